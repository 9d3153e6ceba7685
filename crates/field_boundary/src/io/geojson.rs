use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

use crate::{
    error::{BoundaryError, Result},
    typed_geojson::{BoundaryGeoJson, BoundaryProperties, TypedFeature, TypedFeatureCollection, TypedGeoJson},
    types::{BoundaryFeature, GeoPoint, TracedBoundaries},
};

impl BoundaryFeature {
    pub fn properties(&self) -> BoundaryProperties {
        BoundaryProperties {
            id: self.source_id,
            area_hectares: self.area_hectares,
            size_category: self.size_category,
            message: self.message(),
            class_label: self.label.clone(),
            confidence: self.confidence,
        }
    }

    /// GeoJSON Polygon geometry; positions are emitted as `[lng, lat]`
    pub fn geometry(&self) -> Geometry {
        Geometry::new(Value::Polygon(vec![self.geometry.positions()]))
    }

    pub fn to_geojson_feature(&self) -> Result<Feature> {
        let properties = match serde_json::to_value(self.properties())? {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(BoundaryError::InvalidRequest(format!(
                    "feature properties did not serialize to an object: {}", other
                )))
            }
        };

        Ok(Feature {
            bbox: None,
            geometry: Some(self.geometry()),
            id: Some(geojson::feature::Id::Number(serde_json::Number::from(self.source_id))),
            properties: Some(properties),
            foreign_members: None,
        })
    }
}

impl TracedBoundaries {
    fn foreign_members(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut foreign_members = serde_json::Map::new();
        foreign_members.insert("image_width".to_string(), serde_json::Value::from(self.image_width));
        foreign_members.insert("image_height".to_string(), serde_json::Value::from(self.image_height));
        foreign_members.insert("feature_count".to_string(), serde_json::Value::from(self.features.len()));
        foreign_members.insert(
            "m2_per_pixel".to_string(),
            serde_json::Number::from_f64(self.scale_factor.square_meters_per_pixel())
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        );
        foreign_members
    }

    /// Bare list of GeoJSON features
    pub fn to_features(&self) -> Result<Vec<Feature>> {
        self.features.iter().map(BoundaryFeature::to_geojson_feature).collect()
    }

    /// GeoJSON FeatureCollection with image metadata in its foreign members
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        Ok(FeatureCollection {
            bbox: None,
            features: self.to_features()?,
            foreign_members: Some(self.foreign_members()),
        })
    }

    /// Export to typed GeoJSON format
    pub fn to_typed_geojson(&self) -> Result<BoundaryGeoJson> {
        let features = self.to_features()?
            .into_iter()
            .map(TypedFeature::from_feature)
            .collect();

        Ok(TypedGeoJson::FeatureCollection(TypedFeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(self.foreign_members()),
        }))
    }

    /// Legacy `{polygons: [{paths: [...]}]}` dialect
    pub fn to_paths(&self) -> Result<PathsResponse> {
        PathsResponse::from_features(&self.to_features()?)
    }
}

/// One outline in the legacy paths dialect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PathPolygon {
    pub paths: Vec<GeoPoint>,
}

/// Legacy response: open outlines in `{lat, lng}` form, no area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct PathsResponse {
    pub polygons: Vec<PathPolygon>,
}

impl PathsResponse {
    /// Derive the paths dialect from GeoJSON Polygon features.
    /// The closing position of each exterior ring is dropped.
    pub fn from_features(features: &[Feature]) -> Result<Self> {
        let mut polygons = Vec::with_capacity(features.len());

        for feature in features {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            let Value::Polygon(rings) = &geometry.value else {
                return Err(BoundaryError::InvalidRequest(
                    "paths dialect only supports Polygon geometries".to_string(),
                ));
            };
            let Some(exterior) = rings.first() else {
                continue;
            };

            let mut paths = exterior
                .iter()
                .map(|position| match position.as_slice() {
                    [lng, lat, ..] => Ok(GeoPoint::new(*lat, *lng)),
                    _ => Err(BoundaryError::InvalidRequest(format!(
                        "position has fewer than two coordinates: {:?}", position
                    ))),
                })
                .collect::<Result<Vec<GeoPoint>>>()?;

            if paths.len() > 1 && paths.first() == paths.last() {
                paths.pop();
            }

            polygons.push(PathPolygon { paths });
        }

        Ok(Self { polygons })
    }
}
