use std::marker::PhantomData;
use serde::{Deserialize, Serialize};
use geojson::{Geometry, JsonObject};
use ts_rs::TS;
use schemars::JsonSchema;

use crate::types::SizeCategory;

/// Properties for traced boundary features
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS, JsonSchema)]
#[ts(export)]
#[schemars(description = "Properties for traced field boundary features")]
pub struct BoundaryProperties {
    #[schemars(description = "Index of the instance in the segmentation output")]
    pub id: usize,
    #[schemars(description = "Estimated area in hectares, 0 when unknown")]
    pub area_hectares: f64,
    #[schemars(description = "Size class derived from the area")]
    pub size_category: SizeCategory,
    #[schemars(description = "Human readable summary")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    #[schemars(description = "Class name reported by the segmentation model")]
    pub class_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    #[schemars(description = "Confidence reported by the segmentation model")]
    pub confidence: Option<f64>,
}

/// Type alias for boundary GeoJSON
pub type BoundaryGeoJson = TypedGeoJson<BoundaryProperties>;

/// A typed GeoJSON Feature that is generic over its properties.
#[derive(Serialize, Deserialize, Debug)]
pub struct TypedFeature<P> {
    #[serde(flatten)]
    pub feature: geojson::Feature,
    #[serde(skip)]
    _properties: PhantomData<P>,
}

impl<P> TypedFeature<P>
where
    for<'de> P: Serialize + Deserialize<'de>,
{
    /// Creates a new TypedFeature.
    pub fn new(geometry: Option<Geometry>, properties: P) -> Self {
        let feature = geojson::Feature {
            bbox: None,
            geometry,
            id: None,
            properties: serde_json::to_value(properties).ok().and_then(|v| v.as_object().cloned()),
            foreign_members: None,
        };
        Self {
            feature,
            _properties: PhantomData,
        }
    }

    /// Wrap an untyped feature
    pub fn from_feature(feature: geojson::Feature) -> Self {
        Self {
            feature,
            _properties: PhantomData,
        }
    }

    /// Tries to access the typed properties of the feature.
    pub fn properties(&self) -> Option<P> {
        self.feature.properties.as_ref().and_then(|p| {
            serde_json::from_value(serde_json::Value::Object(p.clone())).ok()
        })
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TypedFeatureCollection<P> {
    pub bbox: Option<Vec<f64>>,
    pub features: Vec<TypedFeature<P>>,
    pub foreign_members: Option<JsonObject>,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum TypedGeoJson<P> {
    Geometry(Geometry),
    Feature(TypedFeature<P>),
    FeatureCollection(TypedFeatureCollection<P>),
}

impl<P> TypedGeoJson<P> {
    /// Get the underlying FeatureCollection if this is a FeatureCollection variant
    pub fn as_feature_collection(&self) -> Option<&TypedFeatureCollection<P>> {
        match self {
            TypedGeoJson::FeatureCollection(fc) => Some(fc),
            _ => None,
        }
    }

    /// Convert to FeatureCollection, consuming self
    pub fn into_feature_collection(self) -> Option<TypedFeatureCollection<P>> {
        match self {
            TypedGeoJson::FeatureCollection(fc) => Some(fc),
            _ => None,
        }
    }
}

impl<P> TypedFeatureCollection<P> {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[TypedFeature<P>] {
        &self.features
    }
}

impl BoundaryGeoJson {
    fn typed_features(&self) -> &[TypedFeature<BoundaryProperties>] {
        self.as_feature_collection()
            .map(|fc| fc.features.as_slice())
            .unwrap_or(&[])
    }

    /// Get features of one size category
    pub fn features_by_category(&self, category: SizeCategory) -> Vec<&TypedFeature<BoundaryProperties>> {
        self.typed_features()
            .iter()
            .filter(|feature| {
                feature.properties()
                    .map(|props| props.size_category == category)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Sum of `area_hectares` over all features
    pub fn total_area_hectares(&self) -> f64 {
        self.typed_features()
            .iter()
            .filter_map(|feature| feature.properties())
            .map(|props| props.area_hectares)
            .sum()
    }

    /// Get the largest feature by area
    pub fn largest_feature(&self) -> Option<&TypedFeature<BoundaryProperties>> {
        self.typed_features()
            .iter()
            .max_by(|a, b| {
                let area_a = a.properties().map(|p| p.area_hectares).unwrap_or(0.0);
                let area_b = b.properties().map(|p| p.area_hectares).unwrap_or(0.0);
                area_a.total_cmp(&area_b)
            })
    }

    /// Get image dimensions from foreign members
    pub fn image_dimensions(&self) -> Option<(u32, u32)> {
        let foreign = self.as_feature_collection()?.foreign_members.as_ref()?;
        let width = foreign.get("image_width")?.as_u64()? as u32;
        let height = foreign.get("image_height")?.as_u64()? as u32;
        Some((width, height))
    }

    /// Get feature count from foreign members
    pub fn feature_count(&self) -> Option<usize> {
        self.as_feature_collection()?
            .foreign_members
            .as_ref()
            .and_then(|foreign| foreign.get("feature_count"))
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
    }
}
