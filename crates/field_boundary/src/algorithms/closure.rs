use crate::types::{GeoPoint, GeoRing};

/// Minimum point count of a closed linear ring
pub const MIN_RING_POINTS: usize = 4;

/// Default tolerance, in degrees, when deciding whether a ring is already closed
pub const DEFAULT_CLOSURE_TOLERANCE: f64 = 1e-9;

/// Closes projected coordinate sequences into linear rings
#[derive(Debug, Clone, Copy)]
pub struct RingCloser {
    /// `0.0` compares coordinates exactly
    pub tolerance: f64,
}

impl Default for RingCloser {
    fn default() -> Self {
        Self { tolerance: DEFAULT_CLOSURE_TOLERANCE }
    }
}

impl RingCloser {
    pub fn exact() -> Self {
        Self { tolerance: 0.0 }
    }

    /// Append the first point when the sequence is open. Returns `None` when
    /// the closed sequence is still shorter than four points.
    pub fn close(&self, points: &[GeoPoint]) -> Option<GeoRing> {
        let (first, last) = (*points.first()?, *points.last()?);

        let mut ring = points.to_vec();
        if last.approx_eq(&first, self.tolerance) {
            // snap so first == last holds exactly
            if let Some(end) = ring.last_mut() {
                *end = first;
            }
        } else {
            ring.push(first);
        }

        if ring.len() < MIN_RING_POINTS {
            return None;
        }

        Some(GeoRing::from_closed(ring))
    }
}
