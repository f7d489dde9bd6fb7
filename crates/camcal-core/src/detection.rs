use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One identified ChArUco corner in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedCorner {
    /// Board-relative corner id (row-major over inner corners).
    pub id: u32,
    pub position: Point2<f32>,
}

/// One decoded marker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedMarker {
    pub id: u32,
    /// Marker outline in image pixels (TL, TR, BR, BL), when it could be located.
    pub outline: Option<[Point2<f32>; 4]>,
}

/// Per-frame detector output. Either set may be empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub corners: Vec<DetectedCorner>,
    pub markers: Vec<DetectedMarker>,
}

impl Detection {
    /// A detection with nothing found.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corners.is_empty() && self.markers.is_empty()
    }

    #[inline]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }
}

/// Corner ids and positions retained from one accepted detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    ids: Vec<u32>,
    points: Vec<Point2<f32>>,
}

impl CalibrationSample {
    pub fn from_detection(detection: &Detection) -> Self {
        let (ids, points) = detection
            .corners
            .iter()
            .map(|c| (c.id, c.position))
            .unzip();
        Self { ids, points }
    }

    #[inline]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    #[inline]
    pub fn points(&self) -> &[Point2<f32>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(id, position)` pairs in detection order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Point2<f32>)> + '_ {
        self.ids.iter().copied().zip(self.points.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_keeps_corner_order() {
        let det = Detection {
            corners: vec![
                DetectedCorner {
                    id: 7,
                    position: Point2::new(1.0, 2.0),
                },
                DetectedCorner {
                    id: 3,
                    position: Point2::new(4.0, 5.0),
                },
            ],
            markers: Vec::new(),
        };
        let sample = CalibrationSample::from_detection(&det);
        assert_eq!(sample.ids(), &[7, 3]);
        assert_eq!(sample.points()[1], Point2::new(4.0, 5.0));
        assert_eq!(sample.iter().count(), 2);
    }
}
