use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Geometric center of the box, with integer division. This is the
    /// position proxy tested against zone hulls.
    pub fn centroid(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// One detected object in a frame, produced fresh per frame and never
/// persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Model class name, e.g. "car".
    pub label: String,
    /// Detection confidence in 0..=1.
    pub confidence: f32,
    pub bbox: BoundingBox,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_uses_integer_division() {
        let bbox = BoundingBox {
            x: 0,
            y: 0,
            width: 5,
            height: 5,
        };
        assert_eq!(bbox.centroid(), Point::new(2, 2));
    }

    #[test]
    fn centroid_of_even_box() {
        let bbox = BoundingBox {
            x: 10,
            y: 20,
            width: 4,
            height: 8,
        };
        assert_eq!(bbox.centroid(), Point::new(12, 24));
    }
}
