// src/classifier.rs
//
// Per-pixel classification of the depth image into two binary masks:
// "object on the surface" and "hand above the surface", by distance to
// the calibrated background plane. Stateless — two fresh masks per frame.

use crate::plane::BackgroundPlane;
use crate::sensor::{DepthSource, Mask};
use crate::types::Band;

/// Classify every sensor pixel into (object mask, hand mask). The floor
/// band is tested first, so it wins when the two bands overlap. A pixel
/// is on in at most one mask.
pub fn classify(
    depth: &dyn DepthSource,
    plane: &BackgroundPlane,
    floor_band: Band,
    hand_band: Band,
) -> (Mask, Mask) {
    let (w, h) = (depth.width(), depth.height());
    let mut objects = Mask::new(w, h);
    let mut hands = Mask::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let d = plane.distance_to(depth.world_at(x, y));
            if floor_band.contains(d) {
                objects.set(x, y, true);
            } else if hand_band.contains(d) {
                hands.set(x, y, true);
            }
        }
    }

    (objects, hands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Flat z=0 floor with a per-pixel height override.
    struct HeightField {
        width: usize,
        height: usize,
        z: Vec<f32>,
    }

    impl HeightField {
        fn new(width: usize, height: usize) -> Self {
            Self {
                width,
                height,
                z: vec![0.0; width * height],
            }
        }

        fn raise(&mut self, x: usize, y: usize, z: f32) {
            self.z[y * self.width + x] = z;
        }
    }

    impl DepthSource for HeightField {
        fn width(&self) -> usize {
            self.width
        }
        fn height(&self) -> usize {
            self.height
        }
        fn world_at(&self, x: usize, y: usize) -> Vec3 {
            Vec3::new(x as f32, y as f32, self.z[y * self.width + x])
        }
        fn is_connected(&self) -> bool {
            true
        }
        fn is_frame_new(&self) -> bool {
            true
        }
    }

    fn floor_plane() -> BackgroundPlane {
        BackgroundPlane::from_points([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_pixels_split_by_band() {
        let mut field = HeightField::new(4, 1);
        field.raise(1, 0, 40.0); // object height
        field.raise(2, 0, 200.0); // hand height
        field.raise(3, 0, 900.0); // above both bands

        let (objects, hands) = classify(
            &field,
            &floor_plane(),
            Band::new(15.0, 70.0),
            Band::new(70.0, 500.0),
        );

        assert!(!objects.is_set(0, 0) && !hands.is_set(0, 0), "bare floor");
        assert!(objects.is_set(1, 0) && !hands.is_set(1, 0));
        assert!(!objects.is_set(2, 0) && hands.is_set(2, 0));
        assert!(!objects.is_set(3, 0) && !hands.is_set(3, 0), "out of range");
    }

    #[test]
    fn test_floor_band_wins_overlap() {
        // 70.0 sits in both bands; the floor test runs first
        let mut field = HeightField::new(1, 1);
        field.raise(0, 0, 70.0);

        let (objects, hands) = classify(
            &field,
            &floor_plane(),
            Band::new(15.0, 70.0),
            Band::new(70.0, 500.0),
        );
        assert!(objects.is_set(0, 0));
        assert!(!hands.is_set(0, 0));
    }

    #[test]
    fn test_band_edges_inclusive() {
        let mut field = HeightField::new(2, 1);
        field.raise(0, 0, 15.0);
        field.raise(1, 0, 500.0);

        let (objects, hands) = classify(
            &field,
            &floor_plane(),
            Band::new(15.0, 70.0),
            Band::new(70.0, 500.0),
        );
        assert!(objects.is_set(0, 0));
        assert!(hands.is_set(1, 0));
    }
}
