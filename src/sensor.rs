// src/sensor.rs
//
// Contracts for the two external collaborators the tracker consumes:
// the depth camera (pixel → world projection) and the blob detector
// (connected components with persistent labels). Neither is implemented
// here — hardware and contour finding live outside the core. The `sim`
// module provides scripted stand-ins for both.

use glam::Vec3;

/// Depth camera with a calibrated pixel → world projection.
pub trait DepthSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// World-space point under the given sensor pixel.
    fn world_at(&self, x: usize, y: usize) -> Vec3;
    fn is_connected(&self) -> bool;
    /// True when a frame arrived since the last `update` pass consumed one.
    fn is_frame_new(&self) -> bool;
}

/// Blob detector with frame-to-frame label persistence. Labels are stable
/// for the same physical entity until reported dead.
pub trait BlobDetector {
    /// Blobs in the mask with pixel area inside [min_area, max_area].
    fn find_blobs(&mut self, mask: &Mask, min_area: f32, max_area: f32) -> Vec<Blob>;
    /// Labels that died since the previous frame. Drained on read.
    fn dead_labels(&mut self) -> Vec<u32>;
}

/// One detected connected region.
#[derive(Debug, Clone)]
pub struct Blob {
    pub label: u32,
    /// Centroid in sensor pixels
    pub centroid: (f32, f32),
    /// Fitted bounding quad, 4 corners in sensor pixels
    pub quad: [(f32, f32); 4],
}

/// Single-channel binary image exchanged between classifier and detector.
/// Pixels are 0 (off) or 255 (on).
#[derive(Debug, Clone)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.width + x] = if on { 255 } else { 0 };
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] != 0
    }

    /// Number of on pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&p| p != 0).count()
    }
}
