// src/sim.rs
//
// Scripted stand-ins for the two out-of-scope collaborators, used by the
// demo binary and the end-to-end tests. `SimDepth` is a flat floor with
// rectangular height stamps; `ScriptedBlobs` replays whatever blobs the
// script hands it instead of running a contour finder.

use crate::sensor::{Blob, BlobDetector, DepthSource, Mask};
use glam::Vec3;

/// Height-field depth source. World coordinates are
/// (x·mm_per_px, y·mm_per_px, height[x, y]) so the background plane of a
/// flat field is z = 0.
pub struct SimDepth {
    width: usize,
    height: usize,
    mm_per_px: f32,
    z: Vec<f32>,
    connected: bool,
}

impl SimDepth {
    pub fn new(width: usize, height: usize, mm_per_px: f32) -> Self {
        Self {
            width,
            height,
            mm_per_px,
            z: vec![0.0; width * height],
            connected: true,
        }
    }

    /// Reset the field to bare floor.
    pub fn clear(&mut self) {
        self.z.fill(0.0);
    }

    /// Raise a pixel rectangle (inclusive corners) to the given height.
    pub fn stamp(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, z: f32) {
        for y in y0..=y1.min(self.height - 1) {
            for x in x0..=x1.min(self.width - 1) {
                self.z[y * self.width + x] = z;
            }
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl DepthSource for SimDepth {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn world_at(&self, x: usize, y: usize) -> Vec3 {
        Vec3::new(
            x as f32 * self.mm_per_px,
            y as f32 * self.mm_per_px,
            self.z[y * self.width + x],
        )
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_frame_new(&self) -> bool {
        self.connected
    }
}

/// Blob detector replaying scripted blobs. Honors the size bounds of the
/// real contract by filtering on quad bounding-box pixel area; dead labels
/// are drained once like the real tracker's dead-label list.
#[derive(Default)]
pub struct ScriptedBlobs {
    frame: Vec<Blob>,
    dead: Vec<u32>,
}

impl ScriptedBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install this frame's live blobs and newly-dead labels.
    pub fn set_frame(&mut self, blobs: Vec<Blob>, dead: Vec<u32>) {
        self.frame = blobs;
        self.dead = dead;
    }
}

fn quad_pixel_area(quad: &[(f32, f32); 4]) -> f32 {
    let xs = quad.iter().map(|c| c.0);
    let ys = quad.iter().map(|c| c.1);
    let min_x = xs.clone().fold(f32::INFINITY, f32::min);
    let max_x = xs.fold(f32::NEG_INFINITY, f32::max);
    let min_y = ys.clone().fold(f32::INFINITY, f32::min);
    let max_y = ys.fold(f32::NEG_INFINITY, f32::max);
    (max_x - min_x).max(0.0) * (max_y - min_y).max(0.0)
}

impl BlobDetector for ScriptedBlobs {
    fn find_blobs(&mut self, _mask: &Mask, min_area: f32, max_area: f32) -> Vec<Blob> {
        self.frame
            .iter()
            .filter(|b| {
                let area = quad_pixel_area(&b.quad);
                area >= min_area && area <= max_area
            })
            .cloned()
            .collect()
    }

    fn dead_labels(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.dead)
    }
}

/// Axis-aligned blob over a pixel rectangle, for scripting scenes.
pub fn rect_blob(label: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> Blob {
    Blob {
        label,
        centroid: ((x0 + x1) * 0.5, (y0 + y1) * 0.5),
        quad: [(x0, y0), (x1, y0), (x1, y1), (x0, y1)],
    }
}
