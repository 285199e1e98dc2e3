// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub logging: LoggingConfig,
}

/// Threshold bands driving classification and blob filtering. Distances are
/// world units (millimeters for a Kinect-class sensor), blob sizes are pixel
/// areas passed through to the blob detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Distance-to-plane band classified as "object on the surface"
    pub floor_band: Band,
    /// Distance-to-plane band classified as "hand above the surface"
    pub hand_band: Band,
    /// Accepted pixel-area range for object blobs
    pub object_blob_size: Band,
    /// Accepted pixel-area range for hand blobs
    pub hand_blob_size: Band,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Inclusive [min, max] range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            floor_band: Band::new(15.0, 70.0),
            hand_band: Band::new(70.0, 500.0),
            object_blob_size: Band::new(20.0, 30_000.0),
            hand_blob_size: Band::new(100.0, 50_000.0),
        }
    }
}
