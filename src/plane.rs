// src/plane.rs
//
// Background plane calibration. Three picked world points define the
// reference surface (tabletop/floor); everything else is measured as
// absolute distance from it.

use glam::Vec3;
use thiserror::Error;
use tracing::{debug, info};

/// Cross products with squared length below this are treated as degenerate
/// (collinear or coincident calibration points).
const MIN_NORMAL_LENGTH_SQ: f32 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("calibration points are collinear or coincident")]
    CollinearPoints,
}

/// Calibrated reference surface: a point on the plane and a unit normal.
/// Immutable once built; recalibration replaces the whole value.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundPlane {
    v0: Vec3,
    n: Vec3,
}

impl BackgroundPlane {
    /// Derive the plane from 3 non-collinear world points:
    /// v0 = p0, n = normalize((p1-p0) × (p2-p0)).
    pub fn from_points(points: [Vec3; 3]) -> Result<Self, CalibrationError> {
        let cross = (points[1] - points[0]).cross(points[2] - points[0]);
        if cross.length_squared() < MIN_NORMAL_LENGTH_SQ {
            return Err(CalibrationError::CollinearPoints);
        }
        Ok(Self {
            v0: points[0],
            n: cross.normalize(),
        })
    }

    /// Absolute distance from `p` to the plane: |n·(p - v0)|.
    pub fn distance_to(&self, p: Vec3) -> f32 {
        self.n.dot(p - self.v0).abs()
    }

    pub fn normal(&self) -> Vec3 {
        self.n
    }
}

/// Re-enterable 3-point collector driving [`BackgroundPlane::from_points`].
/// Armed by a start/stop toggle; one point is pushed per external "point
/// captured" signal and the third point completes calibration automatically.
#[derive(Debug, Default)]
pub struct PlaneCalibration {
    armed: bool,
    points: Vec<Vec3>,
}

impl PlaneCalibration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle collection. Arming discards any partially collected points;
    /// disarming abandons the current attempt.
    pub fn toggle(&mut self) {
        self.armed = !self.armed;
        if self.armed {
            self.points.clear();
            info!("background calibration started, pick 3 points");
        } else {
            debug!("background calibration cancelled");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn captured(&self) -> usize {
        self.points.len()
    }

    /// Feed one captured world point. Ignored while disarmed. Returns the
    /// calibration result once the third point lands; collection disarms
    /// either way, so a rejected plane needs a fresh toggle.
    pub fn push(&mut self, point: Vec3) -> Option<Result<BackgroundPlane, CalibrationError>> {
        if !self.armed {
            return None;
        }
        self.points.push(point);
        debug!("calibration point {}/3 captured: {:?}", self.points.len(), point);
        if self.points.len() < 3 {
            return None;
        }
        self.armed = false;
        let points = [self.points[0], self.points[1], self.points[2]];
        self.points.clear();
        Some(BackgroundPlane::from_points(points))
    }
}
