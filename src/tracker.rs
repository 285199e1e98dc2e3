// src/tracker.rs
//
// Frame orchestrator. One `update` per sensor frame runs the whole
// classify → find-blobs → reconcile → touch sequence synchronously:
//
//   depth → classifier (object mask, hand mask)
//         → blob detectors (labeled blobs per mask, dead hand labels)
//         → registry reconcile (object blobs)
//         → touch pass (every live hand, then every dead hand label)
//
// The registry is owned exclusively by this loop; renderers read objects
// between updates through `objects()` and never mutate.

use crate::classifier::classify;
use crate::event_bus::{EventBus, TrackerEvent};
use crate::metrics::TrackerMetrics;
use crate::plane::{BackgroundPlane, PlaneCalibration};
use crate::registry::{ObjectObservation, ObjectRegistry, TrackedObject};
use crate::sensor::{BlobDetector, DepthSource};
use crate::touch::{self, HandPresence, TouchChange};
use crate::types::TrackingConfig;
use tracing::{debug, info, warn};

const MAX_PENDING_EVENTS: usize = 256;

pub struct SurfaceTracker {
    params: TrackingConfig,
    plane: Option<BackgroundPlane>,
    calibration: PlaneCalibration,
    registry: ObjectRegistry,
    events: EventBus,
    metrics: TrackerMetrics,
}

impl SurfaceTracker {
    pub fn new(params: TrackingConfig) -> Self {
        Self {
            params,
            plane: None,
            calibration: PlaneCalibration::new(),
            registry: ObjectRegistry::new(),
            events: EventBus::new(MAX_PENDING_EVENTS),
            metrics: TrackerMetrics::new(),
        }
    }

    /// Process one sensor frame. Does nothing until the sensor reports a
    /// new frame and a background plane exists.
    pub fn update(
        &mut self,
        depth: &dyn DepthSource,
        object_detector: &mut dyn BlobDetector,
        hand_detector: &mut dyn BlobDetector,
    ) {
        if !depth.is_frame_new() {
            return;
        }
        let Some(plane) = self.plane else {
            debug!("skipping frame: background not calibrated");
            return;
        };

        let (object_mask, hand_mask) =
            classify(depth, &plane, self.params.floor_band, self.params.hand_band);

        let object_blobs = object_detector.find_blobs(
            &object_mask,
            self.params.object_blob_size.min,
            self.params.object_blob_size.max,
        );
        let hand_blobs = hand_detector.find_blobs(
            &hand_mask,
            self.params.hand_blob_size.min,
            self.params.hand_blob_size.max,
        );

        let observations: Vec<ObjectObservation> = object_blobs
            .iter()
            .map(|blob| ObjectObservation {
                label: blob.label,
                area: quad_perimeter_area(depth, &blob.quad),
                world_centroid: world_at_px(depth, blob.centroid),
            })
            .collect();

        let delta = self.registry.reconcile(&observations);
        for label in &delta.appeared {
            self.metrics.inc(&self.metrics.objects_created);
            if let Some(object) = self.registry.get(*label) {
                self.events.publish(TrackerEvent::ObjectAppeared {
                    label: *label,
                    category: object.category,
                });
            }
        }
        for label in &delta.removed {
            self.metrics.inc(&self.metrics.objects_removed);
            self.events.publish(TrackerEvent::ObjectRemoved { label: *label });
        }

        // Level-triggered: every live hand is re-applied every frame
        let mut changes = Vec::new();
        for blob in &hand_blobs {
            let presence = HandPresence {
                label: blob.label,
                centroid_px: blob.centroid,
                world: world_at_px(depth, blob.centroid),
            };
            touch::apply_hand_present(&mut self.registry, &presence, &mut changes);
        }
        for label in hand_detector.dead_labels() {
            touch::apply_hand_gone(&mut self.registry, label, &mut changes);
        }

        for change in changes {
            match change {
                TouchChange::Started { label, hand } => {
                    self.metrics.inc(&self.metrics.touches_started);
                    self.events.publish(TrackerEvent::TouchStarted { label, hand });
                }
                TouchChange::Released { label, hand } => {
                    self.metrics.inc(&self.metrics.touches_released);
                    self.events.publish(TrackerEvent::TouchReleased { label, hand });
                }
            }
        }

        self.metrics.inc(&self.metrics.frames);
    }

    /// Toggle background calibration. Starting discards any partially
    /// collected points.
    pub fn start_calibration(&mut self) {
        self.calibration.toggle();
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_armed()
    }

    pub fn is_calibrated(&self) -> bool {
        self.plane.is_some()
    }

    pub fn background_plane(&self) -> Option<&BackgroundPlane> {
        self.plane.as_ref()
    }

    /// Feed one calibration point, already translated to sensor pixels by
    /// the caller. The third point completes calibration automatically; a
    /// degenerate triple is rejected and leaves the previous plane in place.
    pub fn capture_calibration_point(&mut self, px: usize, py: usize, depth: &dyn DepthSource) {
        let point = depth.world_at(px, py);
        match self.calibration.push(point) {
            Some(Ok(plane)) => {
                info!("background plane calibrated, normal {:?}", plane.normal());
                self.plane = Some(plane);
            }
            Some(Err(e)) => {
                warn!("background calibration rejected: {e}");
            }
            None => {}
        }
    }

    /// Replace the threshold/size parameters for subsequent frames.
    pub fn update_parameters(&mut self, params: TrackingConfig) {
        debug!("tracker parameters updated: {:?}", params);
        self.params = params;
    }

    /// Read-only view of the live objects for rendering. Snapshot of the
    /// last completed update; never valid to hold across an `update`.
    pub fn objects(&self) -> impl Iterator<Item = &TrackedObject> {
        self.registry.iter()
    }

    pub fn object(&self, label: u32) -> Option<&TrackedObject> {
        self.registry.get(label)
    }

    pub fn object_count(&self) -> usize {
        self.registry.len()
    }

    pub fn drain_events(&mut self) -> Vec<TrackerEvent> {
        self.events.drain()
    }

    pub fn metrics(&self) -> &TrackerMetrics {
        &self.metrics
    }
}

/// World point under a fractional pixel centroid (nearest pixel, clamped).
fn world_at_px(depth: &dyn DepthSource, (px, py): (f32, f32)) -> glam::Vec3 {
    let x = (px.round().max(0.0) as usize).min(depth.width().saturating_sub(1));
    let y = (py.round().max(0.0) as usize).min(depth.height().saturating_sub(1));
    depth.world_at(x, y)
}

/// Quad-perimeter area estimate: the world-space lengths of the quad's
/// first two edges summed. Noisy per frame — the registry keeps the running
/// maximum.
fn quad_perimeter_area(depth: &dyn DepthSource, quad: &[(f32, f32); 4]) -> f32 {
    let w0 = world_at_px(depth, quad[0]);
    let w1 = world_at_px(depth, quad[1]);
    let w2 = world_at_px(depth, quad[2]);
    w0.distance(w1) + w1.distance(w2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ObjectCategory;
    use crate::sim::{rect_blob, ScriptedBlobs, SimDepth};
    use crate::types::TrackingConfig;

    fn calibrated_tracker(depth: &SimDepth) -> SurfaceTracker {
        let mut tracker = SurfaceTracker::new(TrackingConfig::default());
        tracker.start_calibration();
        tracker.capture_calibration_point(0, 0, depth);
        tracker.capture_calibration_point(63, 0, depth);
        tracker.capture_calibration_point(0, 63, depth);
        assert!(tracker.is_calibrated());
        tracker
    }

    #[test]
    fn test_uncalibrated_tracker_skips_frames() {
        let depth = SimDepth::new(64, 64, 1.0);
        let mut objects = ScriptedBlobs::new();
        let mut hands = ScriptedBlobs::new();
        objects.set_frame(vec![rect_blob(7, 10.0, 10.0, 29.0, 29.0)], vec![]);

        let mut tracker = SurfaceTracker::new(TrackingConfig::default());
        tracker.update(&depth, &mut objects, &mut hands);
        assert_eq!(tracker.object_count(), 0);
        assert_eq!(tracker.metrics().summary().frames, 0);
    }

    #[test]
    fn test_object_lifetime_through_pipeline() {
        let mut depth = SimDepth::new(64, 64, 1.0);
        let mut objects = ScriptedBlobs::new();
        let mut hands = ScriptedBlobs::new();
        let mut tracker = calibrated_tracker(&depth);

        // A 20x20 px box, 40mm tall: quad perimeter area 19 + 19 = 38 → Small
        depth.stamp(10, 10, 29, 29, 40.0);
        objects.set_frame(vec![rect_blob(7, 10.0, 10.0, 29.0, 29.0)], vec![]);
        tracker.update(&depth, &mut objects, &mut hands);

        let object = tracker.object(7).expect("object tracked");
        assert!((object.area - 38.0).abs() < 1e-3);
        assert_eq!(object.category, ObjectCategory::Small);
        assert_eq!(object.world_position.z, 40.0);
        assert!(matches!(
            tracker.drain_events().as_slice(),
            [TrackerEvent::ObjectAppeared {
                label: 7,
                category: ObjectCategory::Small
            }]
        ));

        // Blob gone next frame → hard delete
        depth.clear();
        objects.set_frame(vec![], vec![]);
        tracker.update(&depth, &mut objects, &mut hands);
        assert_eq!(tracker.object_count(), 0);
        assert!(matches!(
            tracker.drain_events().as_slice(),
            [TrackerEvent::ObjectRemoved { label: 7 }]
        ));
    }

    #[test]
    fn test_touch_sequence_through_pipeline() {
        let mut depth = SimDepth::new(64, 64, 1.0);
        let mut objects = ScriptedBlobs::new();
        let mut hands = ScriptedBlobs::new();
        let mut tracker = calibrated_tracker(&depth);

        // Frame 1: object alone on the surface
        depth.stamp(10, 10, 29, 29, 40.0);
        let object_blob = rect_blob(7, 10.0, 10.0, 29.0, 29.0);
        objects.set_frame(vec![object_blob.clone()], vec![]);
        tracker.update(&depth, &mut objects, &mut hands);
        assert!(!tracker.object(7).unwrap().is_touched());

        // Frame 2: hand hovers beside it at 100mm — world distance to the
        // object centroid (20,20,40) is ~63mm, inside the touch radius
        depth.stamp(30, 12, 45, 27, 100.0);
        objects.set_frame(vec![object_blob.clone()], vec![]);
        hands.set_frame(vec![rect_blob(2, 30.0, 12.0, 45.0, 27.0)], vec![]);
        tracker.update(&depth, &mut objects, &mut hands);
        assert_eq!(tracker.object(7).unwrap().touched_by, 2);

        // Frame 3: hand leaves the volume entirely → released via dead label
        depth.stamp(30, 12, 45, 27, 0.0);
        objects.set_frame(vec![object_blob], vec![]);
        hands.set_frame(vec![], vec![2]);
        tracker.update(&depth, &mut objects, &mut hands);
        assert!(!tracker.object(7).unwrap().is_touched());

        let events = tracker.drain_events();
        let touches: Vec<_> = events
            .iter()
            .filter(|e| {
                matches!(
                    **e,
                    TrackerEvent::TouchStarted { .. } | TrackerEvent::TouchReleased { .. }
                )
            })
            .collect();
        assert_eq!(touches.len(), 2);
        assert!(matches!(*touches[0], TrackerEvent::TouchStarted { label: 7, hand: 2 }));
        assert!(matches!(*touches[1], TrackerEvent::TouchReleased { label: 7, hand: 2 }));

        let summary = tracker.metrics().summary();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.touches_started, 1);
        assert_eq!(summary.touches_released, 1);
    }

    #[test]
    fn test_area_ceiling_survives_pipeline_noise() {
        let mut depth = SimDepth::new(64, 64, 1.0);
        let mut objects = ScriptedBlobs::new();
        let mut hands = ScriptedBlobs::new();
        let mut tracker = calibrated_tracker(&depth);

        depth.stamp(0, 0, 63, 63, 40.0);

        // 31x31 px quad → area 60 → Large
        objects.set_frame(vec![rect_blob(7, 10.0, 10.0, 40.0, 40.0)], vec![]);
        tracker.update(&depth, &mut objects, &mut hands);
        assert_eq!(tracker.object(7).unwrap().category, ObjectCategory::Large);

        // Noisy shrink to a 16x16 px quad (area 30) — ceiling holds
        objects.set_frame(vec![rect_blob(7, 10.0, 10.0, 25.0, 25.0)], vec![]);
        tracker.update(&depth, &mut objects, &mut hands);
        let object = tracker.object(7).unwrap();
        assert!((object.area - 60.0).abs() < 1e-3);
        assert_eq!(object.category, ObjectCategory::Large);
    }

    #[test]
    fn test_update_parameters_changes_blob_filtering() {
        let mut depth = SimDepth::new(64, 64, 1.0);
        let mut objects = ScriptedBlobs::new();
        let mut hands = ScriptedBlobs::new();
        let mut tracker = calibrated_tracker(&depth);

        depth.stamp(10, 10, 29, 29, 40.0);
        objects.set_frame(vec![rect_blob(7, 10.0, 10.0, 29.0, 29.0)], vec![]);

        // Shrink the accepted object blob size below the 400px blob
        let mut params = TrackingConfig::default();
        params.object_blob_size = crate::types::Band::new(1.0, 100.0);
        tracker.update_parameters(params);
        tracker.update(&depth, &mut objects, &mut hands);
        assert_eq!(tracker.object_count(), 0);

        tracker.update_parameters(TrackingConfig::default());
        objects.set_frame(vec![rect_blob(7, 10.0, 10.0, 29.0, 29.0)], vec![]);
        tracker.update(&depth, &mut objects, &mut hands);
        assert_eq!(tracker.object_count(), 1);
    }
}
