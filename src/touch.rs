// src/touch.rs
//
// Hand/object touch relation. The hand pipeline reports every live hand
// blob every frame (level-triggered "present", not edge-triggered
// "arrived") plus the labels that died this frame; both passes walk the
// whole registry applying the transition rules per object:
//
//   untouched:
//     - hand within range            → claim
//     - hand out of range            → nothing
//   touched by hand h:
//     - other hand, any distance     → nothing (no stealing)
//     - present(h) out of range      → release
//     - gone(h)                      → release
//
// Entry and exit share one threshold, exactly as the original behaved.
// That can flicker right at the boundary; widening into a two-threshold
// hysteresis band would change acquisition behavior, so it stays single.

use crate::registry::{ObjectRegistry, UNTOUCHED};
use glam::Vec3;
use tracing::debug;

/// World-space distance below which a hand touches an object (millimeters
/// for a Kinect-class sensor).
pub const TOUCH_DISTANCE: f32 = 100.0;

/// One live hand blob, re-broadcast every frame the hand stays live.
/// Hands have no persistent entity here — identity lives in the external
/// blob tracker's labels.
#[derive(Debug, Clone)]
pub struct HandPresence {
    pub label: u32,
    /// Centroid in sensor pixels
    pub centroid_px: (f32, f32),
    /// Centroid projected to world space
    pub world: Vec3,
}

/// Touch transitions produced by one frame's hand passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchChange {
    Started { label: u32, hand: u32 },
    Released { label: u32, hand: u32 },
}

/// Apply one live hand to every tracked object. An empty registry is a
/// no-op — a hand event with nothing to touch is not an error.
pub fn apply_hand_present(
    registry: &mut ObjectRegistry,
    hand: &HandPresence,
    changes: &mut Vec<TouchChange>,
) {
    for object in registry.iter_mut() {
        let distance = hand.world.distance(object.world_position);
        if object.touched_by == UNTOUCHED && distance < TOUCH_DISTANCE {
            object.touched_by = hand.label;
            debug!(
                "hand {} at px ({:.0},{:.0}) touched object {} (distance {:.1})",
                hand.label, hand.centroid_px.0, hand.centroid_px.1, object.label, distance
            );
            changes.push(TouchChange::Started {
                label: object.label,
                hand: hand.label,
            });
        } else if object.touched_by == hand.label && distance >= TOUCH_DISTANCE {
            object.touched_by = UNTOUCHED;
            debug!(
                "hand {} moved away from object {} (distance {:.1})",
                hand.label, object.label, distance
            );
            changes.push(TouchChange::Released {
                label: object.label,
                hand: hand.label,
            });
        }
        // Touched by a different hand: no change, whatever the distance
    }
}

/// Apply one dead hand label. Releases every object it was touching —
/// the only path out when a hand leaves the sensed volume abruptly.
pub fn apply_hand_gone(registry: &mut ObjectRegistry, hand_label: u32, changes: &mut Vec<TouchChange>) {
    for object in registry.iter_mut() {
        if object.touched_by == hand_label {
            object.touched_by = UNTOUCHED;
            debug!("hand {} left, releasing object {}", hand_label, object.label);
            changes.push(TouchChange::Released {
                label: object.label,
                hand: hand_label,
            });
        }
    }
}
