// src/registry.rs
//
// Persistent object state keyed by blob-tracker label. Rebuilt against the
// live label set every frame: update pass first, then a hard delete of every
// label the detector no longer reports. No coasting — the external tracker
// already owns label persistence, so a missing label means the object is gone.

use glam::Vec3;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Area threshold splitting the two category buckets.
pub const CATEGORY_AREA_THRESHOLD: f32 = 50.0;

/// Hand label recorded on an object nobody is touching.
pub const UNTOUCHED: u32 = 0;

/// Coarse size classification. Two buckets for now; the selector is the
/// single place to extend when richer categories land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectCategory {
    Small,
    Large,
}

impl ObjectCategory {
    /// Pure, total selector: area below the threshold is Small, else Large.
    pub fn from_area(area: f32) -> Self {
        if area < CATEGORY_AREA_THRESHOLD {
            Self::Small
        } else {
            Self::Large
        }
    }
}

/// One persistent physical item on the surface.
#[derive(Debug, Clone)]
pub struct TrackedObject {
    pub label: u32,
    /// Running maximum of the per-frame quad-perimeter area estimate.
    /// Never decreases — the raw estimate is too noisy to report directly.
    pub area: f32,
    /// Latest world-space centroid, overwritten every sighting
    pub world_position: Vec3,
    pub category: ObjectCategory,
    /// Label of the hand currently touching this object, or [`UNTOUCHED`]
    pub touched_by: u32,
}

impl TrackedObject {
    fn new(label: u32, area: f32, world_position: Vec3) -> Self {
        Self {
            label,
            area,
            world_position,
            category: ObjectCategory::from_area(area),
            touched_by: UNTOUCHED,
        }
    }

    pub fn is_touched(&self) -> bool {
        self.touched_by != UNTOUCHED
    }
}

/// One live object blob as seen this frame.
#[derive(Debug, Clone)]
pub struct ObjectObservation {
    pub label: u32,
    pub area: f32,
    pub world_centroid: Vec3,
}

/// Labels that entered or left the registry during one reconcile pass.
#[derive(Debug, Default)]
pub struct FrameDelta {
    pub appeared: Vec<u32>,
    pub removed: Vec<u32>,
}

#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: HashMap<u32, TrackedObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile stored objects against this frame's live blobs.
    /// Insert/update runs strictly before the delete pass, so a label in
    /// the observations is never deleted by its own call. Afterwards the
    /// key set equals exactly the observation label set.
    pub fn reconcile(&mut self, observations: &[ObjectObservation]) -> FrameDelta {
        let mut delta = FrameDelta::default();

        for obs in observations {
            match self.objects.get_mut(&obs.label) {
                Some(object) => {
                    object.world_position = obs.world_centroid;
                    if obs.area > object.area {
                        object.area = obs.area;
                    }
                }
                None => {
                    debug!(
                        "object {} appeared (area {:.1} at {:?})",
                        obs.label, obs.area, obs.world_centroid
                    );
                    self.objects
                        .insert(obs.label, TrackedObject::new(obs.label, obs.area, obs.world_centroid));
                    delta.appeared.push(obs.label);
                }
            }
        }

        for object in self.objects.values_mut() {
            object.category = ObjectCategory::from_area(object.area);
        }

        let live: HashSet<u32> = observations.iter().map(|o| o.label).collect();
        self.objects.retain(|label, _| {
            if live.contains(label) {
                true
            } else {
                debug!("object {} left the surface", label);
                delta.removed.push(*label);
                false
            }
        });

        delta
    }

    pub fn get(&self, label: u32) -> Option<&TrackedObject> {
        self.objects.get(&label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedObject> {
        self.objects.values_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
