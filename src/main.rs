// src/main.rs

mod classifier;
mod config;
mod event_bus;
mod metrics;
mod plane;
mod registry;
mod sensor;
mod sim;
mod touch;
mod tracker;
mod types;

use anyhow::{bail, Result};
use sensor::DepthSource;
use sim::{rect_blob, ScriptedBlobs, SimDepth};
use tracing::info;
use tracker::SurfaceTracker;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.yaml".to_string());
    let config = types::Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("surface touch tracker starting");
    info!(
        "bands: floor [{:.0},{:.0}]mm, hand [{:.0},{:.0}]mm",
        config.tracking.floor_band.min,
        config.tracking.floor_band.max,
        config.tracking.hand_band.min,
        config.tracking.hand_band.max
    );

    // Simulated scene in place of a depth camera + contour finder
    let mut depth = SimDepth::new(320, 240, 2.0);
    let mut object_blobs = ScriptedBlobs::new();
    let mut hand_blobs = ScriptedBlobs::new();

    if !depth.is_connected() {
        bail!("depth sensor unavailable");
    }

    let mut tracker = SurfaceTracker::new(config.tracking.clone());

    // Background calibration from three floor corners
    tracker.start_calibration();
    tracker.capture_calibration_point(10, 10, &depth);
    tracker.capture_calibration_point(300, 10, &depth);
    tracker.capture_calibration_point(10, 230, &depth);
    if !tracker.is_calibrated() {
        bail!("background calibration failed");
    }

    // Scripted session: a box is placed, a hand reaches in, touches it,
    // withdraws, and the box is taken away.
    let frames = 120u64;
    for frame in 0..frames {
        depth.clear();

        if (10..100).contains(&frame) {
            depth.stamp(100, 80, 139, 119, 40.0);
            object_blobs.set_frame(vec![rect_blob(1, 100.0, 80.0, 139.0, 119.0)], vec![]);
        } else {
            object_blobs.set_frame(vec![], vec![]);
        }

        if (40..70).contains(&frame) {
            // Hand slides in from the right toward the object
            let reach = (frame - 40) as usize;
            let x0 = 220usize.saturating_sub(reach * 3).max(140);
            depth.stamp(x0, 85, x0 + 30, 115, 90.0);
            hand_blobs.set_frame(
                vec![rect_blob(2, x0 as f32, 85.0, (x0 + 30) as f32, 115.0)],
                vec![],
            );
        } else if frame == 70 {
            hand_blobs.set_frame(vec![], vec![2]);
        } else {
            hand_blobs.set_frame(vec![], vec![]);
        }

        tracker.update(&depth, &mut object_blobs, &mut hand_blobs);

        for event in tracker.drain_events() {
            info!("frame {frame}: {event:?}");
        }
    }

    let summary = tracker.metrics().summary();
    info!(
        "done: {} frames, {} objects tracked, {} touches ({:.1} fps)",
        summary.frames, summary.objects_created, summary.touches_started, summary.fps
    );

    Ok(())
}
