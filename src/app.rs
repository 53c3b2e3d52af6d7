//! Application wiring: collaborators in, per-frame tick out.
//!
//! `OverlayApp` connects the tracking collaborator, the lifecycle state
//! machine, the event bus and the capture pipeline. Everything timing-related
//! flows through `tick(now)`; DOM-style entry points (`set_sensitivity`,
//! `capture`) interleave between ticks on the same logical thread.

use crate::animation::ClipSet;
use crate::capture::{CaptureConfig, CaptureOutcome, CapturePipeline, CaptureRequest, ExportEnv, Platform, RenderTarget, VideoSource};
use crate::config::Config;
use crate::events::{EventBus, TrackingEvent, TrackingListener};
use crate::lifecycle::{AssetRoot, LifecycleConfig, TrackingLifecycle, TrackingState};
use crate::pose::Pose;
use crate::smoothing::SensitivityProfile;
use crate::Result;
use log::info;

/// The tracking collaborator: found/lost notifications plus a raw pose for
/// the active anchor, read once per tick.
pub trait AnchorSource {
    /// Drain the next pending tracking event, if any.
    fn poll_event(&mut self) -> Option<TrackingEvent>;
    /// Raw pose of the active anchor; `None` while no target is visible.
    fn raw_pose(&self) -> Option<Pose>;
}

/// External collaborators injected at construction.
pub struct Collaborators {
    pub anchor: Box<dyn AnchorSource>,
    pub asset: Box<dyn AssetRoot>,
    pub clips: ClipSet,
    pub video: Box<dyn VideoSource>,
    pub render: Box<dyn RenderTarget>,
    pub export: Box<dyn ExportEnv>,
}

/// Main application struct
pub struct OverlayApp {
    config: Config,
    platform: Platform,
    lifecycle: TrackingLifecycle,
    bus: EventBus,
    pipeline: CapturePipeline,
    anchor: Box<dyn AnchorSource>,
    asset: Box<dyn AssetRoot>,
    video: Box<dyn VideoSource>,
    render: Box<dyn RenderTarget>,
    export: Box<dyn ExportEnv>,
}

impl OverlayApp {
    /// Create a new overlay application for the given platform.
    pub fn new(config: Config, platform: Platform, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        info!("Initializing AR overlay on {:?}", platform);

        let params = config.smoothing_params(platform.is_mobile());
        if platform.is_mobile() {
            info!(
                "Mobile platform: buffer {} / prediction {}",
                params.buffer_capacity, params.prediction_strength
            );
        }

        let lifecycle = TrackingLifecycle::new(
            LifecycleConfig {
                animation_delay: config.lifecycle.animation_delay_secs,
                fade_duration: config.lifecycle.fade_duration_secs,
            },
            params,
            collaborators.clips,
        );

        let pipeline = CapturePipeline::new(
            platform,
            CaptureConfig {
                prefix: config.capture.file_prefix.clone(),
                jpeg_quality: config.capture.jpeg_quality,
            },
        );

        Ok(Self {
            config,
            platform,
            lifecycle,
            bus: EventBus::new(),
            pipeline,
            anchor: collaborators.anchor,
            asset: collaborators.asset,
            video: collaborators.video,
            render: collaborators.render,
            export: collaborators.export,
        })
    }

    /// Subscribe a listener (UI chrome, audio cues) to tracking events.
    pub fn subscribe(&mut self, listener: Box<dyn TrackingListener>) {
        self.bus.subscribe(listener);
    }

    /// One frame of work: drain tracker events, advance the lifecycle and
    /// apply the stabilized transform.
    pub fn tick(&mut self, now: f64) {
        while let Some(event) = self.anchor.poll_event() {
            match event {
                TrackingEvent::TargetFound => self.lifecycle.on_target_found(now, self.asset.as_mut()),
                TrackingEvent::TargetLost => self.lifecycle.on_target_lost(now),
            }
            self.bus.notify(event);
        }

        let raw = self.anchor.raw_pose();
        self.lifecycle.tick(now, raw, self.asset.as_mut());
    }

    /// Change sensitivity at any time, including mid-session. The in-flight
    /// pose buffer is resized, never reset.
    pub fn set_sensitivity(&mut self, profile: SensitivityProfile) {
        info!("Sensitivity changed to {:?}", profile);
        self.lifecycle.set_params(profile.params());
    }

    /// User-triggered capture of the current composited view.
    pub fn capture(&mut self, timestamp_ms: u64) -> Result<CaptureOutcome> {
        let request = CaptureRequest::new(self.platform, timestamp_ms);
        info!("Capture requested: {:?}", request);
        self.pipeline
            .capture(self.video.as_ref(), self.render.as_mut(), self.export.as_mut(), timestamp_ms)
    }

    #[must_use]
    pub fn state(&self) -> TrackingState {
        self.lifecycle.state()
    }

    #[must_use]
    pub fn lifecycle(&self) -> &TrackingLifecycle {
        &self.lifecycle
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
