//! Tracking lifecycle: visibility, fade-out and the one-shot animation.
//!
//! The controller owns the session state, the pose buffer and the smoother,
//! and is driven by found/lost events from the tracking collaborator plus a
//! per-frame tick. All entry points take an explicit `now` in seconds; the
//! controller never reads a wall clock, so tests drive time directly.
//!
//! ```text
//! Idle ──found──▶ Tracking ──lost──▶ FadingOut ──alpha=0──▶ Idle
//!   ▲                 ▲                  │
//!   └─────────────────┴───────found──────┘   (fade canceled)
//! ```

use crate::animation::ClipSet;
use crate::pose::{Pose, PoseBuffer};
use crate::smoothing::{PoseSmoother, SmoothingParams};
use crate::timer::OneShotTimer;
use log::{debug, info};

/// Scene-graph handle for the overlaid asset, provided by the render
/// collaborator.
pub trait AssetRoot {
    fn set_visible(&mut self, visible: bool);
    /// Material opacity in [0, 1]; values below 1 imply transparency is
    /// enabled on the material.
    fn set_opacity(&mut self, alpha: f64);
    fn apply_pose(&mut self, pose: &Pose);
    /// The transform last applied to the asset, used to reseed smoothing on
    /// reacquisition.
    fn committed_pose(&self) -> Pose;
}

/// Lifecycle state of one tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// No target visible, asset hidden, buffer empty
    Idle,
    /// Target visible, asset opaque, buffer filling
    Tracking,
    /// Target just lost, opacity ramping down
    FadingOut,
}

/// Explicit session value owned by the controller; never ambient state.
#[derive(Debug, Clone, Copy)]
pub struct TrackingSession {
    pub state: TrackingState,
    /// True from the moment the one-shot animation fires until the next
    /// fresh acquisition (Idle → Tracking)
    pub animation_played: bool,
    /// Fade start time; only meaningful in `FadingOut`
    pub fade_start: f64,
}

impl TrackingSession {
    fn new() -> Self {
        Self {
            state: TrackingState::Idle,
            animation_played: false,
            fade_start: 0.0,
        }
    }
}

/// Timing constants for the lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleConfig {
    /// Seconds between acquisition and the one-shot animation firing
    pub animation_delay: f64,
    /// Seconds the fade-out ramp takes
    pub fade_duration: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            animation_delay: crate::constants::DEFAULT_ANIMATION_DELAY_SECS,
            fade_duration: crate::constants::DEFAULT_FADE_DURATION_SECS,
        }
    }
}

/// State machine governing asset visibility, fade-out and the one-shot
/// animation trigger.
pub struct TrackingLifecycle {
    config: LifecycleConfig,
    session: TrackingSession,
    buffer: PoseBuffer,
    smoother: PoseSmoother,
    params: SmoothingParams,
    clips: ClipSet,
    animation_timer: OneShotTimer,
}

impl TrackingLifecycle {
    #[must_use]
    pub fn new(config: LifecycleConfig, params: SmoothingParams, clips: ClipSet) -> Self {
        Self {
            config,
            session: TrackingSession::new(),
            buffer: PoseBuffer::new(params.buffer_capacity),
            smoother: PoseSmoother::new(),
            params,
            clips,
            animation_timer: OneShotTimer::new(),
        }
    }

    /// Target acquired, from Idle or mid-fade. Cancels any in-flight fade,
    /// restores full opacity and reseeds smoothing from the asset's last
    /// committed transform so the overlay resumes without jumping.
    pub fn on_target_found(&mut self, now: f64, asset: &mut dyn AssetRoot) {
        if self.session.state == TrackingState::Tracking {
            debug!("Target found while already tracking; ignored");
            return;
        }
        info!("Target found");

        let fresh_acquisition = self.session.state == TrackingState::Idle;
        if fresh_acquisition {
            self.session.animation_played = false;
        }

        asset.set_visible(true);
        asset.set_opacity(1.0);

        self.buffer.reseed(asset.committed_pose());
        self.smoother.reseed(asset.committed_pose());
        self.session.state = TrackingState::Tracking;

        if !self.session.animation_played && !self.clips.is_empty() {
            self.animation_timer.arm(now, self.config.animation_delay);
        }
    }

    /// Target lost while tracking: start the fade, keep the buffer and the
    /// animation flag so a quick reacquire resumes smoothly.
    pub fn on_target_lost(&mut self, now: f64) {
        if self.session.state != TrackingState::Tracking {
            debug!("Target lost outside Tracking; ignored");
            return;
        }
        info!("Target lost, fading out");

        // An armed trigger must never fire once we leave Tracking.
        self.animation_timer.cancel();
        self.session.state = TrackingState::FadingOut;
        self.session.fade_start = now;
    }

    /// Per-frame tick. Applies the stabilized pose while active and advances
    /// the fade; a controller left in Idle forever is a valid steady state.
    pub fn tick(&mut self, now: f64, raw: Option<Pose>, asset: &mut dyn AssetRoot) {
        match self.session.state {
            TrackingState::Idle => {}
            TrackingState::Tracking => {
                if let Some(raw) = raw {
                    let stabilized = self.smoother.smooth(&mut self.buffer, raw, &self.params);
                    asset.apply_pose(&stabilized);
                }
                // Re-validate at fire time: the poll alone is not proof we
                // are still in the state that armed it.
                if self.animation_timer.poll(now)
                    && self.session.state == TrackingState::Tracking
                    && !self.session.animation_played
                {
                    info!("Playing one-shot animation ({} clips)", self.clips.len());
                    self.clips.play_all();
                    self.session.animation_played = true;
                }
            }
            TrackingState::FadingOut => {
                if let Some(raw) = raw {
                    let stabilized = self.smoother.smooth(&mut self.buffer, raw, &self.params);
                    asset.apply_pose(&stabilized);
                }
                let alpha = self.fade_alpha(now);
                asset.set_opacity(alpha);
                if alpha <= 0.0 {
                    debug!("Fade complete, hiding asset");
                    asset.set_visible(false);
                    self.buffer.clear();
                    self.session.state = TrackingState::Idle;
                }
            }
        }
    }

    /// Fade opacity at `now`: `max(0, 1 - elapsed / fade_duration)`.
    /// Meaningful only in `FadingOut`.
    #[must_use]
    pub fn fade_alpha(&self, now: f64) -> f64 {
        let elapsed = now - self.session.fade_start;
        (1.0 - elapsed / self.config.fade_duration).max(0.0)
    }

    /// Swap smoothing parameters mid-session. The in-flight buffer is
    /// resized by truncation, never reset.
    pub fn set_params(&mut self, params: SmoothingParams) {
        self.buffer.set_capacity(params.buffer_capacity);
        self.params = params;
    }

    #[must_use]
    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    #[must_use]
    pub fn state(&self) -> TrackingState {
        self.session.state
    }

    #[must_use]
    pub fn params(&self) -> &SmoothingParams {
        &self.params
    }

    #[must_use]
    pub fn buffer(&self) -> &PoseBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn smoother(&self) -> &PoseSmoother {
        &self.smoother
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::SensitivityProfile;

    /// Minimal scene-node double recording what the lifecycle applies.
    pub(crate) struct StubAsset {
        pub visible: bool,
        pub opacity: f64,
        pub committed: Pose,
        pub applied_poses: usize,
    }

    impl StubAsset {
        pub(crate) fn new() -> Self {
            Self {
                visible: false,
                opacity: 1.0,
                committed: Pose::identity(0.0),
                applied_poses: 0,
            }
        }
    }

    impl AssetRoot for StubAsset {
        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
        fn set_opacity(&mut self, alpha: f64) {
            self.opacity = alpha;
        }
        fn apply_pose(&mut self, pose: &Pose) {
            self.committed = *pose;
            self.applied_poses += 1;
        }
        fn committed_pose(&self) -> Pose {
            self.committed
        }
    }

    fn lifecycle() -> TrackingLifecycle {
        TrackingLifecycle::new(
            LifecycleConfig::default(),
            SensitivityProfile::Medium.params(),
            ClipSet::new(),
        )
    }

    #[test]
    fn test_found_enters_tracking() {
        let mut lc = lifecycle();
        let mut asset = StubAsset::new();
        lc.on_target_found(0.0, &mut asset);
        assert_eq!(lc.state(), TrackingState::Tracking);
        assert!(asset.visible);
        assert_eq!(asset.opacity, 1.0);
        // Buffer reseeded with the committed transform
        assert_eq!(lc.buffer().len(), 1);
    }

    #[test]
    fn test_lost_enters_fading_then_idle() {
        let mut lc = lifecycle();
        let mut asset = StubAsset::new();
        lc.on_target_found(0.0, &mut asset);
        lc.on_target_lost(1.0);
        assert_eq!(lc.state(), TrackingState::FadingOut);

        lc.tick(1.2, None, &mut asset);
        assert_eq!(lc.state(), TrackingState::FadingOut);
        assert!(asset.opacity < 1.0 && asset.opacity > 0.0);

        lc.tick(1.6, None, &mut asset);
        assert_eq!(lc.state(), TrackingState::Idle);
        assert!(!asset.visible);
        assert_eq!(asset.opacity, 0.0);
        assert!(lc.buffer().is_empty());
    }

    #[test]
    fn test_fade_alpha_monotone() {
        let mut lc = lifecycle();
        let mut asset = StubAsset::new();
        lc.on_target_found(0.0, &mut asset);
        lc.on_target_lost(1.0);

        let mut last = 1.0;
        let mut t = 1.0;
        while lc.state() == TrackingState::FadingOut {
            t += 0.05;
            lc.tick(t, None, &mut asset);
            assert!(asset.opacity <= last);
            last = asset.opacity;
        }
    }

    #[test]
    fn test_reacquire_cancels_fade() {
        let mut lc = lifecycle();
        let mut asset = StubAsset::new();
        lc.on_target_found(0.0, &mut asset);
        lc.on_target_lost(1.0);
        lc.tick(1.1, None, &mut asset);
        assert!(asset.opacity < 1.0);

        lc.on_target_found(1.15, &mut asset);
        assert_eq!(lc.state(), TrackingState::Tracking);
        assert_eq!(asset.opacity, 1.0);
        assert!(asset.visible);
    }

    #[test]
    fn test_lost_keeps_buffer_for_quick_reacquire() {
        let mut lc = lifecycle();
        let mut asset = StubAsset::new();
        lc.on_target_found(0.0, &mut asset);
        lc.tick(0.1, Some(Pose::identity(0.1)), &mut asset);
        lc.on_target_lost(0.2);
        assert!(!lc.buffer().is_empty());
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut lc = lifecycle();
        let mut asset = StubAsset::new();
        lc.tick(5.0, Some(Pose::identity(5.0)), &mut asset);
        assert_eq!(asset.applied_poses, 0);
        assert_eq!(lc.state(), TrackingState::Idle);
    }

    #[test]
    fn test_set_params_truncates_live_buffer() {
        let mut lc = lifecycle();
        let mut asset = StubAsset::new();
        lc.on_target_found(0.0, &mut asset);
        for i in 0..6 {
            lc.tick(i as f64 * 0.1, Some(Pose::identity(i as f64 * 0.1)), &mut asset);
        }
        let mut params = SensitivityProfile::High.params();
        params.buffer_capacity = 2;
        lc.set_params(params);
        assert_eq!(lc.buffer().len(), 2);
        assert_eq!(lc.state(), TrackingState::Tracking);
    }
}
