//! AR target-overlay core: pose smoothing, tracking lifecycle and snapshot
//! capture for marker-based augmented reality.
//!
//! The crate stabilizes jittery per-frame pose estimates from an image-target
//! tracker, governs when the overlaid asset is visible (including fade-out on
//! tracking loss and a delayed one-shot animation on acquisition), and
//! composites the live camera frame with the rendered overlay into an
//! exportable snapshot. The tracker, renderer and asset loader are external
//! collaborators consumed through trait seams.
//!
//! # Examples
//!
//! ## Smoothing a pose stream
//!
//! ```
//! use ar_overlay::pose::{Pose, PoseBuffer};
//! use ar_overlay::smoothing::{PoseSmoother, SensitivityProfile};
//! use nalgebra::Vector3;
//!
//! let params = SensitivityProfile::Medium.params();
//! let mut smoother = PoseSmoother::new();
//! let mut buffer = PoseBuffer::new(params.buffer_capacity);
//!
//! for i in 0..10 {
//!     let raw = Pose::from_euler(
//!         Vector3::new(i as f64 * 0.01, 0.0, 0.0),
//!         0.0, 0.0, 0.0,
//!         i as f64 / 30.0,
//!     );
//!     let stabilized = smoother.smooth(&mut buffer, raw, &params);
//!     assert!(stabilized.is_finite());
//! }
//! ```
//!
//! ## Driving the lifecycle
//!
//! ```
//! use ar_overlay::animation::ClipSet;
//! use ar_overlay::lifecycle::{AssetRoot, LifecycleConfig, TrackingLifecycle, TrackingState};
//! use ar_overlay::pose::Pose;
//! use ar_overlay::smoothing::SensitivityProfile;
//!
//! struct Node { visible: bool, opacity: f64, pose: Pose }
//! impl AssetRoot for Node {
//!     fn set_visible(&mut self, v: bool) { self.visible = v; }
//!     fn set_opacity(&mut self, a: f64) { self.opacity = a; }
//!     fn apply_pose(&mut self, p: &Pose) { self.pose = *p; }
//!     fn committed_pose(&self) -> Pose { self.pose }
//! }
//!
//! let mut lifecycle = TrackingLifecycle::new(
//!     LifecycleConfig::default(),
//!     SensitivityProfile::High.params(),
//!     ClipSet::new(),
//! );
//! let mut node = Node { visible: false, opacity: 1.0, pose: Pose::identity(0.0) };
//!
//! lifecycle.on_target_found(0.0, &mut node);
//! assert_eq!(lifecycle.state(), TrackingState::Tracking);
//! lifecycle.on_target_lost(5.0);
//! lifecycle.tick(5.6, None, &mut node);
//! assert_eq!(lifecycle.state(), TrackingState::Idle);
//! assert!(!node.visible);
//! ```

/// Pose values and the fixed-capacity sample buffer
pub mod pose;

/// Sensitivity profiles and the pose smoothing engine
pub mod smoothing;

/// Cancelable one-shot trigger for the cooperative frame loop
pub mod timer;

/// Tracking event fan-out (observer pattern)
pub mod events;

/// One-shot animation clip seam
pub mod animation;

/// Tracking lifecycle state machine
pub mod lifecycle;

/// Snapshot compositing and platform export dispatch
pub mod capture;

/// Application wiring
pub mod app;

/// Error types and result handling
pub mod error;

/// Configuration management
pub mod config;

/// Constants used throughout the application
pub mod constants;

pub use error::{Error, Result};
