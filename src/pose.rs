//! Pose values and the fixed-capacity sample buffer fed to the smoother.

use nalgebra::{UnitQuaternion, Vector3};
use std::collections::VecDeque;

/// A single anchor pose sample: position, orientation, scale and the
/// time it was produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Anchor position in scene units
    pub position: Vector3<f64>,
    /// Anchor orientation (unit quaternion, never per-axis Euler)
    pub orientation: UnitQuaternion<f64>,
    /// Anchor scale per axis
    pub scale: Vector3<f64>,
    /// Sample time in seconds
    pub timestamp: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity(0.0)
    }
}

impl Pose {
    /// Create a pose with identity orientation and unit scale at the origin.
    #[must_use]
    pub fn identity(timestamp: f64) -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            timestamp,
        }
    }

    /// Create a pose from position and Euler angles (roll, pitch, yaw in
    /// radians), converted immediately to a quaternion.
    #[must_use]
    pub fn from_euler(position: Vector3<f64>, roll: f64, pitch: f64, yaw: f64, timestamp: f64) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::from_euler_angles(roll, pitch, yaw),
            scale: Vector3::new(1.0, 1.0, 1.0),
            timestamp,
        }
    }

    /// True when every component of the pose is finite (no NaN/inf).
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.orientation.coords.iter().all(|v| v.is_finite())
            && self.scale.iter().all(|v| v.is_finite())
            && self.timestamp.is_finite()
    }
}

/// Fixed-capacity FIFO buffer of the most recent pose samples.
///
/// The oldest sample is evicted when the buffer is full. Empty at session
/// start and immediately after a target is reacquired (reseeded with a
/// single sample).
#[derive(Debug, Clone)]
pub struct PoseBuffer {
    capacity: usize,
    samples: VecDeque<Pose>,
}

impl PoseBuffer {
    /// Create a buffer holding up to `capacity` samples.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Buffer capacity must be greater than 0");
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest one if the buffer is full.
    pub fn push(&mut self, pose: Pose) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(pose);
    }

    /// Change the capacity at runtime. The buffer is never reset: shrinking
    /// truncates the oldest samples, growing leaves the contents in place
    /// and lets the buffer refill naturally.
    pub fn set_capacity(&mut self, capacity: usize) {
        assert!(capacity > 0, "Buffer capacity must be greater than 0");
        self.capacity = capacity;
        while self.samples.len() > capacity {
            self.samples.pop_front();
        }
    }

    /// Drop all samples and seed the buffer with a single pose. Used on
    /// reacquisition so smoothing restarts from the asset's last committed
    /// transform instead of jumping.
    pub fn reseed(&mut self, pose: Pose) {
        self.samples.clear();
        self.samples.push_back(pose);
    }

    /// Remove all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Pose> {
        self.samples.back()
    }

    /// Second most recent sample, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&Pose> {
        if self.samples.len() >= 2 {
            self.samples.get(self.samples.len() - 2)
        } else {
            None
        }
    }

    /// Iterate samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Pose> {
        self.samples.iter()
    }
}
