//! Pose smoothing: recency-weighted averaging, prediction and an EMA pass.
//!
//! Raw per-frame pose estimates from the tracking collaborator are jittery.
//! The smoother turns them into a stable visual transform in three stages:
//!
//! 1. A recency-weighted average over the pose buffer (linear ramp, newest
//!    sample weighted highest).
//! 2. A linear extrapolation of the last two samples scaled by the profile's
//!    prediction strength, restoring responsiveness lost to averaging.
//! 3. An exponential moving average against the previously emitted output,
//!    suppressing residual high-frequency jitter.
//!
//! All orientation blending is spherical and shortest-arc; averaging Euler
//! axes independently flips near the ±180° seam and is not done anywhere in
//! this module.

use crate::constants::{
    EPSILON, HIGH_SENSITIVITY_CAPACITY, HIGH_SENSITIVITY_PREDICTION, HIGH_SENSITIVITY_SMOOTHING,
    LOW_SENSITIVITY_CAPACITY, LOW_SENSITIVITY_PREDICTION, LOW_SENSITIVITY_SMOOTHING,
    MEDIUM_SENSITIVITY_CAPACITY, MEDIUM_SENSITIVITY_PREDICTION, MEDIUM_SENSITIVITY_SMOOTHING,
};
use crate::pose::{Pose, PoseBuffer};
use log::warn;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Named bundle of smoothing parameters trading responsiveness for
/// stability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityProfile {
    /// Aggressive smoothing, large buffer, little prediction
    Low,
    /// Balanced default
    Medium,
    /// Small buffer, responsive output
    High,
}

impl SensitivityProfile {
    /// Parameters for this profile.
    #[must_use]
    pub fn params(self) -> SmoothingParams {
        match self {
            SensitivityProfile::Low => SmoothingParams {
                buffer_capacity: LOW_SENSITIVITY_CAPACITY,
                prediction_strength: LOW_SENSITIVITY_PREDICTION,
                smoothing_factor: LOW_SENSITIVITY_SMOOTHING,
            },
            SensitivityProfile::Medium => SmoothingParams {
                buffer_capacity: MEDIUM_SENSITIVITY_CAPACITY,
                prediction_strength: MEDIUM_SENSITIVITY_PREDICTION,
                smoothing_factor: MEDIUM_SENSITIVITY_SMOOTHING,
            },
            SensitivityProfile::High => SmoothingParams {
                buffer_capacity: HIGH_SENSITIVITY_CAPACITY,
                prediction_strength: HIGH_SENSITIVITY_PREDICTION,
                smoothing_factor: HIGH_SENSITIVITY_SMOOTHING,
            },
        }
    }

    /// Parse a profile from its lowercase name.
    pub fn from_name(name: &str) -> crate::Result<Self> {
        match name.to_lowercase().as_str() {
            "low" => Ok(SensitivityProfile::Low),
            "medium" => Ok(SensitivityProfile::Medium),
            "high" => Ok(SensitivityProfile::High),
            _ => Err(crate::Error::InvalidInput(format!(
                "Unknown sensitivity profile: {name}"
            ))),
        }
    }
}

/// Concrete smoothing parameters, normally derived from a
/// [`SensitivityProfile`] but individually overridable (the mobile override
/// bumps the buffer and drops prediction on top of the low profile).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    /// Number of samples the pose buffer retains
    pub buffer_capacity: usize,
    /// Weight of the extrapolated step, in [0, 1]
    pub prediction_strength: f64,
    /// EMA alpha: weight of the new value against the previous output, in (0, 1]
    pub smoothing_factor: f64,
}

impl SmoothingParams {
    /// Validate parameter ranges.
    pub fn validate(&self) -> crate::Result<()> {
        if self.buffer_capacity == 0 {
            return Err(crate::Error::InvalidInput(
                "Buffer capacity must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.prediction_strength) {
            return Err(crate::Error::InvalidInput(
                "Prediction strength must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.smoothing_factor <= 0.0 || self.smoothing_factor > 1.0 {
            return Err(crate::Error::InvalidInput(
                "Smoothing factor must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Spherical interpolation that always takes the short way around.
///
/// Quaternions are sign-ambiguous: `q` and `-q` encode the same rotation,
/// and interpolating across the sign flip produces a visible spin. The
/// target is flipped into the same hemisphere as `from` before slerping.
#[must_use]
pub fn shortest_arc_slerp(from: &UnitQuaternion<f64>, to: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    let to = if from.coords.dot(&to.coords) < 0.0 {
        UnitQuaternion::new_unchecked(-to.into_inner())
    } else {
        *to
    };
    match from.try_slerp(&to, t, EPSILON) {
        Some(q) => q,
        None => {
            // Nearly antipodal even after the hemisphere flip; fall back to
            // normalized lerp which is well defined here.
            let lerped = from.into_inner().lerp(&to.into_inner(), t);
            if lerped.norm() < EPSILON {
                *from
            } else {
                UnitQuaternion::from_quaternion(lerped)
            }
        }
    }
}

/// Stabilizes raw anchor poses into the transform applied to the asset root.
///
/// One smoother instance pairs with one [`PoseBuffer`]; the only state kept
/// between calls is the previously emitted output (for the EMA pass) and a
/// recoverable-fault counter.
#[derive(Debug, Default)]
pub struct PoseSmoother {
    last_output: Option<Pose>,
    fault_count: u64,
}

impl PoseSmoother {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a raw pose and return the stabilized one.
    ///
    /// Cold-start behavior: with a single sample in the buffer the input is
    /// returned unchanged, since there is nothing to smooth against yet.
    ///
    /// A pose containing NaN or infinite components is never ingested; the
    /// previous stable output is substituted and a recoverable fault is
    /// counted and logged.
    pub fn smooth(&mut self, buffer: &mut PoseBuffer, raw: Pose, params: &SmoothingParams) -> Pose {
        if !raw.is_finite() {
            self.fault_count += 1;
            warn!("Discarding malformed pose sample (fault #{})", self.fault_count);
            return self
                .last_output
                .or_else(|| buffer.latest().copied())
                .unwrap_or_else(|| Pose::identity(raw.timestamp));
        }

        buffer.push(raw);

        if buffer.len() == 1 {
            self.last_output = Some(raw);
            return raw;
        }

        let averaged = weighted_average(buffer);
        let predicted = extrapolate(buffer, &averaged, params.prediction_strength);

        let output = match self.last_output {
            Some(last) => ema_blend(&last, &predicted, params.smoothing_factor, raw.timestamp),
            None => predicted,
        };

        self.last_output = Some(output);
        output
    }

    /// Align the EMA state with a known-good transform, used when the buffer
    /// is reseeded on reacquisition.
    pub fn reseed(&mut self, pose: Pose) {
        self.last_output = Some(pose);
    }

    /// Forget all state.
    pub fn reset(&mut self) {
        self.last_output = None;
    }

    /// Number of malformed samples rejected so far.
    #[must_use]
    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    /// Previously emitted output, if any.
    #[must_use]
    pub fn last_output(&self) -> Option<&Pose> {
        self.last_output.as_ref()
    }
}

/// Recency-weighted average over the buffer, linear ramp: the i-th sample
/// (oldest first) gets weight i+1.
fn weighted_average(buffer: &PoseBuffer) -> Pose {
    let mut position = Vector3::zeros();
    let mut scale = Vector3::zeros();
    let mut weight_sum = 0.0;
    let mut orientation: Option<UnitQuaternion<f64>> = None;
    let mut timestamp = 0.0;

    for (i, sample) in buffer.iter().enumerate() {
        let w = (i + 1) as f64;
        position += sample.position * w;
        scale += sample.scale * w;
        timestamp = sample.timestamp;

        // Incremental weighted slerp keeps every step shortest-arc.
        orientation = Some(match orientation {
            None => sample.orientation,
            Some(acc) => shortest_arc_slerp(&acc, &sample.orientation, w / (weight_sum + w)),
        });
        weight_sum += w;
    }

    Pose {
        position: position / weight_sum,
        orientation: orientation.unwrap_or_else(UnitQuaternion::identity),
        scale: scale / weight_sum,
        timestamp,
    }
}

/// Blend the averaged pose toward a linear extrapolation of the last two
/// samples. Strength 0 returns the average untouched; strength 1 applies the
/// full last-step delta on top of it.
fn extrapolate(buffer: &PoseBuffer, averaged: &Pose, strength: f64) -> Pose {
    if strength <= 0.0 {
        return *averaged;
    }
    let (Some(latest), Some(previous)) = (buffer.latest(), buffer.previous()) else {
        return *averaged;
    };

    let step = latest.position - previous.position;
    let scale_step = latest.scale - previous.scale;
    let relative = previous.orientation.inverse() * latest.orientation;
    // Keep the relative rotation on the short arc before scaling it.
    let relative = if relative.coords.w < 0.0 {
        UnitQuaternion::new_unchecked(-relative.into_inner())
    } else {
        relative
    };

    Pose {
        position: averaged.position + step * strength,
        orientation: averaged.orientation * relative.powf(strength),
        scale: averaged.scale + scale_step * strength,
        timestamp: averaged.timestamp,
    }
}

/// Exponential moving average against the previous output. Alpha is the new
/// value's weight: `alpha * new + (1 - alpha) * last`.
fn ema_blend(last: &Pose, new: &Pose, alpha: f64, timestamp: f64) -> Pose {
    Pose {
        position: new.position * alpha + last.position * (1.0 - alpha),
        orientation: shortest_arc_slerp(&last.orientation, &new.orientation, alpha),
        scale: new.scale * alpha + last.scale * (1.0 - alpha),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pose_at(x: f64, t: f64) -> Pose {
        Pose {
            position: Vector3::new(x, 0.0, 0.0),
            ..Pose::identity(t)
        }
    }

    #[test]
    fn test_cold_start_identity() {
        for profile in [
            SensitivityProfile::Low,
            SensitivityProfile::Medium,
            SensitivityProfile::High,
        ] {
            let params = profile.params();
            let mut smoother = PoseSmoother::new();
            let mut buffer = PoseBuffer::new(params.buffer_capacity);
            let raw = Pose::from_euler(Vector3::new(1.0, 2.0, 3.0), 0.1, 0.2, 0.3, 0.0);
            let out = smoother.smooth(&mut buffer, raw, &params);
            assert_eq!(out, raw);
        }
    }

    #[test]
    fn test_nan_substitutes_last_output() {
        let params = SensitivityProfile::Medium.params();
        let mut smoother = PoseSmoother::new();
        let mut buffer = PoseBuffer::new(params.buffer_capacity);

        let good = pose_at(1.0, 0.0);
        smoother.smooth(&mut buffer, good, &params);

        let mut bad = pose_at(2.0, 1.0);
        bad.position.z = f64::NAN;
        let out = smoother.smooth(&mut buffer, bad, &params);

        assert_eq!(out.position, good.position);
        assert_eq!(smoother.fault_count(), 1);
        // The malformed sample must not have entered the buffer
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_converges_to_constant_input() {
        let params = SensitivityProfile::High.params();
        let mut smoother = PoseSmoother::new();
        let mut buffer = PoseBuffer::new(params.buffer_capacity);

        // Start somewhere else, then hold a fixed target pose
        smoother.smooth(&mut buffer, pose_at(0.0, 0.0), &params);
        let target = pose_at(5.0, 0.0);
        let mut out = smoother.smooth(&mut buffer, Pose { timestamp: 1.0, ..target }, &params);
        for i in 2..200 {
            out = smoother.smooth(&mut buffer, Pose { timestamp: i as f64, ..target }, &params);
        }
        assert_relative_eq!(out.position.x, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_prediction_leads_constant_velocity() {
        // With a steadily advancing input, prediction should pull the output
        // ahead of the plain weighted average.
        let params = SmoothingParams {
            buffer_capacity: 4,
            prediction_strength: 0.5,
            smoothing_factor: 1.0,
        };
        let no_prediction = SmoothingParams {
            prediction_strength: 0.0,
            ..params
        };

        let mut with = (PoseSmoother::new(), PoseBuffer::new(4));
        let mut without = (PoseSmoother::new(), PoseBuffer::new(4));
        let mut leads = (0.0, 0.0);
        for i in 0..10 {
            let raw = pose_at(i as f64, i as f64);
            leads.0 = with.0.smooth(&mut with.1, raw, &params).position.x;
            leads.1 = without.0.smooth(&mut without.1, raw, &no_prediction).position.x;
        }
        assert!(leads.0 > leads.1);
    }

    #[test]
    fn test_shortest_arc_across_sign_flip() {
        // q and -q are the same rotation; blending across the sign change
        // must not take the long way around.
        let a = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.1);
        let b = UnitQuaternion::new_unchecked(-UnitQuaternion::from_euler_angles(0.0, 0.0, 0.2).into_inner());
        let mid = shortest_arc_slerp(&a, &b, 0.5);
        assert!(a.angle_to(&mid) < 0.1);
    }

    #[test]
    fn test_smoothed_rotation_never_amplifies_step() {
        let params = SensitivityProfile::Medium.params();
        let mut smoother = PoseSmoother::new();
        let mut buffer = PoseBuffer::new(params.buffer_capacity);

        let mut prev_raw: Option<Pose> = None;
        let mut prev_out: Option<Pose> = None;
        for i in 0..50 {
            let yaw = 0.05 * i as f64;
            // Alternate quaternion sign to simulate a sign-ambiguous source
            let mut raw = Pose::from_euler(Vector3::zeros(), 0.0, 0.0, yaw, i as f64);
            if i % 2 == 1 {
                raw.orientation = UnitQuaternion::new_unchecked(-raw.orientation.into_inner());
            }
            let out = smoother.smooth(&mut buffer, raw, &params);
            if let (Some(pr), Some(po)) = (prev_raw, prev_out) {
                let raw_step = pr.orientation.angle_to(&raw.orientation);
                let out_step = po.orientation.angle_to(&out.orientation);
                assert!(
                    out_step <= raw_step + 1e-6,
                    "output step {out_step} exceeds raw step {raw_step}"
                );
            }
            prev_raw = Some(raw);
            prev_out = Some(out);
        }
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(SensitivityProfile::from_name("low").unwrap(), SensitivityProfile::Low);
        assert_eq!(SensitivityProfile::from_name("MEDIUM").unwrap(), SensitivityProfile::Medium);
        assert!(SensitivityProfile::from_name("ultra").is_err());
    }

    #[test]
    fn test_params_validation() {
        assert!(SensitivityProfile::Medium.params().validate().is_ok());
        let bad = SmoothingParams {
            buffer_capacity: 0,
            prediction_strength: 0.1,
            smoothing_factor: 0.5,
        };
        assert!(bad.validate().is_err());
    }
}
