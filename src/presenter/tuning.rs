use serde::{Deserialize, Serialize};

use crate::error::{ScrollError, ScrollResult};

/// Empirically tuned thresholds for the view-change engine.
///
/// These do not transfer from other compositors; hosts targeting different
/// tracker physics should re-derive them and load their own profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenterTuning {
    /// Offsets closer than this are treated as equal (px).
    pub offset_equality_epsilon: f64,
    /// Zoom factors closer than this are treated as equal.
    pub zoom_factor_equality_epsilon: f32,
    /// Velocities closer than this are treated as equal (px/s).
    pub velocity_equality_epsilon: f64,
    /// Impulses below this magnitude are rejected as ineffective (px/s).
    pub min_impulse_velocity: f64,
    /// Fraction of velocity remaining after one second of inertia.
    pub inertia_decay_per_second: f64,
    /// Scroll velocity contributed per wheel line (px/s).
    pub wheel_scroll_velocity_factor: f64,
    /// Zoom velocity contributed per wheel line (factor/s).
    pub wheel_zoom_velocity_factor: f32,
    /// Compositor ticks an impulse waits in the queue so coalesced input can
    /// merge before dispatch.
    pub impulse_settle_ticks: u32,
}

impl Default for PresenterTuning {
    fn default() -> Self {
        Self {
            offset_equality_epsilon: 0.001,
            zoom_factor_equality_epsilon: 0.0001,
            velocity_equality_epsilon: 0.01,
            min_impulse_velocity: 30.0,
            inertia_decay_per_second: 0.15,
            wheel_scroll_velocity_factor: 220.0,
            wheel_zoom_velocity_factor: 0.4,
            impulse_settle_ticks: 3,
        }
    }
}

impl PresenterTuning {
    pub fn validate(self) -> ScrollResult<Self> {
        if !self.offset_equality_epsilon.is_finite() || self.offset_equality_epsilon <= 0.0 {
            return Err(ScrollError::InvalidArgument(
                "offset equality epsilon must be finite and > 0".to_owned(),
            ));
        }
        if !self.zoom_factor_equality_epsilon.is_finite() || self.zoom_factor_equality_epsilon <= 0.0
        {
            return Err(ScrollError::InvalidArgument(
                "zoom factor equality epsilon must be finite and > 0".to_owned(),
            ));
        }
        if !self.velocity_equality_epsilon.is_finite() || self.velocity_equality_epsilon <= 0.0 {
            return Err(ScrollError::InvalidArgument(
                "velocity equality epsilon must be finite and > 0".to_owned(),
            ));
        }
        if !self.min_impulse_velocity.is_finite() || self.min_impulse_velocity <= 0.0 {
            return Err(ScrollError::InvalidArgument(
                "minimum impulse velocity must be finite and > 0".to_owned(),
            ));
        }
        if !self.inertia_decay_per_second.is_finite()
            || self.inertia_decay_per_second <= 0.0
            || self.inertia_decay_per_second >= 1.0
        {
            return Err(ScrollError::InvalidArgument(
                "inertia decay must be finite and in (0, 1)".to_owned(),
            ));
        }
        if !self.wheel_scroll_velocity_factor.is_finite() || self.wheel_scroll_velocity_factor <= 0.0
        {
            return Err(ScrollError::InvalidArgument(
                "wheel scroll velocity factor must be finite and > 0".to_owned(),
            ));
        }
        if !self.wheel_zoom_velocity_factor.is_finite() || self.wheel_zoom_velocity_factor <= 0.0 {
            return Err(ScrollError::InvalidArgument(
                "wheel zoom velocity factor must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Loads a tuning profile from its JSON representation.
    pub fn from_json(json: &str) -> ScrollResult<Self> {
        let tuning: Self = serde_json::from_str(json)
            .map_err(|err| ScrollError::InvalidArgument(format!("invalid tuning json: {err}")))?;
        tuning.validate()
    }

    pub fn to_json(&self) -> ScrollResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ScrollError::InvalidArgument(format!("tuning serialization: {err}")))
    }
}

/// Total displacement of an exponentially decaying velocity.
///
/// For `v(t) = v0 * decay^t` the integral over all time is `v0 / -ln(decay)`.
/// A decay of zero (or one, meaning no decay) yields `None`; callers skip
/// resting-position math in that case.
#[must_use]
pub fn anticipated_resting_delta(velocity: f64, decay_per_second: f64) -> Option<f64> {
    if decay_per_second <= 0.0 || decay_per_second >= 1.0 {
        return None;
    }
    Some(velocity / -decay_per_second.ln())
}

/// Inverse of [`anticipated_resting_delta`]: the velocity whose inertia
/// travels exactly `delta`.
#[must_use]
pub fn velocity_for_resting_delta(delta: f64, decay_per_second: f64) -> Option<f64> {
    if decay_per_second <= 0.0 || decay_per_second >= 1.0 {
        return None;
    }
    Some(delta * -decay_per_second.ln())
}

#[cfg(test)]
mod tests {
    use super::{PresenterTuning, anticipated_resting_delta, velocity_for_resting_delta};
    use crate::error::ScrollError;

    #[test]
    fn default_tuning_is_valid() {
        PresenterTuning::default().validate().expect("valid");
    }

    #[test]
    fn json_round_trip() {
        let tuning = PresenterTuning::default();
        let json = tuning.to_json().expect("serialize");
        let back = PresenterTuning::from_json(&json).expect("parse");
        assert_eq!(back, tuning);
    }

    #[test]
    fn invalid_decay_is_rejected() {
        let tuning = PresenterTuning {
            inertia_decay_per_second: 1.5,
            ..PresenterTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ScrollError::InvalidArgument(_))
        ));
    }

    #[test]
    fn resting_delta_round_trips_velocity() {
        let delta = anticipated_resting_delta(500.0, 0.15).expect("decaying");
        let velocity = velocity_for_resting_delta(delta, 0.15).expect("decaying");
        assert!((velocity - 500.0).abs() <= 1e-9);
    }

    #[test]
    fn constant_rate_has_no_resting_position() {
        assert!(anticipated_resting_delta(500.0, 1.0).is_none());
        assert!(anticipated_resting_delta(500.0, 0.0).is_none());
    }
}
