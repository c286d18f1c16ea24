//! Angular-speed samples and the interface every profile family shares.

use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::TurnDirection;

/// Angular speed commanded for one time step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularSpeedSample {
    /// Zero-based step index.
    pub time_index: u32,
    /// Angular speed (rad/s), signed by the turn direction.
    pub angular_speed: f64,
}

impl AngularSpeedSample {
    /// Construct a sample.
    pub const fn new(time_index: u32, angular_speed: f64) -> Self {
        AngularSpeedSample {
            time_index,
            angular_speed,
        }
    }
}

/// Phase of a trapezoidal profile.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Constant angular acceleration from rest.
    Accelerate,
    /// Constant angular speed. May last zero steps.
    Cruise,
    /// Constant angular deceleration back to rest.
    Decelerate,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Accelerate => write!(f, "accelerate"),
            SegmentKind::Cruise => write!(f, "cruise"),
            SegmentKind::Decelerate => write!(f, "decelerate"),
        }
    }
}

/// One phase of a trapezoidal profile and its closed-form speed law.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSegment {
    /// Which phase this is.
    pub kind: SegmentKind,
    /// Length of the phase in whole steps.
    pub duration_steps: u32,
    /// Angular speed when the phase starts (rad/s).
    pub start_speed: f64,
    /// Signed rate of change of angular speed during the phase (rad/s²).
    pub rate: f64,
}

impl ProfileSegment {
    /// Instantaneous angular speed `elapsed` seconds into the segment.
    ///
    /// `elapsed` is clamped to the segment, and the result never drops below zero.
    pub fn angular_speed_at(&self, elapsed: f64, dt: f64) -> f64 {
        let end = self.duration_steps as f64 * dt;
        let t = elapsed.clamp(0.0, end);
        (self.start_speed + self.rate * t).max(0.0)
    }
}

/// Behaviour shared by the trapezoidal, S-curve and ideal profiles.
pub trait AngularProfile {
    /// Number of steps the profile lasts.
    fn duration_steps(&self) -> u32;

    /// The magnitude schedule, one sample per step.
    fn samples(&self) -> Vec<AngularSpeedSample>;

    /// Total angle covered by the schedule (rad).
    fn swept_angle(&self, dt: f64) -> f64 {
        self.samples().iter().map(|s| s.angular_speed * dt).sum()
    }

    /// Highest angular speed in the schedule (rad/s).
    fn peak_angular_speed(&self) -> f64 {
        self.samples()
            .iter()
            .map(|s| libm::fabs(s.angular_speed))
            .fold(0.0, f64::max)
    }
}

/// Sign every sample for the given turn direction.
pub fn apply_direction(
    samples: Vec<AngularSpeedSample>,
    direction: TurnDirection,
) -> Vec<AngularSpeedSample> {
    let sign = direction.sign();
    samples
        .into_iter()
        .map(|s| AngularSpeedSample::new(s.time_index, sign * s.angular_speed))
        .collect()
}

/// Largest step-to-step change in angular speed, as an acceleration (rad/s²).
///
/// The first sample is compared against rest.
pub fn peak_acceleration(samples: &[AngularSpeedSample], dt: f64) -> f64 {
    let mut last = 0.0;
    let mut peak: f64 = 0.0;
    for s in samples {
        peak = peak.max(libm::fabs(s.angular_speed - last) / dt);
        last = s.angular_speed;
    }
    peak
}
