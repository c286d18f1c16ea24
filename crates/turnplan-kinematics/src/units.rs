//! Degree/radian and millimetre/metre helpers.
//!
//! Everything inside the crate works in metres, seconds and radians. These
//! are for the edges, where configuration is written in the units a
//! micromouse builder thinks in.

use core::f64::consts::PI;

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees.
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Convert millimetres to metres.
#[inline]
pub fn mm_to_m(mm: f64) -> f64 {
    mm / 1000.0
}

/// Convert metres to millimetres.
#[inline]
pub fn m_to_mm(m: f64) -> f64 {
    m * 1000.0
}
