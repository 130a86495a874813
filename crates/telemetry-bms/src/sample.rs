//! Normalization of raw frames into motion samples.

use crate::frame::RawFrame;
use serde::Serialize;

/// Knots to kilometres per hour.
pub const KNOTS_TO_KMH: f32 = 1.852;

/// Normalized telemetry snapshot.
///
/// Angular rates are not stored: they need the previous sample and are derived
/// on request by [`DerivedValueEngine`](crate::DerivedValueEngine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct Sample {
    /// Seconds since the polling session started (monotonic).
    pub time: f64,
    /// Radians.
    pub pitch: f32,
    /// Radians.
    pub roll: f32,
    /// Radians.
    pub yaw: f32,
    /// Indicated airspeed, km/h.
    pub airspeed: f32,
    /// Normal acceleration, g.
    pub heave: f32,
    /// Angle of attack, radians.
    pub aoa: f32,
}

/// Converts raw frames into [`Sample`]s.
///
/// Conversion is pure: non-finite inputs are carried through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleBuilder;

impl SampleBuilder {
    pub fn build(raw: &RawFrame, elapsed_secs: f64) -> Sample {
        Sample {
            time: elapsed_secs,
            pitch: raw.pitch,
            roll: raw.roll,
            yaw: raw.yaw,
            airspeed: raw.kias * KNOTS_TO_KMH,
            heave: raw.gs,
            aoa: raw.alpha * std::f32::consts::PI / 180.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pitch: f32, roll: f32, yaw: f32, kias: f32) -> RawFrame {
        let mut raw = RawFrame::zeroed();
        raw.pitch = pitch;
        raw.roll = roll;
        raw.yaw = yaw;
        raw.kias = kias;
        raw
    }

    #[test]
    fn test_airspeed_converted_to_kmh() {
        let sample = SampleBuilder::build(&frame(0.1, 0.0, 0.0, 100.0), 0.5);
        assert!((sample.airspeed - 185.2).abs() < 1e-3);
        assert_eq!(sample.pitch.to_bits(), 0.1f32.to_bits());
        assert!((sample.time - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_alpha_converted_to_radians() {
        let mut raw = RawFrame::zeroed();
        raw.alpha = 180.0;
        raw.gs = 1.5;
        let sample = SampleBuilder::build(&raw, 0.0);
        assert!((sample.aoa - std::f32::consts::PI).abs() < 1e-6);
        assert!((sample.heave - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_non_finite_input_passes_through() {
        let raw = frame(f32::NAN, f32::INFINITY, 0.0, f32::NAN);
        let sample = SampleBuilder::build(&raw, 1.0);
        assert!(sample.pitch.is_nan());
        assert!(sample.roll.is_infinite());
        assert!(sample.airspeed.is_nan());
    }

    #[test]
    fn test_build_does_not_touch_raw() {
        let raw = frame(0.2, 0.3, 0.4, 250.0);
        let before = raw.clone();
        let _sample = SampleBuilder::build(&raw, 2.0);
        assert_eq!(raw, before);
    }
}
