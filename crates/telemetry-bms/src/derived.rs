//! Derived motion quantities computed from a sample pair.

use crate::sample::Sample;
use falcon_telemetry_core::TelemetryError;

/// Smallest inter-sample delta accepted as a rate denominator, seconds.
pub const MIN_ELAPSED_SECS: f32 = 1.0e-6;

/// The six reserved names served by the derived fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedQuantity {
    Roll,
    Pitch,
    Yaw,
    RollRate,
    PitchRate,
    YawRate,
}

impl DerivedQuantity {
    pub const ALL: [Self; 6] = [
        Self::Roll,
        Self::Pitch,
        Self::Yaw,
        Self::RollRate,
        Self::PitchRate,
        Self::YawRate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Roll => "roll",
            Self::Pitch => "pitch",
            Self::Yaw => "yaw",
            Self::RollRate => "rollrate",
            Self::PitchRate => "pitchrate",
            Self::YawRate => "yawrate",
        }
    }

    pub fn is_rate(self) -> bool {
        matches!(self, Self::RollRate | Self::PitchRate | Self::YawRate)
    }
}

/// Computes derived quantities for one (current, previous) pair.
///
/// Nothing is cached; each call derives from the samples again.
#[derive(Debug, Clone, Copy)]
pub struct DerivedValueEngine<'a> {
    current: &'a Sample,
    previous: Option<&'a Sample>,
}

impl<'a> DerivedValueEngine<'a> {
    pub fn new(current: &'a Sample, previous: Option<&'a Sample>) -> Self {
        Self { current, previous }
    }

    /// Wall-clock delta between the two samples' timestamps.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::ClockAnomaly`] when there is no previous sample or the
    /// delta is non-finite or below [`MIN_ELAPSED_SECS`].
    pub fn elapsed_secs(&self) -> Result<f32, TelemetryError> {
        self.previous_with_elapsed().map(|(_, elapsed)| elapsed)
    }

    fn previous_with_elapsed(&self) -> Result<(&'a Sample, f32), TelemetryError> {
        let previous = self
            .previous
            .ok_or_else(|| TelemetryError::clock_anomaly(0.0, "no previous sample in this session"))?;
        let elapsed = validate_elapsed((self.current.time - previous.time) as f32)?;
        Ok((previous, elapsed))
    }

    /// # Errors
    ///
    /// Rates fail with [`TelemetryError::ClockAnomaly`] as described on
    /// [`elapsed_secs`](Self::elapsed_secs); projections never fail.
    pub fn compute(&self, quantity: DerivedQuantity) -> Result<f32, TelemetryError> {
        let current = self.current;
        match quantity {
            DerivedQuantity::Roll => Ok(roll_projection(current.roll, current.pitch)),
            DerivedQuantity::Pitch => Ok(sine(current.pitch)),
            DerivedQuantity::Yaw => Ok(sine(current.yaw)),
            DerivedQuantity::RollRate => self.angular_rate(|s| s.roll),
            DerivedQuantity::PitchRate => self.angular_rate(|s| s.pitch),
            DerivedQuantity::YawRate => self.angular_rate(|s| s.yaw),
        }
    }

    fn angular_rate(&self, angle: fn(&Sample) -> f32) -> Result<f32, TelemetryError> {
        let (previous, elapsed) = self.previous_with_elapsed()?;
        rate(angle(self.current), angle(previous), elapsed)
    }
}

/// `(current - previous) / elapsed_secs`, with the denominator validated first.
///
/// # Errors
///
/// [`TelemetryError::ClockAnomaly`] when `elapsed_secs` is non-finite or below
/// [`MIN_ELAPSED_SECS`].
pub fn rate(current: f32, previous: f32, elapsed_secs: f32) -> Result<f32, TelemetryError> {
    let elapsed_secs = validate_elapsed(elapsed_secs)?;
    Ok((current - previous) / elapsed_secs)
}

fn validate_elapsed(elapsed_secs: f32) -> Result<f32, TelemetryError> {
    if !elapsed_secs.is_finite() {
        return Err(TelemetryError::clock_anomaly(
            elapsed_secs,
            "elapsed time is not finite",
        ));
    }
    if elapsed_secs < MIN_ELAPSED_SECS {
        return Err(TelemetryError::clock_anomaly(
            elapsed_secs,
            "elapsed time between samples is zero or negative",
        ));
    }
    Ok(elapsed_secs)
}

fn sine(angle: f32) -> f32 {
    f64::from(angle).sin() as f32
}

fn roll_projection(roll: f32, pitch: f32) -> f32 {
    (f64::from(roll).sin() * f64::from(pitch).cos()) as f32
}
