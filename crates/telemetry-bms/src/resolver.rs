//! Name-based value lookup over a sample pair and its raw frame.
//!
//! Lookup order:
//! 1. the six derived names (`roll`, `pitch`, `yaw`, `rollrate`, `pitchrate`,
//!    `yawrate`), which shadow anything else with the same name;
//! 2. [`Sample`] fields;
//! 3. raw [`RawFrame`] fields under their producer names;
//! 4. computed properties (`totalFuel`, `dedLines`, ...).
//!
//! The name table is built once on first use.

use crate::derived::{DerivedQuantity, DerivedValueEngine};
use crate::frame::{RAW_FIELDS, RawFrame, display_lines};
use crate::sample::Sample;
use falcon_telemetry_core::{NamedValue, Session, TelemetryError, TelemetryInfo, TelemetryValue};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

#[derive(Clone, Copy)]
enum Accessor {
    Derived(DerivedQuantity),
    Sample(fn(&Sample) -> TelemetryValue),
    Raw(fn(&RawFrame) -> TelemetryValue),
    Property(fn(&RawFrame) -> Option<TelemetryValue>),
}

const SAMPLE_FIELDS: &[(&str, fn(&Sample) -> TelemetryValue)] = &[
    ("time", |s: &Sample| TelemetryValue::Double(s.time)),
    ("pitch", |s: &Sample| TelemetryValue::Float(s.pitch)),
    ("roll", |s: &Sample| TelemetryValue::Float(s.roll)),
    ("yaw", |s: &Sample| TelemetryValue::Float(s.yaw)),
    ("airspeed", |s: &Sample| TelemetryValue::Float(s.airspeed)),
    ("heave", |s: &Sample| TelemetryValue::Float(s.heave)),
    ("aoa", |s: &Sample| TelemetryValue::Float(s.aoa)),
];

const PROPERTIES: &[(&str, fn(&RawFrame) -> Option<TelemetryValue>)] = &[
    ("totalFuel", |f: &RawFrame| {
        Some(TelemetryValue::Float(f.internal_fuel + f.external_fuel))
    }),
    ("dedLines", |f: &RawFrame| {
        Some(TelemetryValue::TextLines(display_lines(&f.ded_lines)))
    }),
    ("pflLines", |f: &RawFrame| {
        Some(TelemetryValue::TextLines(display_lines(&f.pfl_lines)))
    }),
    ("rwrBearings", |f: &RawFrame| {
        rwr_prefix(f, &f.bearing).map(TelemetryValue::FloatArray)
    }),
    ("rwrSymbols", |f: &RawFrame| {
        rwr_prefix(f, &f.rwr_symbol).map(TelemetryValue::IntegerArray)
    }),
    ("rwrLethality", |f: &RawFrame| {
        rwr_prefix(f, &f.lethality).map(TelemetryValue::FloatArray)
    }),
];

fn rwr_prefix<T: Copy>(frame: &RawFrame, entries: &[T]) -> Option<Vec<T>> {
    let len = frame.rwr_len()?;
    entries.get(..len).map(<[T]>::to_vec)
}

fn accessors() -> &'static HashMap<&'static str, Accessor> {
    static TABLE: OnceLock<HashMap<&'static str, Accessor>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for quantity in DerivedQuantity::ALL {
            table.insert(quantity.name(), Accessor::Derived(quantity));
        }
        for (name, get) in SAMPLE_FIELDS {
            table.entry(*name).or_insert(Accessor::Sample(*get));
        }
        for field in RAW_FIELDS {
            table.entry(field.name).or_insert(Accessor::Raw(field.get));
        }
        for (name, get) in PROPERTIES {
            table.entry(*name).or_insert(Accessor::Property(*get));
        }
        table
    })
}

/// Every name [`NamedValueResolver::resolve`] accepts, sorted.
pub fn value_names() -> BTreeSet<&'static str> {
    accessors().keys().copied().collect()
}

/// Resolves names against one (current, previous) sample pair.
#[derive(Debug, Clone, Copy)]
pub struct NamedValueResolver<'a> {
    current: &'a Sample,
    previous: Option<&'a Sample>,
    frame: &'a RawFrame,
}

impl<'a> NamedValueResolver<'a> {
    pub fn new(current: &'a Sample, previous: Option<&'a Sample>, frame: &'a RawFrame) -> Self {
        Self {
            current,
            previous,
            frame,
        }
    }

    /// # Errors
    ///
    /// - [`TelemetryError::UnknownTelemetryValue`] for a name outside
    ///   [`value_names`] or a property that is absent for this frame.
    /// - [`TelemetryError::ClockAnomaly`] for a rate without a usable previous sample.
    pub fn resolve(&self, name: &str) -> Result<NamedValue, TelemetryError> {
        let accessor = accessors()
            .get(name)
            .ok_or_else(|| TelemetryError::unknown_value(name))?;
        let value = match accessor {
            Accessor::Derived(quantity) => TelemetryValue::Float(
                DerivedValueEngine::new(self.current, self.previous).compute(*quantity)?,
            ),
            Accessor::Sample(get) => get(self.current),
            Accessor::Raw(get) => get(self.frame),
            Accessor::Property(get) => {
                get(self.frame).ok_or_else(|| TelemetryError::unknown_value(name))?
            }
        };
        Ok(NamedValue::new(name, value))
    }
}

/// One published update: the sample pair and raw frame from a single poll.
#[derive(Debug, Clone)]
pub struct TelemetryUpdate {
    pub current: Arc<Sample>,
    /// `None` on the first update of a session.
    pub previous: Option<Arc<Sample>>,
    pub frame: Arc<RawFrame>,
    pub session: Session,
    /// Position of this update within its session, starting at 0.
    pub sequence: u64,
}

impl TelemetryUpdate {
    pub fn resolver(&self) -> NamedValueResolver<'_> {
        NamedValueResolver::new(&self.current, self.previous.as_deref(), &self.frame)
    }
}

impl TelemetryInfo for TelemetryUpdate {
    fn resolve(&self, name: &str) -> Result<NamedValue, TelemetryError> {
        self.resolver().resolve(name)
    }
}
