//! Falcon BMS `FlightData` wire layout.
//!
//! The producer writes a sequential struct (pack 8) into the shared memory area.
//! Every member is a 4-byte scalar or an array of 4-byte/1-byte elements whose
//! total length is a multiple of four, so the layout carries no padding and the
//! fields can be read back-to-back. Values are little-endian.
//!
//! | Field      | Type        | Offset |
//! |------------|-------------|--------|
//! | alpha      | f32         |     24 |
//! | pitch      | f32         |     36 |
//! | roll       | f32         |     40 |
//! | yaw        | f32         |     44 |
//! | kias       | f32         |     52 |
//! | gs         | f32         |     60 |
//! | DEDLines   | [u8; 130]   |    236 |
//! | RWRsymbol  | [i32; 40]   |    768 |
//! | MainPower  | i32         |   1916 |

use falcon_telemetry_core::{TelemetryError, TelemetryValue};

/// Rows in each cockpit text display buffer.
pub const DISPLAY_LINES: usize = 5;
/// Characters per cockpit text display row.
pub const DISPLAY_COLUMNS: usize = 26;
/// Capacity of every RWR contact array.
pub const RWR_CAPACITY: usize = 40;

const DISPLAY_BYTES: usize = DISPLAY_LINES * DISPLAY_COLUMNS;

/// A value with a fixed little-endian wire encoding.
pub(crate) trait WireField: Sized {
    const SIZE: usize;
    const ZERO: Self;

    /// Decode from exactly [`Self::SIZE`] bytes.
    fn decode(bytes: &[u8]) -> Self;

    fn encode(&self, out: &mut Vec<u8>);

    fn to_value(&self) -> TelemetryValue;
}

macro_rules! scalar_wire_field {
    ($ty:ty, $variant:ident, $zero:expr) => {
        impl WireField for $ty {
            const SIZE: usize = 4;
            const ZERO: Self = $zero;

            fn decode(bytes: &[u8]) -> Self {
                <[u8; 4]>::try_from(bytes)
                    .map(<$ty>::from_le_bytes)
                    .unwrap_or($zero)
            }

            fn encode(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn to_value(&self) -> TelemetryValue {
                TelemetryValue::$variant(*self)
            }
        }
    };
}

scalar_wire_field!(f32, Float, 0.0);
scalar_wire_field!(i32, Integer, 0);
scalar_wire_field!(u32, Unsigned, 0);

macro_rules! array_wire_field {
    ($elem:ty, $variant:ident) => {
        impl<const N: usize> WireField for [$elem; N] {
            const SIZE: usize = N * <$elem as WireField>::SIZE;
            const ZERO: Self = [<$elem as WireField>::ZERO; N];

            fn decode(bytes: &[u8]) -> Self {
                let mut out = Self::ZERO;
                for (slot, chunk) in out
                    .iter_mut()
                    .zip(bytes.chunks_exact(<$elem as WireField>::SIZE))
                {
                    *slot = <$elem as WireField>::decode(chunk);
                }
                out
            }

            fn encode(&self, out: &mut Vec<u8>) {
                for value in self {
                    value.encode(out);
                }
            }

            fn to_value(&self) -> TelemetryValue {
                TelemetryValue::$variant(self.to_vec())
            }
        }
    };
}

array_wire_field!(f32, FloatArray);
array_wire_field!(i32, IntegerArray);
array_wire_field!(u32, UnsignedArray);

impl<const N: usize> WireField for [u8; N] {
    const SIZE: usize = N;
    const ZERO: Self = [0; N];

    fn decode(bytes: &[u8]) -> Self {
        let mut out = [0; N];
        for (slot, byte) in out.iter_mut().zip(bytes) {
            *slot = *byte;
        }
        out
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }

    fn to_value(&self) -> TelemetryValue {
        TelemetryValue::Bytes(self.to_vec())
    }
}

/// Sequential, bounds-checked reader over a frame buffer.
struct FrameReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FrameReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read<T: WireField>(&mut self) -> Result<T, TelemetryError> {
        let end = self.offset.saturating_add(T::SIZE);
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(TelemetryError::MalformedFrame {
                expected: RawFrame::SIZE,
                actual: self.data.len(),
            })?;
        self.offset = end;
        Ok(T::decode(bytes))
    }
}

/// Name-indexed accessor for one raw field.
#[derive(Clone, Copy)]
pub(crate) struct RawField {
    pub(crate) name: &'static str,
    pub(crate) size: usize,
    pub(crate) get: fn(&RawFrame) -> TelemetryValue,
}

macro_rules! raw_frame_layout {
    ($( $(#[$meta:meta])* $field:ident: $ty:ty => $wire:literal, )+) => {
        /// Byte-exact mirror of the producer's `FlightData` struct.
        #[derive(Debug, Clone, PartialEq)]
        pub struct RawFrame {
            $( $(#[$meta])* pub $field: $ty, )+
        }

        impl RawFrame {
            /// Size of the wire layout in bytes.
            pub const SIZE: usize = 0 $( + <$ty as WireField>::SIZE )+;

            pub fn zeroed() -> Self {
                Self {
                    $( $field: <$ty as WireField>::ZERO, )+
                }
            }

            /// Decode a frame from the start of `data`. Trailing bytes are ignored.
            ///
            /// # Errors
            ///
            /// Returns [`TelemetryError::MalformedFrame`] when `data` is shorter
            /// than [`RawFrame::SIZE`].
            pub fn decode(data: &[u8]) -> Result<Self, TelemetryError> {
                if data.len() < Self::SIZE {
                    return Err(TelemetryError::MalformedFrame {
                        expected: Self::SIZE,
                        actual: data.len(),
                    });
                }
                let mut reader = FrameReader::new(data);
                Ok(Self {
                    $( $field: reader.read()?, )+
                })
            }

            /// Encode the frame in wire layout.
            pub fn encode(&self) -> Vec<u8> {
                let mut out = Vec::with_capacity(Self::SIZE);
                $( WireField::encode(&self.$field, &mut out); )+
                out
            }
        }

        /// Every raw field, in wire order, under its producer name.
        pub(crate) const RAW_FIELDS: &[RawField] = &[
            $(
                RawField {
                    name: $wire,
                    size: <$ty as WireField>::SIZE,
                    get: |frame: &RawFrame| frame.$field.to_value(),
                },
            )+
        ];
    };
}

raw_frame_layout! {
    x: f32 => "x",
    y: f32 => "y",
    z: f32 => "z",
    x_dot: f32 => "xDot",
    y_dot: f32 => "yDot",
    z_dot: f32 => "zDot",
    /// Angle of attack, degrees.
    alpha: f32 => "alpha",
    beta: f32 => "beta",
    gamma: f32 => "gamma",
    /// Pitch, radians.
    pitch: f32 => "pitch",
    /// Roll, radians.
    roll: f32 => "roll",
    /// Yaw, radians.
    yaw: f32 => "yaw",
    mach: f32 => "mach",
    /// Indicated airspeed, knots.
    kias: f32 => "kias",
    vt: f32 => "vt",
    /// Normal acceleration, g.
    gs: f32 => "gs",
    wind_offset: f32 => "windOffset",
    nozzle_pos: f32 => "nozzlePos",
    internal_fuel: f32 => "internalFuel",
    external_fuel: f32 => "externalFuel",
    fuel_flow: f32 => "fuelFlow",
    rpm: f32 => "rpm",
    ftit: f32 => "ftit",
    gear_pos: f32 => "gearPos",
    speed_brake: f32 => "speedBrake",
    epu_fuel: f32 => "epuFuel",
    oil_pressure: f32 => "oilPressure",
    light_bits: u32 => "lightBits",
    head_pitch: f32 => "headPitch",
    head_roll: f32 => "headRoll",
    head_yaw: f32 => "headYaw",
    light_bits2: u32 => "lightBits2",
    light_bits3: u32 => "lightBits3",
    chaff_count: f32 => "ChaffCount",
    flare_count: f32 => "FlareCount",
    nose_gear_pos: f32 => "NoseGearPos",
    left_gear_pos: f32 => "LeftGearPos",
    right_gear_pos: f32 => "RightGearPos",
    adi_ils_hor_pos: f32 => "AdiIlsHorPos",
    adi_ils_ver_pos: f32 => "AdiIlsVerPos",
    course_state: i32 => "courseState",
    heading_state: i32 => "headingState",
    total_states: i32 => "totalStates",
    course_deviation: f32 => "courseDeviation",
    desired_course: f32 => "desiredCourse",
    distance_to_beacon: f32 => "distanceToBeacon",
    bearing_to_beacon: f32 => "bearingToBeacon",
    current_heading: f32 => "currentHeading",
    desired_heading: f32 => "desiredHeading",
    deviation_limit: f32 => "deviationLimit",
    half_deviation_limit: f32 => "halfDeviationLimit",
    localizer_course: f32 => "localizerCourse",
    airbase_x: f32 => "airbaseX",
    airbase_y: f32 => "airbaseY",
    total_values: f32 => "totalValues",
    trim_pitch: f32 => "TrimPitch",
    trim_roll: f32 => "TrimRoll",
    trim_yaw: f32 => "TrimYaw",
    hsi_bits: u32 => "hsiBits",
    /// Data entry display, 5 rows of 26 characters.
    ded_lines: [u8; DISPLAY_BYTES] => "DEDLines",
    invert: [u8; DISPLAY_BYTES] => "Invert",
    /// Pilot fault list display, 5 rows of 26 characters.
    pfl_lines: [u8; DISPLAY_BYTES] => "PFLLines",
    pfl_invert: [u8; DISPLAY_BYTES] => "PFLInvert",
    ufc_tchan: i32 => "UFCTChan",
    aux_tchan: i32 => "AUXTChan",
    /// Number of valid entries in the RWR arrays.
    rwr_object_count: i32 => "RwrObjectCount",
    rwr_symbol: [i32; RWR_CAPACITY] => "RWRsymbol",
    bearing: [f32; RWR_CAPACITY] => "bearing",
    missile_activity: [u32; RWR_CAPACITY] => "missileActivity",
    missile_launch: [u32; RWR_CAPACITY] => "missileLaunch",
    selected: [u32; RWR_CAPACITY] => "selected",
    lethality: [f32; RWR_CAPACITY] => "lethality",
    new_detection: [u32; RWR_CAPACITY] => "newDetection",
    fwd: f32 => "fwd",
    aft: f32 => "aft",
    total: f32 => "total",
    version_num: i32 => "VersionNum",
    head_x: f32 => "headX",
    head_y: f32 => "headY",
    head_z: f32 => "headZ",
    main_power: i32 => "MainPower",
}

impl Default for RawFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl RawFrame {
    /// Byte offset of a field, looked up by producer name.
    pub fn offset_of(name: &str) -> Option<usize> {
        let mut offset = 0usize;
        for field in RAW_FIELDS {
            if field.name == name {
                return Some(offset);
            }
            offset = offset.saturating_add(field.size);
        }
        None
    }

    /// Number of valid RWR entries, or `None` if the producer reported an
    /// out-of-range count.
    pub fn rwr_len(&self) -> Option<usize> {
        usize::try_from(self.rwr_object_count)
            .ok()
            .filter(|count| *count <= RWR_CAPACITY)
    }
}

/// Decode a 5x26 cockpit display buffer into text rows.
///
/// Each row ends at its first NUL; bytes outside printable ASCII are shown as
/// spaces and trailing whitespace is dropped.
pub fn display_lines(buffer: &[u8]) -> Vec<String> {
    buffer
        .chunks(DISPLAY_COLUMNS)
        .take(DISPLAY_LINES)
        .map(|row| {
            let text: String = row
                .iter()
                .take_while(|byte| **byte != 0)
                .map(|byte| {
                    if byte.is_ascii_graphic() || *byte == b' ' {
                        char::from(*byte)
                    } else {
                        ' '
                    }
                })
                .collect();
            text.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn write_f32(data: &mut [u8], name: &str, value: f32) -> TestResult {
        let offset = RawFrame::offset_of(name).ok_or("unknown field")?;
        data.get_mut(offset..offset + 4)
            .ok_or("offset out of range")?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    #[test]
    fn test_layout_size_matches_producer() {
        assert_eq!(RawFrame::SIZE, 1920);
        assert_eq!(RawFrame::zeroed().encode().len(), RawFrame::SIZE);
    }

    #[test]
    fn test_field_offsets() {
        assert_eq!(RawFrame::offset_of("x"), Some(0));
        assert_eq!(RawFrame::offset_of("alpha"), Some(24));
        assert_eq!(RawFrame::offset_of("pitch"), Some(36));
        assert_eq!(RawFrame::offset_of("roll"), Some(40));
        assert_eq!(RawFrame::offset_of("yaw"), Some(44));
        assert_eq!(RawFrame::offset_of("kias"), Some(52));
        assert_eq!(RawFrame::offset_of("gs"), Some(60));
        assert_eq!(RawFrame::offset_of("lightBits"), Some(108));
        assert_eq!(RawFrame::offset_of("hsiBits"), Some(232));
        assert_eq!(RawFrame::offset_of("DEDLines"), Some(236));
        assert_eq!(RawFrame::offset_of("UFCTChan"), Some(756));
        assert_eq!(RawFrame::offset_of("RWRsymbol"), Some(768));
        assert_eq!(RawFrame::offset_of("fwd"), Some(1888));
        assert_eq!(RawFrame::offset_of("MainPower"), Some(1916));
        assert_eq!(RawFrame::offset_of("nope"), None);
    }

    #[test]
    fn test_decode_reads_fields_at_offsets() -> TestResult {
        let mut data = vec![0u8; RawFrame::SIZE];
        write_f32(&mut data, "pitch", 0.1)?;
        write_f32(&mut data, "kias", 100.0)?;
        write_f32(&mut data, "alpha", 5.0)?;
        let frame = RawFrame::decode(&data)?;
        assert_eq!(frame.pitch.to_bits(), 0.1f32.to_bits());
        assert_eq!(frame.kias.to_bits(), 100.0f32.to_bits());
        assert_eq!(frame.alpha.to_bits(), 5.0f32.to_bits());
        assert_eq!(frame.roll.to_bits(), 0.0f32.to_bits());
        Ok(())
    }

    #[test]
    fn test_decode_too_short() {
        let data = vec![0u8; 100];
        assert_eq!(
            RawFrame::decode(&data),
            Err(TelemetryError::MalformedFrame {
                expected: 1920,
                actual: 100
            })
        );
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() -> TestResult {
        let mut frame = RawFrame::zeroed();
        frame.main_power = 2;
        let mut data = frame.encode();
        data.extend_from_slice(&[0xFF; 64]);
        assert_eq!(RawFrame::decode(&data)?, frame);
        Ok(())
    }

    #[test]
    fn test_array_fields_keep_element_order() -> TestResult {
        let mut frame = RawFrame::zeroed();
        frame.rwr_object_count = 2;
        frame.rwr_symbol[0] = 7;
        frame.rwr_symbol[1] = -3;
        frame.lethality[39] = 0.75;
        frame.ded_lines[0] = b'U';
        let decoded = RawFrame::decode(&frame.encode())?;
        assert_eq!(decoded.rwr_symbol[..2], [7, -3]);
        assert_eq!(decoded.lethality[39].to_bits(), 0.75f32.to_bits());
        assert_eq!(decoded.ded_lines[0], b'U');
        Ok(())
    }

    #[test]
    fn test_rwr_len_bounds() {
        let mut frame = RawFrame::zeroed();
        frame.rwr_object_count = 3;
        assert_eq!(frame.rwr_len(), Some(3));
        frame.rwr_object_count = 40;
        assert_eq!(frame.rwr_len(), Some(40));
        frame.rwr_object_count = 41;
        assert_eq!(frame.rwr_len(), None);
        frame.rwr_object_count = -1;
        assert_eq!(frame.rwr_len(), None);
    }

    #[test]
    fn test_display_lines_decoding() {
        let mut buffer = [0u8; DISPLAY_BYTES];
        buffer[..9].copy_from_slice(b"UHF  242 ");
        buffer[DISPLAY_COLUMNS..DISPLAY_COLUMNS + 4].copy_from_slice(&[b'S', 0x01, b'T', 0]);
        let lines = display_lines(&buffer);
        assert_eq!(lines.len(), DISPLAY_LINES);
        assert_eq!(lines[0], "UHF  242");
        assert_eq!(lines[1], "S T");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn test_raw_field_names_unique() {
        let mut names: Vec<&str> = RAW_FIELDS.iter().map(|f| f.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 81);
    }
}
