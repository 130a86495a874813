//! Property-based tests for frame decoding and value resolution.

use falcon_telemetry_bms::{NamedValueResolver, RawFrame, SampleBuilder, derived, value_names};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Arbitrary bytes of any length must never cause a panic.
    #[test]
    fn prop_random_bytes_no_panic(
        data in proptest::collection::vec(any::<u8>(), 0..4096)
    ) {
        let decoded = RawFrame::decode(&data);
        prop_assert_eq!(decoded.is_ok(), data.len() >= RawFrame::SIZE);
    }

    /// A full-size frame re-encodes to the bytes it came from.
    #[test]
    fn prop_full_frame_reencodes(
        data in proptest::collection::vec(any::<u8>(), RawFrame::SIZE..=RawFrame::SIZE)
    ) {
        let frame = RawFrame::decode(&data);
        prop_assert!(frame.is_ok());
        if let Ok(frame) = frame {
            prop_assert_eq!(frame.encode(), data);
        }
    }

    /// Every enumerated name resolves for any frame paired with a valid
    /// previous sample.
    #[test]
    fn prop_every_name_resolves(
        data in proptest::collection::vec(any::<u8>(), RawFrame::SIZE..=RawFrame::SIZE),
        rwr_count in 0i32..=40,
        start in 0.0f64..10_000.0,
        step in 0.001f64..1.0,
    ) {
        let frame = RawFrame::decode(&data);
        prop_assert!(frame.is_ok());
        if let Ok(mut frame) = frame {
            frame.rwr_object_count = rwr_count;
            let previous = SampleBuilder::build(&frame, start);
            let current = SampleBuilder::build(&frame, start + step);
            let resolver = NamedValueResolver::new(&current, Some(&previous), &frame);
            for name in value_names() {
                let resolved = resolver.resolve(name);
                prop_assert!(resolved.is_ok(), "{} failed: {:?}", name, resolved);
            }
        }
    }

    /// Rates equal (current - previous) / elapsed for any positive elapsed time.
    #[test]
    fn prop_rate_formula(
        current in -std::f32::consts::PI..std::f32::consts::PI,
        previous in -std::f32::consts::PI..std::f32::consts::PI,
        elapsed in 0.0001f32..5.0,
    ) {
        let rate = derived::rate(current, previous, elapsed);
        prop_assert!(rate.is_ok());
        if let Ok(rate) = rate {
            prop_assert_eq!(rate.to_bits(), ((current - previous) / elapsed).to_bits());
        }
    }

    /// Anything below the minimum elapsed time is rejected.
    #[test]
    fn prop_tiny_elapsed_rejected(
        current in any::<f32>(),
        previous in any::<f32>(),
        elapsed in -1.0f32..derived::MIN_ELAPSED_SECS,
    ) {
        prop_assert!(derived::rate(current, previous, elapsed).is_err());
    }
}
