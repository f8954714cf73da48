//! PimaxXR companion, experimental page.
//!
//! Forcing a fixed fraction of the refresh rate is stored as a multiplier
//! code (100 for half, 200 for a third) and pins the frame time offset to
//! 1 ms. Otherwise the bias slider drives the offset directly.

use crate::binding::{Binding, Display, Exclusive, FormTable, Gate, Slider};

pub const MULTIPLIER_KEY: &str = "frame_time_override_multiplier";
pub const OFFSET_KEY: &str = "frame_time_override_offset";

pub const FORCE_HALF: i32 = 100;
pub const FORCE_THIRD: i32 = 200;
/// Offset in microseconds written while a fixed rate is forced.
pub const FORCED_OFFSET: i32 = 1000;

static BINDINGS: [Binding; 5] = [
    Binding::checkbox(
        "frame_timing",
        "use_frame_timing_override",
        "Override frame timing",
        "timing",
        true,
    ),
    Binding::slider(
        "filter_length",
        "frame_time_filter_length",
        "Filter length",
        "timing",
        Slider::new(3, 600, 5).unit("frames"),
    ),
    Binding::toggle("force_half", "Force half rate", "timing"),
    Binding::toggle("force_third", "Force third rate", "timing"),
    // Tenths of a millisecond, stored in microseconds.
    Binding::slider(
        "timing_bias",
        OFFSET_KEY,
        "Timing bias",
        "timing",
        Slider::new(-300, 300, 0)
            .scale(100)
            .unit("ms")
            .display(Display::Fraction(10)),
    ),
];

static GATES: [Gate; 3] = [
    Gate::new(
        "frame_timing",
        &["force_half", "force_third", "filter_length", "timing_bias"],
    ),
    Gate::new("force_half", &["filter_length", "timing_bias"]).inverted(),
    Gate::new("force_third", &["filter_length", "timing_bias"]).inverted(),
];

static EXCLUSIVES: [Exclusive; 1] = [Exclusive {
    key: MULTIPLIER_KEY,
    none: 0,
    members: &[("force_half", FORCE_HALF), ("force_third", FORCE_THIRD)],
    companions: &[(OFFSET_KEY, FORCED_OFFSET)],
    shadowed: &["timing_bias"],
}];

pub static TABLE: FormTable = FormTable {
    name: "experimental",
    title: "PimaxXR Experimental Settings",
    bindings: &BINDINGS,
    gates: &GATES,
    exclusives: &EXCLUSIVES,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_valid() {
        TABLE.validate().unwrap();
        assert_eq!(
            TABLE.owned_keys(),
            vec![
                "use_frame_timing_override",
                "frame_time_filter_length",
                OFFSET_KEY,
                MULTIPLIER_KEY,
            ]
        );
    }

    #[test]
    fn test_bias_units() {
        let bias = TABLE.binding("timing_bias").unwrap();
        assert_eq!(bias.to_store(-15), -1500);
        assert_eq!(bias.display(-15), "-1.5");
        assert_eq!(bias.from_store(FORCED_OFFSET), 10);
    }
}
