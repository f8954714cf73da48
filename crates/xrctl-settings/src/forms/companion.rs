//! PimaxXR companion, main page.

use crate::binding::{Binding, Display, FormTable, Gate, Slider};

/// Option order matches the codes the runtime reads.
pub const CONTROLLER_EMULATION: [&str; 3] = ["None", "Oculus Touch", "Windows Mixed Reality"];

/// Guardian distances are edited in centimetres and stored in millimetres.
const GUARDIAN_DISTANCE: Slider = Slider::new(50, 600, 160)
    .scale(10)
    .unit("m")
    .display(Display::Fraction(100));

static BINDINGS: [Binding; 7] = [
    Binding::checkbox(
        "recenter_on_startup",
        "recenter_on_startup",
        "Recenter on startup",
        "tracking",
        true,
    ),
    Binding::slider(
        "joystick_deadzone",
        "joystick_deadzone",
        "Joystick deadzone",
        "controllers",
        Slider::new(0, 100, 2).display(Display::Fraction(100)),
    ),
    Binding::choice(
        "controller_emulation",
        "force_interaction_profile",
        "Controller emulation",
        "controllers",
        &CONTROLLER_EMULATION,
        0,
    ),
    Binding::checkbox("guardian", "guardian", "Enable guardian", "guardian", true),
    Binding::slider(
        "guardian_radius",
        "guardian_radius",
        "Guardian radius",
        "guardian",
        GUARDIAN_DISTANCE,
    ),
    Binding::slider(
        "guardian_threshold",
        "guardian_threshold",
        "Guardian threshold",
        "guardian",
        Slider { default: 110, ..GUARDIAN_DISTANCE },
    ),
    Binding::checkbox(
        "enable_telemetry",
        "enable_telemetry",
        "Send anonymous usage data",
        "telemetry",
        true,
    ),
];

static GATES: [Gate; 1] = [Gate::new(
    "guardian",
    &["guardian_radius", "guardian_threshold"],
)];

pub static TABLE: FormTable = FormTable {
    name: "companion",
    title: "PimaxXR Control Center",
    bindings: &BINDINGS,
    gates: &GATES,
    exclusives: &[],
};
