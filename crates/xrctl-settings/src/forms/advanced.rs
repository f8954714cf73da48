//! VDXR "Advanced Settings" panel.

use crate::binding::{Binding, Display, FormTable, Gate, Slider};

const fn percent(min: i32, max: i32, default: i32) -> Slider {
    Slider::new(min, max, default).unit("%")
}

static BINDINGS: [Binding; 13] = [
    Binding::slider(
        "supersampling",
        "Supersampling",
        "Supersampling",
        "resolution",
        percent(100, 200, 100),
    ),
    Binding::slider(
        "upscaling",
        "Upscaling",
        "Upscaling",
        "resolution",
        percent(40, 100, 100),
    ),
    Binding::slider(
        "sharpening",
        "Sharpening",
        "Sharpening",
        "resolution",
        percent(0, 100, 0),
    ),
    Binding::slider(
        "horizontal_fov_tangent",
        "HorizontalFovTangent",
        "Horizontal FOV",
        "fov",
        percent(40, 100, 100),
    ),
    Binding::slider(
        "vertical_fov_tangent",
        "VerticalFovTangent",
        "Vertical FOV",
        "fov",
        percent(40, 100, 100),
    ),
    Binding::slider(
        "mask_scale",
        "OverrideVisibilityMaskScale",
        "Visibility mask scale",
        "fov",
        percent(40, 150, 100),
    ),
    Binding::slider(
        "world_scale",
        "OverrideWorldScale",
        "World scale",
        "world",
        percent(25, 400, 100),
    ),
    Binding::toggle("player_height_enable", "Override player height", "world"),
    Binding::slider(
        "player_height",
        "OverrideFloorHeight",
        "Player height",
        "world",
        Slider::new(40, 250, 170).unit("cm").display(Display::Height),
    ),
    Binding::checkbox(
        "quad_views",
        "AllowQuadViews",
        "Allow quad views",
        "quad_views",
        false,
    ),
    Binding::slider(
        "peripheral_view",
        "QVPeripheralViewDensity",
        "Peripheral view density",
        "quad_views",
        percent(10, 100, 50),
    ),
    Binding::slider(
        "focus_size",
        "QVFocusScale",
        "Focus area size",
        "quad_views",
        percent(50, 150, 100),
    ),
    Binding::checkbox("turbo", "DeferFrameWait", "Turbo mode", "performance", false),
];

static GATES: [Gate; 2] = [
    Gate::new("player_height_enable", &["player_height"]).sentinel(-1),
    Gate::new("quad_views", &["peripheral_view", "focus_size"]),
];

pub static TABLE: FormTable = FormTable {
    name: "advanced",
    title: "VDXR Advanced Settings",
    bindings: &BINDINGS,
    gates: &GATES,
    exclusives: &[],
};
