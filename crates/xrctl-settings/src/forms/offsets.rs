//! VDXR controller offsets.
//!
//! Keys follow the runtime's naming: `<pose>_pose_offset_<axis>` in
//! millimetres and `<pose>_pose_rot_<axis>` in degrees.

use crate::binding::{Binding, FormTable, Slider};

const TRANSLATION: Slider = Slider::new(-200, 200, 0).unit("mm");
const ROTATION: Slider = Slider::new(-179, 180, 0).unit("°");

macro_rules! pose {
    ($group:literal, $label:literal) => {
        [
            Binding::slider(
                concat!($group, "_pose_offset_x"),
                concat!($group, "_pose_offset_x"),
                concat!($label, " X"),
                $group,
                TRANSLATION,
            ),
            Binding::slider(
                concat!($group, "_pose_offset_y"),
                concat!($group, "_pose_offset_y"),
                concat!($label, " Y"),
                $group,
                TRANSLATION,
            ),
            Binding::slider(
                concat!($group, "_pose_offset_z"),
                concat!($group, "_pose_offset_z"),
                concat!($label, " Z"),
                $group,
                TRANSLATION,
            ),
            Binding::slider(
                concat!($group, "_pose_rot_x"),
                concat!($group, "_pose_rot_x"),
                concat!($label, " pitch"),
                $group,
                ROTATION,
            ),
            Binding::slider(
                concat!($group, "_pose_rot_y"),
                concat!($group, "_pose_rot_y"),
                concat!($label, " yaw"),
                $group,
                ROTATION,
            ),
            Binding::slider(
                concat!($group, "_pose_rot_z"),
                concat!($group, "_pose_rot_z"),
                concat!($label, " roll"),
                $group,
                ROTATION,
            ),
        ]
    };
}

const AIM: [Binding; 6] = pose!("aim", "Aim");
const GRIP: [Binding; 6] = pose!("grip", "Grip");
const PALM: [Binding; 6] = pose!("palm", "Palm");

static BINDINGS: [Binding; 18] = [
    AIM[0], AIM[1], AIM[2], AIM[3], AIM[4], AIM[5], GRIP[0], GRIP[1], GRIP[2], GRIP[3], GRIP[4],
    GRIP[5], PALM[0], PALM[1], PALM[2], PALM[3], PALM[4], PALM[5],
];

pub static TABLE: FormTable = FormTable {
    name: "offsets",
    title: "VDXR Controller Offsets",
    bindings: &BINDINGS,
    gates: &[],
    exclusives: &[],
};
