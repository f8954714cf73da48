//! End-to-end behavior of the shipped forms against in-memory and file stores.

use std::sync::Arc;

use xrctl_settings::forms::experimental::{FORCED_OFFSET, MULTIPLIER_KEY, OFFSET_KEY};
use xrctl_settings::namespace;
use xrctl_settings::notify::STORE_ACCESS_MESSAGE;
use xrctl_settings::{open_form, Control, Deployment, Form, FormKind, RecordingNotifier};
use xrctl_store::{FileStore, MemoryStore, Store};

struct Harness {
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    fn open(&self, kind: FormKind) -> Form {
        open_form(
            kind,
            Deployment::Bundled,
            self.store.clone(),
            self.notifier.clone(),
        )
    }

    fn ns(kind: FormKind) -> &'static str {
        kind.product().namespace(Deployment::Bundled)
    }

    fn get(&self, kind: FormKind, key: &str) -> Option<i32> {
        self.store.get_dword(Self::ns(kind), key).unwrap()
    }

    fn put(&self, kind: FormKind, key: &str, value: i32) {
        self.store.set_dword(Self::ns(kind), key, value).unwrap();
    }
}

fn keyed_sliders(kind: FormKind) -> impl Iterator<Item = &'static xrctl_settings::Binding> {
    kind.table()
        .bindings
        .iter()
        .filter(|b| b.key.is_some() && b.as_slider().is_some())
}

/// A sentinel-governed value only engages the override when positive.
fn below_range(kind: FormKind, binding: &xrctl_settings::Binding) -> i32 {
    let slider = binding.as_slider().unwrap();
    let gated = kind
        .table()
        .gates
        .iter()
        .any(|g| g.sentinel.is_some() && g.governs.contains(&binding.id));
    if gated {
        slider.min / 2 * slider.scale
    } else {
        (slider.min - 50) * slider.scale
    }
}

#[test]
fn load_clamps_stored_values() {
    for kind in FormKind::ALL {
        for binding in keyed_sliders(kind) {
            let h = Harness::new();
            let slider = binding.as_slider().unwrap();
            let key = binding.key.unwrap();

            h.put(kind, key, (slider.max + 50) * slider.scale);
            assert_eq!(h.open(kind).value(binding.id).unwrap(), slider.max, "{}", binding.id);

            h.put(kind, key, below_range(kind, binding));
            assert_eq!(h.open(kind).value(binding.id).unwrap(), slider.min, "{}", binding.id);
        }
    }
}

#[test]
fn writes_read_back_through_unit_conversion() {
    for kind in FormKind::ALL {
        let h = Harness::new();
        let mut form = h.open(kind);
        if kind == FormKind::Advanced {
            form.set("player_height_enable", 1).unwrap();
            form.set("quad_views", 1).unwrap();
        }

        for binding in kind.table().bindings.iter().filter(|b| b.key.is_some()) {
            let value = match binding.control {
                Control::Slider(s) => s.max,
                Control::Checkbox { default } => (!default) as i32,
                Control::Choice { options, .. } => options.len() as i32 - 1,
            };
            let change = form.set(binding.id, value).unwrap();
            assert!(change.persisted);
            assert_eq!(
                h.get(kind, binding.key.unwrap()),
                Some(binding.to_store(value)),
                "{}",
                binding.id
            );
            if ["guardian", "quad_views", "frame_timing"].contains(&binding.id) {
                form.set(binding.id, 1).unwrap();
            }
        }
        assert_eq!(h.notifier.count(), 0);
    }
}

#[test]
fn restore_defaults_deletes_every_owned_key() {
    for kind in FormKind::ALL {
        let h = Harness::new();
        for key in kind.table().owned_keys() {
            h.put(kind, key, 7);
        }
        h.put(kind, "unrelated", 1);

        let mut form = h.open(kind);
        form.restore_defaults().unwrap();

        for key in kind.table().owned_keys() {
            assert_eq!(h.get(kind, key), None, "{key}");
        }
        assert_eq!(h.get(kind, "unrelated"), Some(1));
        for binding in kind.table().bindings.iter().filter(|b| b.key.is_some()) {
            assert_eq!(
                form.value(binding.id).unwrap(),
                binding.default_value(),
                "{}",
                binding.id
            );
        }
    }
}

#[test]
fn loading_and_restoring_never_write_values() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Companion);
    form.restore_defaults().unwrap();
    form.load().unwrap();
    assert!(h
        .store
        .entries()
        .iter()
        .all(|(path, _, _)| path != namespace::PIMAX));
}

#[test]
fn height_override_scenario() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Advanced);
    assert!(!form.is_checked("player_height_enable").unwrap());
    assert!(!form.is_enabled("player_height"));
    assert_eq!(form.value("player_height").unwrap(), 170);

    form.set("player_height_enable", 1).unwrap();
    assert!(form.is_enabled("player_height"));
    assert_eq!(h.get(FormKind::Advanced, "OverrideFloorHeight"), Some(170));

    form.set("player_height", 182).unwrap();
    form.set("player_height_enable", 0).unwrap();
    assert!(!form.is_enabled("player_height"));
    assert_eq!(h.get(FormKind::Advanced, "OverrideFloorHeight"), Some(-1));

    let mut form = h.open(FormKind::Advanced);
    assert!(!form.is_checked("player_height_enable").unwrap());
    assert_eq!(form.value("player_height").unwrap(), 170);
    form.set("player_height_enable", 1).unwrap();
    assert_eq!(h.get(FormKind::Advanced, "OverrideFloorHeight"), Some(170));

    h.put(FormKind::Advanced, "OverrideFloorHeight", 182);
    let form = h.open(FormKind::Advanced);
    assert!(form.is_checked("player_height_enable").unwrap());
    let view = form.view("player_height").unwrap();
    assert_eq!(view.value, 182);
    assert_eq!(view.detail.as_deref(), Some("5' 11''"));
}

#[test]
fn supersampling_scenario() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Advanced);
    form.set("supersampling", 150).unwrap();
    assert_eq!(form.view("supersampling").unwrap().display, "150");
    assert_eq!(h.get(FormKind::Advanced, "Supersampling"), Some(150));
}

#[test]
fn quad_views_gate() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Advanced);
    assert!(!form.is_enabled("peripheral_view"));
    assert!(!form.is_enabled("focus_size"));
    form.set("quad_views", 1).unwrap();
    assert!(form.is_enabled("peripheral_view"));
    assert!(form.is_enabled("focus_size"));
}

#[test]
fn read_only_store_still_shows_stored_values() {
    let h = Harness::new();
    h.put(FormKind::Advanced, "Supersampling", 150);
    h.store.deny_writes(true);

    let form = h.open(FormKind::Advanced);
    assert_eq!(form.value("supersampling").unwrap(), 150);
    assert_eq!(h.notifier.count(), 0);
}

#[test]
fn store_failure_on_load_scenario() {
    let h = Harness::new();
    h.put(FormKind::Advanced, "Supersampling", 150);
    h.store.deny_access(true);

    let form = h.open(FormKind::Advanced);
    assert_eq!(h.notifier.count(), 1);
    assert_eq!(h.notifier.notifications()[0].message, STORE_ACCESS_MESSAGE);
    for binding in FormKind::Advanced.table().bindings {
        assert_eq!(form.value(binding.id).unwrap(), binding.default_value());
    }
}

#[test]
fn exclusive_rate_checkboxes() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Experimental);
    form.set("force_half", 1).unwrap();
    assert_eq!(h.get(FormKind::Experimental, MULTIPLIER_KEY), Some(100));
    assert_eq!(h.get(FormKind::Experimental, OFFSET_KEY), Some(FORCED_OFFSET));

    form.set("force_third", 1).unwrap();
    assert!(!form.is_checked("force_half").unwrap());
    assert!(form.is_checked("force_third").unwrap());
    assert_eq!(h.get(FormKind::Experimental, MULTIPLIER_KEY), Some(200));
    assert!(!form.is_enabled("filter_length"));
    assert!(!form.is_enabled("timing_bias"));

    form.set("force_third", 0).unwrap();
    assert_eq!(h.get(FormKind::Experimental, MULTIPLIER_KEY), Some(0));
    assert_eq!(h.get(FormKind::Experimental, OFFSET_KEY), Some(0));
    assert!(form.is_enabled("timing_bias"));
}

#[test]
fn exclusive_load_shadows_bias() {
    let h = Harness::new();
    h.put(FormKind::Experimental, MULTIPLIER_KEY, 200);
    h.put(FormKind::Experimental, OFFSET_KEY, FORCED_OFFSET);

    let form = h.open(FormKind::Experimental);
    assert!(form.is_checked("force_third").unwrap());
    assert!(!form.is_checked("force_half").unwrap());
    assert_eq!(form.value("timing_bias").unwrap(), 0);
}

#[test]
fn no_rate_forced_leaves_both_unchecked() {
    let h = Harness::new();
    let form = h.open(FormKind::Experimental);
    assert!(!form.is_checked("force_half").unwrap());
    assert!(!form.is_checked("force_third").unwrap());
}

#[test]
fn frame_timing_gate_disables_page() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Experimental);
    form.set("frame_timing", 0).unwrap();
    for id in ["force_half", "force_third", "filter_length", "timing_bias"] {
        assert!(!form.is_enabled(id), "{id}");
    }
    assert_eq!(h.get(FormKind::Experimental, "use_frame_timing_override"), Some(0));
}

#[test]
fn timing_bias_units() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Experimental);
    form.set_from_str("timing_bias", "-15").unwrap();
    assert_eq!(h.get(FormKind::Experimental, OFFSET_KEY), Some(-1500));
    assert_eq!(form.view("timing_bias").unwrap().display, "-1.5");
}

#[test]
fn guardian_units_and_gate() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Companion);
    assert_eq!(form.view("guardian_radius").unwrap().display, "1.6");
    form.set("guardian_radius", 160).unwrap();
    assert_eq!(h.get(FormKind::Companion, "guardian_radius"), Some(1600));

    form.set_from_str("guardian", "off").unwrap();
    assert!(!form.is_enabled("guardian_radius"));
    assert!(!form.is_enabled("guardian_threshold"));
}

#[test]
fn controller_emulation_by_name() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Companion);
    form.set_from_str("controller_emulation", "windows mixed reality")
        .unwrap();
    assert_eq!(h.get(FormKind::Companion, "force_interaction_profile"), Some(2));
}

#[test]
fn restoring_one_offsets_group() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Offsets);
    form.set("aim_pose_offset_x", 12).unwrap();
    form.set("grip_pose_rot_z", -45).unwrap();
    form.set("palm_pose_offset_y", 3).unwrap();

    form.restore_group("grip").unwrap();
    assert_eq!(h.get(FormKind::Offsets, "grip_pose_rot_z"), None);
    assert_eq!(form.value("grip_pose_rot_z").unwrap(), 0);
    assert_eq!(h.get(FormKind::Offsets, "aim_pose_offset_x"), Some(12));
    assert_eq!(h.get(FormKind::Offsets, "palm_pose_offset_y"), Some(3));
}

#[test]
fn standalone_deployment_uses_its_own_namespace() {
    let h = Harness::new();
    let mut form = open_form(
        FormKind::Offsets,
        Deployment::Standalone,
        h.store.clone(),
        h.notifier.clone(),
    );
    form.set("aim_pose_offset_z", -5).unwrap();
    assert_eq!(
        h.store
            .get_dword(namespace::VDXR_STANDALONE, "aim_pose_offset_z")
            .unwrap(),
        Some(-5)
    );
    assert_eq!(h.get(FormKind::Offsets, "aim_pose_offset_z"), None);
}

#[test]
fn write_failure_is_reported_once_per_change() {
    let h = Harness::new();
    let mut form = h.open(FormKind::Experimental);
    h.store.deny_writes(true);

    let change = form.set("force_half", 1).unwrap();
    assert!(!change.persisted);
    assert!(form.is_checked("force_half").unwrap());
    assert_eq!(h.notifier.count(), 1);
}

#[test]
fn file_store_persists_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let notifier = Arc::new(RecordingNotifier::new());

    let store: Arc<dyn Store> = Arc::new(FileStore::open(&path).unwrap());
    let mut form = open_form(FormKind::Companion, Deployment::Bundled, store, notifier.clone());
    form.set("joystick_deadzone", 10).unwrap();

    let store: Arc<dyn Store> = Arc::new(FileStore::open(&path).unwrap());
    let form = open_form(FormKind::Companion, Deployment::Bundled, store, notifier.clone());
    assert_eq!(form.view("joystick_deadzone").unwrap().display, "0.1");
    assert_eq!(notifier.count(), 0);
}
