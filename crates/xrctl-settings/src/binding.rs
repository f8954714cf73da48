//! Static binding tables.
//!
//! A [`FormTable`] declares every control of a form: the store key it
//! mirrors, its range and fallback default, the conversion between control
//! units and stored units, and how its value is displayed. Dependencies
//! between controls are declared as [`Gate`]s and [`Exclusive`] groups.

use xrctl_common::helpers::{feet_inches, fraction, from_store_units, to_store_units};

use crate::error::{FormError, FormResult};

/// How a slider value is rendered next to the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// The value itself.
    Integer,
    /// `value / divisor`, at most two decimals.
    Fraction(i32),
    /// Centimetres, with a feet/inches detail label.
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slider {
    pub min: i32,
    pub max: i32,
    pub default: i32,
    /// Stored value = control value * `scale`.
    pub scale: i32,
    pub unit: &'static str,
    pub display: Display,
}

impl Slider {
    pub const fn new(min: i32, max: i32, default: i32) -> Self {
        Self {
            min,
            max,
            default,
            scale: 1,
            unit: "",
            display: Display::Integer,
        }
    }

    pub const fn scale(mut self, scale: i32) -> Self {
        self.scale = scale;
        self
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    pub const fn display(mut self, display: Display) -> Self {
        self.display = display;
        self
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Slider(Slider),
    /// Stored as 0/1; any non-zero value reads as checked.
    Checkbox { default: bool },
    /// Stored as the selected option index.
    Choice {
        options: &'static [&'static str],
        default: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub id: &'static str,
    /// `None` for controls derived from a gate sentinel or an exclusive group.
    pub key: Option<&'static str>,
    pub label: &'static str,
    pub group: &'static str,
    pub control: Control,
}

impl Binding {
    pub const fn slider(
        id: &'static str,
        key: &'static str,
        label: &'static str,
        group: &'static str,
        slider: Slider,
    ) -> Self {
        Self {
            id,
            key: Some(key),
            label,
            group,
            control: Control::Slider(slider),
        }
    }

    pub const fn checkbox(
        id: &'static str,
        key: &'static str,
        label: &'static str,
        group: &'static str,
        default: bool,
    ) -> Self {
        Self {
            id,
            key: Some(key),
            label,
            group,
            control: Control::Checkbox { default },
        }
    }

    /// A checkbox with no key of its own.
    pub const fn toggle(id: &'static str, label: &'static str, group: &'static str) -> Self {
        Self {
            id,
            key: None,
            label,
            group,
            control: Control::Checkbox { default: false },
        }
    }

    pub const fn choice(
        id: &'static str,
        key: &'static str,
        label: &'static str,
        group: &'static str,
        options: &'static [&'static str],
        default: i32,
    ) -> Self {
        Self {
            id,
            key: Some(key),
            label,
            group,
            control: Control::Choice { options, default },
        }
    }

    pub fn default_value(&self) -> i32 {
        match self.control {
            Control::Slider(s) => s.default,
            Control::Checkbox { default } => default as i32,
            Control::Choice { default, .. } => default,
        }
    }

    pub fn clamp(&self, value: i32) -> i32 {
        match self.control {
            Control::Slider(s) => value.clamp(s.min, s.max),
            Control::Checkbox { .. } => (value != 0) as i32,
            Control::Choice { options, .. } => {
                value.clamp(0, (options.len() as i32 - 1).max(0))
            }
        }
    }

    fn scale(&self) -> i32 {
        match self.control {
            Control::Slider(s) => s.scale,
            _ => 1,
        }
    }

    /// Converts a stored value into control units, clamped into range.
    pub fn from_store(&self, raw: i32) -> i32 {
        self.clamp(from_store_units(raw, self.scale()))
    }

    pub fn to_store(&self, value: i32) -> i32 {
        to_store_units(value, self.scale())
    }

    pub fn as_slider(&self) -> Option<&Slider> {
        match &self.control {
            Control::Slider(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.control {
            Control::Slider(_) => "slider",
            Control::Checkbox { .. } => "checkbox",
            Control::Choice { .. } => "choice",
        }
    }

    pub fn unit(&self) -> &'static str {
        self.as_slider().map(|s| s.unit).unwrap_or("")
    }

    pub fn options(&self) -> &'static [&'static str] {
        match self.control {
            Control::Choice { options, .. } => options,
            _ => &[],
        }
    }

    /// Label shown next to the control for `value`.
    pub fn display(&self, value: i32) -> String {
        match self.control {
            Control::Slider(s) => match s.display {
                Display::Integer | Display::Height => value.to_string(),
                Display::Fraction(divisor) => fraction(value, divisor),
            },
            Control::Checkbox { .. } => {
                let text = if value != 0 { "on" } else { "off" };
                text.to_string()
            }
            Control::Choice { options, .. } => options
                .get(value.max(0) as usize)
                .copied()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Secondary display-only label, such as feet and inches for a height.
    pub fn detail(&self, value: i32) -> Option<String> {
        match self.control {
            Control::Slider(Slider {
                display: Display::Height,
                ..
            }) => Some(feet_inches(value)),
            _ => None,
        }
    }

    /// Parses user input in control units. The result is not clamped.
    pub fn parse_value(&self, input: &str) -> FormResult<i32> {
        let text = input.trim();
        let invalid = |reason: String| FormError::InvalidValue {
            id: self.id,
            value: input.to_string(),
            reason,
        };
        match self.control {
            Control::Slider(s) => text.parse::<i32>().map_err(|_| {
                invalid(format!("expected an integer between {} and {}", s.min, s.max))
            }),
            Control::Checkbox { .. } => match text.to_ascii_lowercase().as_str() {
                "1" | "on" | "true" | "yes" => Ok(1),
                "0" | "off" | "false" | "no" => Ok(0),
                _ => Err(invalid("expected on or off".to_string())),
            },
            Control::Choice { options, .. } => {
                if let Ok(index) = text.parse::<i32>() {
                    if (0..options.len() as i32).contains(&index) {
                        return Ok(index);
                    }
                }
                options
                    .iter()
                    .position(|o| o.eq_ignore_ascii_case(text))
                    .map(|i| i as i32)
                    .ok_or_else(|| invalid(format!("expected one of {}", options.join(", "))))
            }
        }
    }
}

/// A checkbox that enables or disables other controls.
///
/// With a sentinel, the toggle has no key: it is checked when the governed
/// key holds a positive value other than the sentinel, and unchecking it
/// writes the sentinel to the governed key instead of deleting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub toggle: &'static str,
    pub governs: &'static [&'static str],
    /// Open while the toggle is unchecked.
    pub inverted: bool,
    pub sentinel: Option<i32>,
}

impl Gate {
    pub const fn new(toggle: &'static str, governs: &'static [&'static str]) -> Self {
        Self {
            toggle,
            governs,
            inverted: false,
            sentinel: None,
        }
    }

    pub const fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    pub const fn sentinel(mut self, value: i32) -> Self {
        self.sentinel = Some(value);
        self
    }

    pub fn is_open(&self, toggle_value: i32) -> bool {
        (toggle_value != 0) != self.inverted
    }

    /// Whether a stored governed value means the override is on.
    pub fn engaged_by(&self, raw: i32) -> bool {
        match self.sentinel {
            Some(sentinel) => raw != sentinel && raw > 0,
            None => true,
        }
    }
}

/// Mutually exclusive checkboxes sharing one encoded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusive {
    pub key: &'static str,
    /// Code written when no member is checked.
    pub none: i32,
    pub members: &'static [(&'static str, i32)],
    /// Extra entries written whenever a member gets checked.
    pub companions: &'static [(&'static str, i32)],
    /// Controls whose stored value only applies while no member is checked.
    pub shadowed: &'static [&'static str],
}

impl Exclusive {
    pub fn code_of(&self, id: &str) -> Option<i32> {
        self.members
            .iter()
            .find(|(member, _)| *member == id)
            .map(|(_, code)| *code)
    }
}

#[derive(Debug)]
pub struct FormTable {
    pub name: &'static str,
    pub title: &'static str,
    pub bindings: &'static [Binding],
    pub gates: &'static [Gate],
    pub exclusives: &'static [Exclusive],
}

impl FormTable {
    pub fn binding(&self, id: &str) -> Option<&'static Binding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    /// Every key this form reads, writes or deletes, without duplicates.
    pub fn owned_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Vec::new();
        let candidates = self
            .bindings
            .iter()
            .filter_map(|b| b.key)
            .chain(self.exclusives.iter().map(|e| e.key))
            .chain(
                self.exclusives
                    .iter()
                    .flat_map(|e| e.companions.iter().map(|(k, _)| *k)),
            );
        for key in candidates {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    pub fn groups(&self) -> Vec<&'static str> {
        let mut groups: Vec<&'static str> = Vec::new();
        for binding in self.bindings {
            if !groups.contains(&binding.group) {
                groups.push(binding.group);
            }
        }
        groups
    }

    /// Keys owned by the controls of one group, including the keys of any
    /// exclusive group one of its controls belongs to.
    pub fn group_keys(&self, group: &str) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Vec::new();
        for binding in self.bindings.iter().filter(|b| b.group == group) {
            let exclusive = self.exclusive_of(binding.id).into_iter().flat_map(|e| {
                std::iter::once(e.key).chain(e.companions.iter().map(|(k, _)| *k))
            });
            for key in binding.key.into_iter().chain(exclusive) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    pub fn sentinel_gate(&self, toggle: &str) -> Option<&'static Gate> {
        self.gates
            .iter()
            .find(|g| g.toggle == toggle && g.sentinel.is_some())
    }

    pub fn exclusive_of(&self, member: &str) -> Option<&'static Exclusive> {
        self.exclusives
            .iter()
            .find(|e| e.members.iter().any(|(id, _)| *id == member))
    }

    /// Checks the table for dangling ids and out-of-range defaults.
    pub fn validate(&self) -> Result<(), String> {
        let known = |id: &str| self.binding(id).is_some();
        for (i, b) in self.bindings.iter().enumerate() {
            if self.bindings[..i].iter().any(|o| o.id == b.id) {
                return Err(format!("duplicate control '{}'", b.id));
            }
            if b.clamp(b.default_value()) != b.default_value() {
                return Err(format!("default of '{}' is out of range", b.id));
            }
            if let Control::Slider(s) = b.control {
                if s.min > s.max || s.scale < 1 {
                    return Err(format!("slider '{}' is malformed", b.id));
                }
            }
        }
        for gate in self.gates {
            if !known(gate.toggle) {
                return Err(format!("gate toggle '{}' is not a control", gate.toggle));
            }
            if let Some(id) = gate.governs.iter().find(|id| !known(id)) {
                return Err(format!("gate governs unknown control '{id}'"));
            }
            if gate.sentinel.is_some() {
                let toggle_has_key = self.binding(gate.toggle).and_then(|b| b.key).is_some();
                let governed_keyless = gate
                    .governs
                    .iter()
                    .any(|id| self.binding(id).and_then(|b| b.key).is_none());
                if toggle_has_key || governed_keyless {
                    return Err(format!(
                        "sentinel gate '{}' needs a keyless toggle and keyed controls",
                        gate.toggle
                    ));
                }
            }
        }
        for group in self.exclusives {
            for (id, _) in group.members {
                match self.binding(id) {
                    Some(b) if b.key.is_none() => {}
                    _ => return Err(format!("exclusive member '{id}' must be a keyless control")),
                }
            }
            if let Some(id) = group.shadowed.iter().find(|id| !known(id)) {
                return Err(format!("exclusive group shadows unknown control '{id}'"));
            }
        }
        for b in self.bindings.iter().filter(|b| b.key.is_none()) {
            let derived = self.sentinel_gate(b.id).is_some() || self.exclusive_of(b.id).is_some();
            if !derived {
                return Err(format!("keyless control '{}' has no source", b.id));
            }
        }
        Ok(())
    }
}
