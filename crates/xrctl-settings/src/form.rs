//! The form engine: load, write-through, restore.
//!
//! Loading reads every owned key into a [`Snapshot`] and applies it in one
//! step; nothing is written while loading. Afterwards each [`Form::set`]
//! writes the new value to the store immediately.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use xrctl_store::{Store, StoreResult};

use crate::binding::{Binding, Exclusive, FormTable, Gate};
use crate::error::{FormError, FormResult};
use crate::notify::{Notifier, ERROR_TITLE, STORE_ACCESS_MESSAGE};

/// Raw stored values of every key a form owns, read in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    raw: BTreeMap<&'static str, Option<i32>>,
}

impl Snapshot {
    /// Reads every owned key. A missing namespace reads as all keys absent.
    pub fn read(table: &FormTable, namespace: &str, store: &dyn Store) -> StoreResult<Self> {
        let mut raw = BTreeMap::new();
        for key in table.owned_keys() {
            raw.insert(key, store.get_dword(namespace, key)?);
        }
        Ok(Self { raw })
    }

    pub fn get(&self, key: &str) -> Option<i32> {
        self.raw.get(key).copied().flatten()
    }
}

/// Control values in control units, keyed by control id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<&'static str, i32>,
}

impl FormState {
    pub fn defaults(table: &FormTable) -> Self {
        let values = table
            .bindings
            .iter()
            .map(|b| (b.id, b.default_value()))
            .collect();
        Self { values }
    }

    pub fn from_snapshot(table: &FormTable, snapshot: &Snapshot) -> Self {
        let mut state = Self::defaults(table);

        for binding in table.bindings {
            if let Some(raw) = binding.key.and_then(|key| snapshot.get(key)) {
                state.values.insert(binding.id, binding.from_store(raw));
            }
        }

        for gate in table.gates {
            if gate.sentinel.is_none() {
                continue;
            }
            let governed: Vec<&Binding> = gate
                .governs
                .iter()
                .filter_map(|id| table.binding(id))
                .collect();
            let active = governed.iter().any(|b| {
                b.key
                    .and_then(|key| snapshot.get(key))
                    .is_some_and(|raw| gate.engaged_by(raw))
            });
            state.values.insert(gate.toggle, active as i32);
            if !active {
                for b in governed {
                    state.values.insert(b.id, b.default_value());
                }
            }
        }

        for group in table.exclusives {
            let code = snapshot.get(group.key).unwrap_or(group.none);
            let mut selected = false;
            for (id, member_code) in group.members {
                let on = code == *member_code;
                selected |= on;
                state.values.insert(*id, on as i32);
            }
            if selected {
                for b in group.shadowed.iter().filter_map(|id| table.binding(id)) {
                    state.values.insert(b.id, b.default_value());
                }
            }
        }

        state
    }

    pub fn value(&self, id: &str) -> i32 {
        self.values.get(id).copied().unwrap_or(0)
    }
}

/// Outcome of one user change. When `persisted` is false the store write
/// failed, the user was notified, and the control keeps the new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub id: &'static str,
    pub value: i32,
    pub persisted: bool,
}

/// Everything needed to render one control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlView {
    pub id: &'static str,
    pub label: &'static str,
    pub group: &'static str,
    pub kind: &'static str,
    pub key: Option<&'static str>,
    pub value: i32,
    pub display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub unit: &'static str,
    pub enabled: bool,
    pub options: &'static [&'static str],
}

pub struct Form {
    table: &'static FormTable,
    namespace: String,
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    state: FormState,
    interactive: bool,
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("table", &self.table.name)
            .field("namespace", &self.namespace)
            .field("state", &self.state)
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl Form {
    /// Creates a form showing compiled-in defaults, without touching the store.
    pub fn new(
        table: &'static FormTable,
        namespace: impl Into<String>,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            table,
            namespace: namespace.into(),
            store,
            notifier,
            state: FormState::defaults(table),
            interactive: true,
        }
    }

    /// Creates the form and loads it. A failed load has already been
    /// reported and leaves the defaults in place.
    pub fn open(
        table: &'static FormTable,
        namespace: impl Into<String>,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut form = Self::new(table, namespace, store, notifier);
        let _ = form.load();
        form
    }

    pub fn table(&self) -> &'static FormTable {
        self.table
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Re-reads every owned key from the store.
    pub fn load(&mut self) -> FormResult<()> {
        match Snapshot::read(self.table, &self.namespace, self.store.as_ref()) {
            Ok(snapshot) => {
                self.state = FormState::from_snapshot(self.table, &snapshot);
                debug!("loaded form '{}' from {}", self.table.name, self.namespace);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "failed to load form '{}' from {}: {}",
                    self.table.name, self.namespace, e
                );
                self.state = FormState::defaults(self.table);
                self.notifier.error(ERROR_TITLE, STORE_ACCESS_MESSAGE);
                Err(e.into())
            }
        }
    }

    /// Whether the whole form accepts input. A disabled form still loads.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn lookup(&self, id: &str) -> FormResult<&'static Binding> {
        self.table
            .binding(id)
            .ok_or_else(|| FormError::UnknownControl {
                form: self.table.name,
                id: id.to_string(),
            })
    }

    pub fn value(&self, id: &str) -> FormResult<i32> {
        let binding = self.lookup(id)?;
        Ok(self.state.value(binding.id))
    }

    pub fn is_checked(&self, id: &str) -> FormResult<bool> {
        Ok(self.value(id)? != 0)
    }

    /// A control is enabled when the form is interactive and every gate
    /// governing it is open.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.interactive
            && self
                .table
                .gates
                .iter()
                .filter(|g| g.governs.iter().any(|governed| *governed == id))
                .all(|g| g.is_open(self.state.value(g.toggle)))
    }

    /// Sets a control and writes it through to the store.
    pub fn set(&mut self, id: &str, value: i32) -> FormResult<Change> {
        let binding = self.lookup(id)?;
        if !self.is_enabled(binding.id) {
            return Err(FormError::Disabled(binding.id));
        }
        let value = binding.clamp(value);

        let persisted = if let Some(gate) = self.table.sentinel_gate(binding.id) {
            self.set_override(gate, value)
        } else if let Some(group) = self.table.exclusive_of(binding.id) {
            self.set_exclusive(group, binding, value)
        } else {
            self.state.values.insert(binding.id, value);
            match binding.key {
                Some(key) => self.write_all(&[(key, binding.to_store(value))]),
                None => true,
            }
        };

        Ok(Change {
            id: binding.id,
            value: self.state.value(binding.id),
            persisted,
        })
    }

    /// Parses `input` for the control, then sets it.
    pub fn set_from_str(&mut self, id: &str, input: &str) -> FormResult<Change> {
        let value = self.lookup(id)?.parse_value(input)?;
        self.set(id, value)
    }

    fn set_override(&mut self, gate: &'static Gate, checked: i32) -> bool {
        let sentinel = gate.sentinel.unwrap_or(-1);
        let table = self.table;
        self.state.values.insert(gate.toggle, checked);

        let mut writes = Vec::new();
        for binding in gate.governs.iter().filter_map(|id| table.binding(id)) {
            let Some(key) = binding.key else {
                continue;
            };
            if checked == 0 {
                writes.push((key, sentinel));
                continue;
            }
            let restored = match self.store.get_dword(&self.namespace, key) {
                Ok(Some(raw)) if gate.engaged_by(raw) => {
                    binding.from_store(raw)
                }
                Ok(_) => self.state.value(binding.id),
                Err(e) => {
                    self.report(&e);
                    return false;
                }
            };
            self.state.values.insert(binding.id, restored);
            writes.push((key, binding.to_store(restored)));
        }
        self.write_all(&writes)
    }

    fn set_exclusive(
        &mut self,
        group: &'static Exclusive,
        binding: &'static Binding,
        checked: i32,
    ) -> bool {
        let was_checked = self.state.value(binding.id) != 0;

        if checked == 0 {
            self.state.values.insert(binding.id, 0);
            if !was_checked {
                return true;
            }
            let mut writes = vec![(group.key, group.none)];
            for shadowed in group.shadowed.iter().filter_map(|id| self.table.binding(id)) {
                if let Some(key) = shadowed.key {
                    writes.push((key, shadowed.to_store(self.state.value(shadowed.id))));
                }
            }
            return self.write_all(&writes);
        }

        for (member, _) in group.members {
            self.state.values.insert(*member, 0);
        }
        self.state.values.insert(binding.id, 1);

        let code = group.code_of(binding.id).unwrap_or(group.none);
        let mut writes = vec![(group.key, code)];
        writes.extend(group.companions.iter().copied());
        self.write_all(&writes)
    }

    /// Writes entries in order, stopping at the first failure. The namespace
    /// is created before the first write.
    fn write_all(&self, writes: &[(&'static str, i32)]) -> bool {
        if writes.is_empty() {
            return true;
        }
        if let Err(e) = self.store.ensure_path(&self.namespace) {
            self.report(&e);
            return false;
        }
        for (key, value) in writes {
            if let Err(e) = self.store.set_dword(&self.namespace, key, *value) {
                self.report(&e);
                return false;
            }
            debug!("{}\\{} = {}", self.namespace, key, value);
        }
        true
    }

    fn report(&self, err: &xrctl_store::StoreError) {
        warn!("store access failed for {}: {}", self.namespace, err);
        self.notifier.error(ERROR_TITLE, STORE_ACCESS_MESSAGE);
    }

    fn delete_keys(&self, keys: &[&'static str]) {
        for key in keys {
            if let Err(e) = self.store.delete_value(&self.namespace, key) {
                debug!("ignoring failed delete of {}\\{}: {}", self.namespace, key, e);
            }
        }
    }

    /// Deletes every key this form owns, then reloads so the controls show
    /// what the runtime falls back to.
    pub fn restore_defaults(&mut self) -> FormResult<()> {
        info!("restoring defaults of form '{}'", self.table.name);
        self.delete_keys(&self.table.owned_keys());
        self.load()
    }

    /// Like [`Form::restore_defaults`], limited to the keys of one group.
    pub fn restore_group(&mut self, group: &str) -> FormResult<()> {
        if !self.table.groups().iter().any(|g| *g == group) {
            return Err(FormError::UnknownGroup {
                form: self.table.name,
                group: group.to_string(),
            });
        }
        info!("restoring group '{}' of form '{}'", group, self.table.name);
        self.delete_keys(&self.table.group_keys(group));
        self.load()
    }

    pub fn view(&self, id: &str) -> FormResult<ControlView> {
        let binding = self.lookup(id)?;
        Ok(self.view_of(binding))
    }

    fn view_of(&self, binding: &'static Binding) -> ControlView {
        let value = self.state.value(binding.id);
        ControlView {
            id: binding.id,
            label: binding.label,
            group: binding.group,
            kind: binding.kind(),
            key: binding.key,
            value,
            display: binding.display(value),
            detail: binding.detail(value),
            unit: binding.unit(),
            enabled: self.is_enabled(binding.id),
            options: binding.options(),
        }
    }

    /// Every control in table order.
    pub fn controls(&self) -> Vec<ControlView> {
        self.table
            .bindings
            .iter()
            .map(|b| self.view_of(b))
            .collect()
    }
}
