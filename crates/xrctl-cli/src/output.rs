//! Rendering of forms and runtime information for the terminal.

use serde::Serialize;
use xrctl_settings::{ControlView, Form, Notifier};

/// Prints notifications to stderr; the terminal stands in for a message box.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn error(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}

#[derive(Debug, Serialize)]
pub struct FormReport {
    pub form: &'static str,
    pub title: &'static str,
    pub namespace: String,
    pub interactive: bool,
    pub controls: Vec<ControlView>,
}

impl FormReport {
    pub fn new(form: &Form) -> Self {
        Self {
            form: form.table().name,
            title: form.table().title,
            namespace: form.namespace().to_string(),
            interactive: form.is_interactive(),
            controls: form.controls(),
        }
    }
}

fn value_text(control: &ControlView) -> String {
    let mut text = control.display.clone();
    if !control.unit.is_empty() {
        text.push(' ');
        text.push_str(control.unit);
    }
    if let Some(detail) = &control.detail {
        text.push_str(&format!(" ({detail})"));
    }
    text
}

pub fn render_form(report: &FormReport) -> String {
    let mut out = format!("{} [{}]\n", report.title, report.namespace);
    if !report.interactive {
        out.push_str("(read-only)\n");
    }
    let width = report
        .controls
        .iter()
        .map(|c| c.id.len())
        .max()
        .unwrap_or(0);
    let mut group = "";
    for control in &report.controls {
        if control.group != group {
            group = control.group;
            out.push_str(&format!("\n{group}:\n"));
        }
        let state = if control.enabled { "" } else { "  (disabled)" };
        out.push_str(&format!(
            "  {:width$}  {}{}\n",
            control.id,
            value_text(control),
            state,
            width = width
        ));
    }
    out
}

pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
