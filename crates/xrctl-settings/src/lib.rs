//! Settings binding layer for OpenXR runtime configuration.
//!
//! Each form is a static [`FormTable`] of bindings between controls and
//! entries of the machine-wide store. A [`Form`] loads those entries, writes
//! every change through immediately, and restores defaults by deleting the
//! entries it owns.

#![forbid(unsafe_code)]

pub mod binding;
pub mod error;
pub mod form;
pub mod forms;
pub mod notify;
pub mod runtime_select;

use std::str::FromStr;
use std::sync::Arc;

use xrctl_store::Store;

pub use binding::{Binding, Control, Display, Exclusive, FormTable, Gate, Slider};
pub use error::{FormError, FormResult};
pub use form::{Change, ControlView, Form, FormState, Snapshot};
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier};
pub use runtime_select::{ActiveRuntime, RuntimeChoice, RuntimeSelector};

/// Store namespaces read by the runtimes.
pub mod namespace {
    pub const VDXR_BUNDLED: &str = "SOFTWARE\\Virtual Desktop, Inc.\\OpenXR";
    pub const VDXR_STANDALONE: &str = "SOFTWARE\\VirtualDesktop-OpenXR";
    pub const PIMAX: &str = "SOFTWARE\\PimaxXR";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    VirtualDesktop,
    Pimax,
}

/// How VDXR was installed. Only the Virtual Desktop forms depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deployment {
    #[default]
    Bundled,
    Standalone,
}

impl Product {
    pub fn namespace(self, deployment: Deployment) -> &'static str {
        match (self, deployment) {
            (Product::VirtualDesktop, Deployment::Bundled) => namespace::VDXR_BUNDLED,
            (Product::VirtualDesktop, Deployment::Standalone) => namespace::VDXR_STANDALONE,
            (Product::Pimax, _) => namespace::PIMAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Advanced,
    Offsets,
    Companion,
    Experimental,
}

impl FormKind {
    pub const ALL: [FormKind; 4] = [
        FormKind::Advanced,
        FormKind::Offsets,
        FormKind::Companion,
        FormKind::Experimental,
    ];

    pub fn table(self) -> &'static FormTable {
        match self {
            FormKind::Advanced => &forms::advanced::TABLE,
            FormKind::Offsets => &forms::offsets::TABLE,
            FormKind::Companion => &forms::companion::TABLE,
            FormKind::Experimental => &forms::experimental::TABLE,
        }
    }

    pub fn product(self) -> Product {
        match self {
            FormKind::Advanced | FormKind::Offsets => Product::VirtualDesktop,
            FormKind::Companion | FormKind::Experimental => Product::Pimax,
        }
    }

    pub fn name(self) -> &'static str {
        self.table().name
    }
}

impl FromStr for FormKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormError::UnknownForm(s.to_string()))
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Opens and loads a form in the namespace of its product.
pub fn open_form(
    kind: FormKind,
    deployment: Deployment,
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
) -> Form {
    let namespace = kind.product().namespace(deployment);
    Form::open(kind.table(), namespace, store, notifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_is_valid() {
        for kind in FormKind::ALL {
            kind.table()
                .validate()
                .unwrap_or_else(|e| panic!("{kind}: {e}"));
        }
    }

    #[test]
    fn test_form_kind_from_str() {
        assert_eq!("Advanced".parse::<FormKind>().unwrap(), FormKind::Advanced);
        assert_eq!(
            " experimental ".parse::<FormKind>().unwrap(),
            FormKind::Experimental
        );
        assert!(matches!(
            "bogus".parse::<FormKind>(),
            Err(FormError::UnknownForm(_))
        ));
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(
            FormKind::Offsets.product().namespace(Deployment::Standalone),
            "SOFTWARE\\VirtualDesktop-OpenXR"
        );
        assert_eq!(
            FormKind::Advanced.product().namespace(Deployment::Bundled),
            "SOFTWARE\\Virtual Desktop, Inc.\\OpenXR"
        );
        assert_eq!(
            FormKind::Companion.product().namespace(Deployment::Standalone),
            "SOFTWARE\\PimaxXR"
        );
    }
}
