//! Selection of the system-wide OpenXR runtime.
//!
//! The OpenXR loader reads the manifest path from the `ActiveRuntime`
//! string entry, separately for 64-bit and 32-bit applications.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use xrctl_store::{Store, StoreResult};

use crate::error::{FormError, FormResult};
use crate::notify::{Notifier, ERROR_TITLE, STORE_ACCESS_MESSAGE};

pub const KHRONOS_KEY: &str = "SOFTWARE\\Khronos\\OpenXR\\1";
pub const KHRONOS_KEY_32: &str = "SOFTWARE\\WOW6432Node\\Khronos\\OpenXR\\1";
pub const ACTIVE_RUNTIME: &str = "ActiveRuntime";

pub const STEAM_KEY: &str = "SOFTWARE\\WOW6432Node\\Valve\\Steam";
pub const STEAM_INSTALL_PATH: &str = "InstallPath";
pub const STEAMVR_MANIFEST: &str = "steamapps\\common\\SteamVR\\steamxr_win64.json";

pub const PIMAX_MANIFEST: &str = "pimax-openxr.json";
pub const PIMAX_MANIFEST_32: &str = "pimax-openxr-32.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "runtime", content = "manifest", rename_all = "lowercase")]
pub enum ActiveRuntime {
    PimaxXr,
    SteamVr,
    /// A manifest this tool does not recognize.
    Other(String),
    None,
}

impl ActiveRuntime {
    /// Compares `manifest` with the exact manifest paths of the runtimes
    /// this tool can select.
    pub fn classify(manifest: Option<&str>, pimax: &str, steamvr: Option<&str>) -> Self {
        let Some(manifest) = manifest.map(str::trim).filter(|m| !m.is_empty()) else {
            return Self::None;
        };
        if manifest.eq_ignore_ascii_case(pimax) {
            Self::PimaxXr
        } else if steamvr.is_some_and(|steamvr| manifest.eq_ignore_ascii_case(steamvr)) {
            Self::SteamVr
        } else {
            Self::Other(manifest.to_string())
        }
    }
}

impl std::fmt::Display for ActiveRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PimaxXr => write!(f, "PimaxXR"),
            Self::SteamVr => write!(f, "SteamVR"),
            Self::Other(path) => write!(f, "unknown ({path})"),
            Self::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeChoice {
    PimaxXr,
    SteamVr,
}

/// Joins Windows path segments regardless of the host platform.
fn join(dir: &str, file: &str) -> String {
    format!("{}\\{}", dir.trim_end_matches(['\\', '/']), file)
}

pub struct RuntimeSelector {
    store: Arc<dyn Store>,
    install_dir: String,
    exists: fn(&Path) -> bool,
}

impl RuntimeSelector {
    /// `install_dir` holds the PimaxXR manifests.
    pub fn new(store: Arc<dyn Store>, install_dir: impl Into<String>) -> Self {
        Self {
            store,
            install_dir: install_dir.into(),
            exists: |path| path.is_file(),
        }
    }

    /// Replaces the file existence check used to locate SteamVR.
    pub fn with_exists(mut self, exists: fn(&Path) -> bool) -> Self {
        self.exists = exists;
        self
    }

    pub fn pimax_manifests(&self) -> (String, String) {
        (
            join(&self.install_dir, PIMAX_MANIFEST),
            join(&self.install_dir, PIMAX_MANIFEST_32),
        )
    }

    /// The SteamVR manifest, if Steam is installed and the file exists.
    pub fn locate_steamvr(&self) -> StoreResult<Option<String>> {
        let Some(steam) = self.store.get_string(STEAM_KEY, STEAM_INSTALL_PATH)? else {
            return Ok(None);
        };
        let manifest = join(&steam, STEAMVR_MANIFEST);
        if (self.exists)(Path::new(&manifest)) {
            Ok(Some(manifest))
        } else {
            Ok(None)
        }
    }

    pub fn active(&self) -> StoreResult<ActiveRuntime> {
        let manifest = self.store.get_string(KHRONOS_KEY, ACTIVE_RUNTIME)?;
        let steamvr = self.locate_steamvr()?;
        Ok(ActiveRuntime::classify(
            manifest.as_deref(),
            &self.pimax_manifests().0,
            steamvr.as_deref(),
        ))
    }

    pub fn select(&self, choice: RuntimeChoice) -> FormResult<()> {
        match choice {
            RuntimeChoice::PimaxXr => {
                let (manifest, manifest_32) = self.pimax_manifests();
                self.store.ensure_path(KHRONOS_KEY)?;
                self.store.set_string(KHRONOS_KEY, ACTIVE_RUNTIME, &manifest)?;
                self.store.ensure_path(KHRONOS_KEY_32)?;
                self.store
                    .set_string(KHRONOS_KEY_32, ACTIVE_RUNTIME, &manifest_32)?;
                info!("selected PimaxXR as the active OpenXR runtime");
            }
            RuntimeChoice::SteamVr => {
                let manifest = self
                    .locate_steamvr()?
                    .ok_or(FormError::RuntimeNotFound("SteamVR"))?;
                self.store.ensure_path(KHRONOS_KEY)?;
                self.store.set_string(KHRONOS_KEY, ACTIVE_RUNTIME, &manifest)?;
                // SteamVR ships no 32-bit runtime.
                self.store.delete_value(KHRONOS_KEY_32, ACTIVE_RUNTIME)?;
                info!("selected SteamVR as the active OpenXR runtime");
            }
        }
        Ok(())
    }

    /// Whether the PimaxXR forms should accept input. Failures, missing
    /// and unrecognized runtimes are reported through `notifier`.
    pub fn pimax_is_active(&self, notifier: &dyn Notifier) -> bool {
        match self.active() {
            Ok(ActiveRuntime::PimaxXr) => true,
            Ok(ActiveRuntime::SteamVr) => false,
            Ok(other) => {
                let path = match &other {
                    ActiveRuntime::Other(path) => path.as_str(),
                    _ => "",
                };
                warn!("unidentified OpenXR runtime: '{}'", path);
                notifier.error(
                    ERROR_TITLE,
                    &format!("Unable to identify the active OpenXR runtime: {path}"),
                );
                false
            }
            Err(e) => {
                warn!("failed to read the active OpenXR runtime: {}", e);
                notifier.error(ERROR_TITLE, STORE_ACCESS_MESSAGE);
                false
            }
        }
    }
}
