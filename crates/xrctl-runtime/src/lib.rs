//! Status and version of the installed runtime.
//!
//! The runtime exports two functions from its shared library for its
//! companion app. [`RuntimeStatusProvider`] hides those calls so callers
//! never touch the library directly.

#![deny(unsafe_code)]

#[cfg(target_os = "windows")]
mod library;

#[cfg(target_os = "windows")]
pub use library::RuntimeLibrary;

use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

pub const RUNTIME_LIBRARY: &str = "pimax-openxr.dll";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime unavailable: {0}")]
    Unavailable(String),
    #[error("runtime library error: {0}")]
    Library(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Headset state as reported by the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RuntimeStatus {
    pub valid: bool,
    pub refresh_rate: f32,
    pub resolution_width: u32,
    pub resolution_height: u32,
    pub fov_level: u8,
    pub fov: f32,
    pub floor_height: f32,
    pub use_parallel_projection: bool,
    pub use_smart_smoothing: bool,
    pub use_lighthouse_tracking: bool,
    pub fps: f32,
}

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return write!(f, "headset not detected");
        }
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        writeln!(
            f,
            "Resolution:          {}x{} per eye",
            self.resolution_width, self.resolution_height
        )?;
        writeln!(f, "Refresh rate:        {:.0} Hz", self.refresh_rate)?;
        writeln!(f, "Field of view:       {:.1} deg (level {})", self.fov, self.fov_level)?;
        writeln!(f, "Floor height:        {:.2} m", self.floor_height)?;
        writeln!(f, "Parallel projection: {}", yes_no(self.use_parallel_projection))?;
        writeln!(f, "Smart smoothing:     {}", yes_no(self.use_smart_smoothing))?;
        writeln!(f, "Lighthouse tracking: {}", yes_no(self.use_lighthouse_tracking))?;
        write!(f, "Frame rate:          {:.1} fps", self.fps)
    }
}

pub trait RuntimeStatusProvider {
    fn version(&self) -> RuntimeResult<String>;
    fn status(&self) -> RuntimeResult<RuntimeStatus>;
}

/// Stands in where the runtime library cannot be loaded.
#[derive(Debug, Clone)]
pub struct UnavailableRuntime {
    reason: String,
}

impl UnavailableRuntime {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl RuntimeStatusProvider for UnavailableRuntime {
    fn version(&self) -> RuntimeResult<String> {
        Err(RuntimeError::Unavailable(self.reason.clone()))
    }

    fn status(&self) -> RuntimeResult<RuntimeStatus> {
        Err(RuntimeError::Unavailable(self.reason.clone()))
    }
}

/// Loads the runtime library from `install_dir`, falling back to
/// [`UnavailableRuntime`] when that is not possible.
pub fn open_default(install_dir: &Path) -> Box<dyn RuntimeStatusProvider> {
    #[cfg(target_os = "windows")]
    {
        match RuntimeLibrary::open(install_dir.join(RUNTIME_LIBRARY)) {
            Ok(library) => Box::new(library),
            Err(e) => {
                tracing::warn!("{}", e);
                Box::new(UnavailableRuntime::new(e.to_string()))
            }
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        let _ = install_dir;
        Box::new(UnavailableRuntime::new(format!(
            "{} is only available on Windows",
            RUNTIME_LIBRARY
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RuntimeStatus {
        RuntimeStatus {
            valid: true,
            refresh_rate: 90.0,
            resolution_width: 3200,
            resolution_height: 2880,
            fov_level: 1,
            fov: 120.5,
            floor_height: 1.7,
            use_parallel_projection: true,
            use_smart_smoothing: false,
            use_lighthouse_tracking: false,
            fps: 89.96,
        }
    }

    #[test]
    fn test_unavailable_runtime() {
        let runtime = UnavailableRuntime::new("not installed");
        assert!(matches!(runtime.version(), Err(RuntimeError::Unavailable(_))));
        let err = runtime.status().unwrap_err();
        assert_eq!(err.to_string(), "runtime unavailable: not installed");
    }

    #[test]
    fn test_status_display() {
        let text = sample().to_string();
        assert!(text.contains("3200x2880 per eye"));
        assert!(text.contains("90 Hz"));
        assert!(text.contains("Parallel projection: yes"));
        assert!(text.ends_with("90.0 fps"));

        assert_eq!(RuntimeStatus::default().to_string(), "headset not detected");
    }

    #[test]
    fn test_status_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["resolution_width"], 3200);
        assert_eq!(json["use_smart_smoothing"], false);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_open_default_off_windows() {
        let runtime = open_default(Path::new("."));
        assert!(matches!(runtime.status(), Err(RuntimeError::Unavailable(_))));
    }
}
