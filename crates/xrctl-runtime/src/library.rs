#![allow(unsafe_code)]

use std::ffi::{c_char, CStr};
use std::path::PathBuf;

use libloading::Library;
use tracing::debug;

use crate::{RuntimeError, RuntimeResult, RuntimeStatus, RuntimeStatusProvider};

/// Layout of the status struct filled by the runtime.
#[repr(C)]
#[derive(Default)]
struct RawStatus {
    valid: bool,
    refresh_rate: f32,
    resolution_width: u32,
    resolution_height: u32,
    fov_level: u8,
    fov: f32,
    floor_height: f32,
    use_parallel_projection: bool,
    use_smart_smoothing: bool,
    use_lighthouse_tracking: bool,
    fps: f32,
}

impl From<RawStatus> for RuntimeStatus {
    fn from(raw: RawStatus) -> Self {
        Self {
            valid: raw.valid,
            refresh_rate: raw.refresh_rate,
            resolution_width: raw.resolution_width,
            resolution_height: raw.resolution_height,
            fov_level: raw.fov_level,
            fov: raw.fov,
            floor_height: raw.floor_height,
            use_parallel_projection: raw.use_parallel_projection,
            use_smart_smoothing: raw.use_smart_smoothing,
            use_lighthouse_tracking: raw.use_lighthouse_tracking,
            fps: raw.fps,
        }
    }
}

type GetVersionStringFn = unsafe extern "system" fn() -> *const c_char;
type GetRuntimeStatusFn = unsafe extern "system" fn(*mut RawStatus);

/// The runtime's shared library, loaded once and kept open.
pub struct RuntimeLibrary {
    path: PathBuf,
    library: Library,
}

impl RuntimeLibrary {
    pub fn open(path: impl Into<PathBuf>) -> RuntimeResult<Self> {
        let path = path.into();
        let library = unsafe { Library::new(&path) }.map_err(|e| {
            RuntimeError::Unavailable(format!("failed to load {}: {}", path.display(), e))
        })?;
        debug!("loaded {}", path.display());
        Ok(Self { path, library })
    }

    fn symbol<T>(&self, name: &[u8]) -> RuntimeResult<libloading::Symbol<'_, T>> {
        unsafe { self.library.get::<T>(name) }.map_err(|e| {
            RuntimeError::Library(format!("{}: {}", self.path.display(), e))
        })
    }
}

impl RuntimeStatusProvider for RuntimeLibrary {
    fn version(&self) -> RuntimeResult<String> {
        let get_version = self.symbol::<GetVersionStringFn>(b"getVersionString\0")?;
        let ptr = unsafe { get_version() };
        if ptr.is_null() {
            return Err(RuntimeError::Library("failed to query version".to_string()));
        }
        Ok(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }

    fn status(&self) -> RuntimeResult<RuntimeStatus> {
        let get_status = self.symbol::<GetRuntimeStatusFn>(b"getRuntimeStatus\0")?;
        let mut raw = RawStatus::default();
        unsafe { get_status(&mut raw) };
        Ok(raw.into())
    }
}
