//! Windows registry backend rooted at `HKEY_LOCAL_MACHINE`.
//!
//! Writing under `HKLM\SOFTWARE` requires an elevated process; failures
//! surface as [`StoreError::AccessDenied`].

use std::ffi::c_void;

use tracing::trace;
use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, ERROR_UNSUPPORTED_TYPE,
    WIN32_ERROR,
};
use windows::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyW, RegDeleteKeyValueW, RegGetValueW, RegSetKeyValueW, HKEY,
    HKEY_LOCAL_MACHINE, REG_DWORD, REG_SZ, RRF_RT_REG_DWORD, RRF_RT_REG_SZ,
};

use crate::{Store, StoreError, StoreResult, ValueKind};

#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryStore;

impl RegistryStore {
    pub fn local_machine() -> Self {
        Self
    }
}

fn check(status: WIN32_ERROR, path: &str, name: &str) -> StoreResult<()> {
    if status == ERROR_SUCCESS {
        Ok(())
    } else if status == ERROR_ACCESS_DENIED {
        Err(StoreError::AccessDenied {
            path: path.to_string(),
        })
    } else {
        Err(StoreError::Os {
            path: path.to_string(),
            name: name.to_string(),
            code: status.0,
        })
    }
}

fn mismatch(name: &str, expected: ValueKind) -> StoreError {
    StoreError::TypeMismatch {
        name: name.to_string(),
        expected,
    }
}

impl Store for RegistryStore {
    fn ensure_path(&self, path: &str) -> StoreResult<()> {
        let wide_path = HSTRING::from(path);
        let mut key = HKEY::default();
        let status =
            unsafe { RegCreateKeyW(HKEY_LOCAL_MACHINE, PCWSTR(wide_path.as_ptr()), &mut key) };
        check(status, path, "")?;
        unsafe {
            let _ = RegCloseKey(key);
        }
        Ok(())
    }

    fn get_dword(&self, path: &str, name: &str) -> StoreResult<Option<i32>> {
        let wide_path = HSTRING::from(path);
        let wide_name = HSTRING::from(name);
        let mut data: u32 = 0;
        let mut size = std::mem::size_of::<u32>() as u32;
        let status = unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide_path.as_ptr()),
                PCWSTR(wide_name.as_ptr()),
                RRF_RT_REG_DWORD,
                None,
                Some(&mut data as *mut u32 as *mut c_void),
                Some(&mut size as *mut u32),
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status == ERROR_UNSUPPORTED_TYPE {
            return Err(mismatch(name, ValueKind::Dword));
        }
        check(status, path, name)?;
        trace!("read {}\\{} = {}", path, name, data as i32);
        Ok(Some(data as i32))
    }

    fn get_string(&self, path: &str, name: &str) -> StoreResult<Option<String>> {
        let wide_path = HSTRING::from(path);
        let wide_name = HSTRING::from(name);

        let mut size: u32 = 0;
        let status = unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide_path.as_ptr()),
                PCWSTR(wide_name.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut size as *mut u32),
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status == ERROR_UNSUPPORTED_TYPE {
            return Err(mismatch(name, ValueKind::String));
        }
        check(status, path, name)?;

        let mut buffer = vec![0u16; (size as usize).div_ceil(2) + 1];
        let mut size = (buffer.len() * 2) as u32;
        let status = unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide_path.as_ptr()),
                PCWSTR(wide_name.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr() as *mut c_void),
                Some(&mut size as *mut u32),
            )
        };
        check(status, path, name)?;

        let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
        Ok(Some(String::from_utf16_lossy(&buffer[..len])))
    }

    fn set_dword(&self, path: &str, name: &str, value: i32) -> StoreResult<()> {
        let wide_path = HSTRING::from(path);
        let wide_name = HSTRING::from(name);
        let data = (value as u32).to_le_bytes();
        let status = unsafe {
            RegSetKeyValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide_path.as_ptr()),
                PCWSTR(wide_name.as_ptr()),
                REG_DWORD.0,
                Some(data.as_ptr() as *const c_void),
                data.len() as u32,
            )
        };
        check(status, path, name)?;
        trace!("wrote {}\\{} = {}", path, name, value);
        Ok(())
    }

    fn set_string(&self, path: &str, name: &str, value: &str) -> StoreResult<()> {
        let wide_path = HSTRING::from(path);
        let wide_name = HSTRING::from(name);
        let data: Vec<u16> = value.encode_utf16().chain(std::iter::once(0)).collect();
        let status = unsafe {
            RegSetKeyValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide_path.as_ptr()),
                PCWSTR(wide_name.as_ptr()),
                REG_SZ.0,
                Some(data.as_ptr() as *const c_void),
                (data.len() * 2) as u32,
            )
        };
        check(status, path, name)?;
        trace!("wrote {}\\{} = {:?}", path, name, value);
        Ok(())
    }

    fn delete_value(&self, path: &str, name: &str) -> StoreResult<()> {
        let wide_path = HSTRING::from(path);
        let wide_name = HSTRING::from(name);
        let status = unsafe {
            RegDeleteKeyValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide_path.as_ptr()),
                PCWSTR(wide_name.as_ptr()),
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(());
        }
        check(status, path, name)
    }
}
