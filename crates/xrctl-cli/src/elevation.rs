//! Re-launching with administrator rights.
//!
//! Writes to `HKEY_LOCAL_MACHINE` need an elevated process. When the user
//! did not start one, the binary starts itself again through the `runas`
//! verb, waits for that copy and exits with its code.

#![allow(unsafe_code)]

/// Quotes one argument for a Windows command line: embedded quotes are
/// doubled and arguments containing spaces are wrapped in quotes.
pub fn quote_arg(arg: &str) -> String {
    let escaped = arg.replace('"', "\"\"");
    if escaped.is_empty() || escaped.contains([' ', '\t']) {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

pub fn join_args<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|a| quote_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(target_os = "windows")]
pub fn is_elevated() -> bool {
    unsafe { windows::Win32::UI::Shell::IsUserAnAdmin() }.as_bool()
}

#[cfg(not(target_os = "windows"))]
pub fn is_elevated() -> bool {
    true
}

pub const ADMIN_REQUIRED: &str = "This application must be run as Administrator.";

/// Outcome of an elevated re-launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relaunch {
    /// The elevated copy ran and exited with this code.
    Exited(u32),
    /// The user refused the elevation prompt.
    Declined,
}

impl Relaunch {
    /// Process exit code for the non-elevated parent.
    pub fn exit_code(self) -> anyhow::Result<i32> {
        match self {
            Relaunch::Exited(code) => Ok(code as i32),
            Relaunch::Declined => anyhow::bail!(ADMIN_REQUIRED),
        }
    }
}

/// Starts this executable again, elevated, with `args`, and waits for it.
#[cfg(target_os = "windows")]
pub fn relaunch_elevated(args: &[String]) -> anyhow::Result<Relaunch> {
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::Foundation::{CloseHandle, ERROR_CANCELLED};
    use windows::Win32::System::Threading::{GetExitCodeProcess, WaitForSingleObject, INFINITE};
    use windows::Win32::UI::Shell::{ShellExecuteExW, SEE_MASK_NOCLOSEPROCESS, SHELLEXECUTEINFOW};
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    let exe = std::env::current_exe()?;
    let file = HSTRING::from(exe.as_os_str());
    let parameters = HSTRING::from(join_args(args));
    let verb = HSTRING::from("runas");

    let mut info = SHELLEXECUTEINFOW {
        cbSize: std::mem::size_of::<SHELLEXECUTEINFOW>() as u32,
        fMask: SEE_MASK_NOCLOSEPROCESS,
        lpVerb: PCWSTR(verb.as_ptr()),
        lpFile: PCWSTR(file.as_ptr()),
        lpParameters: PCWSTR(parameters.as_ptr()),
        nShow: SW_SHOWNORMAL.0,
        ..Default::default()
    };

    tracing::info!("re-launching elevated: {} {}", exe.display(), parameters);
    if let Err(e) = unsafe { ShellExecuteExW(&mut info) } {
        if e.code() == ERROR_CANCELLED.to_hresult() {
            return Ok(Relaunch::Declined);
        }
        anyhow::bail!("failed to re-launch elevated: {}", e);
    }
    if info.hProcess.is_invalid() {
        anyhow::bail!("elevated process handle is missing");
    }

    let mut code = 0u32;
    let status = unsafe {
        WaitForSingleObject(info.hProcess, INFINITE);
        GetExitCodeProcess(info.hProcess, &mut code)
    };
    unsafe {
        let _ = CloseHandle(info.hProcess);
    }
    status?;
    tracing::debug!("elevated process exited with {}", code);
    Ok(Relaunch::Exited(code))
}

#[cfg(not(target_os = "windows"))]
pub fn relaunch_elevated(_args: &[String]) -> anyhow::Result<Relaunch> {
    anyhow::bail!("elevation is only supported on Windows")
}
