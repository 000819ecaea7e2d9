//! Host environment detection
//!
//! Backend selection depends on where we run: WSL rarely has a working
//! Speech Dispatcher, so the espeak-ng backend is tried first there.

use std::fs;

/// Kind of host we are running on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// Linux under Windows Subsystem for Linux
    Wsl,
    /// Native Linux
    Linux,
    /// macOS, Windows, BSDs, ...
    Other,
}

/// Detect the current host
pub fn host_kind() -> HostKind {
    if std::env::consts::OS != "linux" {
        return HostKind::Other;
    }
    if is_wsl() {
        HostKind::Wsl
    } else {
        HostKind::Linux
    }
}

/// Detect if running in WSL
///
/// Checks /proc/version for a Microsoft kernel, then the WSL environment variable.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        if looks_like_wsl_kernel(&contents) {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

fn looks_like_wsl_kernel(version: &str) -> bool {
    let lower = version.to_lowercase();
    lower.contains("microsoft") || lower.contains("wsl")
}
