//! Host description printed at start-up. Informational only.

use std::fmt;

use sysinfo::System;

/// Operating system and architecture of the running host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Operating system name, e.g. "Windows", "Darwin" or "Debian GNU/Linux".
    pub os: String,
    /// Release number, when the host exposes one.
    pub os_version: Option<String>,
    /// Long, human-readable form such as "Windows 11 Pro" or "Linux 12 Debian GNU/Linux 12".
    pub long_name: Option<String>,
    pub arch: &'static str,
}

impl HostInfo {
    pub fn detect() -> Self {
        Self {
            os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_version: System::os_version(),
            long_name: System::long_os_version(),
            arch: std::env::consts::ARCH,
        }
    }
}

impl fmt::Display for HostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.long_name, &self.os_version) {
            (Some(long_name), _) => write!(f, "{} ({})", long_name, self.arch),
            (None, Some(version)) => write!(f, "{} {} ({})", self.os, version, self.arch),
            (None, None) => write!(f, "{} ({})", self.os, self.arch),
        }
    }
}
