//! Host OS and CPU resolution.
//!
//! Raw identifiers are accepted in both the Node style the vendor tooling uses
//! (`darwin`, `win32`, `ia32`) and Rust's `std::env::consts` style (`macos`,
//! `windows`, `x86_64`), so [`Host::detect`] can feed consts straight in.

use std::fmt;

use crate::error::ProvisionError;

const OSX_DRIVER: &[&str] = &["Contents", "Home", "bin", "java"];
const WINDOWS_DRIVER: &[&str] = &["bin", "javaw.exe"];
const LINUX_DRIVER: &[&str] = &["bin", "java"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsName {
    Linux,
    Osx,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    I586,
}

/// Everything that differs per OS: vendor name, archive type and where the
/// java executable sits below the unpacked root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub os: OsName,
    pub archive: ArchiveFormat,
    pub driver_path: &'static [&'static str],
}

impl OsName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Osx => "osx",
            Self::Windows => "windows",
        }
    }

    pub fn descriptor(self) -> PlatformDescriptor {
        let (archive, driver_path) = match self {
            Self::Osx => (ArchiveFormat::TarGz, OSX_DRIVER),
            Self::Windows => (ArchiveFormat::Zip, WINDOWS_DRIVER),
            Self::Linux => (ArchiveFormat::TarGz, LINUX_DRIVER),
        };
        PlatformDescriptor {
            os: self,
            archive,
            driver_path,
        }
    }
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::I586 => "i586",
        }
    }
}

impl PlatformDescriptor {
    pub fn is_windows(&self) -> bool {
        self.os == OsName::Windows
    }

    /// Separator used when joining classpath entries.
    pub fn classpath_separator(&self) -> &'static str {
        if self.is_windows() {
            ";"
        } else {
            ":"
        }
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn resolve_platform(raw_os: &str) -> Result<PlatformDescriptor, ProvisionError> {
    let os = match raw_os {
        "darwin" | "macos" => OsName::Osx,
        "win32" | "windows" => OsName::Windows,
        "linux" => OsName::Linux,
        other => return Err(ProvisionError::UnsupportedPlatform(other.to_string())),
    };
    Ok(os.descriptor())
}

pub fn resolve_arch(raw_arch: &str) -> Result<Arch, ProvisionError> {
    match raw_arch {
        "x64" | "x86_64" => Ok(Arch::X64),
        "ia32" | "x86" => Ok(Arch::I586),
        other => Err(ProvisionError::UnsupportedArch(other.to_string())),
    }
}

/// A resolved host: the pair every later stage is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Host {
    pub platform: PlatformDescriptor,
    pub arch: Arch,
}

impl Host {
    /// Resolves the machine this process runs on.
    pub fn detect() -> Result<Self, ProvisionError> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Architecture is checked first, matching the order the vendor tooling
    /// reports failures in.
    pub fn resolve(raw_os: &str, raw_arch: &str) -> Result<Self, ProvisionError> {
        let arch = resolve_arch(raw_arch)?;
        let platform = resolve_platform(raw_os)?;
        Ok(Self { platform, arch })
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform.os, self.arch)
    }
}
