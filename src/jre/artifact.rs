use std::path::PathBuf;

use crate::config::InstallConfig;
use crate::platform::{Arch, Host, PlatformDescriptor};

/// Where to fetch the runtime from and where to unpack it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub url: String,
    pub local_dir: PathBuf,
}

impl InstallTarget {
    pub fn new(config: &InstallConfig, host: &Host) -> Self {
        Self {
            url: build_url(&config.base_url, &host.platform, host.arch, &config.version),
            local_dir: config.install_dir.clone(),
        }
    }
}

pub fn archive_name(platform: &PlatformDescriptor, arch: Arch, version: &str) -> String {
    format!(
        "openjdk-{version}_{}-{}_bin.{}",
        platform.os,
        arch,
        platform.archive.extension()
    )
}

pub fn build_url(base_url: &str, platform: &PlatformDescriptor, arch: Arch, version: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        archive_name(platform, arch, version)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;
    use crate::platform::resolve_platform;

    #[test]
    fn linux_x64_url() {
        let linux = resolve_platform("linux").unwrap();
        assert_eq!(
            build_url(DEFAULT_BASE_URL, &linux, Arch::X64, "11.0.2"),
            "https://download.java.net/java/GA/jdk11/9/GPL/openjdk-11.0.2_linux-x64_bin.tar.gz"
        );
    }

    #[test]
    fn windows_i586_url_uses_zip() {
        let windows = resolve_platform("win32").unwrap();
        assert_eq!(
            build_url(DEFAULT_BASE_URL, &windows, Arch::I586, "11.0.2"),
            "https://download.java.net/java/GA/jdk11/9/GPL/openjdk-11.0.2_windows-i586_bin.zip"
        );
    }

    #[test]
    fn url_is_deterministic() {
        let osx = resolve_platform("darwin").unwrap();
        let a = build_url(DEFAULT_BASE_URL, &osx, Arch::X64, "11.0.2");
        let b = build_url(DEFAULT_BASE_URL, &osx, Arch::X64, "11.0.2");
        assert_eq!(a, b);
        assert!(a.ends_with("openjdk-11.0.2_osx-x64_bin.tar.gz"));
    }

    #[test]
    fn every_input_changes_the_url() {
        let linux = resolve_platform("linux").unwrap();
        let osx = resolve_platform("darwin").unwrap();
        let base = build_url(DEFAULT_BASE_URL, &linux, Arch::X64, "11.0.2");
        assert_ne!(base, build_url(DEFAULT_BASE_URL, &osx, Arch::X64, "11.0.2"));
        assert_ne!(base, build_url(DEFAULT_BASE_URL, &linux, Arch::I586, "11.0.2"));
        assert_ne!(base, build_url(DEFAULT_BASE_URL, &linux, Arch::X64, "11.0.1"));
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let linux = resolve_platform("linux").unwrap();
        assert_eq!(
            build_url("http://127.0.0.1:8080/", &linux, Arch::X64, "11.0.2"),
            "http://127.0.0.1:8080/openjdk-11.0.2_linux-x64_bin.tar.gz"
        );
    }

    #[test]
    fn target_uses_config_dir() {
        let config = InstallConfig::new("/srv/jre");
        let host = Host::resolve("linux", "x64").unwrap();
        let target = InstallTarget::new(&config, &host);
        assert_eq!(target.local_dir, PathBuf::from("/srv/jre"));
        assert!(target.url.ends_with("_linux-x64_bin.tar.gz"));
    }
}
