use std::path::PathBuf;
use std::time::Duration;

use crate::error::ProvisionError;

/// Runtime release fetched by default.
pub const JRE_VERSION: &str = "11.0.2";

/// Download host plus the fixed release path for [`JRE_VERSION`].
pub const DEFAULT_BASE_URL: &str = "https://download.java.net/java/GA/jdk11/9/GPL";

/// Name of the directory the runtime is unpacked into.
pub const JRE_DIR_NAME: &str = "jre";

/// Settings for one install. Passed explicitly to every pipeline stage.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub install_dir: PathBuf,
    pub version: String,
    pub base_url: String,
    /// Skips TLS certificate validation for the download. On by default, as
    /// in the installer this tool replaces.
    pub accept_invalid_certs: bool,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub install_timeout: Option<Duration>,
    pub smoketest_timeout: Duration,
    pub show_progress: bool,
}

impl InstallConfig {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            version: JRE_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            accept_invalid_certs: true,
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            install_timeout: None,
            smoketest_timeout: Duration::from_secs(30),
            show_progress: true,
        }
    }

    pub fn default_install_dir() -> Result<PathBuf, ProvisionError> {
        let home = dirs::home_dir().ok_or_else(|| {
            ProvisionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine home directory",
            ))
        })?;
        Ok(home.join(".jre-provision").join(JRE_DIR_NAME))
    }

    pub fn with_defaults() -> Result<Self, ProvisionError> {
        Ok(Self::new(Self::default_install_dir()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_fixed_release() {
        let config = InstallConfig::new("/tmp/jre");
        assert_eq!(config.version, "11.0.2");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.install_dir, PathBuf::from("/tmp/jre"));
        assert!(config.install_timeout.is_none());
    }

    #[test]
    fn default_install_dir_ends_with_jre() {
        if let Ok(dir) = InstallConfig::default_install_dir() {
            assert_eq!(dir.file_name().unwrap(), JRE_DIR_NAME);
        }
    }
}
