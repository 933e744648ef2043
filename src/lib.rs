//! Provisions a platform-specific Java runtime: resolve the host, download the
//! matching archive, unpack it, smoke-test it, and launch it on demand.

pub mod config;
pub mod error;
pub mod jre;
pub mod platform;

pub use config::InstallConfig;
pub use error::ProvisionError;
pub use jre::runtime::{java_args, Runtime};
pub use jre::{Installed, Provisioner};
pub use platform::{Arch, ArchiveFormat, Host, OsName, PlatformDescriptor};
