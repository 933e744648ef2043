use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output};

use crate::error::ProvisionError;
use crate::platform::PlatformDescriptor;

/// An installed runtime: the install dir plus the layout of the platform it
/// was built for.
#[derive(Debug, Clone)]
pub struct Runtime {
    install_dir: PathBuf,
    platform: PlatformDescriptor,
}

impl Runtime {
    pub fn new(install_dir: impl Into<PathBuf>, platform: PlatformDescriptor) -> Self {
        Self {
            install_dir: install_dir.into(),
            platform,
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// The single top-level directory the archive unpacked into. Its name is
    /// vendor-chosen, so it is discovered rather than assumed.
    pub fn root(&self) -> Result<PathBuf, ProvisionError> {
        let entries = match std::fs::read_dir(&self.install_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProvisionError::NotInstalled(self.install_dir.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();

        match dirs.len() {
            0 => Err(ProvisionError::NotInstalled(self.install_dir.clone())),
            1 => Ok(dirs.remove(0)),
            _ => {
                let mut candidates: Vec<String> = dirs
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect();
                candidates.sort();
                Err(ProvisionError::AmbiguousRuntime {
                    dir: self.install_dir.clone(),
                    candidates,
                })
            }
        }
    }

    /// Absolute path of the java executable.
    pub fn executable(&self) -> Result<PathBuf, ProvisionError> {
        let mut path = self.root()?;
        path.extend(self.platform.driver_path);
        Ok(path)
    }

    pub fn command(
        &self,
        classpath: &[PathBuf],
        class_name: &str,
        args: &[String],
    ) -> Result<Command, ProvisionError> {
        let mut cmd = Command::new(self.executable()?);
        cmd.args(java_args(&self.platform, classpath, class_name, args));
        Ok(cmd)
    }

    pub fn async_command(
        &self,
        classpath: &[PathBuf],
        class_name: &str,
        args: &[String],
    ) -> Result<tokio::process::Command, ProvisionError> {
        Ok(self.command(classpath, class_name, args)?.into())
    }

    pub fn spawn(
        &self,
        classpath: &[PathBuf],
        class_name: &str,
        args: &[String],
    ) -> Result<Child, ProvisionError> {
        let mut cmd = self.command(classpath, class_name, args)?;
        cmd.spawn().map_err(|source| ProvisionError::Spawn {
            path: PathBuf::from(cmd.get_program()),
            source,
        })
    }

    /// Runs to completion, capturing stdout and stderr.
    pub fn spawn_sync(
        &self,
        classpath: &[PathBuf],
        class_name: &str,
        args: &[String],
    ) -> Result<Output, ProvisionError> {
        let mut cmd = self.command(classpath, class_name, args)?;
        cmd.output().map_err(|source| ProvisionError::Spawn {
            path: PathBuf::from(cmd.get_program()),
            source,
        })
    }
}

/// `-cp <classpath> <class_name> <args...>`
pub fn java_args(
    platform: &PlatformDescriptor,
    classpath: &[PathBuf],
    class_name: &str,
    args: &[String],
) -> Vec<OsString> {
    let mut joined = OsString::new();
    for (i, entry) in classpath.iter().enumerate() {
        if i > 0 {
            joined.push(platform.classpath_separator());
        }
        joined.push(entry);
    }

    let mut out = Vec::with_capacity(args.len() + 3);
    out.push(OsString::from("-cp"));
    out.push(joined);
    out.push(OsString::from(class_name));
    out.extend(args.iter().map(OsString::from));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::resolve_platform;
    use tempfile::tempdir;

    fn linux() -> PlatformDescriptor {
        resolve_platform("linux").unwrap()
    }

    #[test]
    fn missing_install_dir_is_not_installed() {
        let dir = tempdir().unwrap();
        let runtime = Runtime::new(dir.path().join("jre"), linux());
        assert!(matches!(
            runtime.executable(),
            Err(ProvisionError::NotInstalled(_))
        ));
    }

    #[test]
    fn empty_install_dir_is_not_installed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("stray.txt"), b"x").unwrap();
        let runtime = Runtime::new(dir.path(), linux());
        assert!(matches!(
            runtime.executable(),
            Err(ProvisionError::NotInstalled(_))
        ));
    }

    #[test]
    fn single_root_joins_driver_path() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("jdk-11.0.2")).unwrap();
        let runtime = Runtime::new(dir.path(), linux());
        assert_eq!(runtime.install_dir(), dir.path());
        assert_eq!(
            runtime.executable().unwrap(),
            dir.path().join("jdk-11.0.2").join("bin").join("java")
        );
    }

    #[test]
    fn osx_uses_bundle_layout() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("jdk-11.0.2.jdk")).unwrap();
        let runtime = Runtime::new(dir.path(), resolve_platform("darwin").unwrap());
        assert_eq!(
            runtime.executable().unwrap(),
            dir.path().join("jdk-11.0.2.jdk/Contents/Home/bin/java")
        );
    }

    #[test]
    fn two_roots_are_ambiguous() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        let runtime = Runtime::new(dir.path(), linux());
        match runtime.executable() {
            Err(ProvisionError::AmbiguousRuntime { candidates, .. }) => {
                assert_eq!(candidates, ["a", "b"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn args_join_classpath_with_colon() {
        let args = java_args(
            &linux(),
            &[PathBuf::from("/a"), PathBuf::from("/b.jar")],
            "Main",
            &["x".to_string(), "y".to_string()],
        );
        assert_eq!(args, ["-cp", "/a:/b.jar", "Main", "x", "y"]);
    }

    #[test]
    fn args_join_classpath_with_semicolon_on_windows() {
        let args = java_args(
            &resolve_platform("win32").unwrap(),
            &[PathBuf::from("a"), PathBuf::from("b")],
            "Main",
            &[],
        );
        assert_eq!(args, ["-cp", "a;b", "Main"]);
    }

    #[test]
    fn empty_classpath_still_passes_cp_flag() {
        let args = java_args(&linux(), &[], "Main", &[]);
        assert_eq!(args, ["-cp", "", "Main"]);
    }

    #[test]
    fn spawn_fails_fast_without_install() {
        let dir = tempdir().unwrap();
        let runtime = Runtime::new(dir.path().join("missing"), linux());
        assert!(runtime.spawn_sync(&[], "Main", &[]).is_err());
    }
}
