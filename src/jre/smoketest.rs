use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use crate::error::ProvisionError;

use super::runtime::Runtime;

/// What the bundled program prints on a working runtime.
pub const EXPECTED_OUTPUT: &str = "No smoke!";

const SOURCE_NAME: &str = "Smoketest.java";
const SOURCE: &str = include_str!("../../resources/Smoketest.java");

/// Launches the installed runtime on a trivial program and checks its output.
///
/// The program ships as source and runs in single-file source mode, which
/// every JDK 11+ supports.
pub struct Smoketest {
    timeout: Duration,
}

impl Smoketest {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn passes(&self, runtime: &Runtime) -> bool {
        match self.run(runtime).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{e}");
                false
            }
        }
    }

    pub async fn run(&self, runtime: &Runtime) -> Result<(), ProvisionError> {
        let stdout = self.stdout(runtime).await?;
        if output_matches(&stdout) {
            tracing::info!("smoketest passed");
            Ok(())
        } else {
            Err(ProvisionError::Verification(format!(
                "expected {EXPECTED_OUTPUT:?}, got {:?}",
                stdout.trim()
            )))
        }
    }

    async fn stdout(&self, runtime: &Runtime) -> Result<String, ProvisionError> {
        let work = tempfile::tempdir()?;
        let source = work.path().join(SOURCE_NAME);
        tokio::fs::write(&source, SOURCE).await?;

        let classpath = [work.path().to_path_buf()];
        let class = source.to_string_lossy().into_owned();
        let mut cmd = runtime
            .async_command(&classpath, &class, &[])
            .map_err(|e| ProvisionError::Verification(e.to_string()))?;
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        let program = PathBuf::from(cmd.as_std().get_program());
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                ProvisionError::Verification(format!("runtime did not exit within {:?}", self.timeout))
            })?
            .map_err(|source| ProvisionError::Verification(format!(
                "failed to launch {}: {source}",
                program.display()
            )))?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub fn output_matches(stdout: &str) -> bool {
    stdout.trim() == EXPECTED_OUTPUT
}
