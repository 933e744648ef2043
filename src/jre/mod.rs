pub mod artifact;
pub mod download;
pub mod extract;
pub mod runtime;
pub mod smoketest;

use std::future::Future;
use std::path::PathBuf;

use crate::config::InstallConfig;
use crate::error::ProvisionError;
use crate::platform::Host;

use artifact::InstallTarget;
use download::{DownloadProgress, Downloader};
use extract::Unpacking;
use runtime::Runtime;
use smoketest::Smoketest;

/// Outcome of a successful install.
#[derive(Debug, Clone)]
pub struct Installed {
    pub url: String,
    pub install_dir: PathBuf,
    pub executable: PathBuf,
}

/// Drives resolve, download, extract and smoketest for one host.
#[derive(Debug, Clone)]
pub struct Provisioner {
    config: InstallConfig,
    host: Host,
}

impl Provisioner {
    pub fn new(config: InstallConfig, host: Host) -> Self {
        Self { config, host }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    pub fn target(&self) -> InstallTarget {
        InstallTarget::new(&self.config, &self.host)
    }

    pub fn runtime(&self) -> Runtime {
        Runtime::new(&self.config.install_dir, self.host.platform)
    }

    pub async fn install(&self) -> Result<Installed, ProvisionError> {
        self.install_until(std::future::pending()).await
    }

    /// Like [`install`](Self::install), but gives up with
    /// [`ProvisionError::Cancelled`] as soon as `cancel` resolves.
    ///
    /// A cancelled or timed out install returns only after any archive
    /// writer has stopped, so a retry never races the previous unpack.
    pub async fn install_until<F>(&self, cancel: F) -> Result<Installed, ProvisionError>
    where
        F: Future<Output = ()>,
    {
        let unpacking = Unpacking::default();
        let pipeline = async {
            match self.config.install_timeout {
                Some(limit) => {
                    match tokio::time::timeout(limit, self.run_pipeline(&unpacking)).await {
                        Ok(result) => result,
                        Err(_) => Err(ProvisionError::TimedOut(limit)),
                    }
                }
                None => self.run_pipeline(&unpacking).await,
            }
        };

        let result = tokio::select! {
            result = pipeline => result,
            () = cancel => {
                tracing::warn!("install cancelled");
                Err(ProvisionError::Cancelled)
            }
        };

        if let Err(ProvisionError::Cancelled | ProvisionError::TimedOut(_)) = &result {
            unpacking.abort();
            unpacking.stopped().await;
        }
        result
    }

    async fn run_pipeline(&self, unpacking: &Unpacking) -> Result<Installed, ProvisionError> {
        let target = self.target();
        let downloader = Downloader::new(&self.config)?;

        extract::reset_install_dir(&target.local_dir).await?;

        let download = downloader.fetch(&target.url).await?;
        let progress = DownloadProgress::new(download.content_length, self.config.show_progress);
        let chunks = progress.track(download.into_stream());

        let strategy = extract::strategy_for(self.host.platform.archive);
        if let Err(e) = strategy.extract(chunks, &target.local_dir, unpacking).await {
            progress.abandon();
            return Err(e);
        }
        progress.finish();
        tracing::info!(
            "{} downloaded and unpacked in {}",
            target.url,
            target.local_dir.display()
        );

        let runtime = self.runtime();
        Smoketest::new(self.config.smoketest_timeout)
            .run(&runtime)
            .await?;

        let executable = runtime.executable()?;
        Ok(Installed {
            url: target.url,
            install_dir: target.local_dir,
            executable,
        })
    }
}
