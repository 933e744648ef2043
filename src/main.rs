mod cli;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::HumanBytes;

use cli::{Cli, Command};
use jre_provision::jre::smoketest::Smoketest;
use jre_provision::{Host, InstallConfig, Provisioner};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jre_provision=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    // Nothing below can work without a known platform.
    let host = match resolve_host(cli.os.as_deref(), cli.arch.as_deref()) {
        Ok(host) => host,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut config = match cli.install_dir {
        Some(dir) => InstallConfig::new(dir),
        None => InstallConfig::with_defaults()?,
    };

    match cli.command {
        Command::Install {
            base_url,
            version,
            verify_certs,
            timeout,
            quiet,
        } => {
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }
            if let Some(version) = version {
                config.version = version;
            }
            config.accept_invalid_certs = !verify_certs;
            config.install_timeout = timeout.map(Duration::from_secs);
            config.show_progress = !quiet;

            run_install(Provisioner::new(config, host)).await?;
        }
        Command::Url => {
            println!("{}", Provisioner::new(config, host).target().url);
        }
        Command::Locate => {
            let java = Provisioner::new(config, host).runtime().executable()?;
            println!("{}", java.display());
        }
        Command::Run {
            classpath,
            class_name,
            args,
        } => {
            let runtime = Provisioner::new(config, host).runtime();
            let status = runtime
                .spawn(&classpath, &class_name, &args)?
                .wait()
                .context("waiting for java")?;
            std::process::exit(status.code().unwrap_or(1));
        }
        Command::Smoketest => {
            let runtime = Provisioner::new(config.clone(), host).runtime();
            Smoketest::new(config.smoketest_timeout)
                .run(&runtime)
                .await?;
            eprintln!("No smoke!");
        }
        Command::Info => {
            run_info(&Provisioner::new(config, host))?;
        }
        Command::Clean => {
            run_clean(&config.install_dir)?;
        }
    }

    Ok(())
}

fn resolve_host(os: Option<&str>, arch: Option<&str>) -> Result<Host, jre_provision::ProvisionError> {
    match (os, arch) {
        (None, None) => Host::detect(),
        (os, arch) => Host::resolve(
            os.unwrap_or(std::env::consts::OS),
            arch.unwrap_or(std::env::consts::ARCH),
        ),
    }
}

async fn run_install(provisioner: Provisioner) -> Result<()> {
    let installed = provisioner.install().await.with_context(|| {
        format!(
            "installing JRE into {}",
            provisioner.config().install_dir.display()
        )
    })?;

    eprintln!("\n  Runtime: {}", installed.executable.display());
    eprintln!("  Size:    {}", HumanBytes(dir_size(&installed.install_dir)));
    eprintln!("  Ready to run!\n");
    Ok(())
}

fn run_info(provisioner: &Provisioner) -> Result<()> {
    let host = provisioner.host();
    let runtime = provisioner.runtime();
    let install_dir = runtime.install_dir();

    eprintln!("Platform:          {} ({})", host.platform.os, host.arch);
    eprintln!("Archive:           {}", host.platform.archive.extension());
    eprintln!("Download URL:      {}", provisioner.target().url);
    eprintln!("Install directory: {}", install_dir.display());

    match runtime.executable() {
        Ok(java) => {
            eprintln!("Installed java:    {}", java.display());
            eprintln!("Install size:      {}", HumanBytes(dir_size(install_dir)));
        }
        Err(e) => eprintln!("Installed java:    none ({e})"),
    }
    Ok(())
}

fn run_clean(install_dir: &Path) -> Result<()> {
    if install_dir.exists() {
        let size = dir_size(install_dir);
        std::fs::remove_dir_all(install_dir)
            .with_context(|| format!("removing {}", install_dir.display()))?;
        eprintln!("Removed {} of runtime files", HumanBytes(size));
    } else {
        eprintln!("No runtime installed");
    }
    Ok(())
}

fn dir_size(path: &Path) -> u64 {
    let mut size = 0;
    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_dir() {
                size += dir_size(&p);
            } else if let Ok(meta) = p.metadata() {
                size += meta.len();
            }
        }
    }
    size
}
