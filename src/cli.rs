use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jre-provision", version, about = "Download and run a bundled Java runtime")]
pub struct Cli {
    /// Directory the runtime is unpacked into
    #[arg(long, global = true, env = "JRE_PROVISION_DIR")]
    pub install_dir: Option<PathBuf>,

    /// Override the detected OS (linux, darwin, win32)
    #[arg(long, global = true)]
    pub os: Option<String>,

    /// Override the detected architecture (x64, ia32)
    #[arg(long, global = true)]
    pub arch: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download, unpack and smoke-test the runtime, replacing any previous install
    Install {
        /// Download host and release path
        #[arg(long, env = "JRE_PROVISION_BASE_URL")]
        base_url: Option<String>,

        /// Runtime version to fetch
        #[arg(long)]
        version: Option<String>,

        /// Validate the server's TLS certificate
        #[arg(long)]
        verify_certs: bool,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Hide the download progress bar
        #[arg(long)]
        quiet: bool,
    },
    /// Print the download URL for this platform
    Url,
    /// Print the path of the installed java executable
    Locate,
    /// Run a class on the installed runtime
    Run {
        /// Classpath entries
        #[arg(long = "cp", value_delimiter = ',')]
        classpath: Vec<PathBuf>,

        /// Main class
        class_name: String,

        /// Arguments passed to the class
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Check that the installed runtime starts
    Smoketest,
    /// Show platform, URL and install state
    Info,
    /// Remove the installed runtime
    Clean,
}
