use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Buf, Bytes};
use flate2::read::GzDecoder;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, OwnedRwLockReadGuard, RwLock};

use crate::error::ProvisionError;
use crate::platform::ArchiveFormat;

use super::download::ChunkStream;

/// Chunks buffered between the network and the blocking tar unpacker.
const PIPE_DEPTH: usize = 16;

/// Unpacks a downloaded archive into a directory.
pub trait ExtractStrategy: Send + Sync {
    fn extract<'a>(
        &'a self,
        chunks: ChunkStream,
        dest: &'a Path,
        unpacking: &'a Unpacking,
    ) -> BoxFuture<'a, Result<(), ProvisionError>>;
}

/// Stages the whole download in a temp file, then unzips it. The zip reader
/// needs the central directory at the end of the file, so it cannot stream.
pub struct ZipStrategy;

/// gunzip + untar straight off the response, no temp file.
pub struct TarGzStrategy;

pub fn strategy_for(format: ArchiveFormat) -> Box<dyn ExtractStrategy> {
    match format {
        ArchiveFormat::Zip => Box::new(ZipStrategy),
        ArchiveFormat::TarGz => Box::new(TarGzStrategy),
    }
}

/// Ties an async extraction to the blocking thread that writes the files.
///
/// Dropping the extraction future aborts the writer, which stops before its
/// next archive entry. [`stopped`](Self::stopped) resolves once no writer is
/// left touching the install dir.
#[derive(Debug, Clone, Default)]
pub struct Unpacking {
    aborted: Arc<AtomicBool>,
    running: Arc<RwLock<()>>,
}

impl Unpacking {
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Waits for every blocking writer started through this handle to return.
    pub async fn stopped(&self) {
        drop(self.running.write().await);
    }

    async fn enter(&self) -> (OwnedRwLockReadGuard<()>, AbortOnDrop) {
        let running = self.running.clone().read_owned().await;
        let abort = AbortOnDrop {
            unpacking: self.clone(),
            armed: true,
        };
        (running, abort)
    }

    fn check(&self) -> Result<(), ProvisionError> {
        if self.is_aborted() {
            return Err(ProvisionError::Cancelled);
        }
        Ok(())
    }
}

/// Held by the async side of an extraction.
struct AbortOnDrop {
    unpacking: Unpacking,
    armed: bool,
}

impl AbortOnDrop {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.unpacking.abort();
        }
    }
}

/// Removes anything left by a previous install and recreates `dir` empty.
pub async fn reset_install_dir(dir: &Path) -> Result<(), ProvisionError> {
    if tokio::fs::try_exists(dir).await? {
        tracing::debug!("removing previous install at {}", dir.display());
        tokio::fs::remove_dir_all(dir).await?;
    }
    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}

/// Wipes `dest`, then unpacks `chunks` with the strategy for `format`.
pub async fn extract(
    chunks: ChunkStream,
    format: ArchiveFormat,
    dest: &Path,
) -> Result<(), ProvisionError> {
    reset_install_dir(dest).await?;
    strategy_for(format)
        .extract(chunks, dest, &Unpacking::default())
        .await
}

impl ExtractStrategy for ZipStrategy {
    fn extract<'a>(
        &'a self,
        chunks: ChunkStream,
        dest: &'a Path,
        unpacking: &'a Unpacking,
    ) -> BoxFuture<'a, Result<(), ProvisionError>> {
        extract_zip(chunks, dest.to_path_buf(), unpacking).boxed()
    }
}

impl ExtractStrategy for TarGzStrategy {
    fn extract<'a>(
        &'a self,
        chunks: ChunkStream,
        dest: &'a Path,
        unpacking: &'a Unpacking,
    ) -> BoxFuture<'a, Result<(), ProvisionError>> {
        extract_tar_gz(chunks, dest.to_path_buf(), unpacking).boxed()
    }
}

async fn extract_zip(
    mut chunks: ChunkStream,
    dest: PathBuf,
    unpacking: &Unpacking,
) -> Result<(), ProvisionError> {
    let staging_dir = dest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);
    tokio::fs::create_dir_all(&staging_dir).await?;

    let staging = tempfile::Builder::new()
        .prefix(".jre-download-")
        .suffix(".zip")
        .tempfile_in(&staging_dir)?;

    let mut file = tokio::fs::File::from_std(staging.reopen()?);
    let mut written: u64 = 0;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    tracing::info!("archive written ({written} bytes), unpacking");

    let (running, abort) = unpacking.enter().await;
    let writer = unpacking.clone();
    let unzipped = tokio::task::spawn_blocking(move || -> Result<(), ProvisionError> {
        let _running = running;
        // dropped first, so the staged file is gone before `stopped` resolves
        let staging = staging;
        let archive = staging
            .reopen()
            .map_err(|e| ProvisionError::Extraction(format!("cannot reopen staged archive: {e}")))?;
        unzip(archive, &dest, &writer)
    })
    .await
    .map_err(|e| ProvisionError::Extraction(format!("unzip task failed: {e}")));
    abort.disarm();
    unzipped?
}

/// Unzips entry by entry so an abort takes effect between files.
fn unzip(archive: fs::File, dest: &Path, unpacking: &Unpacking) -> Result<(), ProvisionError> {
    let mut zip = zip::ZipArchive::new(archive)?;
    for i in 0..zip.len() {
        unpacking.check()?;

        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(ProvisionError::Extraction(format!(
                "zip entry escapes the install dir: {}",
                entry.name()
            )));
        };
        let out = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&out)?;
        io::copy(&mut entry, &mut file)
            .map_err(|e| ProvisionError::Extraction(format!("zip: {}: {e}", entry.name())))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out, fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}

async fn extract_tar_gz(
    mut chunks: ChunkStream,
    dest: PathBuf,
    unpacking: &Unpacking,
) -> Result<(), ProvisionError> {
    let (tx, rx) = mpsc::channel::<Bytes>(PIPE_DEPTH);
    let (running, abort) = unpacking.enter().await;
    let writer = unpacking.clone();
    let unpacker = tokio::task::spawn_blocking(move || {
        let _running = running;
        unpack_tar_gz(ChunkReader::new(rx), &dest, &writer)
    });

    let mut fed = Ok(());
    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(chunk) => {
                // unpacker already gave up; its error is reported below
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                fed = Err(err);
                break;
            }
        }
    }
    drop(tx);

    let unpacked = unpacker
        .await
        .map_err(|e| ProvisionError::Extraction(format!("untar task failed: {e}")));
    abort.disarm();
    let unpacked = unpacked?;

    // A broken download also breaks the unpacker; report the cause.
    fed?;
    unpacked
}

fn unpack_tar_gz(
    reader: impl Read,
    dest: &Path,
    unpacking: &Unpacking,
) -> Result<(), ProvisionError> {
    let tar_error = |e: io::Error| ProvisionError::Extraction(format!("tar.gz: {e}"));

    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    for entry in archive.entries().map_err(tar_error)? {
        unpacking.check()?;
        entry.map_err(tar_error)?.unpack_in(dest).map_err(tar_error)?;
    }

    // tar stops at its end marker; drain so the gzip trailer CRC is checked.
    let mut decoder = archive.into_inner();
    io::copy(&mut decoder, &mut io::sink()).map_err(tar_error)?;
    Ok(())
}

/// Blocking `Read` over chunks sent from the async side.
struct ChunkReader {
    rx: mpsc::Receiver<Bytes>,
    current: Bytes,
}

impl ChunkReader {
    fn new(rx: mpsc::Receiver<Bytes>) -> Self {
        Self {
            rx,
            current: Bytes::new(),
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.current.is_empty() {
            match self.rx.blocking_recv() {
                Some(chunk) => self.current = chunk,
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.current.len());
        buf[..n].copy_from_slice(&self.current[..n]);
        self.current.advance(n);
        Ok(n)
    }
}
