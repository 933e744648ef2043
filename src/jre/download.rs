use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, COOKIE};
use reqwest::{Client, Response};

use crate::config::InstallConfig;
use crate::error::ProvisionError;

/// Accepts the vendor's binary license so the mirror serves the archive.
pub const LICENSE_COOKIE: &str =
    "gpw_e24=http://www.oracle.com/; oraclelicense=accept-securebackup-cookie";

/// Response body in arrival order. Never buffered as a whole.
pub type ChunkStream = BoxStream<'static, Result<Bytes, ProvisionError>>;

pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(COOKIE, HeaderValue::from_static(LICENSE_COOKIE));
    headers
}

pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(config: &InstallConfig) -> Result<Self, ProvisionError> {
        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate validation is disabled for the runtime download");
        }

        let client = Client::builder()
            .default_headers(default_headers())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(ProvisionError::Client)?;

        Ok(Self { client })
    }

    /// Sends the GET and returns once headers arrive. The body is left unread.
    pub async fn fetch(&self, url: &str) -> Result<Download, ProvisionError> {
        tracing::info!("downloading from {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ProvisionError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        Ok(Download {
            url: url.to_string(),
            content_length: response.content_length(),
            response,
        })
    }
}

pub struct Download {
    pub url: String,
    pub content_length: Option<u64>,
    response: Response,
}

impl Download {
    pub fn into_stream(self) -> ChunkStream {
        let url = self.url;
        self.response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|source| ProvisionError::Network {
                    url: url.clone(),
                    source,
                })
            })
            .boxed()
    }
}

/// Byte-level progress for one download. A no-op when the size is unknown.
#[derive(Clone)]
pub struct DownloadProgress {
    bar: Option<ProgressBar>,
}

impl DownloadProgress {
    pub fn new(total: Option<u64>, visible: bool) -> Self {
        let bar = total.filter(|_| visible).map(|total| {
            let style = ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            let pb = ProgressBar::new(total);
            pb.set_style(style);
            pb.set_message("downloading and preparing JRE");
            pb
        });
        Self { bar }
    }

    pub fn disabled() -> Self {
        Self { bar: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.bar.is_some()
    }

    pub fn tick(&self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.as_ref().map_or(0, ProgressBar::position)
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message("download complete");
        }
    }

    pub fn abandon(&self) {
        if let Some(bar) = &self.bar {
            bar.abandon();
        }
    }

    /// Ticks once per chunk as the stream is consumed.
    pub fn track(&self, chunks: ChunkStream) -> ChunkStream {
        let progress = self.clone();
        chunks
            .inspect(move |chunk| {
                if let Ok(chunk) = chunk {
                    progress.tick(chunk.len() as u64);
                }
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: &[&'static str]) -> ChunkStream {
        let items: Vec<Result<Bytes, ProvisionError>> = parts
            .iter()
            .copied()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        stream::iter(items).boxed()
    }

    #[test]
    fn headers_carry_license_cookie_and_keep_alive() {
        let headers = default_headers();
        assert_eq!(headers[CONNECTION], "keep-alive");
        assert_eq!(headers[COOKIE], LICENSE_COOKIE);
    }

    #[test]
    fn client_builds_with_defaults() {
        let config = InstallConfig::new("/tmp/jre");
        assert!(Downloader::new(&config).is_ok());
    }

    #[test]
    fn progress_without_length_is_noop() {
        let progress = DownloadProgress::new(None, true);
        assert!(!progress.is_enabled());
        progress.tick(10);
        progress.finish();
        assert_eq!(progress.position(), 0);
    }

    #[test]
    fn hidden_progress_is_noop() {
        assert!(!DownloadProgress::new(Some(100), false).is_enabled());
        assert!(!DownloadProgress::disabled().is_enabled());
    }

    #[tokio::test]
    async fn track_ticks_per_chunk_and_keeps_order() {
        let progress = DownloadProgress::new(Some(9), true);
        let tracked = progress.track(chunks(&["abc", "def", "ghi"]));
        let collected: Vec<Bytes> = tracked.map(|c| c.unwrap()).collect().await;
        assert_eq!(collected.concat(), b"abcdefghi".to_vec());
        assert_eq!(progress.position(), 9);
    }
}
