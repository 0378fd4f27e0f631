use std::io::{ErrorKind, Read, Write};

use tracing::debug;

use crate::data::{FetchOptions, FetchPhase, Progress};
use crate::error::{FetchError, Result};
use crate::http::HttpClient;

const CHUNK_SIZE: usize = 64 * 1024;

/// Streams HTTP responses into writers, reporting progress as it goes.
#[derive(Clone, Debug)]
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Download `url` into `writer` and return the number of bytes written.
    ///
    /// A non-2xx status fails before anything is written. A body shorter than
    /// the advertised `Content-Length` fails with [`FetchError::Incomplete`].
    /// The writer is flushed on success; the caller owns cleanup on failure.
    pub fn fetch_to(&self, url: &str, writer: &mut dyn Write, options: &FetchOptions) -> Result<u64> {
        report(options, FetchPhase::Connecting, 0, None);

        let response = self.client.get(url)?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let total_bytes = response.content_length;
        debug!(url, ?total_bytes, "response received");
        report(options, FetchPhase::Downloading, 0, total_bytes);

        let mut body = response.body;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut bytes_downloaded = 0u64;
        loop {
            let read = match body.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(FetchError::Body {
                        url: url.to_string(),
                        source: e,
                    });
                }
            };
            writer.write_all(&buffer[..read]).map_err(FetchError::Write)?;
            bytes_downloaded += read as u64;
            report(options, FetchPhase::Downloading, bytes_downloaded, total_bytes);
        }

        if let Some(expected) = total_bytes.filter(|&expected| bytes_downloaded < expected) {
            return Err(FetchError::Incomplete {
                url: url.to_string(),
                expected,
                actual: bytes_downloaded,
            });
        }

        writer.flush().map_err(FetchError::Write)?;
        report(options, FetchPhase::Completed, bytes_downloaded, total_bytes);
        debug!(url, bytes_downloaded, "download finished");
        Ok(bytes_downloaded)
    }
}

fn report(options: &FetchOptions, phase: FetchPhase, bytes_downloaded: u64, total_bytes: Option<u64>) {
    if let Some(ref callback) = options.on_progress {
        callback(&Progress {
            phase,
            bytes_downloaded,
            total_bytes,
        });
    }
}
