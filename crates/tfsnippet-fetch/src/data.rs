//! Data layer: download options and progress reports.

use std::fmt;
use std::sync::Arc;

/// Phases of a download, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Request sent, waiting for the response head.
    #[default]
    Connecting,
    /// Streaming the body into the writer.
    Downloading,
    Completed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Connecting => write!(f, "Connecting"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub phase: FetchPhase,
    pub bytes_downloaded: u64,
    /// Total expected bytes, if the server sent `Content-Length`.
    pub total_bytes: Option<u64>,
}

impl Progress {
    /// Completion percentage in `0.0..=100.0`, when the total is known.
    pub fn percentage(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(100.0),
            Some(total) => Some((self.bytes_downloaded as f64 / total as f64 * 100.0).min(100.0)),
            None => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase == FetchPhase::Completed
    }
}

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

#[derive(Clone, Default)]
pub struct FetchOptions {
    /// Invoked on phase transitions and after every chunk written.
    pub on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl FetchOptions {
    #[must_use]
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_with_known_total() {
        let progress = Progress {
            phase: FetchPhase::Downloading,
            bytes_downloaded: 25,
            total_bytes: Some(100),
        };
        assert_eq!(progress.percentage(), Some(25.0));
    }

    #[test]
    fn percentage_with_unknown_total() {
        let progress = Progress {
            phase: FetchPhase::Downloading,
            bytes_downloaded: 25,
            total_bytes: None,
        };
        assert_eq!(progress.percentage(), None);
    }

    #[test]
    fn percentage_of_empty_body() {
        let progress = Progress {
            phase: FetchPhase::Completed,
            bytes_downloaded: 0,
            total_bytes: Some(0),
        };
        assert_eq!(progress.percentage(), Some(100.0));
        assert!(progress.is_completed());
    }
}
