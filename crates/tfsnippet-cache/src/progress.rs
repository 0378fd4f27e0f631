use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;
use tfsnippet_fetch::{FetchPhase, Progress, ProgressCallback};

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {wide_msg}";

const SPINNER_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {bytes} ({bytes_per_sec}) {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> =
    Lazy::new(|| ProgressStyle::with_template(SPINNER_STYLE).ok().map(|s| s.tick_chars(TICK)));

/// Where progress bars and status lines go.
///
/// Bars are drawn only for the standard streams; a custom writer receives
/// the status lines alone.
#[derive(Clone, Default)]
pub enum ProgressSink {
    #[default]
    Stdout,
    Stderr,
    Writer(Arc<Mutex<dyn Write + Send>>),
}

impl ProgressSink {
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        Self::Writer(Arc::new(Mutex::new(writer)))
    }

    /// Writes `text` and flushes. Failures are ignored: progress output never
    /// decides whether an operation succeeds.
    pub(crate) fn write_str(&self, text: &str) {
        let _ = match self {
            Self::Stdout => write_flush(&mut io::stdout().lock(), text),
            Self::Stderr => write_flush(&mut io::stderr().lock(), text),
            Self::Writer(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                write_flush(&mut *writer, text)
            }
        };
    }

    fn draw_target(&self) -> ProgressDrawTarget {
        match self {
            Self::Stdout => ProgressDrawTarget::stdout(),
            Self::Stderr => ProgressDrawTarget::stderr(),
            Self::Writer(_) => ProgressDrawTarget::hidden(),
        }
    }
}

fn write_flush(writer: &mut dyn Write, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.flush()
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("Stdout"),
            Self::Stderr => f.write_str("Stderr"),
            Self::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// `Extracting <archive> ... ` followed by `done` or `error`.
///
/// The outcome is written when the line is finished with [`StatusLine::done`]
/// or, failing that, when it is dropped.
pub(crate) struct StatusLine<'a> {
    sink: &'a ProgressSink,
    finished: bool,
}

impl<'a> StatusLine<'a> {
    pub(crate) fn start(sink: &'a ProgressSink, action: &str, subject: &Path) -> Self {
        sink.write_str(&format!("{action} {} ... ", subject.display()));
        Self {
            sink,
            finished: false,
        }
    }

    pub(crate) fn done(mut self) {
        self.finished = true;
        self.sink.write_str("done\n");
    }
}

impl Drop for StatusLine<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.sink.write_str("error\n");
        }
    }
}

/// Download bar fed by fetch progress callbacks. Shows a bar once the total
/// is known and a spinner otherwise.
pub(crate) struct DownloadTracker {
    pb: ProgressBar,
}

impl DownloadTracker {
    pub(crate) fn new(sink: &ProgressSink, prefix: &str) -> Self {
        let pb = ProgressBar::with_draw_target(None, sink.draw_target());
        if let Some(style) = SPINNER_TEMPLATE.as_ref() {
            pb.set_style(style.clone());
        }
        pb.set_prefix(prefix.to_string());
        Self { pb }
    }

    pub(crate) fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |progress: &Progress| {
            if let Some(total) = progress.total_bytes {
                if pb.length() != Some(total) {
                    pb.set_length(total);
                    if let Some(style) = PB_TEMPLATE.as_ref() {
                        pb.set_style(style.clone());
                    }
                }
            }
            pb.set_position(progress.bytes_downloaded);
            if progress.phase == FetchPhase::Completed {
                pb.finish();
            }
        })
    }

    pub(crate) fn abandon(self) {
        self.pb.abandon();
    }
}
