use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Receives byte-count updates while a download is streamed to disk.
///
/// `start` is called once per attempt, so a retried download restarts the
/// sink from zero. A `total` of `None` means the server did not declare a
/// length.
pub trait ProgressSink {
    fn start(&self, total: Option<u64>);
    fn advance(&self, bytes: u64);
    fn finish(&self);
    fn abandon(&self);
}

/// Discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&self, _total: Option<u64>) {}
    fn advance(&self, _bytes: u64) {}
    fn finish(&self) {}
    fn abandon(&self) {}
}

const BAR_TEMPLATE: &str = "{spinner:.green} {prefix:.cyan.bold} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str =
    "{spinner:.green} {prefix:.cyan.bold} [{elapsed_precise}] {bytes} ({bytes_per_sec})";
const PROGRESS_CHARS: &str = "#>-";

/// Terminal progress bar. Falls back to a spinner when the total is unknown.
pub struct IndicatifProgress {
    prefix: String,
    bar: Mutex<Option<ProgressBar>>,
}

impl IndicatifProgress {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }
}

impl ProgressSink for IndicatifProgress {
    fn start(&self, total: Option<u64>) {
        let bar = match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                    bar.set_style(style.progress_chars(PROGRESS_CHARS));
                }
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                    bar.set_style(style);
                }
                bar.enable_steady_tick(Duration::from_millis(120));
                bar
            }
        };
        bar.set_prefix(self.prefix.clone());

        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = guard.replace(bar) {
            previous.abandon();
        }
    }

    fn advance(&self, bytes: u64) {
        self.with_bar(|bar| bar.inc(bytes));
    }

    fn finish(&self) {
        self.with_bar(|bar| bar.finish());
    }

    fn abandon(&self) {
        self.with_bar(|bar| bar.abandon());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicatif_progress_tracks_position() {
        let progress = IndicatifProgress::new("test");
        progress.start(Some(100));
        progress.advance(40);
        progress.advance(2);

        let guard = progress.bar.lock().unwrap();
        let bar = guard.as_ref().unwrap();
        assert_eq!(bar.position(), 42);
        assert_eq!(bar.length(), Some(100));
    }

    #[test]
    fn test_indicatif_progress_restarts_on_new_attempt() {
        let progress = IndicatifProgress::new("test");
        progress.start(Some(10));
        progress.advance(7);
        progress.abandon();
        progress.start(None);
        progress.advance(3);

        let guard = progress.bar.lock().unwrap();
        let bar = guard.as_ref().unwrap();
        assert_eq!(bar.position(), 3);
        assert_eq!(bar.length(), None);
    }

    #[test]
    fn test_updates_before_start_are_ignored() {
        let progress = IndicatifProgress::new("test");
        progress.advance(5);
        progress.finish();

        assert!(progress.bar.lock().unwrap().is_none());
    }
}
