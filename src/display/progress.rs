use indicatif::{ProgressBar, ProgressStyle};
use std::borrow::Cow;
use std::time::Duration;

/// Spinner shown while the pipeline runs. Cleared when dropped, so it goes
/// away on every exit path, errors included.
pub struct BusyIndicator {
    bar: ProgressBar,
}

impl BusyIndicator {
    pub fn start(message: impl Into<Cow<'static, str>>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} {pos}/{len}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self::with_bar(bar, message)
    }

    pub fn with_bar(bar: ProgressBar, message: impl Into<Cow<'static, str>>) -> Self {
        bar.set_message(message);
        BusyIndicator { bar }
    }

    pub fn set_message(&self, message: impl Into<Cow<'static, str>>) {
        self.bar.set_message(message);
    }

    /// Switch to counting `total` steps.
    pub fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }
}

impl Drop for BusyIndicator {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
