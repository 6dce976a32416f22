//! Progress indicators for long-running CLI operations.
//!
//! A thin wrapper over `indicatif` so commands never deal with styles or with
//! the hidden/visible decision themselves. Bars are hidden when progress is
//! disabled and, through `indicatif`, whenever stderr is not a terminal.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// A progress bar that counts finished packages.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// A bar of `len` steps with a spinner, or a hidden bar if `enabled` is false.
    pub fn new(len: u64, enabled: bool) -> Self {
        if !enabled {
            return Self::hidden();
        }
        let bar = IndicatifBar::new(len);
        bar.set_style(bar_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            inner: bar,
        }
    }

    /// A bar that draws nothing.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    /// Set the text shown after the counter.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Advance by `delta` steps.
    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    /// Print `line` to stdout above the bar without tearing it.
    pub fn println(&self, line: &str) {
        self.inner.suspend(|| println!("{line}"));
    }

    /// Remove the bar from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn bar_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}
