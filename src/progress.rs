//! Progress bars in a consistent style.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

fn bar_style(len: u64) -> ProgressStyle {
    let pos_width = format!("{len}").len();

    let template = format!(
        "[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos:>{pos_width}}}/{{len}} {{msg}} remaining: [{{eta_precise}}]"
    );

    ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// A bar for `len` steps.
pub fn make_bar(len: u64) -> ProgressBar {
    ProgressBar::new(len).with_style(bar_style(len))
}

/// A spinner for work of unknown length.
pub fn unknown_bar() -> ProgressBar {
    let style = ProgressStyle::with_template("[{elapsed_precise}] [{spinner:10.cyan/blue}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            ">---------",
            "=>--------",
            "<=>-------",
            "-<=>------",
            "--<=>-----",
            "---<=>----",
            "----<=>---",
            "-----<=>--",
            "------<=>-",
            "-------<=>",
            "--------<=",
            "---------<",
        ]);

    let bar = ProgressBar::new(100).with_style(style);
    bar.enable_steady_tick(Duration::from_millis(66));
    bar
}

/// Finish `bar`, reporting how many shapes were found for `what` and how
/// long it took.
pub fn finish_bar(bar: &ProgressBar, duration: Duration, found: usize, what: &str) {
    let time = duration.as_micros();
    let secs = time / 1_000_000;
    let micros = time % 1_000_000;

    if let Some(len) = bar.length() {
        let template = format!(
            "[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos:>{}}}/{{len}} {{msg}}",
            format!("{len}").len()
        );
        if let Ok(style) = ProgressStyle::with_template(&template) {
            bar.set_style(style.progress_chars("#>-"));
        }
    }

    bar.finish_with_message(format!("Done! Found {found} shapes ({what}) in {secs}.{micros:06} s"));
}
