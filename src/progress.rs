/*!
 * Progress bars for long-running loops.
 */

use indicatif::{ProgressBar, ProgressStyle};

/// A bar counting `len` items of `unit`
pub fn progress_bar(len: usize, unit: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        ))
        .or_else(|_| {
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}")
        })
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar
}
