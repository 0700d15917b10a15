//! Progress bars for per-file stage loops

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Create a progress bar over `total` units of work
///
/// Draws to stderr; indicatif hides it automatically when stderr is not a
/// terminal, so log files and test output stay clean.
pub fn stage_progress(total: usize, message: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
    let style = ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
