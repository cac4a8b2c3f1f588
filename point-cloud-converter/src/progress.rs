use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// Point-count progress bar, or a hidden one when progress output is off.
pub fn point_bar(len: u64, enabled: bool, message: &'static str) -> Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} points ({percent}%) {msg}")?
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message(message);
    Ok(pb)
}
