//! Spinner shown on stderr while map data is being fetched

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a spinner for a request of unknown length
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner wrapped around a single map-data fetch
pub struct FetchSpinner {
    pub pb: ProgressBar,
}

impl FetchSpinner {
    pub fn new(message: &str) -> Self {
        Self {
            pb: create_spinner(message),
        }
    }

    pub fn finish(&self, message: &str) {
        self.pb.finish_with_message(message.to_string());
    }

    pub fn fail(&self) {
        self.pb.abandon();
    }
}
