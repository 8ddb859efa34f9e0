// Progress indicator shown while a query runs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use std::future::Future;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// An indeterminate spinner on stderr.
///
/// The spinner is cleared when the `Spinner` is dropped, so it never
/// outlives the scope it was started in, even on early returns.
pub struct Spinner(ProgressBar);

impl Spinner {
    /// Starts a spinner showing `message`.
    pub fn start(message: &'static str) -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let pb = ProgressBar::new_spinner();
        pb.set_style(style);
        pb.set_message(message);
        pb.enable_steady_tick(TICK_INTERVAL);

        Self(pb)
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

/// Runs `operation` with a spinner showing `message` for its duration.
pub async fn with_spinner<F, T>(message: &'static str, operation: F) -> T
where
    F: Future<Output = T>,
{
    let _spinner = Spinner::start(message);

    operation.await
}
