use std::future::Future;

use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    // The template is a literal; fall back to the stock style if it is ever rejected
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Await `future` behind a spinner, clearing it once the call resolves.
pub async fn with_spinner<F: Future>(message: &str, future: F) -> F::Output {
    let spinner = create_spinner(format!("  {}", message));
    let output = future.await;
    spinner.finish_and_clear();
    output
}
