use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// A spinner only when a person is watching stdout.
pub fn spinner_if_terminal(message: String) -> Option<ProgressBar> {
    std::io::stdout()
        .is_terminal()
        .then(|| create_spinner(message))
}
