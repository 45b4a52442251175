use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

fn tag(label: colored::ColoredString) -> String {
    format!("{}{}{}", "[".bold().white(), label, "]".bold().white())
}

pub fn info(message: &str) {
    println!("{} {}", tag("INF".bold().blue()), message);
}

pub fn warn(message: &str) {
    println!("{} {}", tag("WRN".bold().yellow()), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", tag("ERR".bold().red()), message.bold().white());
}

pub fn debug(verbose: u8, message: &str) {
    if verbose > 0 {
        println!("{} {}", tag("DBG".bold().cyan()), message.dimmed());
    }
}

pub fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

/// The "waiting for the answer" placeholder. It is cleared when dropped, so
/// it disappears on every path out of a request.
pub struct WaitingIndicator {
    pb: ProgressBar,
}

impl WaitingIndicator {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(message.to_string());
        Self { pb }
    }
}

impl Drop for WaitingIndicator {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}
