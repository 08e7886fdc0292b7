//! ## Features
//!
//! - Leveled messages (info, warn, error, debug, success, verbose) on stderr
//! - Multi-line message support with consistent prefixes
//! - Page headings (title, subheader) on stdout
//! - Inline labels for highlighting categories such as cluster names
//!
//! ## Usage
//!
//! Messages: `info()`, `warn()`, `error()`, `debug()`, `success()`, `verbose()`
//!
//! Headings: `title()`, `subheader()`
//!
//! Labels: `badge()`, `badges()`

use colored::*;

/// Severity of a message written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Verbose,
  Info,
  Warn,
  Error,
  Debug,
  Success,
}

impl Level {
  fn tag(self) -> &'static str {
    match self {
      Level::Verbose => "verb",
      Level::Info => "info",
      Level::Warn => "warn",
      Level::Error => "error",
      Level::Debug => "debug",
      Level::Success => "sccs",
    }
  }

  fn color(self) -> Color {
    match self {
      Level::Verbose => Color::Cyan,
      Level::Info => Color::Blue,
      Level::Warn => Color::Yellow,
      Level::Error => Color::Red,
      Level::Debug => Color::Magenta,
      Level::Success => Color::Green,
    }
  }
}

/// Write each line of `message` to stderr
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Colored `[tag]` prefix padded to a fixed column
pub fn format_prefix(level: Level) -> String {
  let tag = level.tag();
  format!("[{}]{:<width$}", tag.color(level.color()).bold(), "", width = 7 - tag.len() - 2)
}

/// Prefix every line of `message` for the given level
pub fn format_message(level: Level, message: &str) -> String {
  let prefix = format_prefix(level);
  message.lines().map(|line| format!("{prefix} {line}")).collect::<Vec<_>>().join("\n")
}

pub fn emit(level: Level, message: &str) {
  log(&format_message(level, message));
}

pub fn verbose(message: &str) {
  emit(Level::Verbose, message);
}

/// General information, e.g. a dataset finished loading
pub fn info(message: &str) {
  emit(Level::Info, message);
}

/// Something degraded but the command keeps going
pub fn warn(message: &str) {
  emit(Level::Warn, message);
}

/// Something failed; shown once, never retried
pub fn error(message: &str) {
  emit(Level::Error, message);
}

pub fn debug(message: &str) {
  emit(Level::Debug, message);
}

pub fn success(message: &str) {
  emit(Level::Success, message);
}

/// Create a banner line of the specified length and character
pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

/// Frame `message` between two border lines sized to its widest line
pub fn format_banner(message: &str, border_char: char) -> String {
  let width = message.lines().map(console::measure_text_width).max().unwrap_or(0);
  let border = banner_line(width, border_char);
  format!("{border}\n{message}\n{border}")
}

/// Page title
pub fn format_title(text: &str) -> String {
  format_banner(&text.bright_white().bold().to_string(), '=')
}

pub fn title(text: &str) {
  println!("{}", format_title(text));
}

/// Section heading with an underline matching the visible width
pub fn format_subheader(text: &str) -> String {
  let underline = banner_line(console::measure_text_width(text), '-');
  format!("\n{}\n{}", text.cyan().bold(), underline.dimmed())
}

pub fn subheader(text: &str) {
  println!("{}", format_subheader(text));
}

/// Inline label, white on black
pub fn badge(text: &str) -> String {
  format!(" {text} ").white().on_black().bold().to_string()
}

/// Labels joined on one line
pub fn badges<S: AsRef<str>>(labels: &[S]) -> String {
  labels.iter().map(|label| badge(label.as_ref())).collect::<Vec<_>>().join(" ")
}

#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::info($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($msg:expr) => {
    $crate::warn($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($msg:expr) => {
    $crate::error($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::success($msg); // LCOV_EXCL_LINE
  };
}
