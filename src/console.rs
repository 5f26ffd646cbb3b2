/*!
 * Terminal stage output
 *
 * Stages render as `Title ...........  [  OK  ]` lines; the attack stage
 * switches to a progress bar while entries are being processed.
 */

use std::io::Write;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::reporter::{StageEnd, StageSink};

/// Column at which stage status brackets are aligned
pub const LINE_WIDTH: usize = 70;

/// Stage sink writing to stdout
#[derive(Default)]
pub struct ConsoleSink {
    title: String,
    bar: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_title(&self) {
        print!("{} ...{} ", self.title, title_dots(&self.title));
        std::io::stdout().flush().ok();
    }

    fn progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {eta}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░-"),
        );
        pb
    }
}

impl StageSink for ConsoleSink {
    fn stage_started(&mut self, title: &str) {
        self.title = title.to_string();
        self.print_title();
    }

    fn stage_progress(&mut self, current: u64, total: u64) {
        let bar = self.bar.get_or_insert_with(|| {
            println!();
            Self::progress_bar(total)
        });
        bar.set_position(current);
    }

    fn stage_ended(&mut self, end: StageEnd) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
            self.print_title();
        }

        match end {
            StageEnd::Ok => println!("[  {}  ]", "OK".green().bold()),
            StageEnd::Failed(_) => println!("[ {} ]", "FAIL".red().bold()),
        }
    }
}

/// Padding dots so that status brackets line up
pub fn title_dots(title: &str) -> String {
    ".".repeat(LINE_WIDTH.saturating_sub(title.chars().count()))
}

/// Print indented detail lines; `"quoted"` parts are highlighted
pub fn print_extra(data: &str) {
    for line in data.lines() {
        println!("  {}", highlight_quoted(line));
    }
}

fn highlight_quoted(line: &str) -> String {
    line.split('"')
        .enumerate()
        .map(|(i, chunk)| {
            if i % 2 == 0 {
                chunk.bright_black().bold().to_string()
            } else {
                chunk.bright_blue().bold().to_string()
            }
        })
        .collect()
}

pub fn print_success() {
    println!("> Finished {}!\n", "SUCCESSFULLY".green().bold());
}

pub fn print_error(message: &str) {
    println!("> {}: {}", "ERROR".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_dots() {
        assert_eq!(title_dots("Installing pipe").len(), LINE_WIDTH - 15);
        assert_eq!(title_dots(&"x".repeat(100)), "");
    }

    #[test]
    fn test_highlight_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(
            highlight_quoted("Found path: \"/usr/sbin/unix_chkpwd\""),
            "Found path: /usr/sbin/unix_chkpwd"
        );
        colored::control::unset_override();
    }
}
