//! Terminal output for the EcoDairy CLI.
//!
//! Every status line has a colored symbol and a plain `[TAG]` fallback for
//! `--no-color` and non-interactive use. Command results (chat answers,
//! documents, tokens) go to stdout undecorated.

use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};

/// Kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Info,
    Warn,
    Error,
    Created,
    Skipped,
}

impl Status {
    fn symbol(self) -> &'static str {
        match self {
            Status::Ok | Status::Created => "✓",
            Status::Info => "•",
            Status::Warn => "⚠",
            Status::Error => "✗",
            Status::Skipped => "○",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[OK]",
            Status::Info => "[INFO]",
            Status::Warn => "[WARN]",
            Status::Error => "[ERROR]",
            Status::Created => "[CREATED]",
            Status::Skipped => "[SKIPPED]",
        }
    }

    fn style(self) -> Style {
        match self {
            Status::Ok | Status::Created => Style::new().green().bold(),
            Status::Info => Style::new().blue(),
            Status::Warn | Status::Skipped => Style::new().yellow().bold(),
            Status::Error => Style::new().red().bold(),
        }
    }
}

pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Output {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    fn line(&self, status: Status, message: &str) -> String {
        if self.colored {
            format!("  {} {}", status.symbol().style(status.style()), message)
        } else {
            format!("  {} {}", status.tag(), message)
        }
    }

    fn print(&self, status: Status, message: &str) {
        let line = self.line(status, message);
        if status == Status::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {}{}\n   {} {}\n",
                "EcoDairy".bright_green().bold(),
                ".AI".green().bold(),
                "Dairy herd dashboard".bright_white().bold(),
                version.dimmed()
            );
        } else {
            println!("\n   EcoDairy.AI\n   Dairy herd dashboard {}\n", version);
        }
    }

    pub fn success(&self, message: &str) {
        self.print(Status::Ok, message);
    }

    pub fn info(&self, message: &str) {
        self.print(Status::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.print(Status::Warn, message);
    }

    /// Written to stderr.
    pub fn error(&self, message: &str) {
        self.print(Status::Error, message);
    }

    /// A file or directory written by `init`.
    pub fn created(&self, kind: &str, path: &str) {
        let message = if self.colored {
            format!("{} {}", kind.dimmed(), path.bright_white())
        } else {
            format!("{} {}", kind, path)
        };
        self.print(Status::Created, &message);
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        self.print(Status::Skipped, &format!("{} ({})", path, reason));
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// A shell command the user may want to run next.
    pub fn command(&self, cmd: &str) {
        let cmd = format!("$ {}", cmd);
        if self.colored {
            println!("     {}", cmd.bright_cyan());
        } else {
            println!("     {}", cmd);
        }
    }

    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Streamed answer text, flushed immediately.
    pub fn fragment(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    pub fn json(&self, value: &serde_json::Value) {
        match serde_json::to_string_pretty(value) {
            Ok(rendered) => println!("{}", rendered),
            Err(_) => println!("{}", value),
        }
    }

    /// Prints a table sized to its widest cell per column.
    pub fn table(&self, columns: &[&str], rows: &[Vec<String>]) {
        let widths = column_widths(columns, rows);

        let header = pad_row(columns.iter().copied(), &widths);
        let rule = "-".repeat(header.chars().count());
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", rule.dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", rule);
        }

        for row in rows {
            println!("    {}", pad_row(row.iter().map(String::as_str), &widths));
        }
    }

    pub fn newline(&self) {
        println!();
    }
}

fn column_widths(columns: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_use_tags() {
        let output = Output::new(false);
        assert_eq!(output.line(Status::Ok, "saved"), "  [OK] saved");
        assert_eq!(output.line(Status::Error, "boom"), "  [ERROR] boom");
        assert_eq!(output.line(Status::Skipped, "data"), "  [SKIPPED] data");
    }

    #[test]
    fn test_colored_lines_use_symbols() {
        let output = Output::new(true);
        let line = output.line(Status::Warn, "careful");
        assert!(line.contains('⚠'));
        assert!(line.ends_with("careful"));
    }

    #[test]
    fn test_column_widths_fit_widest_cell() {
        let rows = vec![
            vec!["6f1c2a".to_string(), "Feed plan for Bessie".to_string()],
            vec!["a".to_string(), "Hi".to_string()],
        ];
        assert_eq!(column_widths(&["Id", "Title"], &rows), vec![6, 20]);
        assert_eq!(column_widths(&["Messages"], &[]), vec![8]);
    }

    #[test]
    fn test_pad_row_aligns_and_trims() {
        let row = pad_row(["Id", "Title"].into_iter(), &[6, 10]);
        assert_eq!(row, "Id      Title");
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::new(false), Output::new(true)] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.created("config", "ecodairy.toml");
            output.skipped("data", "already exists");
            output.header("Test Header");
            output.subheader("Test Subheader");
            output.kv("key", "value");
            output.hint("hint message");
            output.command("ecodairy serve");
            output.complete("complete message");
            output.fragment("partial ");
            output.json(&serde_json::json!({ "cow": "Bessie" }));
            output.table(&["Id", "Title"], &[vec!["1".to_string(), "Bessie".to_string()]]);
            output.newline();
        }
    }
}
