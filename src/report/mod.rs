mod grid;
mod prompt;

pub use grid::render_grid;
pub use prompt::{read_password, Operator, TerminalOperator};

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use owo_colors::OwoColorize;
use tracing::warn;

use crate::db::TableData;

const BANNER_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Warning,
    Failure,
    Heading,
}

pub struct Reporter<W: Write = File> {
    log: Option<W>,
    echo: bool,
    color: bool,
}

impl Reporter<File> {
    // Truncates an existing log
    pub fn create(path: &Path, color: bool) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file, true, color))
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(log: W, echo: bool, color: bool) -> Self {
        Self {
            log: Some(log),
            echo,
            color,
        }
    }

    pub fn line(&mut self, tone: Tone, message: impl AsRef<str>) {
        let message = message.as_ref();

        if self.echo {
            if self.color {
                println!("{}", paint(tone, message));
            } else {
                println!("{}", message);
            }
        }

        if let Some(log) = self.log.as_mut() {
            if let Err(e) = writeln!(log, "{}", message).and_then(|_| log.flush()) {
                warn!(error = %e, "log file write failed, continuing with console output only");
                self.log = None;
            }
        }
    }

    pub fn plain(&mut self, message: impl AsRef<str>) {
        self.line(Tone::Plain, message);
    }

    pub fn blank(&mut self) {
        self.line(Tone::Plain, "");
    }

    pub fn banner(&mut self, title: &str) {
        let rule = "─".repeat(BANNER_WIDTH);
        self.blank();
        self.line(Tone::Heading, &rule);
        self.line(Tone::Heading, format!("{:^width$}", title, width = BANNER_WIDTH));
        self.line(Tone::Heading, &rule);
        self.blank();
    }

    pub fn grid(&mut self, tone: Tone, data: &TableData, empty: &str) {
        if data.is_empty() {
            self.line(Tone::Warning, empty);
            return;
        }
        for line in render_grid(data) {
            self.line(tone, line);
        }
    }

    #[cfg(test)]
    pub fn into_log(self) -> Option<W> {
        self.log
    }
}

fn paint(tone: Tone, message: &str) -> String {
    match tone {
        Tone::Plain => message.to_string(),
        Tone::Info => message.cyan().to_string(),
        Tone::Success => message.green().to_string(),
        Tone::Warning => message.yellow().to_string(),
        Tone::Failure => message.red().to_string(),
        Tone::Heading => message.blue().bold().to_string(),
    }
}

#[cfg(test)]
pub(crate) fn captured(reporter: Reporter<Vec<u8>>) -> String {
    String::from_utf8(reporter.into_log().unwrap_or_default()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_receives_plain_text() {
        let mut reporter = Reporter::new(Vec::new(), false, true);
        reporter.line(Tone::Failure, "Tabela 'clientes' NÃO existe.");
        reporter.plain("fim");
        assert_eq!(captured(reporter), "Tabela 'clientes' NÃO existe.\nfim\n");
    }

    #[test]
    fn test_banner_is_centered() {
        let mut reporter = Reporter::new(Vec::new(), false, false);
        reporter.banner("abc");
        let log = captured(reporter);
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1].chars().count(), BANNER_WIDTH);
        assert_eq!(lines[2].trim(), "abc");
        assert_eq!(lines[2].chars().count(), BANNER_WIDTH);
    }

    #[test]
    fn test_grid_falls_back_to_empty_message() {
        let mut reporter = Reporter::new(Vec::new(), false, false);
        reporter.grid(Tone::Plain, &TableData::default(), "(sem registros)");
        assert_eq!(captured(reporter), "(sem registros)\n");
    }

    #[test]
    fn test_write_failure_disables_log() {
        let mut reporter = Reporter::new(BrokenWriter, false, false);
        reporter.plain("first");
        reporter.plain("second");
        assert!(reporter.into_log().is_none());
    }

    #[test]
    fn test_create_truncates_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verificacao_loja.log");
        std::fs::write(&path, "previous run\n").unwrap();

        let mut reporter = Reporter::create(&path, false).unwrap();
        reporter.echo = false;
        reporter.plain("new run");
        drop(reporter);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new run\n");
    }
}
