use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use owo_colors::OwoColorize;

pub trait Operator {
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "s" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

pub struct TerminalOperator<R> {
    input: R,
}

impl TerminalOperator<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> TerminalOperator<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Operator for TerminalOperator<R> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        loop {
            print!("{}", format!("{} (s/n): ", question).cyan());
            io::stdout().flush()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                // End of input means nobody is there to approve a mutation.
                println!();
                return Ok(false);
            }
            if let Some(answer) = parse_answer(&answer) {
                return Ok(answer);
            }
        }
    }
}

// Plain line read when stdin is not a terminal, so the password can be piped
pub fn read_password(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    if !io::stdin().is_terminal() || terminal::enable_raw_mode().is_err() {
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let result = read_masked();
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn read_masked() -> io::Result<String> {
    let mut secret = String::new();
    loop {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            match code {
                KeyCode::Enter => return Ok(secret),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "password prompt cancelled"));
                }
                KeyCode::Char(c) => secret.push(c),
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Esc => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "password prompt cancelled"));
                }
                _ => {}
            }
        }
    }
}
