use std::io::{self, Write};

use crate::usecases::contracts::AlertPresenter;

/// Line-oriented terminal used by the CLI screens.
pub trait Prompter: Send + Sync {
    fn print_line(&self, line: &str) -> io::Result<()>;
    fn prompt_line(&self, prompt: &str) -> io::Result<Option<String>>;
    fn prompt_secret(&self, prompt: &str) -> io::Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdTerminal;

impl Prompter for StdTerminal {
    fn print_line(&self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }

    fn prompt_line(&self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }

    fn prompt_secret(&self, prompt: &str) -> io::Result<Option<String>> {
        match rpassword::prompt_password(prompt) {
            Ok(password) => Ok(Some(password.trim().to_owned())),
            Err(source) if source.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(source) => Err(source),
        }
    }
}

/// Shows alerts and confirmations through a `Prompter`.
pub struct TerminalAlerts<P> {
    terminal: P,
}

impl<P: Prompter> TerminalAlerts<P> {
    pub fn new(terminal: P) -> Self {
        Self { terminal }
    }
}

impl<P: Prompter> AlertPresenter for TerminalAlerts<P> {
    fn alert(&self, title: &str, message: &str) {
        if let Err(error) = self.terminal.print_line(&alert_line(title, message)) {
            tracing::warn!(code = "UI_ALERT_WRITE_FAILED", error = %error, "alert not shown");
        }
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        let prompt = format!("{} [y/N] ", alert_line(title, message));
        match self.terminal.prompt_line(&prompt) {
            Ok(Some(answer)) => is_affirmative(&answer),
            Ok(None) => false,
            Err(error) => {
                tracing::warn!(code = "UI_CONFIRM_READ_FAILED", error = %error, "confirm declined");
                false
            }
        }
    }
}

fn alert_line(title: &str, message: &str) -> String {
    if message.is_empty() {
        format!("! {title}")
    } else {
        format!("! {title}: {message}")
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
