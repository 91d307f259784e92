use console::{Term, style};
use dialoguer::{Input, theme::ColorfulTheme};
use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::{Error, Result};

/// Abstraction over a free-text terminal prompt.
///
/// Implementors define how a line of input is collected from the user.
/// The registry reconciliation only ever talks to this trait, so tests can
/// script the answers instead of driving a terminal.
pub trait Prompter {
    /// Show `prompt` and return the line the user typed, without the
    /// trailing newline. An empty answer is returned as an empty string.
    fn prompt(&mut self, prompt: &str) -> Result<String>;
}

/// Default implementation of `Prompter` using `dialoguer::Input`.
///
/// Uses the `ColorfulTheme` for user-friendly styling. When stdin or stderr
/// is not a terminal (piped answers, scripts), the prompt is printed on
/// stdout and one line is read from stdin instead.
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn prompt(&mut self, prompt: &str) -> Result<String> {
        if !Term::stderr().is_term() || !io::stdin().is_terminal() {
            let stdin = io::stdin();
            let stdout = io::stdout();
            return read_line_answer(&mut stdin.lock(), &mut stdout.lock(), prompt);
        }

        let theme = ColorfulTheme::default();
        Input::<String>::with_theme(&theme)
            .with_prompt(prompt.trim_end_matches(':'))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}

/// Writes `prompt` on its own line to `output` and reads one line of
/// `input`.
///
/// # Parameters
/// - `input`: Where the answer is read from.
/// - `output`: Where the prompt is written.
/// - `prompt`: The message shown to the user.
///
/// # Returns
/// The line without its `\n` or `\r\n` terminator, or `Error::Prompt` when
/// the input is already exhausted.
pub fn read_line_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<String> {
    writeln!(output, "{}", prompt)
        .and_then(|_| output.flush())
        .map_err(|e| Error::Prompt(e.to_string()))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| Error::Prompt(format!("Could not read from stdin: {}", e)))?;
    if read == 0 {
        return Err(Error::Prompt(String::from("unexpected end of input")));
    }

    let answer = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(&line);
    Ok(answer.to_string())
}

/// Ask for a developer's full name until a non-blank answer is given.
///
/// # Returns
/// The trimmed name.
pub fn ask_full_name<P: Prompter>(prompter: &mut P, key: &str) -> Result<String> {
    let prompt = format!("Please enter a full name for {}:", key);
    loop {
        let answer = prompter.prompt(&prompt)?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}

/// Ask once for the email a developer uses on the code host.
///
/// An empty answer is accepted; the co-author trailer will then carry an
/// empty address.
pub fn ask_dev_email<P: Prompter>(prompter: &mut P, key: &str) -> Result<String> {
    let prompt = format!(
        "Please enter an email for {} (for github integration use email associated with github):",
        key
    );
    Ok(prompter.prompt(&prompt)?.trim().to_string())
}

/// Ask for the shared base email, repeating until it has exactly one `@`
/// with text on both sides.
pub fn ask_base_email<P: Prompter>(prompter: &mut P) -> Result<String> {
    loop {
        let answer = prompter.prompt("Please provide base author email:")?;
        let answer = answer.trim();
        if is_valid_base_email(answer) {
            return Ok(answer.to_string());
        }
        eprintln!("{}", style("Invalid").yellow().bold());
    }
}

/// `local@domain` with no further `@` and neither side empty.
pub fn is_valid_base_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
