/*!
 * API key resolution.
 *
 * A key comes from the configuration file first, then from the environment,
 * and finally from an interactive prompt when stdin is a terminal. The prompt
 * reads in raw mode so the key is never echoed.
 */

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::debug;
use std::io::{self, IsTerminal, Write};

use crate::errors::AppError;

/// Environment variable holding the OpenAI key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable holding the Anthropic key
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Resolve an API key for `label`
pub fn resolve_api_key(configured: &str, env_var: &str, label: &str) -> Result<String, AppError> {
    let env_value = std::env::var(env_var).ok();
    if let Some(key) = pick_key(configured, env_value.as_deref()) {
        return Ok(key);
    }

    if io::stdin().is_terminal() {
        debug!("{} not set, prompting for {} API key", env_var, label);
        let key = prompt_for_key(label).map_err(|e| AppError::Config(e.to_string()))?;
        if !key.is_empty() {
            return Ok(key);
        }
    }

    Err(AppError::Config(format!(
        "No {} API key: set {} or providers.{}.api_key",
        label,
        env_var,
        label.to_lowercase()
    )))
}

/// First non-blank key among the configured value and the environment value
fn pick_key(configured: &str, env_value: Option<&str>) -> Option<String> {
    [Some(configured), env_value]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}

/// What a key press does to the hidden input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Submit,
    Cancel,
}

fn apply_key(buffer: &mut String, key: KeyEvent) -> KeyOutcome {
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyOutcome::Cancel
        }
        KeyCode::Esc => KeyOutcome::Cancel,
        KeyCode::Enter => KeyOutcome::Submit,
        KeyCode::Backspace => {
            buffer.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

fn read_hidden_line() -> io::Result<String> {
    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match apply_key(&mut buffer, key) {
                KeyOutcome::Continue => {}
                KeyOutcome::Submit => return Ok(buffer),
                KeyOutcome::Cancel => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "API key prompt cancelled"));
                }
            }
        }
    }
}

fn prompt_for_key(label: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "Enter your {} API key: ", label)?;
    stderr.flush()?;

    enable_raw_mode()?;
    let result = read_hidden_line();
    disable_raw_mode()?;
    writeln!(stderr)?;

    result.map(|key| key.trim().to_string())
}
