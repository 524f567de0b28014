//! Interactive credentials.
//!
//! The username is read as plain text, the password with echo disabled.
//! Reading blocks the calling thread until a line is entered or input ends;
//! there is no timeout.

use crate::connection::Credentials;
use crate::error::{InputError, SqlCredError};
use crate::provider::CredentialProvider;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use zeroize::Zeroizing;

/// Line-oriented input with an optional masked mode.
///
/// Implementations report end of input as [`io::ErrorKind::UnexpectedEof`].
pub trait Prompt: Send {
    /// Show `prompt` and read one line of plain text.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Show `prompt` and read one line without echoing it.
    fn read_masked(&mut self, prompt: &str) -> io::Result<String>;
}

/// Prompts on the controlling terminal.
///
/// Prompts go to stderr, the username comes from stdin and the password is
/// read from the tty with echo disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(prompt.as_bytes())?;
        stderr.flush()?;

        read_plain_line(&mut io::stdin().lock())
    }

    fn read_masked(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }
}

/// Prompts on arbitrary streams, for scripted input and tests.
///
/// Both lines are read the same way: no echo handling, and a last line
/// without a trailing newline is accepted.
#[derive(Debug)]
pub struct ReaderPrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ReaderPrompt<R, W> {
    /// Wrap a reader for input and a writer for prompts.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Return the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead + Send, W: Write + Send> Prompt for ReaderPrompt<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.writer.write_all(prompt.as_bytes())?;
        self.writer.flush()?;

        read_plain_line(&mut self.reader)
    }

    fn read_masked(&mut self, prompt: &str) -> io::Result<String> {
        self.read_line(prompt)
    }
}

fn read_plain_line(reader: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "unexpected end of input",
        ));
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}

/// Asks the user for a username and a masked password.
pub struct InteractiveCredentialProvider<P = TerminalPrompt> {
    prompt: Mutex<P>,
    username_prompt: String,
    password_prompt: String,
}

impl InteractiveCredentialProvider<TerminalPrompt> {
    /// Prompt on the controlling terminal.
    pub fn terminal() -> Self {
        Self::new(TerminalPrompt)
    }
}

impl<P: Prompt> InteractiveCredentialProvider<P> {
    /// Prompt through `prompt` with the default prompt texts.
    pub fn new(prompt: P) -> Self {
        Self {
            prompt: Mutex::new(prompt),
            username_prompt: "Username: ".to_string(),
            password_prompt: "Password: ".to_string(),
        }
    }

    /// Override the prompt texts.
    pub fn with_prompts(mut self, username: &str, password: &str) -> Self {
        self.username_prompt = username.to_string();
        self.password_prompt = password.to_string();
        self
    }

    /// Return the wrapped prompt.
    pub fn into_prompt(self) -> P {
        self.prompt
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn input_error(field: &str, err: io::Error) -> InputError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => InputError::EndOfInput {
            field: field.to_string(),
        },
        _ => InputError::Io(err.to_string()),
    }
}

impl<P: Prompt> CredentialProvider for InteractiveCredentialProvider<P> {
    fn resolve(&self) -> Result<Credentials, SqlCredError> {
        let mut prompt = self
            .prompt
            .lock()
            .map_err(|_| InputError::Io("prompt lock poisoned".to_string()))?;

        let username = prompt
            .read_line(&self.username_prompt)
            .map_err(|e| input_error("username", e))?;
        let password = Zeroizing::new(
            prompt
                .read_masked(&self.password_prompt)
                .map_err(|e| input_error("password", e))?,
        );

        tracing::debug!(strategy = self.strategy(), "resolved credentials");
        Ok(Credentials::new(username, password.as_str()))
    }

    fn strategy(&self) -> &'static str {
        "interactive"
    }
}

impl<P> std::fmt::Debug for InteractiveCredentialProvider<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractiveCredentialProvider")
            .field("username_prompt", &self.username_prompt)
            .field("password_prompt", &self.password_prompt)
            .finish()
    }
}
