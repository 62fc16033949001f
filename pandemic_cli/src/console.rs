//! Line-oriented command console.
//!
//! Commands are registered by name. Each input line is split on whitespace;
//! the first token picks the command and the whole token list is passed to
//! its handler. A few commands are built in:
//!
//! - `help` lists every command
//! - `run <file>` executes a script, one command per line, `#` for comments
//! - `complete <text>` prints completion candidates for a card argument
//! - `quit` / `exit` end the session
//!
//! On a terminal, [`Console::run_interactive`] reads through a line editor
//! with history and Tab completion: command names on the first word, the
//! registered completion function for every later word.

use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Context, Editor, Helper};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

/// What a handler tells the console to do next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnCode {
    /// Keep reading commands
    Ok = 0,
    /// End the session
    Quit = 1,
    /// The command failed; interactive sessions continue, scripts stop
    Error = 2,
}

/// Handler for a registered command; `args[0]` is the command name
pub type CommandFn<S> = Box<dyn Fn(&mut S, &[String]) -> ReturnCode>;

/// Produces candidate completions for an argument being typed
pub type CompletionFn = Rc<dyn Fn(&str) -> Vec<String>>;

const BUILTINS: [&str; 5] = ["help", "run", "complete", "quit", "exit"];

/// Command registry and dispatcher over a session state `S`
pub struct Console<S> {
    greeting: String,
    commands: BTreeMap<String, CommandFn<S>>,
    completer: Option<CompletionFn>,
}

impl<S> Console<S> {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            commands: BTreeMap::new(),
            completer: None,
        }
    }

    pub fn register_command<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut S, &[String]) -> ReturnCode + 'static,
    {
        self.commands.insert(name.to_string(), Box::new(handler));
    }

    pub fn register_completion<F>(&mut self, completer: F)
    where
        F: Fn(&str) -> Vec<String> + 'static,
    {
        self.completer = Some(Rc::new(completer));
    }

    /// Names of all commands, built-in ones included, sorted
    pub fn registered_commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .keys()
            .cloned()
            .chain(BUILTINS.iter().map(|b| b.to_string()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Tokenize and dispatch one line
    pub fn execute_command(&self, state: &mut S, line: &str) -> ReturnCode {
        let inputs: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some(name) = inputs.first() else {
            return ReturnCode::Ok;
        };

        if let Some(handler) = self.commands.get(name) {
            tracing::debug!("Dispatching '{}' with {} arguments", name, inputs.len() - 1);
            return handler(state, &inputs);
        }

        match name.as_str() {
            "help" => {
                println!("Available commands are:");
                for command in self.registered_commands() {
                    println!("\t{}", command);
                }
                ReturnCode::Ok
            }
            "run" => match inputs.get(1) {
                Some(file) => self.execute_file(state, Path::new(file)),
                None => {
                    println!("Usage: {} script_filename", name);
                    ReturnCode::Error
                }
            },
            "complete" => {
                let text = inputs.get(1).map(String::as_str).unwrap_or("");
                let entries = self.completion_entries(text);
                if let Some((prefix, candidates)) = entries.split_first() {
                    if prefix.len() > text.len() {
                        println!("common prefix: {}", prefix);
                    }
                    for candidate in candidates {
                        println!("{}", candidate);
                    }
                }
                ReturnCode::Ok
            }
            "quit" | "exit" => ReturnCode::Quit,
            _ => {
                println!("Command '{}' not found.", name);
                ReturnCode::Error
            }
        }
    }

    /// Execute every command in a script, stopping at the first one that
    /// does not return `Ok`
    pub fn execute_file(&self, state: &mut S, path: &Path) -> ReturnCode {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Unable to read script {:?}: {}", path, e);
                println!("Could not find the specified file to execute.");
                return ReturnCode::Error;
            }
        };

        let commands = contents
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'));
        for (counter, command) in commands.enumerate() {
            println!("[{}] {}", counter, command);
            let result = self.execute_command(state, command);
            if result != ReturnCode::Ok {
                return result;
            }
            println!();
        }

        ReturnCode::Ok
    }

    /// Read and execute lines from `input` until it ends or a command quits
    pub fn run<R: BufRead>(&self, state: &mut S, input: &mut R) -> io::Result<()> {
        loop {
            print!("{}", self.greeting);
            io::stdout().flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // Keep the transcript tidy when input ends mid-prompt
                println!();
                return Ok(());
            }

            if self.execute_command(state, &line) == ReturnCode::Quit {
                return Ok(());
            }
        }
    }

    /// Read lines through a terminal line editor until end of input or a
    /// command quits. Ctrl-C clears the current line.
    pub fn run_interactive(&self, state: &mut S) -> rustyline::Result<()> {
        let config = rustyline::Config::builder()
            .completion_type(CompletionType::List)
            .build();
        let mut editor: Editor<LineHelper, DefaultHistory> = Editor::with_config(config)?;
        editor.set_helper(Some(self.line_helper()));

        loop {
            match editor.readline(&self.greeting) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        editor.add_history_entry(line.as_str())?;
                    }
                    if self.execute_command(state, &line) == ReturnCode::Quit {
                        return Ok(());
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!();
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Completion list for `text`: the longest prefix shared by every
    /// candidate first, then the candidates themselves
    pub fn completion_entries(&self, text: &str) -> Vec<String> {
        match &self.completer {
            Some(completer) => with_common_prefix(completer(text)),
            None => Vec::new(),
        }
    }

    fn line_helper(&self) -> LineHelper {
        LineHelper {
            commands: self.registered_commands(),
            completer: self.completer.clone(),
        }
    }
}

/// Prepend the longest prefix shared by all `candidates`, compared without
/// case. Empty input stays empty.
fn with_common_prefix(candidates: Vec<String>) -> Vec<String> {
    let Some(first) = candidates.first() else {
        return Vec::new();
    };

    let prefix: String = first
        .chars()
        .enumerate()
        .take_while(|(i, c)| {
            candidates
                .iter()
                .all(|other| other.chars().nth(*i).is_some_and(|o| o.eq_ignore_ascii_case(c)))
        })
        .map(|(_, c)| c)
        .collect();

    let mut entries = Vec::with_capacity(candidates.len() + 1);
    entries.push(prefix);
    entries.extend(candidates);
    entries
}

/// Tab completion for the line editor
pub struct LineHelper {
    commands: Vec<String>,
    completer: Option<CompletionFn>,
}

impl LineHelper {
    /// Replacement start and candidates for the word ending at `pos`.
    ///
    /// When the candidates share a prefix longer than the word, only that
    /// prefix is offered so the first Tab extends the word; the next Tab
    /// lists the candidates.
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let before = &line[..pos];
        let start = before
            .rfind(|c: char| c.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        let word = &before[start..];

        let entries = if before[..start].trim().is_empty() {
            with_common_prefix(
                self.commands
                    .iter()
                    .filter(|command| command.starts_with(word))
                    .cloned()
                    .collect(),
            )
        } else {
            match &self.completer {
                Some(completer) => with_common_prefix(completer(word)),
                None => Vec::new(),
            }
        };

        let mut entries = entries.into_iter();
        let candidates = match entries.next() {
            Some(prefix) if prefix.len() > word.len() => vec![prefix],
            Some(_) => entries.collect(),
            None => Vec::new(),
        };
        (start, candidates)
    }
}

impl Completer for LineHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for LineHelper {
    type Hint = String;
}

impl Highlighter for LineHelper {}

impl Validator for LineHelper {}

impl Helper for LineHelper {}
