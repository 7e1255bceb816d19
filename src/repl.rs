//! Interactive REPL and file runner

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::diagnostics::{LispError, Result};
use crate::interp::{Interpreter, PrintOptions, Value, render_with};
use crate::parser::Reader;

const HELP: &str = "\
Commands:
  :help, :h       Show this help
  :globals, :g    List global bindings in definition order
  :quit, :q       Exit the REPL

Each complete expression is echoed as `EXPR => VALUE`.
An unfinished expression continues on the next line.";

/// Evaluate every expression in a file, stopping at the first error
pub fn run_file(interp: &Interpreter, path: &Path) -> Result<Value> {
    let source = fs::read_to_string(path).map_err(|err| LispError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    info!(path = %path.display(), "running file");

    let mut reader = Reader::new(&path.display().to_string(), &source);
    let mut last = Value::Nil;
    while let Some(expr) = reader.read()? {
        last = interp.eval(&expr)?;
    }
    Ok(last)
}

/// What became of a buffer fed to [`eval_input`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Every expression was read; output has been written
    Complete,
    /// The buffer ends inside an expression; nothing was evaluated
    Incomplete,
}

/// Read all of `input`, then evaluate each expression and echo it to `out`
///
/// Evaluation errors are written as `==> MESSAGE` and end the buffer.
pub fn eval_input<W: Write>(
    interp: &Interpreter,
    input: &str,
    options: PrintOptions,
    out: &mut W,
) -> Result<Input> {
    let mut reader = Reader::new("<repl>", input);
    let mut exprs = Vec::new();
    loop {
        match reader.read() {
            Ok(Some(expr)) => exprs.push(expr),
            Ok(None) => break,
            Err(LispError::Incomplete) => return Ok(Input::Incomplete),
            Err(err) => {
                write_line(out, &format!("==> {err}"))?;
                return Ok(Input::Complete);
            }
        }
    }

    for expr in exprs {
        write_text(out, &format!("{} => ", render_with(&expr, options)))?;
        match interp.eval(&expr) {
            Ok(value) => write_line(out, &render_with(&value, options))?,
            Err(err) => {
                write_line(out, "")?;
                write_line(out, &format!("==> {err}"))?;
                break;
            }
        }
    }
    Ok(Input::Complete)
}

fn write_text<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(stdout_error)
}

fn write_line<W: Write>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{text}").map_err(stdout_error)
}

fn stdout_error(err: io::Error) -> LispError {
    LispError::Io {
        path: "<stdout>".to_string(),
        message: err.to_string(),
    }
}

fn editor_error(err: ReadlineError) -> LispError {
    LispError::Io {
        path: "<terminal>".to_string(),
        message: err.to_string(),
    }
}

/// Line-editing REPL over an interpreter
pub struct Repl {
    interp: Interpreter,
    config: Config,
    editor: DefaultEditor,
}

impl Repl {
    pub fn new(interp: Interpreter, config: Config) -> Result<Self> {
        let mut editor = DefaultEditor::new().map_err(editor_error)?;
        if let Some(history) = &config.history_file {
            if let Err(err) = editor.load_history(history) {
                debug!(path = %history.display(), %err, "no history loaded");
            }
        }
        Ok(Repl {
            interp,
            config,
            editor,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("ratlisp v{}", crate::VERSION);
        println!("Type :help for help, :quit to exit");
        println!();

        let options = self.config.print_options();
        let mut stdout = io::stdout();
        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                &self.config.prompt
            } else {
                &self.config.continuation_prompt
            };
            let line = match self.editor.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    buffer.clear();
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(editor_error(err)),
            };

            if buffer.is_empty() {
                match line.trim() {
                    "" => continue,
                    ":quit" | ":q" => break,
                    ":help" | ":h" => {
                        println!("{HELP}");
                        continue;
                    }
                    ":globals" | ":g" => {
                        self.print_globals();
                        continue;
                    }
                    _ => {}
                }
            }

            buffer.push_str(&line);
            buffer.push('\n');
            if eval_input(&self.interp, &buffer, options, &mut stdout)? == Input::Complete {
                if let Err(err) = self.editor.add_history_entry(buffer.trim_end()) {
                    debug!(%err, "history entry dropped");
                }
                buffer.clear();
            }
        }

        if let Some(history) = &self.config.history_file {
            if let Err(err) = self.editor.save_history(history) {
                warn!(path = %history.display(), %err, "could not save history");
            }
        }
        println!("Goodbye!");
        Ok(())
    }

    fn print_globals(&self) {
        let names: Vec<String> = self
            .interp
            .global_env()
            .global_names()
            .into_iter()
            .map(|symbol| symbol.name())
            .collect();
        println!("{}", names.join(" "));
    }
}
