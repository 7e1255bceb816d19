//! Driver configuration
//!
//! Read from a TOML file. Every field is optional:
//!
//! ```toml
//! prelude = true
//! print_depth = 4
//! annotate_rationals = true
//! history_file = ".ratlisp_history"
//! stack_size_mib = 256
//! prompt = "> "
//! continuation_prompt = "  "
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::diagnostics::{LispError, Result};
use crate::interp::PrintOptions;
use crate::interp::printer::MAX_PRINT_RECUR;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "ratlisp.toml";

const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Load the Lisp prelude at start-up
    pub prelude: bool,
    /// Revisit budget for printing cyclic lists
    pub print_depth: i32,
    /// Show the float value next to rationals in the REPL
    pub annotate_rationals: bool,
    /// REPL history; none means history is not saved
    pub history_file: Option<PathBuf>,
    /// Stack of the evaluation thread
    pub stack_size_mib: usize,
    pub prompt: String,
    pub continuation_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prelude: true,
            print_depth: MAX_PRINT_RECUR,
            annotate_rationals: true,
            history_file: None,
            stack_size_mib: 256,
            prompt: "> ".to_string(),
            continuation_prompt: "  ".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration text
    pub fn from_toml(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text).map_err(|err| LispError::Config {
            message: err.to_string(),
        })?;
        if config.stack_size_mib == 0 {
            return Err(LispError::Config {
                message: "stack_size_mib must be positive".to_string(),
            });
        }
        if config.stack_size_mib.checked_mul(MIB).is_none() {
            return Err(LispError::Config {
                message: format!("stack_size_mib is too large: {}", config.stack_size_mib),
            });
        }
        Ok(config)
    }

    /// Load `path` if given, else `ratlisp.toml` in the working directory
    /// when it exists, else the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    debug!("no configuration file, using defaults");
                    return Ok(Config::default());
                }
                fallback
            }
        };

        let text = fs::read_to_string(&path).map_err(|err| LispError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        debug!(path = %path.display(), "loading configuration");
        Config::from_toml(&text)
    }

    /// Printer options for REPL output
    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            max_recur: self.print_depth,
            annotate_rationals: self.annotate_rationals,
        }
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size_mib.saturating_mul(MIB)
    }
}
