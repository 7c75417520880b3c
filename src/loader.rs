//! This module provides the `Program` document and the `ProgramLoader` struct, responsible
//! for loading machine definitions from JSON files and strings.

use crate::types::{
    AutomatonError, Result, Symbol, Transition, TransitionTable, BLANK, DEFAULT_MAX_STEPS,
    DEFAULT_PADDING, HALT_STATE, INPUT_BLANK_SYMBOL, MAX_PROGRAM_SIZE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A machine definition as stored on disk.
///
/// ```json
/// {
///   "name": "Write A",
///   "initial_state": "q0",
///   "halt_states": ["HALT"],
///   "rules": [
///     { "state": "q0", "read": "_", "write": "A", "move": "R", "next": "HALT" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// The state the machine starts in.
    #[serde(default = "default_initial_state")]
    pub initial_state: String,
    /// The declared halting states.
    #[serde(default = "default_halt_states")]
    pub halt_states: Vec<String>,
    /// The step bound for a run.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Padding used when rendering the tape in each step record.
    #[serde(default = "default_padding")]
    pub padding: usize,
    /// The transition rules, one entry per `(state, read)` pair.
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

fn default_initial_state() -> String {
    "q0".to_string()
}

fn default_halt_states() -> Vec<String> {
    vec![HALT_STATE.to_string()]
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

fn default_padding() -> usize {
    DEFAULT_PADDING
}

/// A single rule as written in a program document.
///
/// Symbols are one-character strings; `_` and `⊔` both denote the blank symbol.
/// The move is a code (`L`, `R`, `S`) kept as text until the table is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    pub state: String,
    pub read: String,
    pub write: String,
    #[serde(rename = "move")]
    pub movement: String,
    pub next: String,
}

impl RuleDef {
    pub fn new(state: &str, read: &str, write: &str, movement: &str, next: &str) -> Self {
        Self {
            state: state.to_string(),
            read: read.to_string(),
            write: write.to_string(),
            movement: movement.to_string(),
            next: next.to_string(),
        }
    }
}

impl Program {
    /// Builds the transition table for this program.
    ///
    /// # Returns
    ///
    /// * `Err(AutomatonError::MalformedTransition)` if a rule has an unknown move code.
    /// * `Err(AutomatonError::InvalidSymbol)` if a symbol is not exactly one character.
    /// * `Err(AutomatonError::DuplicateTransition)` if a `(state, read)` pair repeats.
    pub fn table(&self) -> Result<TransitionTable> {
        let mut table = TransitionTable::new();

        for rule in &self.rules {
            let read = parse_symbol(&rule.read)?;
            let write = parse_symbol(&rule.write)?;
            let transition = Transition::parse(write, &rule.movement, rule.next.as_str())?;
            table.insert(rule.state.as_str(), read, transition)?;
        }

        Ok(table)
    }
}

/// Parses a one-character symbol field, mapping [`INPUT_BLANK_SYMBOL`] to [`BLANK`].
fn parse_symbol(s: &str) -> Result<Symbol> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(INPUT_BLANK_SYMBOL), None) => Ok(BLANK),
        (Some(c), None) => Ok(c),
        _ => Err(AutomatonError::InvalidSymbol(s.to_string())),
    }
}

/// `ProgramLoader` is a utility struct for loading program documents.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.json` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read, parsed and its rules are well formed.
    /// * `Err(AutomatonError::FileError)` if the file cannot be read.
    /// * `Err(AutomatonError::ParseError)` if the file content is not a valid document.
    pub fn load_program(path: &Path) -> Result<Program> {
        let content = fs::read_to_string(path).map_err(|e| {
            AutomatonError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "Loaded program file");

        Self::load_program_from_string(&content)
    }

    /// Loads a single program from the provided string content.
    ///
    /// The rules are turned into a transition table once so that a malformed
    /// move or a duplicate rule is reported at load time.
    pub fn load_program_from_string(content: &str) -> Result<Program> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(AutomatonError::ValidationError(format!(
                "Program is {} bytes, the limit is {} bytes",
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        let program: Program = serde_json::from_str(content)?;
        program.table()?;

        if program.halt_states.is_empty() {
            warn!(name = %program.name, "Program declares no halting states");
        }

        Ok(program)
    }

    /// Loads every `.json` program in `directory`, sorted by path.
    ///
    /// A directory that cannot be listed is an error. A file that fails to load is
    /// reported next to its path so one bad program does not hide the others.
    pub fn load_programs(directory: &Path) -> Result<Vec<(PathBuf, Result<Program>)>> {
        let entries = fs::read_dir(directory).map_err(|e| {
            AutomatonError::FileError(format!(
                "Failed to read directory {}: {}",
                directory.display(),
                e
            ))
        })?;

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| AutomatonError::FileError(format!("Failed to read directory entry: {e}")))?;

        paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"));
        paths.sort();

        debug!(directory = %directory.display(), programs = paths.len(), "Discovered program files");

        Ok(paths
            .into_iter()
            .map(|path| {
                let program = Self::load_program(&path);
                (path, program)
            })
            .collect())
    }
}
