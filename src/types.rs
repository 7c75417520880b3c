//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including transitions, the transition table, step records and error types.

use serde::{Deserialize, Serialize};
use std::collections::{hash_map::Entry, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single tape value.
pub type Symbol = char;

/// The reserved blank symbol. Every cell that was never written reads as `BLANK`.
pub const BLANK: Symbol = '⊔';
/// A symbol accepted in program documents as an alias for [`BLANK`].
pub const INPUT_BLANK_SYMBOL: Symbol = '_';
/// The state the machine enters when no transition applies.
pub const HALT_STATE: &str = "HALT";
/// The step bound used when a program does not specify one.
pub const DEFAULT_MAX_STEPS: usize = 1000;
/// The number of cells rendered on each side of the written extent by default.
pub const DEFAULT_PADDING: usize = 2;
/// The maximum allowed size for a program document in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, AutomatonError>;

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Returns the one-letter move code (`L`, `R` or `S`).
    pub fn code(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        }
    }

    /// Applies the movement to a head position.
    pub fn apply(self, head: i64) -> i64 {
        match self {
            Direction::Left => head - 1,
            Direction::Right => head + 1,
            Direction::Stay => head,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl TryFrom<char> for Direction {
    type Error = AutomatonError;

    fn try_from(code: char) -> Result<Self> {
        match code.to_ascii_uppercase() {
            'L' => Ok(Direction::Left),
            'R' => Ok(Direction::Right),
            'S' => Ok(Direction::Stay),
            _ => Err(AutomatonError::MalformedTransition(code.to_string())),
        }
    }
}

impl FromStr for Direction {
    type Err = AutomatonError;

    /// Accepts the move codes `L`, `R`, `S` and the full names, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Direction::try_from(c);
        }

        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "stay" => Ok(Direction::Stay),
            _ => Err(AutomatonError::MalformedTransition(s.to_string())),
        }
    }
}

/// Represents a single transition rule: what to write, where to move and the next state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol written under the head.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub next_state: String,
}

impl Transition {
    pub fn new(write: Symbol, direction: Direction, next_state: impl Into<String>) -> Self {
        Self {
            write,
            direction,
            next_state: next_state.into(),
        }
    }

    /// Builds a transition from a raw move code, failing fast on an unknown direction.
    pub fn parse(write: Symbol, move_code: &str, next_state: impl Into<String>) -> Result<Self> {
        Ok(Self::new(write, move_code.parse()?, next_state))
    }
}

/// Mapping from `(state, symbol)` to the transition to apply.
///
/// A missing key is not an error: the machine halts by omission when it
/// reaches a configuration with no rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    rules: HashMap<String, HashMap<Symbol, Transition>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule. Each `(state, symbol)` pair may only be defined once.
    pub fn insert(
        &mut self,
        state: impl Into<String>,
        read: Symbol,
        transition: Transition,
    ) -> Result<()> {
        let state = state.into();
        let by_symbol = self.rules.entry(state.clone()).or_default();

        match by_symbol.entry(read) {
            Entry::Occupied(_) => Err(AutomatonError::DuplicateTransition(state, read)),
            Entry::Vacant(e) => {
                e.insert(transition);
                Ok(())
            }
        }
    }

    /// Builder-style variant of [`TransitionTable::insert`].
    pub fn with_rule(
        mut self,
        state: impl Into<String>,
        read: Symbol,
        transition: Transition,
    ) -> Result<Self> {
        self.insert(state, read, transition)?;
        Ok(self)
    }

    /// Looks up the transition for a state and the symbol under the head.
    pub fn get(&self, state: &str, read: Symbol) -> Option<&Transition> {
        self.rules.get(state)?.get(&read)
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns every state that has at least one outgoing rule, sorted.
    pub fn states(&self) -> BTreeSet<&str> {
        self.rules.keys().map(String::as_str).collect()
    }
}

/// Why a machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// The machine transitioned into one of its declared halting states.
    Accepted,
    /// No transition was defined for the current state and symbol.
    NoTransition,
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a transition and can continue.
    Continue,
    /// The machine is halted.
    Halt(HaltReason),
}

impl Step {
    pub fn is_halt(&self) -> bool {
        matches!(self, Step::Halt(_))
    }
}

/// One immutable trace entry describing the effect of a single executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Number of transitions executed once this record was produced.
    pub step: usize,
    /// The state the step was attempted in.
    pub state_before: String,
    /// The state after the step.
    pub state_after: String,
    /// The head position after the step.
    pub head_after: i64,
    /// The symbol read before any mutation.
    pub read: Symbol,
    /// The symbol written, `None` for a halt by omission.
    pub write: Option<Symbol>,
    /// The head movement, `None` for a halt by omission.
    pub movement: Option<Direction>,
    /// Padded tape rendering after the step.
    pub tape: String,
}

impl StepRecord {
    /// Returns `true` if this record marks a halt by omission.
    pub fn is_omission(&self) -> bool {
        self.write.is_none() && self.movement.is_none()
    }
}

/// Represents the errors that can occur while building or loading a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutomatonError {
    /// A transition names a movement direction other than left, right or stay.
    #[error("Malformed transition: invalid move '{0}'")]
    MalformedTransition(String),
    /// Two rules were defined for the same state and symbol.
    #[error("Duplicate transition for state {0} and symbol '{1}'")]
    DuplicateTransition(String, Symbol),
    /// A symbol field did not hold exactly one character.
    #[error("Invalid symbol '{0}': expected exactly one character")]
    InvalidSymbol(String),
    /// A program document could not be decoded.
    #[error("Program parsing error: {0}")]
    ParseError(String),
    /// A program document was decoded but is not usable.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Reading or writing a file failed.
    #[error("File error: {0}")]
    FileError(String),
}

impl From<serde_json::Error> for AutomatonError {
    fn from(e: serde_json::Error) -> Self {
        AutomatonError::ParseError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left = Direction::Left;
        let stay = Direction::Stay;

        let left_json = serde_json::to_string(&left).unwrap();
        let stay_json = serde_json::to_string(&stay).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(stay_json, "\"Stay\"");

        let left_deserialized: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, left_deserialized);
    }

    #[test]
    fn test_direction_from_codes() {
        assert_eq!("L".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("r".parse::<Direction>(), Ok(Direction::Right));
        assert_eq!("Stay".parse::<Direction>(), Ok(Direction::Stay));
        assert_eq!(Direction::try_from('S'), Ok(Direction::Stay));
    }

    #[test]
    fn test_malformed_direction() {
        let err = "X".parse::<Direction>().unwrap_err();
        assert_eq!(err, AutomatonError::MalformedTransition("X".to_string()));

        let err = Transition::parse('a', "up", "q1").unwrap_err();
        assert!(matches!(err, AutomatonError::MalformedTransition(_)));
    }

    #[test]
    fn test_direction_apply() {
        assert_eq!(Direction::Left.apply(0), -1);
        assert_eq!(Direction::Right.apply(-1), 0);
        assert_eq!(Direction::Stay.apply(7), 7);
    }

    #[test]
    fn test_table_rejects_duplicates() {
        let mut table = TransitionTable::new();
        table
            .insert("q0", BLANK, Transition::new('A', Direction::Right, "q1"))
            .unwrap();

        let err = table
            .insert("q0", BLANK, Transition::new('B', Direction::Left, "q2"))
            .unwrap_err();

        assert_eq!(err, AutomatonError::DuplicateTransition("q0".to_string(), BLANK));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("q0", BLANK).unwrap().write, 'A');
    }

    #[test]
    fn test_table_lookup_and_states() {
        let table = TransitionTable::new()
            .with_rule("q1", 'a', Transition::new('b', Direction::Stay, "q0"))
            .unwrap()
            .with_rule("q0", BLANK, Transition::new('a', Direction::Right, "q1"))
            .unwrap();

        assert!(table.get("q0", 'a').is_none());
        assert_eq!(table.get("q1", 'a').unwrap().next_state, "q0");
        assert_eq!(table.states().into_iter().collect::<Vec<_>>(), vec!["q0", "q1"]);
    }

    #[test]
    fn test_table_counts_rules_across_states() {
        let mut table = TransitionTable::new();
        assert!(table.is_empty());

        for (state, read) in [("q0", BLANK), ("q0", 'a'), ("q1", BLANK)] {
            table
                .insert(state, read, Transition::new(read, Direction::Stay, "q0"))
                .unwrap();
        }

        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert!(table.get("q2", BLANK).is_none());
        assert!(table.get("q1", 'a').is_none());

        // A rejected duplicate leaves the count unchanged
        assert!(table
            .insert("q0", 'a', Transition::new('b', Direction::Left, "q1"))
            .is_err());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_error_display() {
        let error = AutomatonError::MalformedTransition("Q".to_string());

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Malformed transition"));
        assert!(error_msg.contains("Q"));
    }
}
