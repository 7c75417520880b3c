//! This crate provides the core logic for a single-tape deterministic Turing Machine.
//! It includes modules for the sparse tape, the execution engine, loading programs
//! from JSON documents, building programs from data, and exporting execution traces.

pub mod loader;
pub mod machine;
pub mod programs;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `ProgramLoader` struct and the `Program` document from the loader module.
pub use loader::{Program, ProgramLoader, RuleDef};
/// Re-exports the `TapeAutomaton` struct from the machine module.
pub use machine::TapeAutomaton;
/// Re-exports the program builders from the programs module.
pub use programs::{word_program, write_word};
/// Re-exports the sparse `Tape` from the tape module.
pub use tape::Tape;
/// Re-exports the trace exporters from the trace module.
pub use trace::{to_csv, to_json};
/// Re-exports the core vocabulary from the types module.
pub use types::{
    AutomatonError, Direction, HaltReason, Result, Step, StepRecord, Symbol, Transition,
    TransitionTable, BLANK, DEFAULT_MAX_STEPS, DEFAULT_PADDING, HALT_STATE, MAX_PROGRAM_SIZE,
};
