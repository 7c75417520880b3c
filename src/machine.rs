//! This module defines the `TapeAutomaton` struct, which simulates a single-tape
//! deterministic Turing Machine. It handles the machine's state, the sparse tape, head
//! movement, transition lookup and the execution trace.

use crate::loader::Program;
use crate::tape::Tape;
use crate::types::{
    HaltReason, Result, Step, StepRecord, Symbol, Transition, TransitionTable, DEFAULT_PADDING,
    HALT_STATE,
};
use std::collections::HashSet;
use tracing::{debug, info, trace};

/// Represents a single-tape deterministic Turing Machine.
///
/// The machine is mutated in place by successive calls to [`TapeAutomaton::step`]. Every
/// executed step, including the final "no rule found" step, appends a [`StepRecord`] to
/// the machine's history.
#[derive(Debug, Clone)]
pub struct TapeAutomaton {
    table: TransitionTable,
    initial_state: String,
    halt_states: HashSet<String>,
    state: String,
    head: i64,
    tape: Tape,
    step_count: usize,
    halted: Option<HaltReason>,
    history: Vec<StepRecord>,
    padding: usize,
}

impl TapeAutomaton {
    /// Creates a new `TapeAutomaton` with an empty tape and the head at cell 0.
    ///
    /// The table is not checked for completeness: a missing rule halts the machine.
    ///
    /// # Arguments
    ///
    /// * `table` - The transition table.
    /// * `start_state` - The state the machine starts in.
    /// * `halt_states` - The declared halting states.
    pub fn new<I, S>(table: TransitionTable, start_state: impl Into<String>, halt_states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let start_state = start_state.into();
        Self {
            table,
            state: start_state.clone(),
            initial_state: start_state,
            halt_states: halt_states.into_iter().map(Into::into).collect(),
            head: 0,
            tape: Tape::new(),
            step_count: 0,
            halted: None,
            history: Vec::new(),
            padding: DEFAULT_PADDING,
        }
    }

    /// Creates a machine from a loaded [`Program`] document.
    ///
    /// # Returns
    ///
    /// * `Err(AutomatonError::MalformedTransition)` if a rule has an unknown move code.
    /// * `Err(AutomatonError::DuplicateTransition)` if a `(state, symbol)` pair is defined twice.
    pub fn from_program(program: &Program) -> Result<Self> {
        let table = program.table()?;
        Ok(Self::new(table, program.initial_state.clone(), program.halt_states.clone())
            .with_padding(program.padding))
    }

    /// Sets the padding used for the tape rendering stored in each [`StepRecord`].
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Returns the symbol under the head, or the blank symbol if the cell was never written.
    pub fn read(&self) -> Symbol {
        self.tape.read(self.head)
    }

    /// Writes `symbol` under the head. Writing the blank symbol still extends the written range.
    pub fn write(&mut self, symbol: Symbol) {
        self.tape.write(self.head, symbol);
    }

    /// Executes a single transition attempt.
    ///
    /// If no rule exists for the current state and symbol, the machine enters [`HALT_STATE`]
    /// and records a step with neither write nor movement. A machine that is already
    /// halted is left untouched.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was applied and the new state is not halting.
    /// * `Step::Halt(HaltReason::Accepted)` if the machine is now in a declared halting state.
    /// * `Step::Halt(HaltReason::NoTransition)` if the machine halted by omission.
    pub fn step(&mut self) -> Step {
        if let Some(reason) = self.halt_reason() {
            return Step::Halt(reason);
        }

        let state_before = self.state.clone();
        let read = self.read();

        let transition = match self.table.get(&state_before, read).cloned() {
            Some(t) => t,
            None => {
                debug!(
                    state = %state_before,
                    head = self.head,
                    symbol = %read,
                    "No transition defined, halting"
                );

                self.state = HALT_STATE.to_string();
                self.halted = Some(HaltReason::NoTransition);
                self.record(state_before, read, None);

                return Step::Halt(HaltReason::NoTransition);
            }
        };

        self.write(transition.write);
        self.head = transition.direction.apply(self.head);
        self.state = transition.next_state.clone();
        self.step_count += 1;

        trace!(
            step = self.step_count,
            from = %state_before,
            to = %self.state,
            head = self.head,
            "Applied transition"
        );

        self.record(state_before, read, Some(&transition));

        match self.halt_reason() {
            Some(reason) => Step::Halt(reason),
            None => Step::Continue,
        }
    }

    /// Runs the machine until it halts or `max_steps` steps have been executed.
    ///
    /// Reaching the step limit is not an error; callers check [`TapeAutomaton::is_halted`]
    /// to tell a finished computation from a truncated one.
    ///
    /// # Returns
    ///
    /// The records produced by this call, in order.
    pub fn run(&mut self, max_steps: usize) -> Vec<StepRecord> {
        let start = self.history.len();
        let mut executed = 0;

        while executed < max_steps && !self.is_halted() {
            self.step();
            executed += 1;
        }

        info!(
            steps = executed,
            state = %self.state,
            halted = self.is_halted(),
            "Run finished"
        );

        self.history[start..].to_vec()
    }

    /// Renders the tape from `min_written - padding` to `max_written + padding`,
    /// with the head cell bracketed.
    pub fn snapshot(&self, padding: usize) -> String {
        self.tape.render(self.head, padding)
    }

    /// Returns the written extent of the tape as plain text, without padding or head marker.
    pub fn contents(&self) -> String {
        self.tape.contents()
    }

    /// Returns the computed result: the written extent with blank cells trimmed from both ends.
    pub fn text(&self) -> String {
        self.tape.text()
    }

    /// Returns why the machine is halted, or `None` if it can still step.
    ///
    /// A halt by omission takes precedence, even when [`HALT_STATE`] is also declared
    /// as a halting state.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halted.or_else(|| {
            self.halt_states
                .contains(&self.state)
                .then_some(HaltReason::Accepted)
        })
    }

    /// Checks if the machine is in a declared halting state or halted by omission.
    pub fn is_halted(&self) -> bool {
        self.halt_reason().is_some()
    }

    /// Resets the machine to its initial configuration.
    /// This clears the tape, the head position, the step count and the history.
    pub fn reset(&mut self) {
        self.state = self.initial_state.clone();
        self.head = 0;
        self.tape = Tape::new();
        self.step_count = 0;
        self.halted = None;
        self.history.clear();
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the initial state of the machine.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn halt_states(&self) -> &HashSet<String> {
        &self.halt_states
    }

    pub fn head(&self) -> i64 {
        self.head
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns the number of transitions applied so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns every record produced since construction or the last reset.
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    fn record(&mut self, state_before: String, read: Symbol, transition: Option<&Transition>) {
        let record = StepRecord {
            step: self.step_count,
            state_before,
            state_after: self.state.clone(),
            head_after: self.head,
            read,
            write: transition.map(|t| t.write),
            movement: transition.map(|t| t.direction),
            tape: self.snapshot(self.padding),
        };
        self.history.push(record);
    }
}
