//! Builders that assemble transition tables from data.
//!
//! Programs are plain input to the engine; nothing here is special-cased by
//! [`TapeAutomaton`](crate::TapeAutomaton).

use crate::loader::{Program, RuleDef};
use crate::types::{
    AutomatonError, Direction, Result, Symbol, Transition, TransitionTable, BLANK,
    DEFAULT_PADDING, HALT_STATE, INPUT_BLANK_SYMBOL,
};

/// Step bound used for generated word programs.
const WORD_PROGRAM_MAX_STEPS: usize = 50;

fn state_name(index: usize) -> String {
    format!("q{index}")
}

/// Lists the rules that write `letters` left to right on a blank tape.
///
/// State `q{i}` writes letter `i` on a blank cell and moves right into `q{i+1}`.
/// If it finds its own letter already there it moves right and stays in `q{i}`.
/// The final state writes a blank in place and enters [`HALT_STATE`].
fn word_rules(letters: &[Symbol]) -> Vec<(String, Symbol, Transition)> {
    let mut rules = Vec::with_capacity(letters.len() * 2 + 1);

    for (i, &letter) in letters.iter().enumerate() {
        let state = state_name(i);
        rules.push((
            state.clone(),
            BLANK,
            Transition::new(letter, Direction::Right, state_name(i + 1)),
        ));
        rules.push((
            state.clone(),
            letter,
            Transition::new(letter, Direction::Right, state),
        ));
    }

    rules.push((
        state_name(letters.len()),
        BLANK,
        Transition::new(BLANK, Direction::Stay, HALT_STATE),
    ));

    rules
}

/// Builds a transition table that writes `letters` starting at the head, then halts.
///
/// # Returns
///
/// * `Err(AutomatonError::DuplicateTransition)` if a letter is the blank symbol.
pub fn write_word(letters: &[Symbol]) -> Result<TransitionTable> {
    word_rules(letters)
        .into_iter()
        .try_fold(TransitionTable::new(), |table, (state, read, transition)| {
            table.with_rule(state, read, transition)
        })
}

/// Wraps [`write_word`] into a complete [`Program`] document starting in `q0`.
pub fn word_program(word: &str) -> Result<Program> {
    let letters: Vec<Symbol> = word.chars().collect();

    if let Some(&c) = letters.iter().find(|&&c| c == INPUT_BLANK_SYMBOL) {
        return Err(AutomatonError::InvalidSymbol(c.to_string()));
    }

    // Validates the rule set before it is turned into a document
    write_word(&letters)?;

    let rules = word_rules(&letters)
        .into_iter()
        .map(|(state, read, t)| RuleDef {
            state,
            read: read.to_string(),
            write: t.write.to_string(),
            movement: t.direction.to_string(),
            next: t.next_state,
        })
        .collect();

    Ok(Program {
        name: format!("Write '{word}'"),
        initial_state: state_name(0),
        halt_states: vec![HALT_STATE.to_string()],
        max_steps: WORD_PROGRAM_MAX_STEPS,
        padding: DEFAULT_PADDING,
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::TapeAutomaton;
    use crate::types::HaltReason;

    #[test]
    fn test_write_word_table_shape() {
        let table = write_word(&['M', 'A', 'T', 'E', 'O']).unwrap();

        // Two rules per letter plus the final halt rule
        assert_eq!(table.len(), 11);
        assert_eq!(
            table.get("q0", BLANK),
            Some(&Transition::new('M', Direction::Right, "q1"))
        );
        assert_eq!(
            table.get("q2", 'T'),
            Some(&Transition::new('T', Direction::Right, "q2"))
        );
        assert_eq!(
            table.get("q5", BLANK),
            Some(&Transition::new(BLANK, Direction::Stay, "HALT"))
        );
    }

    #[test]
    fn test_write_word_runs_to_halt() {
        let table = write_word(&['M', 'A', 'T', 'E', 'O']).unwrap();
        let mut machine = TapeAutomaton::new(table, "q0", [HALT_STATE]);

        let records = machine.run(50);

        assert_eq!(records.len(), 6);
        assert_eq!(machine.halt_reason(), Some(HaltReason::Accepted));
        assert_eq!(machine.text(), "MATEO");
        assert_eq!(machine.contents(), "MATEO⊔");
        assert_eq!(machine.snapshot(0), " M  A  T  E  O [⊔]");
    }

    #[test]
    fn test_empty_word_halts_immediately() {
        let table = write_word(&[]).unwrap();
        let mut machine = TapeAutomaton::new(table, "q0", [HALT_STATE]);

        assert_eq!(machine.run(10).len(), 1);
        assert_eq!(machine.text(), "");
    }

    #[test]
    fn test_blank_letter_is_rejected() {
        let err = write_word(&['a', BLANK]).unwrap_err();
        assert_eq!(err, AutomatonError::DuplicateTransition("q1".to_string(), BLANK));
    }

    #[test]
    fn test_word_program_matches_table() {
        let program = word_program("HI").unwrap();

        assert_eq!(program.initial_state, "q0");
        assert_eq!(program.max_steps, 50);
        assert_eq!(program.rules.len(), 5);
        assert_eq!(program.table().unwrap(), write_word(&['H', 'I']).unwrap());

        let mut machine = TapeAutomaton::from_program(&program).unwrap();
        machine.run(program.max_steps);
        assert_eq!(machine.text(), "HI");
    }

    #[test]
    fn test_word_program_rejects_input_blank() {
        assert_eq!(
            word_program("a_b").unwrap_err(),
            AutomatonError::InvalidSymbol("_".to_string())
        );
    }
}
