//! Tabular export of an execution trace.
//!
//! Each [`StepRecord`] becomes one row. Persisting the result is left to the caller.

use crate::types::{Result, StepRecord};

/// Column names of the CSV export, in order.
pub const CSV_HEADER: [&str; 8] = [
    "step",
    "state",
    "head",
    "read",
    "write",
    "move",
    "next_state",
    "tape",
];

/// Renders the records as CSV with a header row.
///
/// `state` is the state after a transition, or the state the machine was stuck in
/// for a halt by omission; `next_state` is always the state after the step.
/// `write` and `move` are empty for a halt by omission. Fields containing a comma,
/// a quote or a line break are quoted.
pub fn to_csv(records: &[StepRecord]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');

    for record in records {
        let state = if record.is_omission() {
            &record.state_before
        } else {
            &record.state_after
        };

        let row = [
            record.step.to_string(),
            state.clone(),
            record.head_after.to_string(),
            record.read.to_string(),
            record.write.map(|c| c.to_string()).unwrap_or_default(),
            record.movement.map(|d| d.to_string()).unwrap_or_default(),
            record.state_after.clone(),
            record.tape.clone(),
        ];

        let row = row.iter().map(|f| escape(f)).collect::<Vec<_>>().join(",");
        out.push_str(&row);
        out.push('\n');
    }

    out
}

/// Renders the records as a pretty-printed JSON array.
pub fn to_json(records: &[StepRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
