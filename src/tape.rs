//! This module defines the sparse `Tape`: a mapping from signed cell index to symbol that
//! is semantically infinite in both directions. Cells that were never written read as the
//! blank symbol and are never stored.

use crate::types::{Symbol, BLANK};
use std::collections::BTreeMap;

/// A sparse, unbounded tape.
///
/// The tape remembers the inclusive range of indices that were ever written.
/// That range starts as `0..=0`, only grows, and bounds every rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: BTreeMap<i64, Symbol>,
    blank: Symbol,
    min_written: i64,
    max_written: i64,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    /// Creates an empty tape using [`BLANK`].
    pub fn new() -> Self {
        Self::with_blank(BLANK)
    }

    /// Creates an empty tape with a custom blank symbol.
    pub fn with_blank(blank: Symbol) -> Self {
        Self {
            cells: BTreeMap::new(),
            blank,
            min_written: 0,
            max_written: 0,
        }
    }

    /// Returns the symbol at `index`, or the blank symbol if it was never written.
    pub fn read(&self, index: i64) -> Symbol {
        self.cells.get(&index).copied().unwrap_or(self.blank)
    }

    /// Stores `symbol` at `index` and extends the written extent.
    ///
    /// Writing the blank symbol is still a write: the cell is stored and the
    /// extent grows to cover it.
    pub fn write(&mut self, index: i64, symbol: Symbol) {
        self.cells.insert(index, symbol);
        self.min_written = self.min_written.min(index);
        self.max_written = self.max_written.max(index);
    }

    pub fn min_written(&self) -> i64 {
        self.min_written
    }

    pub fn max_written(&self) -> i64 {
        self.max_written
    }

    /// Number of cells that hold an explicitly written value.
    pub fn written_cells(&self) -> usize {
        self.cells.len()
    }

    /// Iterates the explicitly written cells in index order.
    pub fn cells(&self) -> impl Iterator<Item = (i64, Symbol)> + '_ {
        self.cells.iter().map(|(&i, &s)| (i, s))
    }

    /// Renders the tape from `min_written - padding` to `max_written + padding`.
    ///
    /// The cell under `head` is shown as `[s]`, every other cell as ` s `.
    ///
    /// ```text
    ///  ⊔  ⊔  M  A [⊔] ⊔  ⊔
    /// ```
    pub fn render(&self, head: i64, padding: usize) -> String {
        let (left, right) = self.bounds(padding);
        (left..=right)
            .map(|i| {
                let symbol = self.read(i);
                if i == head {
                    format!("[{symbol}]")
                } else {
                    format!(" {symbol} ")
                }
            })
            .collect()
    }

    /// Inclusive index range covered by a rendering with `padding` cells on each side.
    /// Paddings that do not fit the index type clamp to the ends of the tape.
    fn bounds(&self, padding: usize) -> (i64, i64) {
        let padding = i64::try_from(padding).unwrap_or(i64::MAX);
        (
            self.min_written.saturating_sub(padding),
            self.max_written.saturating_add(padding),
        )
    }

    /// Concatenates the cells from `min_written` to `max_written` with no padding
    /// and no head marker.
    pub fn contents(&self) -> String {
        (self.min_written..=self.max_written)
            .map(|i| self.read(i))
            .collect()
    }

    /// Like [`Tape::contents`], with blank cells trimmed from both ends.
    pub fn text(&self) -> String {
        self.contents()
            .trim_matches(self.blank)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_cells_are_blank() {
        let tape = Tape::new();

        assert_eq!(tape.read(0), BLANK);
        assert_eq!(tape.read(-1_000_000), BLANK);
        assert_eq!(tape.read(1_000_000), BLANK);
        assert_eq!(tape.written_cells(), 0);
    }

    #[test]
    fn test_reads_do_not_materialize_cells() {
        let tape = Tape::new();
        for i in -50..50 {
            tape.read(i);
        }
        assert_eq!(tape.written_cells(), 0);
        assert_eq!((tape.min_written(), tape.max_written()), (0, 0));
    }

    #[test]
    fn test_write_extends_extent() {
        let mut tape = Tape::new();
        tape.write(3, 'x');
        tape.write(-2, 'y');

        assert_eq!(tape.min_written(), -2);
        assert_eq!(tape.max_written(), 3);

        // Overwriting inside the range leaves it unchanged
        tape.write(0, 'z');
        assert_eq!((tape.min_written(), tape.max_written()), (-2, 3));
    }

    #[test]
    fn test_writing_blank_counts_as_write() {
        let mut tape = Tape::new();
        tape.write(-4, BLANK);

        assert_eq!(tape.min_written(), -4);
        assert_eq!(tape.written_cells(), 1);
        assert_eq!(tape.read(-4), BLANK);
        assert_eq!(tape.contents(), "⊔⊔⊔⊔⊔");
        assert_eq!(tape.text(), "");
    }

    #[test]
    fn test_render_marks_head() {
        let mut tape = Tape::new();
        tape.write(0, 'A');
        tape.write(1, 'B');

        assert_eq!(tape.render(1, 0), " A [B]");
        assert_eq!(tape.render(0, 1), " ⊔ [A] B  ⊔ ");
    }

    #[test]
    fn test_render_head_outside_range() {
        let tape = Tape::new();

        // Only the origin cell is in range; the head at 5 is not drawn
        assert_eq!(tape.render(5, 0), " ⊔ ");
        assert_eq!(tape.render(0, 0), "[⊔]");
    }

    #[test]
    fn test_render_bounds_clamp_large_padding() {
        let mut tape = Tape::new();
        tape.write(0, 'A');

        assert_eq!(tape.bounds(0), (0, 0));
        assert_eq!(tape.bounds(3), (-3, 3));
        // Paddings past i64::MAX must neither wrap to an empty range nor overflow
        assert_eq!(tape.bounds(usize::MAX), (i64::MIN, i64::MAX));
        assert_eq!(tape.bounds(1usize << 63), (i64::MIN, i64::MAX));

        tape.write(-5, 'B');
        tape.write(7, 'C');
        let max = i64::MAX as usize;
        assert_eq!(tape.bounds(max), (i64::MIN, i64::MAX));
        assert_eq!(tape.bounds(max - 10), (i64::MIN + 6, i64::MAX - 3));
        assert_eq!(tape.render(0, 0), " B  ⊔  ⊔  ⊔  ⊔ [A] ⊔  ⊔  ⊔  ⊔  ⊔  ⊔  C ");
    }

    #[test]
    fn test_contents_fills_gaps_with_blank() {
        let mut tape = Tape::with_blank('_');
        tape.write(0, 'a');
        tape.write(2, 'c');

        assert_eq!(tape.contents(), "a_c");
        assert_eq!(tape.text(), "a_c");
        assert_eq!(tape.cells().collect::<Vec<_>>(), vec![(0, 'a'), (2, 'c')]);
    }
}
