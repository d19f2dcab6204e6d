use std::collections::VecDeque;

use crate::{Direction, Symbol};

/// Two-way unbounded tape, materialized one cell at a time.
///
/// Index 0 is always the leftmost materialized cell. Cells that were never
/// visited are implicitly blank and only exist once the head reaches them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Tape {
    cells: VecDeque<Symbol>,
    head: usize,
}

impl Tape {
    /// Materializes exactly `symbols` with the head on the first cell.
    #[must_use]
    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            cells: symbols.into_iter().collect(),
            head: 0,
        }
    }

    /// Head index into the materialized cells.
    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Number of materialized cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` when no cell is materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Symbol under the head; blank when the head is past the materialized end.
    #[must_use]
    pub fn read(&self) -> Symbol {
        self.cells.get(self.head).copied().unwrap_or(Symbol::Blank)
    }

    /// Writes `symbol` under the head, materializing the cell if needed.
    pub fn write(&mut self, symbol: Symbol) {
        if self.head >= self.cells.len() {
            self.cells.resize(self.head + 1, Symbol::Blank);
        }
        self.cells[self.head] = symbol;
    }

    /// Moves the head one cell and grows the tape by one blank when the head
    /// leaves the materialized range.
    pub fn shift(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.head == 0 {
                    self.cells.push_front(Symbol::Blank);
                } else {
                    self.head -= 1;
                }
            }
            Direction::Right => {
                self.head += 1;
                if self.head >= self.cells.len() {
                    self.cells.push_back(Symbol::Blank);
                }
            }
            Direction::Stay => {}
        }
    }

    /// Materialized cells from left to right.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.cells.iter().copied().collect()
    }

    /// Splits the materialized cells into those left of the head and those
    /// from the head onwards.
    #[must_use]
    pub fn split_at_head(&self) -> (Vec<Symbol>, Vec<Symbol>) {
        let split = self.head.min(self.cells.len());
        let left = self.cells.range(..split).copied().collect();
        let right = self.cells.range(split..).copied().collect();
        (left, right)
    }
}
