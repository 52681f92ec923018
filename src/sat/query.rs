use super::*;

/// One cell of the literal–clause incidence matrix: `(literal index, clause index)`.
pub type Cell = (u32, u32);

/// Structural snapshot of a partial assignment, as seen by the oracle.
///
/// `free` is sorted and duplicate-free. Only clauses that are neither
/// satisfied nor reduced below two open literals contribute cells.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchQuery {
    free: Vec<Var>,
    cells: Vec<Cell>,
}

impl SearchQuery {
    pub fn new(free: Vec<Var>, cells: Vec<Cell>) -> Self {
        debug_assert!(free.windows(2).all(|w| w[0] < w[1]));
        Self { free, cells }
    }
    pub fn free(&self) -> &[Var] {
        &self.free
    }
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
    pub fn is_closed(&self) -> bool {
        self.free.is_empty()
    }
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}
