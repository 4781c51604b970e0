//! Position mapper: FDI tooth codes to grid cells.
//!
//! Rows follow the printed form: upper right, upper left, lower left, lower right. The upper right
//! row of both grids and the lower right row of the temporary grid run in descending order; every
//! other row ascends.

use crate::constants::{PERMANENT_COLS, PERMANENT_ROWS, TEMPORARY_COLS, TEMPORARY_ROWS};
use form033_types::{Dentition, ToothCode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

static PERMANENT_LAYOUT: [[u8; PERMANENT_COLS]; PERMANENT_ROWS] = [
    [18, 17, 16, 15, 14, 13, 12, 11],
    [21, 22, 23, 24, 25, 26, 27, 28],
    [31, 32, 33, 34, 35, 36, 37, 38],
    [41, 42, 43, 44, 45, 46, 47, 48],
];

static TEMPORARY_LAYOUT: [[u8; TEMPORARY_COLS]; TEMPORARY_ROWS] = [
    [55, 54, 53, 52, 51],
    [61, 62, 63, 64, 65],
    [71, 72, 73, 74, 75],
    [85, 84, 83, 82, 81],
];

/// Grid shape `(rows, cols)` for a dentition.
pub const fn dimensions(dentition: Dentition) -> (usize, usize) {
    match dentition {
        Dentition::Permanent => (PERMANENT_ROWS, PERMANENT_COLS),
        Dentition::Temporary => (TEMPORARY_ROWS, TEMPORARY_COLS),
    }
}

fn layout_rows(dentition: Dentition) -> Vec<&'static [u8]> {
    match dentition {
        Dentition::Permanent => PERMANENT_LAYOUT.iter().map(|r| &r[..]).collect(),
        Dentition::Temporary => TEMPORARY_LAYOUT.iter().map(|r| &r[..]).collect(),
    }
}

/// Cell of `code` in the grid of `dentition`; `None` if the code is not on that grid.
pub fn position_for(dentition: Dentition, code: ToothCode) -> Option<GridPosition> {
    let number = code.number();
    layout_rows(dentition).into_iter().enumerate().find_map(|(row, codes)| {
        codes
            .iter()
            .position(|c| *c == number)
            .map(|col| GridPosition { row, col })
    })
}

/// Inverse of [`position_for`].
pub fn code_at(dentition: Dentition, row: usize, col: usize) -> Option<ToothCode> {
    let number = layout_rows(dentition).get(row)?.get(col).copied()?;
    ToothCode::from_number(number).ok()
}

/// Every tooth code of a dentition's grid in row-major order.
pub fn codes(dentition: Dentition) -> Vec<ToothCode> {
    layout_rows(dentition)
        .into_iter()
        .flat_map(|r| r.iter().copied())
        .filter_map(|n| ToothCode::from_number(n).ok())
        .collect()
}
