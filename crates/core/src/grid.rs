//! Grid builder: populates the Form033 charts from a patient's teeth.

use crate::attributes::{extract, RankedOptionResolver};
use crate::cell::{AttributeCell, PrimaryCell};
use crate::constants::{PERMANENT_COLS, PERMANENT_ROWS, TEMPORARY_COLS, TEMPORARY_ROWS};
use crate::model::{AttributeType, Tooth};
use crate::position::{position_for, GridPosition};
use crate::resolver::primary_cell;
use form033_types::{Dentition, ToothCode};
use std::collections::BTreeMap;

/// Fixed-shape matrix of optional cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T, const R: usize, const C: usize> {
    cells: [[Option<T>; C]; R],
}

impl<T, const R: usize, const C: usize> Default for Grid<T, R, C> {
    fn default() -> Self {
        Self {
            cells: std::array::from_fn(|_| std::array::from_fn(|_| None)),
        }
    }
}

impl<T, const R: usize, const C: usize> Grid<T, R, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    /// Stores `value` at `pos`, returning the previous occupant. Out-of-range positions are ignored.
    pub fn set(&mut self, pos: GridPosition, value: T) -> Option<T> {
        self.cells
            .get_mut(pos.row)
            .and_then(|row| row.get_mut(pos.col))
            .and_then(|slot| slot.replace(value))
    }

    pub fn rows(&self) -> &[[Option<T>; C]; R] {
        &self.cells
    }

    /// Populated cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPosition, &T)> {
        self.cells.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.as_ref().map(|c| (GridPosition { row, col }, c)))
        })
    }

    pub fn populated(&self) -> usize {
        self.iter().count()
    }
}

pub type PermanentGrid<T> = Grid<T, PERMANENT_ROWS, PERMANENT_COLS>;
pub type TemporaryGrid<T> = Grid<T, TEMPORARY_ROWS, TEMPORARY_COLS>;

/// Permanent dentition: primary diagnosis plus the mobility and recession rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PermanentChart {
    pub diagnosis: PermanentGrid<PrimaryCell>,
    pub mobility: PermanentGrid<AttributeCell>,
    pub recession: PermanentGrid<AttributeCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemporaryChart {
    pub diagnosis: TemporaryGrid<PrimaryCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form033Chart {
    pub permanent: PermanentChart,
    pub temporary: TemporaryChart,
}

/// Builds charts using a ranked option source for secondary attributes.
#[derive(Clone, Debug)]
pub struct GridBuilder<O> {
    options: O,
}

impl<O: RankedOptionResolver> GridBuilder<O> {
    pub fn new(options: O) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &O {
        &self.options
    }

    /// Permanent chart. Teeth that are not on the permanent grid are skipped.
    pub fn build_permanent<'t>(&self, teeth: impl IntoIterator<Item = &'t Tooth>) -> PermanentChart {
        let mut chart = PermanentChart::default();
        for tooth in last_record_per_code(teeth, true).into_values() {
            let Some(pos) = locate(Dentition::Permanent, tooth) else {
                continue;
            };
            if let Some(cell) = primary_cell(tooth) {
                chart.diagnosis.set(pos, cell);
            }
            if let Some(cell) = extract(tooth, AttributeType::Mobility, &self.options) {
                chart.mobility.set(pos, cell);
            }
            if let Some(cell) = extract(tooth, AttributeType::Recession, &self.options) {
                chart.recession.set(pos, cell);
            }
        }
        chart
    }

    /// Temporary chart. Teeth that are not on the temporary grid are skipped.
    pub fn build_temporary<'t>(&self, teeth: impl IntoIterator<Item = &'t Tooth>) -> TemporaryChart {
        let mut chart = TemporaryChart::default();
        for tooth in last_record_per_code(teeth, true).into_values() {
            let Some(pos) = locate(Dentition::Temporary, tooth) else {
                continue;
            };
            if let Some(cell) = primary_cell(tooth) {
                chart.diagnosis.set(pos, cell);
            }
        }
        chart
    }

    /// Both charts from a full tooth collection, partitioned by dentition class.
    pub fn build(&self, teeth: &[Tooth]) -> Form033Chart {
        let (permanent, temporary): (Vec<&Tooth>, Vec<&Tooth>) = teeth
            .iter()
            .partition(|t| t.code.dentition() == Dentition::Permanent);

        Form033Chart {
            permanent: self.build_permanent(permanent),
            temporary: self.build_temporary(temporary),
        }
    }
}

/// The last record of every tooth code, in code order.
///
/// A repeated code replaces the earlier record entirely, so a later healthy record clears what an
/// earlier one would have drawn.
pub fn latest_per_code<'t>(teeth: impl IntoIterator<Item = &'t Tooth>) -> BTreeMap<ToothCode, &'t Tooth> {
    last_record_per_code(teeth, false)
}

fn last_record_per_code<'t>(
    teeth: impl IntoIterator<Item = &'t Tooth>,
    warn_on_duplicate: bool,
) -> BTreeMap<ToothCode, &'t Tooth> {
    let mut latest = BTreeMap::new();
    for tooth in teeth {
        if latest.insert(tooth.code, tooth).is_some() && warn_on_duplicate {
            tracing::warn!(tooth = %tooth.code, "duplicate tooth record; keeping the last one");
        }
    }
    latest
}

fn locate(dentition: Dentition, tooth: &Tooth) -> Option<GridPosition> {
    let pos = position_for(dentition, tooth.code);
    if pos.is_none() {
        tracing::debug!(tooth = %tooth.code, dentition = dentition.as_str(), "tooth not on grid; skipped");
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::StaticRankedOptions;
    use crate::model::{AttributeBag, CatalogEntry, Finding, Surface};
    use chrono::{DateTime, Utc};
    use form033_types::{NonEmptyText, ToothCode};
    use uuid::Uuid;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).expect("timestamp")
    }

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).expect("text")
    }

    fn tooth(code: &str) -> Tooth {
        Tooth::new(ToothCode::parse(code).expect("code"))
    }

    fn finding(key: &str, priority: i32, symbol: &str) -> Finding {
        Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(text(key), priority).with_symbol(symbol),
            at(0),
        )
    }

    fn builder() -> GridBuilder<StaticRankedOptions> {
        GridBuilder::new(StaticRankedOptions::standard())
    }

    #[test]
    fn grid_starts_empty_and_ignores_out_of_range() {
        let mut grid: TemporaryGrid<u8> = Grid::new();
        assert_eq!(grid.populated(), 0);
        assert_eq!(grid.set(GridPosition { row: 4, col: 0 }, 1), None);
        assert_eq!(grid.set(GridPosition { row: 0, col: 5 }, 1), None);
        assert_eq!(grid.populated(), 0);

        assert_eq!(grid.set(GridPosition { row: 3, col: 4 }, 7), None);
        assert_eq!(grid.set(GridPosition { row: 3, col: 4 }, 8), Some(7));
        assert_eq!(grid.get(3, 4), Some(&8));
    }

    #[test]
    fn first_permanent_row_matches_form() {
        let teeth = vec![
            tooth("18").with_surface(
                Surface::new("oclusal").with_finding(finding("caries", 5, "O_rojo")),
            ),
            tooth("17").with_surface(
                Surface::new("oclusal").with_finding(finding("obturacion", 2, "o_azul")),
            ),
            tooth("15").mark_absent(),
            tooth("16"),
            tooth("14"),
        ];

        let chart = builder().build(&teeth);
        let row: Vec<Option<&str>> = chart.permanent.diagnosis.rows()[0]
            .iter()
            .map(|c| c.as_ref().map(|cell| cell.symbol.key))
            .collect();

        assert_eq!(
            row,
            vec![
                Some("O_rojo"),
                Some("o_azul"),
                None,
                Some("A"),
                None,
                None,
                None,
                None
            ]
        );
        let absent = chart.permanent.diagnosis.get(0, 3).expect("absent cell");
        assert!(absent.surfaces.is_empty());
        assert_eq!(chart.permanent.diagnosis.populated(), 3);
        assert_eq!(chart.temporary.diagnosis.populated(), 0);
    }

    #[test]
    fn unknown_codes_are_omitted_from_both_grids() {
        let teeth = vec![
            tooth("19").with_surface(
                Surface::new("oclusal").with_finding(finding("caries", 5, "O_rojo")),
            ),
            tooth("99").mark_absent(),
            tooth("56").mark_absent(),
        ];
        let chart = builder().build(&teeth);
        assert_eq!(chart, Form033Chart::default());
    }

    #[test]
    fn temporary_teeth_land_on_temporary_grid() {
        let teeth = vec![
            tooth("85").mark_absent(),
            tooth("61").with_surface(
                Surface::new("vestibular").with_finding(finding("caries", 5, "O_rojo")),
            ),
        ];
        let chart = builder().build(&teeth);
        assert!(chart.temporary.diagnosis.get(3, 0).expect("85").is_absent());
        assert_eq!(
            chart.temporary.diagnosis.get(1, 0).map(|c| c.symbol.key),
            Some("O_rojo")
        );
        assert_eq!(chart.permanent.diagnosis.populated(), 0);
    }

    #[test]
    fn attributes_fill_auxiliary_rows_independently() {
        let mobility = Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(text("movilidad_dental"), 3),
            at(0),
        )
        .with_attributes(AttributeBag::new().with(AttributeType::Mobility, text("grado_1")));
        let recession = Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(text("recesion_gingival"), 2),
            at(0),
        );

        let teeth = vec![
            tooth("41").with_surface(Surface::new("vestibular").with_finding(mobility)),
            tooth("48")
                .mark_absent()
                .with_surface(Surface::new("vestibular").with_finding(recession)),
        ];
        let chart = builder().build_permanent(&teeth);

        assert!(chart.diagnosis.get(3, 0).is_none());
        assert_eq!(chart.mobility.get(3, 0).map(|c| c.rank), Some(2));
        assert!(chart.recession.get(3, 0).is_none());

        assert!(chart.diagnosis.get(3, 7).expect("absent").is_absent());
        assert!(chart.recession.get(3, 7).expect("default").is_default());
    }

    #[test]
    fn later_duplicate_replaces_every_cell() {
        let mobility = Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(text("movilidad_dental"), 3),
            at(0),
        )
        .with_attributes(AttributeBag::new().with(AttributeType::Mobility, text("grado_2")));
        let teeth = vec![
            tooth("18")
                .with_surface(Surface::new("oclusal").with_finding(finding("caries", 5, "O_rojo")))
                .with_surface(Surface::new("vestibular").with_finding(mobility)),
            tooth("18"),
            tooth("55").mark_absent(),
            tooth("55").with_surface(
                Surface::new("oclusal").with_finding(finding("fluorosis", 9, "F_morado")),
            ),
        ];
        let chart = builder().build(&teeth);

        assert!(chart.permanent.diagnosis.get(0, 0).is_none());
        assert!(chart.permanent.mobility.get(0, 0).is_none());
        assert!(chart.temporary.diagnosis.get(0, 0).is_none());
        assert_eq!(chart, Form033Chart::default());
    }

    #[test]
    fn later_duplicate_with_finding_wins() {
        let teeth = vec![
            tooth("26").mark_absent(),
            tooth("26").with_surface(
                Surface::new("mesial").with_finding(finding("obturacion", 2, "o_azul")),
            ),
        ];
        let chart = builder().build_permanent(&teeth);
        let cell = chart.diagnosis.get(1, 5).expect("26");
        assert_eq!(cell.symbol.key, "o_azul");
        assert_eq!(latest_per_code(&teeth).len(), 1);
    }

    #[test]
    fn build_is_independent_of_tooth_order() {
        let mut teeth = vec![
            tooth("11").with_surface(
                Surface::new("vestibular").with_finding(finding("caries", 5, "O_rojo")),
            ),
            tooth("36").mark_absent(),
            tooth("54").with_surface(
                Surface::new("oclusal").with_finding(finding("sellante", 1, "U_azul")),
            ),
        ];
        let forward = builder().build(&teeth);
        teeth.reverse();
        assert_eq!(builder().build(&teeth), forward);
    }
}
