//! Diagnosis resolver: one representative finding per tooth.

use crate::catalog::{self, SymbolEntry};
use crate::cell::PrimaryCell;
use crate::model::{Finding, Tooth};
use form033_types::SurfaceLetter;
use std::collections::BTreeSet;

/// The winning finding of a tooth and the surfaces touched by every eligible finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Representative<'a> {
    pub finding: &'a Finding,
    pub surfaces: BTreeSet<SurfaceLetter>,
}

/// Outcome of resolving one tooth.
///
/// `Healthy` and `Unmapped` both render as an empty cell; only the log tells them apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    Absent,
    Healthy,
    Unmapped(Representative<'a>),
    Mapped(Representative<'a>, &'static SymbolEntry),
}

/// Picks the representative among the tooth's active, non-reserved findings.
///
/// Ordering is `(priority, recorded_at, id)`, so equal findings never depend on traversal order.
/// The absent flag is not consulted here; see [`resolve_tooth`].
pub fn select_representative(tooth: &Tooth) -> Option<Representative<'_>> {
    let mut surfaces = BTreeSet::new();
    let mut best: Option<&Finding> = None;

    for (surface, finding) in tooth.active_findings() {
        if finding.diagnosis.reserved_attribute().is_some() {
            continue;
        }
        if let Some(letter) = surface.letter() {
            surfaces.insert(letter);
        }
        let wins = best.is_none_or(|current| ordering_key(finding) > ordering_key(current));
        if wins {
            best = Some(finding);
        }
    }

    best.map(|finding| Representative { finding, surfaces })
}

fn ordering_key(finding: &Finding) -> (i32, chrono::DateTime<chrono::Utc>, uuid::Uuid) {
    (finding.diagnosis.priority, finding.recorded_at, finding.id)
}

pub fn resolve_tooth(tooth: &Tooth) -> Resolution<'_> {
    if tooth.absent {
        return Resolution::Absent;
    }
    let Some(representative) = select_representative(tooth) else {
        return Resolution::Healthy;
    };
    match representative
        .finding
        .diagnosis
        .symbol_key
        .as_deref()
        .and_then(catalog::resolve)
    {
        Some(symbol) => Resolution::Mapped(representative, symbol),
        None => Resolution::Unmapped(representative),
    }
}

/// Primary grid cell for a tooth, or `None` when nothing is drawn.
pub fn primary_cell(tooth: &Tooth) -> Option<PrimaryCell> {
    match resolve_tooth(tooth) {
        Resolution::Absent => Some(PrimaryCell::absent(tooth.code)),
        Resolution::Healthy => None,
        Resolution::Unmapped(rep) => {
            tracing::warn!(
                tooth = %tooth.code,
                diagnosis = %rep.finding.diagnosis.key,
                symbol_key = rep.finding.diagnosis.symbol_key.as_deref().unwrap_or("<none>"),
                finding_id = %rep.finding.id,
                "diagnosis has no symbol in the catalog; tooth drawn as healthy"
            );
            None
        }
        Resolution::Mapped(rep, symbol) => Some(PrimaryCell {
            tooth: tooth.code,
            symbol,
            surfaces: rep.surfaces,
            diagnosis_key: Some(rep.finding.diagnosis.key.clone()),
            source_finding: Some(rep.finding.id),
            source_recorded_at: Some(rep.finding.recorded_at),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeBag, AttributeType, CatalogEntry, Surface};
    use chrono::{DateTime, Utc};
    use form033_types::{NonEmptyText, ToothCode};
    use uuid::Uuid;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).expect("timestamp")
    }

    fn entry(key: &str, priority: i32, symbol: &str) -> CatalogEntry {
        CatalogEntry::new(NonEmptyText::new(key).expect("key"), priority).with_symbol(symbol)
    }

    fn caries(secs: i64) -> Finding {
        Finding::new(Uuid::new_v4(), entry("caries", 5, "O_rojo"), at(secs))
    }

    fn restoration(secs: i64) -> Finding {
        Finding::new(Uuid::new_v4(), entry("obturacion", 2, "o_azul"), at(secs))
    }

    fn tooth(code: &str) -> Tooth {
        Tooth::new(ToothCode::parse(code).expect("code"))
    }

    fn letters(cell: &PrimaryCell) -> Vec<char> {
        cell.surfaces.iter().map(|s| s.as_char()).collect()
    }

    #[test]
    fn absent_tooth_ignores_findings() {
        let t = tooth("15")
            .mark_absent()
            .with_surface(Surface::new("oclusal").with_finding(caries(0)));

        assert_eq!(resolve_tooth(&t), Resolution::Absent);
        let cell = primary_cell(&t).expect("absent cell");
        assert!(cell.is_absent());
        assert_eq!(cell.symbol.glyph, "A");
        assert!(cell.surfaces.is_empty());
        assert_eq!(cell.source_finding, None);
    }

    #[test]
    fn single_finding_is_representative() {
        let finding = caries(0);
        let id = finding.id;
        let t = tooth("16").with_surface(Surface::new("mesial").with_finding(finding));

        let cell = primary_cell(&t).expect("cell");
        assert_eq!(cell.source_finding, Some(id));
        assert_eq!(cell.source_recorded_at, Some(at(0)));
        assert_eq!(letters(&cell), vec!['M']);
        assert_eq!(cell.symbol.key, "O_rojo");
    }

    #[test]
    fn higher_priority_wins_regardless_of_order() {
        for caries_first in [true, false] {
            let (c, r) = (caries(0), restoration(100));
            let expected = c.id;
            let findings = if caries_first { vec![c, r] } else { vec![r, c] };
            let mut surface = Surface::new("oclusal");
            surface.findings = findings;
            let t = tooth("26").with_surface(surface);

            let cell = primary_cell(&t).expect("cell");
            assert_eq!(cell.source_finding, Some(expected));
            assert_eq!(cell.symbol.key, "O_rojo");
        }
    }

    #[test]
    fn equal_priority_prefers_most_recent() {
        let older = caries(0);
        let newer = caries(60);
        let expected = newer.id;
        let t = tooth("36")
            .with_surface(Surface::new("oclusal").with_finding(newer))
            .with_surface(Surface::new("distal").with_finding(older));

        let cell = primary_cell(&t).expect("cell");
        assert_eq!(cell.source_finding, Some(expected));
    }

    #[test]
    fn full_ties_break_on_finding_id() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let make = |id| Finding::new(id, entry("caries", 5, "O_rojo"), at(0));

        for order in [[low, high], [high, low]] {
            let t = tooth("11").with_surface(
                Surface::new("vestibular")
                    .with_finding(make(order[0]))
                    .with_finding(make(order[1])),
            );
            let cell = primary_cell(&t).expect("cell");
            assert_eq!(cell.source_finding, Some(high));
        }
    }

    #[test]
    fn surfaces_are_union_of_eligible_findings() {
        let c = caries(0);
        let expected = c.id;
        let t = tooth("46")
            .with_surface(Surface::new("oclusal").with_finding(c))
            .with_surface(Surface::new("distal").with_finding(restoration(100)));

        let cell = primary_cell(&t).expect("cell");
        assert_eq!(letters(&cell), vec!['D', 'O']);
        assert_eq!(cell.source_finding, Some(expected));
        assert_eq!(cell.symbol.color, catalog::RED);
    }

    #[test]
    fn malformed_surface_names_are_dropped() {
        let t = tooth("21")
            .with_surface(Surface::new("incisal").with_finding(caries(0)))
            .with_surface(Surface::new("cara_palatino").with_finding(restoration(0)));

        let cell = primary_cell(&t).expect("cell");
        assert_eq!(letters(&cell), vec!['L']);
        assert_eq!(cell.symbol.key, "O_rojo");
    }

    #[test]
    fn reserved_and_inactive_findings_are_not_eligible() {
        let mobility = Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(NonEmptyText::new("movilidad_dental").expect("key"), 99),
            at(0),
        )
        .with_attributes(AttributeBag::new().with(
            AttributeType::Mobility,
            NonEmptyText::new("grado_2").expect("grade"),
        ));
        let t = tooth("31").with_surface(
            Surface::new("vestibular")
                .with_finding(mobility)
                .with_finding(caries(0).inactive()),
        );

        assert_eq!(resolve_tooth(&t), Resolution::Healthy);
        assert_eq!(primary_cell(&t), None);
    }

    #[test]
    fn unmapped_symbol_renders_as_empty() {
        let unmapped = Finding::new(Uuid::new_v4(), entry("fluorosis", 9, "F_morado"), at(0));
        let no_symbol = Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(NonEmptyText::new("control").expect("key"), 1),
            at(0),
        );
        let t = tooth("12").with_surface(Surface::new("vestibular").with_finding(unmapped));
        assert!(matches!(resolve_tooth(&t), Resolution::Unmapped(_)));
        assert_eq!(primary_cell(&t), None);

        let t = tooth("13").with_surface(Surface::new("vestibular").with_finding(no_symbol));
        assert!(matches!(resolve_tooth(&t), Resolution::Unmapped(_)));
        assert_eq!(primary_cell(&t), None);
    }
}
