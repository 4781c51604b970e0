//! Dental indices derived from the built charts.

use crate::catalog::{self, SymbolKind};
use crate::grid::{latest_per_code, Form033Chart};
use crate::model::Tooth;
use crate::position::position_for;
use form033_types::Dentition;
use std::fmt;

/// WHO caries-risk band of a CPO-D value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CariesRisk {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl CariesRisk {
    pub const fn from_total(total: u32) -> Self {
        match total {
            0..=1 => Self::VeryLow,
            2 => Self::Low,
            3..=4 => Self::Moderate,
            5..=6 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryLow => "Muy bajo",
            Self::Low => "Bajo",
            Self::Moderate => "Moderado",
            Self::High => "Alto",
            Self::VeryHigh => "Muy alto",
        }
    }
}

/// Decayed, missing and filled permanent teeth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpoIndex {
    pub decayed: u32,
    pub missing: u32,
    pub filled: u32,
}

impl CpoIndex {
    pub const fn total(&self) -> u32 {
        self.decayed + self.missing + self.filled
    }
}

/// Decayed, extraction-indicated and filled temporary teeth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CeoIndex {
    pub decayed: u32,
    pub extraction_indicated: u32,
    pub filled: u32,
}

impl CeoIndex {
    pub const fn total(&self) -> u32 {
        self.decayed + self.extraction_indicated + self.filled
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DentalIndices {
    pub cpo: CpoIndex,
    pub ceo: CeoIndex,
    pub permanent_with_diagnosis: u32,
    pub temporary_with_diagnosis: u32,
    pub healthy: u32,
}

fn is_done_treatment(kind: SymbolKind) -> bool {
    matches!(
        kind,
        SymbolKind::Restored
            | SymbolKind::SealantDone
            | SymbolKind::CrownDone
            | SymbolKind::FixedProsthesisDone
            | SymbolKind::RemovableProsthesisDone
    )
}

fn is_loss(kind: SymbolKind) -> bool {
    matches!(
        kind,
        SymbolKind::Lost | SymbolKind::LostOtherCause | SymbolKind::ExtractionOtherCause
    )
}

/// Semantic kinds of every active, non-reserved finding of a tooth with a catalog symbol.
fn finding_kinds(tooth: &Tooth) -> Vec<SymbolKind> {
    tooth
        .active_findings()
        .filter(|(_, f)| f.diagnosis.reserved_attribute().is_none())
        .filter_map(|(_, f)| f.diagnosis.symbol_key.as_deref().and_then(catalog::resolve))
        .map(|symbol| symbol.kind)
        .collect()
}

impl CpoIndex {
    /// Counts one permanent tooth. Loss beats caries, and caries beats a done treatment even
    /// when both are recorded.
    fn add(&mut self, tooth: &Tooth) {
        let kinds = finding_kinds(tooth);
        if tooth.absent || kinds.iter().copied().any(is_loss) {
            self.missing += 1;
        } else if kinds.contains(&SymbolKind::Caries) {
            self.decayed += 1;
        } else if kinds.iter().copied().any(is_done_treatment) {
            self.filled += 1;
        }
    }
}

impl CeoIndex {
    /// Counts one temporary tooth: extraction indicated, then caries, then a done treatment.
    fn add(&mut self, tooth: &Tooth) {
        if tooth.absent {
            return;
        }
        let kinds = finding_kinds(tooth);
        if kinds.contains(&SymbolKind::ExtractionIndicated) {
            self.extraction_indicated += 1;
        } else if kinds.contains(&SymbolKind::Caries) {
            self.decayed += 1;
        } else if kinds.iter().copied().any(is_done_treatment) {
            self.filled += 1;
        }
    }
}

impl fmt::Display for CpoIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPO-D: {} (C={}, P={}, O={})",
            self.total(),
            self.decayed,
            self.missing,
            self.filled
        )
    }
}

impl fmt::Display for CeoIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ceo-d: {} (c={}, e={}, o={})",
            self.total(),
            self.decayed,
            self.extraction_indicated,
            self.filled
        )
    }
}

impl DentalIndices {
    /// Index counts for the teeth drawn on `chart`.
    ///
    /// Each mapped tooth (last record per code) is classified from all of its findings rather than
    /// the representative alone. Healthy teeth are mapped, not absent, and have no primary cell.
    pub fn from_chart(chart: &Form033Chart, teeth: &[Tooth]) -> Self {
        let mut indices = Self {
            permanent_with_diagnosis: count(chart.permanent.diagnosis.populated()),
            temporary_with_diagnosis: count(chart.temporary.diagnosis.populated()),
            ..Self::default()
        };

        for tooth in latest_per_code(teeth).into_values() {
            let dentition = tooth.code.dentition();
            let Some(pos) = position_for(dentition, tooth.code) else {
                continue;
            };
            let drawn = match dentition {
                Dentition::Permanent => {
                    indices.cpo.add(tooth);
                    chart.permanent.diagnosis.get(pos.row, pos.col).is_some()
                }
                Dentition::Temporary => {
                    indices.ceo.add(tooth);
                    chart.temporary.diagnosis.get(pos.row, pos.col).is_some()
                }
            };
            if !tooth.absent && !drawn {
                indices.healthy += 1;
            }
        }

        indices
    }

    pub fn risk(&self) -> CariesRisk {
        CariesRisk::from_total(self.cpo.total())
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// CPO-D, ceo-d and risk band lines, as printed by every summary.
pub fn index_lines(indices: &DentalIndices) -> [String; 3] {
    [
        indices.cpo.to_string(),
        indices.ceo.to_string(),
        format!("Riesgo de caries: {}", indices.risk().label()),
    ]
}

/// Short plain-text summary for the observations box of the form.
pub fn clinical_summary(indices: &DentalIndices, observations: Option<&str>) -> String {
    let mut lines = index_lines(indices).to_vec();
    lines.push(format!(
        "Dientes con diagnóstico: {} permanentes, {} temporales; sanos: {}",
        indices.permanent_with_diagnosis, indices.temporary_with_diagnosis, indices.healthy
    ));
    if let Some(text) = observations.map(str::trim).filter(|t| !t.is_empty()) {
        lines.push(format!("Observaciones: {text}"));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::StaticRankedOptions;
    use crate::grid::GridBuilder;
    use crate::model::{CatalogEntry, Finding, Surface};
    use chrono::{DateTime, Utc};
    use form033_types::{NonEmptyText, ToothCode};
    use uuid::Uuid;

    fn tooth(code: &str, symbol: Option<&str>) -> Tooth {
        let t = Tooth::new(ToothCode::parse(code).expect("code"));
        match symbol {
            Some(symbol) => t.with_surface(Surface::new("oclusal").with_finding(Finding::new(
                Uuid::new_v4(),
                CatalogEntry::new(NonEmptyText::new(symbol).expect("key"), 5).with_symbol(symbol),
                DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("timestamp"),
            ))),
            None => t,
        }
    }

    fn indices_for(teeth: &[Tooth]) -> DentalIndices {
        let chart = GridBuilder::new(StaticRankedOptions::standard()).build(teeth);
        DentalIndices::from_chart(&chart, teeth)
    }

    #[test]
    fn counts_cpo_and_ceo() {
        let teeth = vec![
            tooth("18", Some("O_rojo")),
            tooth("17", Some("o_azul")),
            tooth("16", Some("X_azul")),
            tooth("15", None).mark_absent(),
            tooth("14", Some("ª_azul")),
            tooth("13", Some("r")),
            tooth("12", None),
            tooth("55", Some("O_rojo")),
            tooth("54", Some("X_rojo")),
            tooth("53", Some("U_azul")),
            tooth("19", None),
        ];
        let indices = indices_for(&teeth);

        assert_eq!(
            indices.cpo,
            CpoIndex {
                decayed: 1,
                missing: 2,
                filled: 2
            }
        );
        assert_eq!(
            indices.ceo,
            CeoIndex {
                decayed: 1,
                extraction_indicated: 1,
                filled: 1
            }
        );
        assert_eq!(indices.permanent_with_diagnosis, 6);
        assert_eq!(indices.temporary_with_diagnosis, 3);
        assert_eq!(indices.healthy, 1);
        assert_eq!(indices.risk(), CariesRisk::High);
    }

    fn with_finding(t: Tooth, symbol: &str, priority: i32) -> Tooth {
        t.with_surface(Surface::new("vestibular").with_finding(Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(NonEmptyText::new(symbol).expect("key"), priority).with_symbol(symbol),
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("timestamp"),
        )))
    }

    #[test]
    fn caries_counts_even_when_a_done_treatment_is_drawn() {
        let teeth = vec![with_finding(tooth("16", Some("O_rojo")), "ª_azul", 6)];
        let chart = GridBuilder::new(StaticRankedOptions::standard()).build(&teeth);
        let drawn = chart.permanent.diagnosis.get(0, 2).expect("16");
        assert_eq!(drawn.symbol.key, "ª_azul");

        let indices = DentalIndices::from_chart(&chart, &teeth);
        assert_eq!(
            indices.cpo,
            CpoIndex {
                decayed: 1,
                missing: 0,
                filled: 0
            }
        );
    }

    #[test]
    fn loss_beats_caries_and_caries_beats_filling() {
        let teeth = vec![
            with_finding(tooth("21", Some("O_rojo")), "ⓧ_azul", 1),
            with_finding(tooth("22", Some("o_azul")), "O_rojo", 1),
            with_finding(tooth("23", Some("U_azul")), "r", 1),
            with_finding(tooth("71", Some("O_rojo")), "X_rojo", 1),
            with_finding(tooth("72", Some("o_azul")), "O_rojo", 1),
        ];
        let indices = indices_for(&teeth);
        assert_eq!(
            indices.cpo,
            CpoIndex {
                decayed: 1,
                missing: 1,
                filled: 1
            }
        );
        assert_eq!(
            indices.ceo,
            CeoIndex {
                decayed: 1,
                extraction_indicated: 1,
                filled: 0
            }
        );
    }

    #[test]
    fn inactive_findings_do_not_count() {
        let mut t = tooth("36", Some("O_rojo"));
        t.surfaces[0].findings[0].active = false;
        let indices = indices_for(&[t]);
        assert_eq!(indices.cpo.total(), 0);
        assert_eq!(indices.healthy, 1);
    }

    #[test]
    fn duplicate_codes_count_once_using_last_record() {
        let teeth = vec![tooth("46", Some("O_rojo")), tooth("46", None)];
        let indices = indices_for(&teeth);
        assert_eq!(indices.cpo.total(), 0);
        assert_eq!(indices.permanent_with_diagnosis, 0);
        assert_eq!(indices.healthy, 1);
    }

    #[test]
    fn index_lines_are_shared_with_summary() {
        let indices = indices_for(&[tooth("46", Some("O_rojo")), tooth("85", Some("X_rojo"))]);
        let lines = index_lines(&indices);
        assert_eq!(lines[0], "CPO-D: 1 (C=1, P=0, O=0)");
        assert_eq!(lines[1], "ceo-d: 1 (c=0, e=1, o=0)");
        assert_eq!(lines[2], "Riesgo de caries: Muy bajo");

        let summary = clinical_summary(&indices, None);
        assert!(summary.starts_with(&lines.join("\n")));
        assert!(summary.ends_with('\n'));
    }

    #[test]
    fn risk_bands_follow_who_cutoffs() {
        let bands: Vec<_> = (0..=8).map(CariesRisk::from_total).collect();
        assert_eq!(
            bands,
            vec![
                CariesRisk::VeryLow,
                CariesRisk::VeryLow,
                CariesRisk::Low,
                CariesRisk::Moderate,
                CariesRisk::Moderate,
                CariesRisk::High,
                CariesRisk::High,
                CariesRisk::VeryHigh,
                CariesRisk::VeryHigh,
            ]
        );
    }

    #[test]
    fn summary_includes_observations_only_when_present() {
        let indices = indices_for(&[tooth("46", Some("O_rojo"))]);
        let summary = clinical_summary(&indices, Some("  control en 6 meses "));
        assert!(summary.starts_with("CPO-D: 1 (C=1, P=0, O=0)"));
        assert!(summary.contains("Riesgo de caries: Muy bajo"));
        assert!(summary.contains("Observaciones: control en 6 meses"));

        let summary = clinical_summary(&indices, Some("   "));
        assert!(!summary.contains("Observaciones"));
    }
}
