//! Symbol catalog: the legend printed in section K of the paper form.
//!
//! Keys, glyphs and colors must match the printed legend exactly. Any change here must bump
//! [`crate::constants::CATALOG_REVISION`].

use crate::constants::ABSENT_SYMBOL_KEY;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const RED: &str = "#FF0000";
pub const BLUE: &str = "#0000FF";
pub const BLACK: &str = "#000000";
pub const GREEN: &str = "#00AA00";

/// Ink group of a symbol: red marks pending work, blue marks work done.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolCategory {
    Red,
    Blue,
    Black,
    Green,
}

impl SymbolCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "rojo",
            Self::Blue => "azul",
            Self::Black => "negro",
            Self::Green => "verde",
        }
    }
}

/// Clinical meaning of a symbol, independent of how it is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    SealantIndicated,
    SealantDone,
    ExtractionIndicated,
    Lost,
    LostOtherCause,
    ExtractionOtherCause,
    EndodonticsIndicated,
    EndodonticsDone,
    Caries,
    Restored,
    Absent,
    FixedProsthesisIndicated,
    FixedProsthesisDone,
    RemovableProsthesisIndicated,
    RemovableProsthesisDone,
    CrownIndicated,
    CrownDone,
    TotalProsthesisIndicated,
    TotalProsthesisDone,
    Healthy,
}

impl SymbolKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SealantIndicated => "preventivo_indicado",
            Self::SealantDone => "preventivo_realizado",
            Self::ExtractionIndicated => "extraccion_indicada",
            Self::Lost => "perdido",
            Self::LostOtherCause => "perdido_otra_causa",
            Self::ExtractionOtherCause => "extraccion_otra_causa",
            Self::EndodonticsIndicated => "endodoncia_indicada",
            Self::EndodonticsDone => "endodoncia_realizada",
            Self::Caries => "patologia",
            Self::Restored => "restaurado",
            Self::Absent => "ausente",
            Self::FixedProsthesisIndicated | Self::RemovableProsthesisIndicated => {
                "protesis_indicada"
            }
            Self::FixedProsthesisDone | Self::RemovableProsthesisDone => "protesis_realizada",
            Self::CrownIndicated => "corona_indicada",
            Self::CrownDone => "corona_realizada",
            Self::TotalProsthesisIndicated => "protesis_total_indicada",
            Self::TotalProsthesisDone => "protesis_total_realizada",
            Self::Healthy => "sano",
        }
    }
}

/// Legend block a symbol is listed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LegendGroup {
    ToothState,
    CariesAndFillings,
    Endodontics,
    Prosthetics,
}

impl LegendGroup {
    pub const ALL: [LegendGroup; 4] = [
        Self::ToothState,
        Self::CariesAndFillings,
        Self::Endodontics,
        Self::Prosthetics,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::ToothState => "Estado del diente",
            Self::CariesAndFillings => "Caries/Obturaciones",
            Self::Endodontics => "Endodoncia",
            Self::Prosthetics => "Prótesis",
        }
    }
}

/// Display encoding of one catalog key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolEntry {
    pub key: &'static str,
    pub glyph: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub category: SymbolCategory,
    pub kind: SymbolKind,
    /// Visual stacking order when surfaces overlap. Never used to pick a diagnosis.
    pub render_priority: u8,
    pub group: LegendGroup,
}

#[allow(clippy::too_many_arguments)]
const fn entry(
    key: &'static str,
    glyph: &'static str,
    color: &'static str,
    description: &'static str,
    category: SymbolCategory,
    kind: SymbolKind,
    render_priority: u8,
    group: LegendGroup,
) -> SymbolEntry {
    SymbolEntry {
        key,
        glyph,
        color,
        description,
        category,
        kind,
        render_priority,
        group,
    }
}

use self::LegendGroup::{CariesAndFillings, Endodontics, Prosthetics, ToothState};
use self::SymbolCategory::{Black, Blue, Green, Red};

const ABSENT: SymbolEntry = entry(
    ABSENT_SYMBOL_KEY,
    "A",
    BLACK,
    "Ausente",
    Black,
    SymbolKind::Absent,
    90,
    ToothState,
);

static ABSENT_ENTRY: SymbolEntry = ABSENT;

static ENTRIES: [SymbolEntry; 20] = [
    entry("U_rojo", "Ü", RED, "Sellante necesario", Red, SymbolKind::SealantIndicated, 20, Prosthetics),
    entry("U_azul", "Ü", BLUE, "Sellante realizado", Blue, SymbolKind::SealantDone, 20, Prosthetics),
    entry("X_rojo", "X", RED, "Extracción indicada", Red, SymbolKind::ExtractionIndicated, 80, ToothState),
    entry("X_azul", "X", BLUE, "Pérdida por caries", Blue, SymbolKind::Lost, 75, ToothState),
    entry("ⓧ_azul", "ⓧ", BLUE, "Pérdida (otra causa)", Blue, SymbolKind::LostOtherCause, 75, ToothState),
    entry("|_rojo", "|", RED, "Extracción (otra causa)", Red, SymbolKind::ExtractionOtherCause, 80, Endodontics),
    entry("r", "r", RED, "Endodoncia por realizar", Red, SymbolKind::EndodonticsIndicated, 50, Endodontics),
    entry("_azul", "|", BLUE, "Endodoncia realizada", Blue, SymbolKind::EndodonticsDone, 50, Endodontics),
    entry("O_rojo", "O", RED, "Caries", Red, SymbolKind::Caries, 40, CariesAndFillings),
    entry("o_azul", "o", BLUE, "Obturado", Blue, SymbolKind::Restored, 30, CariesAndFillings),
    ABSENT,
    entry("--", "¨---¨", RED, "Prótesis fija indicada", Red, SymbolKind::FixedProsthesisIndicated, 60, Prosthetics),
    entry("--_azul", "¨---¨", BLUE, "Prótesis fija realizada", Blue, SymbolKind::FixedProsthesisDone, 60, Prosthetics),
    entry("-----", "(-----)", RED, "Prótesis removible indicada", Red, SymbolKind::RemovableProsthesisIndicated, 60, Prosthetics),
    entry("----_azul", "(-----)", BLUE, "Prótesis removible realizada", Blue, SymbolKind::RemovableProsthesisDone, 60, Prosthetics),
    entry("ª", "ª", RED, "Corona indicada", Red, SymbolKind::CrownIndicated, 55, Prosthetics),
    entry("ª_azul", "ª", BLUE, "Corona realizada", Blue, SymbolKind::CrownDone, 55, Prosthetics),
    entry("═", "═", RED, "Prótesis total indicada", Red, SymbolKind::TotalProsthesisIndicated, 70, Prosthetics),
    entry("═_azul", "═", BLUE, "Prótesis total realizada", Blue, SymbolKind::TotalProsthesisDone, 70, Prosthetics),
    entry("check", "✓", GREEN, "Sano", Green, SymbolKind::Healthy, 0, ToothState),
];

static INDEX: LazyLock<HashMap<&'static str, &'static SymbolEntry>> =
    LazyLock::new(|| ENTRIES.iter().map(|e| (e.key, e)).collect());

/// Looks up a display-symbol key.
pub fn resolve(symbol_key: &str) -> Option<&'static SymbolEntry> {
    INDEX.get(symbol_key).copied()
}

/// The fixed encoding used for teeth marked absent.
pub fn absent() -> &'static SymbolEntry {
    &ABSENT_ENTRY
}

/// Every catalog entry in legend order.
pub fn entries() -> &'static [SymbolEntry] {
    &ENTRIES
}

/// Entries grouped by legend block, in the order they are printed.
pub fn legend() -> Vec<(LegendGroup, Vec<&'static SymbolEntry>)> {
    LegendGroup::ALL
        .into_iter()
        .map(|group| {
            let members = ENTRIES.iter().filter(|e| e.group == group).collect();
            (group, members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = ENTRIES.iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), ENTRIES.len());
    }

    #[test]
    fn resolves_printed_legend_symbols() {
        let caries = resolve("O_rojo").expect("caries symbol");
        assert_eq!((caries.glyph, caries.color), ("O", RED));
        assert_eq!(caries.kind.as_str(), "patologia");

        let restored = resolve("o_azul").expect("restored symbol");
        assert_eq!((restored.glyph, restored.color), ("o", BLUE));
        assert_eq!(restored.category.as_str(), "azul");

        let lost = resolve("ⓧ_azul").expect("lost other cause");
        assert_eq!(lost.kind, SymbolKind::LostOtherCause);

        let endo = resolve("_azul").expect("endodontics done");
        assert_eq!(endo.glyph, "|");
        assert_eq!(endo.kind, SymbolKind::EndodonticsDone);
    }

    #[test]
    fn unknown_key_is_absent() {
        assert!(resolve("Z_verde").is_none());
        assert!(resolve("").is_none());
    }

    #[test]
    fn absent_encoding_is_in_catalog() {
        let absent = absent();
        assert_eq!(absent.key, "A");
        assert_eq!(absent.glyph, "A");
        assert_eq!(absent.color, BLACK);
        assert_eq!(resolve("A"), Some(absent));
    }

    #[test]
    fn legend_lists_every_entry_once() {
        let listed: usize = legend().iter().map(|(_, members)| members.len()).sum();
        assert_eq!(listed, ENTRIES.len());
        assert!(legend().iter().all(|(_, members)| !members.is_empty()));
    }
}
