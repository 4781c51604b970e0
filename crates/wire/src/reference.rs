//! Reference documents: the symbol legend and the grid layout.

use form033_core::catalog::{self, SymbolEntry};
use form033_core::constants::CATALOG_REVISION;
use form033_core::position::{code_at, dimensions};
use form033_types::Dentition;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LegendDocument {
    pub catalog_revision: u32,
    pub groups: Vec<LegendGroupWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LegendGroupWire {
    pub label: String,
    pub symbols: Vec<SymbolWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SymbolWire {
    pub key: String,
    pub glyph: String,
    pub color: String,
    pub category: String,
    pub semantic_type: String,
    pub description: String,
    pub render_priority: u8,
}

/// Tooth codes of both grids, row by row. Empty strings never occur.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LayoutDocument {
    pub permanent: Vec<Vec<String>>,
    pub temporary: Vec<Vec<String>>,
}

fn symbol_to_wire(entry: &SymbolEntry) -> SymbolWire {
    SymbolWire {
        key: entry.key.to_string(),
        glyph: entry.glyph.to_string(),
        color: entry.color.to_string(),
        category: entry.category.as_str().to_string(),
        semantic_type: entry.kind.as_str().to_string(),
        description: entry.description.to_string(),
        render_priority: entry.render_priority,
    }
}

pub fn legend_document() -> LegendDocument {
    LegendDocument {
        catalog_revision: CATALOG_REVISION,
        groups: catalog::legend()
            .into_iter()
            .map(|(group, members)| LegendGroupWire {
                label: group.label().to_string(),
                symbols: members.into_iter().map(symbol_to_wire).collect(),
            })
            .collect(),
    }
}

fn layout_rows(dentition: Dentition) -> Vec<Vec<String>> {
    let (rows, cols) = dimensions(dentition);
    (0..rows)
        .map(|r| {
            (0..cols)
                .filter_map(|c| code_at(dentition, r, c))
                .map(|code| code.to_string())
                .collect()
        })
        .collect()
}

pub fn layout_document() -> LayoutDocument {
    LayoutDocument {
        permanent: layout_rows(Dentition::Permanent),
        temporary: layout_rows(Dentition::Temporary),
    }
}
