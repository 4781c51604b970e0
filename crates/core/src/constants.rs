//! Constants used throughout the Form033 core crate.

/// Revision of the symbol catalog, stamped onto every export.
///
/// Bump whenever a glyph, color or key changes so that stored exports can be matched against the
/// legend they were drawn with.
pub const CATALOG_REVISION: u32 = 3;

/// Catalog key of the reserved tooth mobility diagnosis.
pub const MOBILITY_DIAGNOSIS_KEY: &str = "movilidad_dental";

/// Catalog key of the reserved gingival recession diagnosis.
pub const RECESSION_DIAGNOSIS_KEY: &str = "recesion_gingival";

/// Attribute-bag name holding a mobility grade option key.
pub const MOBILITY_ATTRIBUTE: &str = "movilidad_dental";

/// Attribute-bag name holding a recession severity option key.
pub const RECESSION_ATTRIBUTE: &str = "gravedad_recesion";

/// Symbol key of the fixed absent-tooth encoding.
pub const ABSENT_SYMBOL_KEY: &str = "A";

pub const PERMANENT_ROWS: usize = 4;
pub const PERMANENT_COLS: usize = 8;
pub const TEMPORARY_ROWS: usize = 4;
pub const TEMPORARY_COLS: usize = 5;

/// Rank assigned when a reserved attribute diagnosis carries no recorded value.
pub const DEFAULT_ATTRIBUTE_RANK: u32 = 1;

pub const DEFAULT_MOBILITY_PRIORITY: i32 = 3;
pub const DEFAULT_RECESSION_PRIORITY: i32 = 2;

pub const DEFAULT_MOBILITY_LABEL: &str = "Movilidad (sin grado)";
pub const DEFAULT_RECESSION_LABEL: &str = "Recesión (sin gravedad)";

pub const DEFAULT_ESTABLISHMENT: &str = "Centro Medico FamySALUD";
pub const DEFAULT_PROVINCE: &str = "Guayas";
pub const DEFAULT_CANTON: &str = "Guayaquil";
