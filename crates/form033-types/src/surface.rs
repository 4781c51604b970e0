//! Crown surfaces as drawn on the form.

use std::fmt;

/// One of the five renderable crown surfaces.
///
/// Declaration order is the drawing order used by renderers: peripheral surfaces first,
/// occlusal on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceLetter {
    /// Vestibular
    V,
    /// Lingual (or palatal)
    L,
    /// Distal
    D,
    /// Mesial
    M,
    /// Occlusal
    O,
}

impl SurfaceLetter {
    pub const ALL: [SurfaceLetter; 5] = [Self::V, Self::L, Self::D, Self::M, Self::O];

    /// Normalises a recorded surface name to its letter.
    ///
    /// Accepts the canonical names (`vestibular`, `lingual`, `oclusal`, `distal`, `mesial`),
    /// the `palatino` alias of lingual, the `cara_` prefixed forms, and bare letters, all
    /// case-insensitively. Returns `None` for anything else so the caller can drop it.
    pub fn from_name(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        let name = lowered.strip_prefix("cara_").unwrap_or(lowered.as_str());
        match name {
            "vestibular" | "v" => Some(Self::V),
            "lingual" | "palatino" | "l" => Some(Self::L),
            "oclusal" | "o" => Some(Self::O),
            "distal" | "d" => Some(Self::D),
            "mesial" | "m" => Some(Self::M),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::V => 'V',
            Self::L => 'L',
            Self::D => 'D',
            Self::M => 'M',
            Self::O => 'O',
        }
    }

    /// Canonical surface name as recorded by clinicians.
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::V => "vestibular",
            Self::L => "lingual",
            Self::D => "distal",
            Self::M => "mesial",
            Self::O => "oclusal",
        }
    }
}

impl fmt::Display for SurfaceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl serde::Serialize for SurfaceLetter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
