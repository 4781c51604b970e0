//! FDI two-digit tooth identifiers.
//!
//! The first digit is the quadrant (1-4 permanent, 5-8 temporary), the second the position
//! counted from the midline. Any two-digit code is accepted so that unknown codes can flow
//! through the engine and be skipped at the grid boundary instead of failing a whole build.

use crate::TypesError;
use std::fmt;
use std::str::FromStr;

/// Permanent or temporary (deciduous) dentition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dentition {
    Permanent,
    Temporary,
}

impl Dentition {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permanent => "permanente",
            Self::Temporary => "temporal",
        }
    }
}

/// Upper or lower dental arch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arch {
    Upper,
    Lower,
}

/// Patient's right or left side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Right,
    Left,
}

/// Anatomical description of a valid FDI code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FdiInfo {
    pub quadrant: u8,
    pub position: u8,
    pub arch: Arch,
    pub side: Side,
    pub dentition: Dentition,
    pub name: &'static str,
    /// Sequential index over all 52 codes: 11-48 map to 1-32, 51-85 to 33-52.
    pub sequence: u8,
}

const PERMANENT_NAMES: [&str; 8] = [
    "central incisor",
    "lateral incisor",
    "canine",
    "first premolar",
    "second premolar",
    "first molar",
    "second molar",
    "third molar",
];

const TEMPORARY_NAMES: [&str; 5] = [
    "central incisor",
    "lateral incisor",
    "canine",
    "first molar",
    "second molar",
];

/// A two-digit tooth code such as `18` or `85`.
///
/// Construction only checks the syntax (two ASCII digits). Use [`ToothCode::fdi_info`] to
/// find out whether the code is a real FDI tooth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToothCode([u8; 2]);

impl ToothCode {
    /// Parses a code, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidToothCode`] if the input is not exactly two ASCII digits.
    pub fn parse(input: &str) -> Result<Self, TypesError> {
        let trimmed = input.trim();
        match trimmed.as_bytes() {
            [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => Ok(Self([a - b'0', b - b'0'])),
            _ => Err(TypesError::InvalidToothCode(input.to_owned())),
        }
    }

    /// Builds a code from its numeric value, e.g. `48`.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidToothCode`] for values above 99.
    pub fn from_number(value: u8) -> Result<Self, TypesError> {
        if value > 99 {
            return Err(TypesError::InvalidToothCode(value.to_string()));
        }
        Ok(Self([value / 10, value % 10]))
    }

    pub const fn quadrant_digit(self) -> u8 {
        self.0[0]
    }

    pub const fn position_digit(self) -> u8 {
        self.0[1]
    }

    pub const fn number(self) -> u8 {
        self.0[0] * 10 + self.0[1]
    }

    /// Dentition class, decided purely by the first digit: 1-4 permanent, anything else temporary.
    pub const fn dentition(self) -> Dentition {
        match self.0[0] {
            1..=4 => Dentition::Permanent,
            _ => Dentition::Temporary,
        }
    }

    /// Describes the tooth if the code is a valid FDI code (11-18 … 41-48, 51-55 … 81-85).
    pub fn fdi_info(self) -> Option<FdiInfo> {
        let [quadrant, position] = self.0;
        let (dentition, names, base): (Dentition, &[&'static str], u8) = match quadrant {
            1..=4 => (Dentition::Permanent, &PERMANENT_NAMES[..], (quadrant - 1) * 8),
            5..=8 => (Dentition::Temporary, &TEMPORARY_NAMES[..], 32 + (quadrant - 5) * 5),
            _ => return None,
        };
        if position == 0 || usize::from(position) > names.len() {
            return None;
        }

        // Quadrants run clockwise from the patient's upper right in both dentitions.
        let (arch, side) = match (quadrant - 1) % 4 {
            0 => (Arch::Upper, Side::Right),
            1 => (Arch::Upper, Side::Left),
            2 => (Arch::Lower, Side::Left),
            _ => (Arch::Lower, Side::Right),
        };

        Some(FdiInfo {
            quadrant,
            position,
            arch,
            side,
            dentition,
            name: names[usize::from(position) - 1],
            sequence: base + position,
        })
    }

    pub fn is_valid_fdi(self) -> bool {
        self.fdi_info().is_some()
    }
}

impl fmt::Display for ToothCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0], self.0[1])
    }
}

impl FromStr for ToothCode {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for ToothCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ToothCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ToothCode::parse(&s).map_err(serde::de::Error::custom)
    }
}
