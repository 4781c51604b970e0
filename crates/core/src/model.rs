//! Clinical input model: teeth, surfaces and the findings recorded on them.
//!
//! These are plain domain values built at the wire boundary. The engine only reads them.

use crate::constants::{
    DEFAULT_MOBILITY_LABEL, DEFAULT_MOBILITY_PRIORITY, DEFAULT_RECESSION_LABEL,
    DEFAULT_RECESSION_PRIORITY, MOBILITY_ATTRIBUTE, MOBILITY_DIAGNOSIS_KEY, RECESSION_ATTRIBUTE,
    RECESSION_DIAGNOSIS_KEY,
};
use crate::Form033Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use form033_types::{NonEmptyText, SurfaceLetter, ToothCode};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Secondary clinical attributes tracked outside the primary diagnosis grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeType {
    Mobility,
    Recession,
}

impl AttributeType {
    pub const ALL: [AttributeType; 2] = [Self::Mobility, Self::Recession];

    /// Name under which the option key is stored in a finding's attribute bag.
    pub const fn attribute_name(self) -> &'static str {
        match self {
            Self::Mobility => MOBILITY_ATTRIBUTE,
            Self::Recession => RECESSION_ATTRIBUTE,
        }
    }

    /// Reserved catalog key of the diagnosis that records this attribute.
    pub const fn diagnosis_key(self) -> &'static str {
        match self {
            Self::Mobility => MOBILITY_DIAGNOSIS_KEY,
            Self::Recession => RECESSION_DIAGNOSIS_KEY,
        }
    }

    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.attribute_name() == name)
    }

    pub fn from_diagnosis_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.diagnosis_key() == key)
    }

    pub const fn fallback_priority(self) -> i32 {
        match self {
            Self::Mobility => DEFAULT_MOBILITY_PRIORITY,
            Self::Recession => DEFAULT_RECESSION_PRIORITY,
        }
    }

    pub const fn fallback_label(self) -> &'static str {
        match self {
            Self::Mobility => DEFAULT_MOBILITY_LABEL,
            Self::Recession => DEFAULT_RECESSION_LABEL,
        }
    }
}

/// Per-finding parameters.
///
/// The two known attribute names are held as typed option keys; everything else is kept verbatim
/// so it can round-trip through exports untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeBag {
    typed: BTreeMap<AttributeType, NonEmptyText>,
    other: BTreeMap<String, String>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`AttributeBag::set`].
    pub fn with(mut self, attribute: AttributeType, option_key: NonEmptyText) -> Self {
        self.set(attribute, option_key);
        self
    }

    pub fn set(&mut self, attribute: AttributeType, option_key: NonEmptyText) {
        self.typed.insert(attribute, option_key);
    }

    /// Inserts a raw name/value pair, typing it when the name is a known attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if a known attribute name carries a blank value.
    pub fn insert_raw(&mut self, name: &str, value: &str) -> Form033Result<()> {
        match AttributeType::from_attribute_name(name) {
            Some(attribute) => self.set(attribute, NonEmptyText::new(value)?),
            None => {
                self.other.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    pub fn get(&self, attribute: AttributeType) -> Option<&NonEmptyText> {
        self.typed.get(&attribute)
    }

    pub fn typed(&self) -> impl Iterator<Item = (AttributeType, &NonEmptyText)> {
        self.typed.iter().map(|(k, v)| (*k, v))
    }

    pub fn other(&self) -> &BTreeMap<String, String> {
        &self.other
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty() && self.other.is_empty()
    }
}

/// A diagnosis dictionary item referenced by findings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: NonEmptyText,
    pub name: Option<String>,
    /// Clinical priority; higher is more urgent or definitive.
    pub priority: i32,
    /// Key into the symbol catalog. `None` for diagnoses with no printed symbol.
    pub symbol_key: Option<String>,
}

impl CatalogEntry {
    pub fn new(key: NonEmptyText, priority: i32) -> Self {
        Self {
            key,
            name: None,
            priority,
            symbol_key: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_symbol(mut self, symbol_key: impl Into<String>) -> Self {
        self.symbol_key = Some(symbol_key.into());
        self
    }

    /// The secondary attribute this diagnosis is reserved for, if any.
    pub fn reserved_attribute(&self) -> Option<AttributeType> {
        AttributeType::from_diagnosis_key(self.key.as_str())
    }
}

/// A recorded diagnosis instance on one surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub id: Uuid,
    pub diagnosis: CatalogEntry,
    pub recorded_at: DateTime<Utc>,
    pub active: bool,
    pub attributes: AttributeBag,
}

impl Finding {
    pub fn new(id: Uuid, diagnosis: CatalogEntry, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            diagnosis,
            recorded_at,
            active: true,
            attributes: AttributeBag::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeBag) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// One crown surface of a tooth as recorded, with its raw name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pub name: String,
    pub findings: Vec<Finding>,
}

impl Surface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            findings: Vec::new(),
        }
    }

    pub fn with_finding(mut self, finding: Finding) -> Self {
        self.findings.push(finding);
        self
    }

    /// Renderable letter for this surface; `None` if the recorded name is not recognised.
    pub fn letter(&self) -> Option<SurfaceLetter> {
        SurfaceLetter::from_name(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tooth {
    pub code: ToothCode,
    pub absent: bool,
    pub surfaces: Vec<Surface>,
}

impl Tooth {
    pub fn new(code: ToothCode) -> Self {
        Self {
            code,
            absent: false,
            surfaces: Vec::new(),
        }
    }

    pub fn mark_absent(mut self) -> Self {
        self.absent = true;
        self
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surfaces.push(surface);
        self
    }

    /// Active findings on every surface, paired with the surface they were recorded on.
    pub fn active_findings(&self) -> impl Iterator<Item = (&Surface, &Finding)> {
        self.surfaces
            .iter()
            .flat_map(|s| s.findings.iter().map(move |f| (s, f)))
            .filter(|(_, f)| f.active)
    }
}

/// Demographic fields printed in the patient section of the form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientHeader {
    pub national_id: Option<String>,
    pub given_names: Option<String>,
    pub family_names: Option<String>,
    pub sex: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl PatientHeader {
    /// Age in whole years on `date`, if a birth date is known and not in the future.
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut years = date.year() - birth.year();
        if (date.month(), date.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

/// A patient's full clinical snapshot as consumed by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRecord {
    pub id: Uuid,
    pub header: PatientHeader,
    pub teeth: Vec<Tooth>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).expect("valid key")
    }

    #[test]
    fn insert_raw_types_known_attributes() {
        let mut bag = AttributeBag::new();
        bag.insert_raw("movilidad_dental", "grado_2").expect("insert");
        bag.insert_raw("gravedad_recesion", " severa ").expect("insert");
        bag.insert_raw("nota", "").expect("free-form values may be blank");

        assert_eq!(
            bag.get(AttributeType::Mobility).map(NonEmptyText::as_str),
            Some("grado_2")
        );
        assert_eq!(
            bag.get(AttributeType::Recession).map(NonEmptyText::as_str),
            Some("severa")
        );
        assert_eq!(bag.other().get("nota").map(String::as_str), Some(""));
    }

    #[test]
    fn insert_raw_rejects_blank_known_attribute() {
        let mut bag = AttributeBag::new();
        let err = bag.insert_raw("movilidad_dental", "  ").expect_err("blank grade");
        assert!(matches!(err, crate::Form033Error::InvalidValue(_)));
        assert!(bag.is_empty());
    }

    #[test]
    fn reserved_attribute_follows_diagnosis_key() {
        let mobility = CatalogEntry::new(key("movilidad_dental"), 3);
        let recession = CatalogEntry::new(key("recesion_gingival"), 2);
        let caries = CatalogEntry::new(key("caries"), 5).with_symbol("O_rojo");

        assert_eq!(mobility.reserved_attribute(), Some(AttributeType::Mobility));
        assert_eq!(recession.reserved_attribute(), Some(AttributeType::Recession));
        assert_eq!(caries.reserved_attribute(), None);
    }

    #[test]
    fn active_findings_skips_inactive() {
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("timestamp");
        let entry = CatalogEntry::new(key("caries"), 5);
        let tooth = Tooth::new(ToothCode::parse("16").expect("code")).with_surface(
            Surface::new("oclusal")
                .with_finding(Finding::new(Uuid::new_v4(), entry.clone(), at))
                .with_finding(Finding::new(Uuid::new_v4(), entry, at).inactive()),
        );
        assert_eq!(tooth.active_findings().count(), 1);
    }

    #[test]
    fn age_is_counted_in_whole_years() {
        let header = PatientHeader {
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15),
            ..PatientHeader::default()
        };
        let day_before = NaiveDate::from_ymd_opt(2024, 6, 14).expect("date");
        let birthday = NaiveDate::from_ymd_opt(2024, 6, 15).expect("date");
        assert_eq!(header.age_on(day_before), Some(33));
        assert_eq!(header.age_on(birthday), Some(34));

        let past = NaiveDate::from_ymd_opt(1980, 1, 1).expect("date");
        assert_eq!(header.age_on(past), None);
    }
}
