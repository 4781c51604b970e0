//! Secondary attribute extractor: tooth mobility and gingival recession.
//!
//! Both attributes are recorded as findings of a reserved diagnosis whose attribute bag carries
//! an option key. Older records stored the key on unrelated findings instead, so those are read
//! as a fallback.

use crate::cell::AttributeCell;
use crate::constants::DEFAULT_ATTRIBUTE_RANK;
use crate::model::{AttributeType, Finding, Tooth};
use form033_types::NonEmptyText;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An ordered enumeration value of a secondary attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedOption {
    pub attribute: AttributeType,
    pub key: NonEmptyText,
    pub name: String,
    /// Ordinal rank, 1 being the least severe.
    pub rank: u32,
    pub priority: i32,
}

/// Lookup of ranked options by `(attribute, option key)`.
pub trait RankedOptionResolver {
    fn resolve(&self, attribute: AttributeType, option_key: &str) -> Option<RankedOption>;
}

impl<T: RankedOptionResolver + ?Sized> RankedOptionResolver for &T {
    fn resolve(&self, attribute: AttributeType, option_key: &str) -> Option<RankedOption> {
        (**self).resolve(attribute, option_key)
    }
}

impl<T: RankedOptionResolver + ?Sized> RankedOptionResolver for Arc<T> {
    fn resolve(&self, attribute: AttributeType, option_key: &str) -> Option<RankedOption> {
        (**self).resolve(attribute, option_key)
    }
}

/// In-memory option table.
#[derive(Clone, Debug, Default)]
pub struct StaticRankedOptions {
    options: BTreeMap<(AttributeType, String), RankedOption>,
}

impl StaticRankedOptions {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The options printed on the form: mobility grades 0-3 and recession severities.
    pub fn standard() -> Self {
        const STANDARD: [(AttributeType, &str, &str, u32, i32); 7] = [
            (AttributeType::Mobility, "grado_0", "Grado 0", 1, 1),
            (AttributeType::Mobility, "grado_1", "Grado 1", 2, 2),
            (AttributeType::Mobility, "grado_2", "Grado 2", 3, 4),
            (AttributeType::Mobility, "grado_3", "Grado 3", 4, 5),
            (AttributeType::Recession, "leve", "Leve (1-2mm)", 1, 1),
            (AttributeType::Recession, "moderada", "Moderada (3-4mm)", 2, 2),
            (AttributeType::Recession, "severa", "Severa (5mm o más)", 3, 3),
        ];

        let mut table = Self::empty();
        for (attribute, key, name, rank, priority) in STANDARD {
            if let Ok(key) = NonEmptyText::new(key) {
                table.insert(RankedOption {
                    attribute,
                    key,
                    name: name.to_string(),
                    rank,
                    priority,
                });
            }
        }
        table
    }

    /// Adds or replaces an option.
    pub fn insert(&mut self, option: RankedOption) {
        self.options
            .insert((option.attribute, option.key.as_str().to_string()), option);
    }

    /// Options of one attribute ordered by rank.
    pub fn options_for(&self, attribute: AttributeType) -> Vec<&RankedOption> {
        let mut options: Vec<_> = self
            .options
            .values()
            .filter(|o| o.attribute == attribute)
            .collect();
        options.sort_by_key(|o| o.rank);
        options
    }
}

impl RankedOptionResolver for StaticRankedOptions {
    fn resolve(&self, attribute: AttributeType, option_key: &str) -> Option<RankedOption> {
        self.options
            .get(&(attribute, option_key.trim().to_string()))
            .cloned()
    }
}

fn keep_latest<'a>(slot: &mut Option<&'a Finding>, candidate: &'a Finding) {
    let newer = slot.is_none_or(|current| {
        (candidate.recorded_at, candidate.id) > (current.recorded_at, current.id)
    });
    if newer {
        *slot = Some(candidate);
    }
}

/// Resolves one secondary attribute of a tooth.
///
/// Candidates are ranked: reserved diagnosis with a value, then a legacy value on any other
/// finding, then the reserved diagnosis without a value (fixed default). Within a tier the most
/// recent finding wins. A recorded value with no matching option yields `None`.
pub fn extract<R>(tooth: &Tooth, attribute: AttributeType, options: &R) -> Option<AttributeCell>
where
    R: RankedOptionResolver + ?Sized,
{
    let mut reserved_with_value = None;
    let mut legacy_value = None;
    let mut reserved_without_value = None;

    for (_, finding) in tooth.active_findings() {
        let is_reserved = finding.diagnosis.reserved_attribute() == Some(attribute);
        let has_value = finding.attributes.get(attribute).is_some();
        match (is_reserved, has_value) {
            (true, true) => keep_latest(&mut reserved_with_value, finding),
            (false, true) => keep_latest(&mut legacy_value, finding),
            (true, false) => keep_latest(&mut reserved_without_value, finding),
            (false, false) => {}
        }
    }

    if let Some(finding) = reserved_with_value.or(legacy_value) {
        return resolve_recorded(tooth, attribute, finding, options);
    }

    reserved_without_value.map(|finding| AttributeCell {
        tooth: tooth.code,
        attribute,
        rank: DEFAULT_ATTRIBUTE_RANK,
        key: None,
        name: attribute.fallback_label().to_string(),
        priority: attribute.fallback_priority(),
        source_finding: finding.id,
        source_recorded_at: finding.recorded_at,
    })
}

fn resolve_recorded<R>(
    tooth: &Tooth,
    attribute: AttributeType,
    finding: &Finding,
    options: &R,
) -> Option<AttributeCell>
where
    R: RankedOptionResolver + ?Sized,
{
    let value = finding.attributes.get(attribute)?;
    let Some(option) = options.resolve(attribute, value.as_str()) else {
        tracing::warn!(
            tooth = %tooth.code,
            attribute = attribute.attribute_name(),
            value = %value,
            finding_id = %finding.id,
            "no ranked option for recorded attribute value"
        );
        return None;
    };

    Some(AttributeCell {
        tooth: tooth.code,
        attribute,
        rank: option.rank,
        key: Some(option.key),
        name: option.name,
        priority: option.priority,
        source_finding: finding.id,
        source_recorded_at: finding.recorded_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeBag, CatalogEntry, Surface};
    use chrono::{DateTime, Utc};
    use form033_types::ToothCode;
    use uuid::Uuid;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).expect("timestamp")
    }

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).expect("text")
    }

    fn reserved(attribute: AttributeType, value: Option<&str>, secs: i64) -> Finding {
        let mut bag = AttributeBag::new();
        if let Some(v) = value {
            bag.set(attribute, text(v));
        }
        Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(text(attribute.diagnosis_key()), attribute.fallback_priority()),
            at(secs),
        )
        .with_attributes(bag)
    }

    fn legacy(attribute: AttributeType, value: &str, secs: i64) -> Finding {
        Finding::new(
            Uuid::new_v4(),
            CatalogEntry::new(text("caries"), 5).with_symbol("O_rojo"),
            at(secs),
        )
        .with_attributes(AttributeBag::new().with(attribute, text(value)))
    }

    fn tooth_with(findings: Vec<Finding>) -> Tooth {
        let mut surface = Surface::new("vestibular");
        surface.findings = findings;
        Tooth::new(ToothCode::parse("16").expect("code")).with_surface(surface)
    }

    #[test]
    fn recorded_value_matches_ranked_option() {
        let options = StaticRankedOptions::standard();
        let t = tooth_with(vec![
            reserved(AttributeType::Mobility, Some("grado_2"), 0),
            reserved(AttributeType::Recession, Some("severa"), 0),
        ]);

        let mobility = extract(&t, AttributeType::Mobility, &options).expect("mobility");
        assert_eq!(mobility.rank, 3);
        assert_eq!(mobility.name, "Grado 2");
        assert_eq!(mobility.priority, 4);
        assert!(!mobility.is_default());

        let recession = extract(&t, AttributeType::Recession, &options).expect("recession");
        assert_eq!(recession.rank, 3);
        assert_eq!(recession.name, "Severa (5mm o más)");
    }

    #[test]
    fn reserved_without_value_defaults_to_lowest_rank() {
        let options = StaticRankedOptions::standard();
        let finding = reserved(AttributeType::Recession, None, 0);
        let id = finding.id;
        let t = tooth_with(vec![finding]);

        let cell = extract(&t, AttributeType::Recession, &options).expect("default cell");
        assert!(cell.is_default());
        assert_eq!(cell.rank, DEFAULT_ATTRIBUTE_RANK);
        assert_eq!(cell.priority, 2);
        assert_eq!(cell.source_finding, id);
    }

    #[test]
    fn no_finding_means_no_cell() {
        let options = StaticRankedOptions::standard();
        let t = tooth_with(vec![reserved(AttributeType::Mobility, Some("grado_1"), 0)]);
        assert!(extract(&t, AttributeType::Recession, &options).is_none());
        assert!(extract(&tooth_with(vec![]), AttributeType::Mobility, &options).is_none());
    }

    #[test]
    fn legacy_value_is_read_from_other_findings() {
        let options = StaticRankedOptions::standard();
        let t = tooth_with(vec![legacy(AttributeType::Mobility, "grado_3", 0)]);
        let cell = extract(&t, AttributeType::Mobility, &options).expect("legacy");
        assert_eq!(cell.rank, 4);
    }

    #[test]
    fn legacy_value_beats_reserved_default() {
        let options = StaticRankedOptions::standard();
        let t = tooth_with(vec![
            reserved(AttributeType::Mobility, None, 100),
            legacy(AttributeType::Mobility, "grado_1", 0),
        ]);
        let cell = extract(&t, AttributeType::Mobility, &options).expect("cell");
        assert_eq!(cell.name, "Grado 1");
    }

    #[test]
    fn reserved_value_beats_legacy_and_latest_wins() {
        let options = StaticRankedOptions::standard();
        let t = tooth_with(vec![
            legacy(AttributeType::Mobility, "grado_3", 500),
            reserved(AttributeType::Mobility, Some("grado_0"), 0),
            reserved(AttributeType::Mobility, Some("grado_1"), 10),
        ]);
        let cell = extract(&t, AttributeType::Mobility, &options).expect("cell");
        assert_eq!(cell.name, "Grado 1");
    }

    #[test]
    fn missing_option_yields_no_cell() {
        let t = tooth_with(vec![reserved(AttributeType::Mobility, Some("grado_9"), 0)]);
        assert!(extract(&t, AttributeType::Mobility, &StaticRankedOptions::standard()).is_none());

        let t = tooth_with(vec![reserved(AttributeType::Mobility, Some("grado_1"), 0)]);
        assert!(extract(&t, AttributeType::Mobility, &StaticRankedOptions::empty()).is_none());
    }

    #[test]
    fn inactive_findings_are_ignored() {
        let options = StaticRankedOptions::standard();
        let t = tooth_with(vec![reserved(AttributeType::Mobility, Some("grado_2"), 0).inactive()]);
        assert!(extract(&t, AttributeType::Mobility, &options).is_none());
    }

    #[test]
    fn options_are_listed_by_rank() {
        let options = StaticRankedOptions::standard();
        let ranks: Vec<_> = options
            .options_for(AttributeType::Mobility)
            .iter()
            .map(|o| o.rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(options.options_for(AttributeType::Recession).len(), 3);
    }
}
