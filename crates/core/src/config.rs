//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the service. Nothing
//! here reads process-wide environment variables; binaries read them and hand the raw values to
//! [`core_config_from_env_values`].

use crate::constants::{DEFAULT_CANTON, DEFAULT_ESTABLISHMENT, DEFAULT_PROVINCE};
use crate::{Form033Error, Form033Result};

/// Facility details printed in the patient section of the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacilityInfo {
    pub establishment: String,
    pub province: String,
    pub canton: String,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    facility: FacilityInfo,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(establishment: String, province: String, canton: String) -> Form033Result<Self> {
        for (field, value) in [
            ("establishment", &establishment),
            ("province", &province),
            ("canton", &canton),
        ] {
            if value.trim().is_empty() {
                return Err(Form033Error::InvalidInput(format!("{field} cannot be empty")));
            }
        }

        Ok(Self {
            facility: FacilityInfo {
                establishment: establishment.trim().to_string(),
                province: province.trim().to_string(),
                canton: canton.trim().to_string(),
            },
        })
    }

    pub fn facility(&self) -> &FacilityInfo {
        &self.facility
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            facility: FacilityInfo {
                establishment: DEFAULT_ESTABLISHMENT.to_string(),
                province: DEFAULT_PROVINCE.to_string(),
                canton: DEFAULT_CANTON.to_string(),
            },
        }
    }
}

/// Build a `CoreConfig` from optional raw values.
///
/// `None` or empty/whitespace values fall back to the built-in facility defaults.
pub fn core_config_from_env_values(
    establishment: Option<String>,
    province: Option<String>,
    canton: Option<String>,
) -> Form033Result<CoreConfig> {
    fn or_default(value: Option<String>, default: &str) -> String {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    CoreConfig::new(
        or_default(establishment, DEFAULT_ESTABLISHMENT),
        or_default(province, DEFAULT_PROVINCE),
        or_default(canton, DEFAULT_CANTON),
    )
}
