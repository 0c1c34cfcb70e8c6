//! Daily measure wire models.
//!
//! One document per patient per calendar date, holding that day's vitals.
//! Re-recording a date replaces the whole day's document; the collection is
//! append-only across dates.

use crate::{parse_uuid_field, parse_wire, RecordsError, RecordsResult};
use carebook_uuid::ShardableUuid;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// The vital readings a daily entry may carry. All optional; a day's entry
/// records whatever was measured.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_glucose: Option<f32>,
}

impl Vitals {
    /// Whether no reading at all is present.
    pub fn is_empty(&self) -> bool {
        self.systolic_bp.is_none()
            && self.diastolic_bp.is_none()
            && self.heart_rate.is_none()
            && self.temperature_c.is_none()
            && self.weight_kg.is_none()
            && self.blood_glucose.is_none()
    }
}

/// Domain-level carrier for one day's measures.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyMeasureData {
    /// The calendar date this entry is keyed by.
    pub date: NaiveDate,
    pub vitals: Vitals,
    /// Who recorded the entry: the patient or a linked caregiver.
    pub added_by: ShardableUuid,
    pub recorded_at: DateTime<Utc>,
}

// ============================================================================
// Public operations
// ============================================================================

/// Daily measure record operations.
pub struct DailyMeasure;

impl DailyMeasure {
    /// Parse a daily measure entry from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if the YAML does not match the wire schema,
    /// the date is not `YYYY-MM-DD`, or `added_by` is not a canonical UUID.
    pub fn parse(yaml_text: &str) -> RecordsResult<DailyMeasureData> {
        let wire: MeasureWire = parse_wire(yaml_text, "Daily measure")?;

        let date = NaiveDate::parse_from_str(&wire.date, "%Y-%m-%d").map_err(|_| {
            RecordsError::InvalidDate(format!("date must be YYYY-MM-DD, got '{}'", wire.date))
        })?;

        Ok(DailyMeasureData {
            date,
            vitals: wire.vitals,
            added_by: parse_uuid_field(&wire.added_by, "added_by")?,
            recorded_at: wire.recorded_at,
        })
    }

    /// Render a daily measure entry as YAML text.
    pub fn render(data: &DailyMeasureData) -> RecordsResult<String> {
        let wire = MeasureWire {
            date: data.date.format("%Y-%m-%d").to_string(),
            vitals: data.vitals.clone(),
            added_by: data.added_by.to_string(),
            recorded_at: data.recorded_at,
        };
        serde_yaml::to_string(&wire).map_err(|e| {
            RecordsError::Translation(format!("Failed to serialise daily measure: {e}"))
        })
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct MeasureWire {
    pub date: String,
    pub vitals: Vitals,
    pub added_by: String,
    pub recorded_at: DateTime<Utc>,
}
