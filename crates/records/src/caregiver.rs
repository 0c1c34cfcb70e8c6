//! Caregiver request and link wire models.
//!
//! A patient initiates a request towards a caregiver; the caregiver approves
//! or rejects it. Approval creates a separate link document granting the
//! caregiver access to the patient's daily measures. Requests and links are
//! stored per caregiver, keyed by patient id.

use crate::{parse_uuid_field, parse_wire, RecordsError, RecordsResult};
use carebook_uuid::ShardableUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Decision state of a caregiver request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    /// Awaiting the caregiver's decision.
    Pending,
    /// Accepted; a link document exists.
    Approved,
    /// Turned down. Terminal.
    Rejected,
}

impl LinkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkStatus::Pending => "pending",
            LinkStatus::Approved => "approved",
            LinkStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain-level carrier for a caregiver request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaregiverRequestData {
    pub patient_id: ShardableUuid,
    pub caregiver_id: ShardableUuid,
    pub status: LinkStatus,
    pub requested_at: DateTime<Utc>,
    /// Set when the caregiver approves or rejects.
    pub decided_at: Option<DateTime<Utc>>,
}

/// Domain-level carrier for an approved caregiver link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaregiverLinkData {
    pub patient_id: ShardableUuid,
    pub caregiver_id: ShardableUuid,
    pub linked_at: DateTime<Utc>,
}

// ============================================================================
// Public operations
// ============================================================================

/// Caregiver request/link record operations.
pub struct CaregiverRequest;

impl CaregiverRequest {
    /// Parse a caregiver request from YAML text.
    pub fn parse(yaml_text: &str) -> RecordsResult<CaregiverRequestData> {
        let wire: RequestWire = parse_wire(yaml_text, "Caregiver request")?;

        Ok(CaregiverRequestData {
            patient_id: parse_uuid_field(&wire.patient_id, "patient_id")?,
            caregiver_id: parse_uuid_field(&wire.caregiver_id, "caregiver_id")?,
            status: wire.status,
            requested_at: wire.requested_at,
            decided_at: wire.decided_at,
        })
    }

    /// Render a caregiver request as YAML text.
    pub fn render(data: &CaregiverRequestData) -> RecordsResult<String> {
        let wire = RequestWire {
            patient_id: data.patient_id.to_string(),
            caregiver_id: data.caregiver_id.to_string(),
            status: data.status,
            requested_at: data.requested_at,
            decided_at: data.decided_at,
        };
        serde_yaml::to_string(&wire).map_err(|e| {
            RecordsError::Translation(format!("Failed to serialise caregiver request: {e}"))
        })
    }

    /// Parse an approved caregiver link from YAML text.
    pub fn parse_link(yaml_text: &str) -> RecordsResult<CaregiverLinkData> {
        let wire: LinkWire = parse_wire(yaml_text, "Caregiver link")?;

        Ok(CaregiverLinkData {
            patient_id: parse_uuid_field(&wire.patient_id, "patient_id")?,
            caregiver_id: parse_uuid_field(&wire.caregiver_id, "caregiver_id")?,
            linked_at: wire.linked_at,
        })
    }

    /// Render an approved caregiver link as YAML text.
    pub fn render_link(data: &CaregiverLinkData) -> RecordsResult<String> {
        let wire = LinkWire {
            patient_id: data.patient_id.to_string(),
            caregiver_id: data.caregiver_id.to_string(),
            linked_at: data.linked_at,
        };
        serde_yaml::to_string(&wire).map_err(|e| {
            RecordsError::Translation(format!("Failed to serialise caregiver link: {e}"))
        })
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct RequestWire {
    pub patient_id: String,
    pub caregiver_id: String,
    pub status: LinkStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct LinkWire {
    pub patient_id: String,
    pub caregiver_id: String,
    pub linked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"patient_id: "a4f91c6d3b2e4c5f9d7a1e8b6c0a9f12"
caregiver_id: "550e8400e29b41d4a716446655440000"
status: pending
requested_at: "2026-02-10T12:00:00Z"
"#;

    #[test]
    fn round_trips_pending_request() {
        let data = CaregiverRequest::parse(SAMPLE).expect("parse yaml");
        assert_eq!(data.status, LinkStatus::Pending);
        assert!(data.decided_at.is_none());

        let output = CaregiverRequest::render(&data).expect("render");
        let reparsed = CaregiverRequest::parse(&output).expect("reparse");
        assert_eq!(data, reparsed);
    }

    #[test]
    fn parses_decided_request() {
        let input = format!(
            "{}decided_at: \"2026-02-11T09:00:00Z\"\n",
            SAMPLE.replace("status: pending", "status: approved")
        );
        let data = CaregiverRequest::parse(&input).expect("parse");
        assert_eq!(data.status, LinkStatus::Approved);
        assert!(data.decided_at.is_some());
    }

    #[test]
    fn rejects_unknown_status() {
        let input = SAMPLE.replace("status: pending", "status: revoked");
        let err = CaregiverRequest::parse(&input).expect_err("should reject");
        match err {
            RecordsError::Translation(msg) => assert!(msg.contains("status")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn link_round_trip() {
        let input = r#"patient_id: "a4f91c6d3b2e4c5f9d7a1e8b6c0a9f12"
caregiver_id: "550e8400e29b41d4a716446655440000"
linked_at: "2026-02-11T09:00:00Z"
"#;
        let data = CaregiverRequest::parse_link(input).expect("parse link");
        let output = CaregiverRequest::render_link(&data).expect("render link");
        let reparsed = CaregiverRequest::parse_link(&output).expect("reparse link");
        assert_eq!(data, reparsed);
    }
}
