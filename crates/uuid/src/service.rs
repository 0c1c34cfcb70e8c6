//! Implementation of canonical UUIDs and timestamp identifiers.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Carebook's canonical UUID representation (32 lowercase hex characters,
/// no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to be in canonical
/// form, so path derivation and string comparison are consistent everywhere.
///
/// # Construction
/// - [`ShardableUuid::new`] generates a fresh identifier for a new record.
/// - [`ShardableUuid::parse`] validates an externally supplied identifier.
///
/// Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are
/// rejected rather than normalised.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShardableUuid(Uuid);

impl Default for ShardableUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardableUuid {
    /// Generates a new identifier in canonical form (RFC 4122 version 4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be canonical.
    ///
    /// This does **not** normalise other common UUID forms (hyphenated,
    /// uppercase); callers must provide the canonical representation.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not 32 lowercase hex
    /// characters.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if Self::is_canonical(input) {
            // is_canonical guarantees valid hex, so parse_str cannot fail
            let uuid = Uuid::parse_str(input).expect("is_canonical guarantees valid UUID");
            return Ok(Self(uuid));
        }
        Err(UuidError::InvalidInput(format!(
            "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
            input
        )))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// Purely syntactic: exactly 32 bytes, all lowercase hex.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<uuid>/` where `s1`/`s2` are the first
    /// two and next two hex characters of this identifier.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for ShardableUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for ShardableUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShardableUuid::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ShardableUuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ShardableUuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ShardableUuid::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A millisecond-precision timestamp identifier.
///
/// Format: `YYYYMMDDTHHMMSS.mmmZ`, for example `20260111T143522.045Z`.
///
/// Used as the prefix of stored attachment file names
/// (`<timestamp>-<filename>`), giving each stored file a distinct,
/// chronologically ordered name even when the same file name is uploaded
/// more than once.
///
/// # Monotonicity guarantee
///
/// When [`TimestampId::generate`] is given the previous identifier, the new
/// timestamp is strictly greater than the previous one (advanced by at least
/// 1 ms if the clock has not moved). Generation is expected to happen while
/// the caller holds whatever per-appointment exclusivity it needs.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampId(DateTime<Utc>);

impl TimestampId {
    /// Returns the timestamp this identifier encodes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    /// Generate a new timestamp identifier.
    ///
    /// If `last` is provided, the result is guaranteed to be strictly greater
    /// (by at least 1 ms).
    pub fn generate(last: Option<&TimestampId>) -> Self {
        let now = Utc::now();

        let timestamp = match last {
            Some(prev) if now <= prev.0 => prev.0 + Duration::milliseconds(1),
            _ => now,
        };

        Self(timestamp)
    }
}

impl FromStr for TimestampId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.ends_with('Z') {
            return Err(UuidError::InvalidInput(format!(
                "Timestamp must end with 'Z': '{}'",
                s
            )));
        }

        let without_z = &s[..s.len() - 1];
        let naive = chrono::NaiveDateTime::parse_from_str(without_z, "%Y%m%dT%H%M%S%.3f")
            .map_err(|e| {
                UuidError::InvalidInput(format!("Invalid timestamp format '{}': {}", s, e))
            })?;

        Ok(Self(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)))
    }
}

impl fmt::Display for TimestampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%dT%H%M%S%.3fZ"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_canonical_uuid() {
        let id = ShardableUuid::new();
        let canonical = id.to_string();

        assert_eq!(canonical.len(), 32);
        assert!(ShardableUuid::is_canonical(&canonical));
    }

    #[test]
    fn parse_accepts_canonical_form() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let parsed = ShardableUuid::parse(canonical).expect("should parse");
        assert_eq!(parsed.to_string(), canonical);
    }

    #[test]
    fn parse_rejects_hyphenated_and_uppercase() {
        assert!(ShardableUuid::parse("550e8400-e29b-41d4-a716-446655440000").is_err());
        assert!(ShardableUuid::parse("550E8400E29B41D4A716446655440000").is_err());
    }

    #[test]
    fn parse_rejects_wrong_length_and_bad_characters() {
        assert!(ShardableUuid::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(ShardableUuid::parse("550e8400e29b41d4a7164466554400000").is_err());
        assert!(ShardableUuid::parse("550e8400e29b41d4a716446655440zzz").is_err());
        assert!(ShardableUuid::parse("").is_err());
    }

    #[test]
    fn sharded_dir_structure() {
        let id = ShardableUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        let parent = Path::new("/care_data/appointments");
        assert_eq!(
            id.sharded_dir(parent),
            PathBuf::from("/care_data/appointments/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn round_trip_new_to_string_to_parse() {
        let original = ShardableUuid::new();
        let parsed = ShardableUuid::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_canonical_string() {
        let id = ShardableUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"550e8400e29b41d4a716446655440000\"");
        let back: ShardableUuid = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, id);
    }

    #[test]
    fn timestamp_id_display_and_parse_round_trip() {
        let original = "20260111T143522.045Z";
        let parsed = TimestampId::from_str(original).expect("should parse");
        assert_eq!(parsed.to_string(), original);
    }

    #[test]
    fn timestamp_id_rejects_missing_z_suffix() {
        let err = TimestampId::from_str("20260111T143522.045").expect_err("should reject");
        match err {
            UuidError::InvalidInput(msg) => assert!(msg.contains("must end with 'Z'")),
        }
    }

    #[test]
    fn timestamp_id_rejects_garbage() {
        assert!(TimestampId::from_str("20260199T143522.045Z").is_err());
        assert!(TimestampId::from_str("not-a-timestamp").is_err());
    }

    #[test]
    fn timestamp_id_monotonic_without_elapsed_time() {
        let first = TimestampId::generate(None);
        // No sleep: forces the increment branch
        let second = TimestampId::generate(Some(&first));
        assert!(second.timestamp() > first.timestamp());
    }

    #[test]
    fn timestamp_id_monotonic_with_elapsed_time() {
        let first = TimestampId::generate(None);
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = TimestampId::generate(Some(&first));
        assert!(second.timestamp() > first.timestamp());
    }
}
