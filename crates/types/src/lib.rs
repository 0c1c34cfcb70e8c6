/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input was not a plausible email address
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character. Input is trimmed of leading and trailing whitespace during
/// construction. Used wherever the system requires text to actually be
/// present: appointment reasons, completion notes, display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed; if the trimmed result is empty,
    /// `TextError::Empty` is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A validated, normalised email address.
///
/// Construction trims the input, lowercases it, and requires the shape
/// `local@domain` with a dot somewhere in the domain part. This is a
/// syntactic plausibility check only; deliverability is not verified.
/// Email addresses identify user accounts and must compare consistently,
/// hence the normalisation to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a new `EmailAddress` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input, or
    /// `TextError::InvalidEmail` when the input does not look like
    /// `local@domain.tld`.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }

        let normalised = trimmed.to_ascii_lowercase();
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(TextError::InvalidEmail(trimmed.to_owned()));
        };

        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains(char::is_whitespace);

        if local.is_empty() || domain.is_empty() || !domain_ok || local.contains(char::is_whitespace)
        {
            return Err(TextError::InvalidEmail(trimmed.to_owned()));
        }

        Ok(Self(normalised))
    }

    /// Returns the normalised address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EmailAddress::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_accepts() {
        let text = NonEmptyText::new("  routine check-up  ").expect("should accept");
        assert_eq!(text.as_str(), "routine check-up");
    }

    #[test]
    fn non_empty_text_rejects_blank() {
        assert!(matches!(NonEmptyText::new(""), Err(TextError::Empty)));
        assert!(matches!(NonEmptyText::new("   \t"), Err(TextError::Empty)));
    }

    #[test]
    fn email_normalises_to_lowercase() {
        let email = EmailAddress::new(" Alice@Example.COM ").expect("should accept");
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn email_rejects_missing_at_sign() {
        let err = EmailAddress::new("alice.example.com").expect_err("should reject");
        assert!(matches!(err, TextError::InvalidEmail(_)));
    }

    #[test]
    fn email_rejects_bad_domain() {
        assert!(EmailAddress::new("alice@example").is_err());
        assert!(EmailAddress::new("alice@.com").is_err());
        assert!(EmailAddress::new("alice@example.").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
    }

    #[test]
    fn email_serde_round_trip() {
        let email = EmailAddress::new("bob@clinic.org").expect("valid");
        let json = serde_json::to_string(&email).expect("serialise");
        assert_eq!(json, "\"bob@clinic.org\"");
        let back: EmailAddress = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, email);
    }
}
