use crate::domain::validation::ValidationError;

/// Canonicalize a free-form phone string into the gateway's digit format.
///
/// Strips every non-digit character, then rewrites the country prefix: a
/// leading `0` becomes `63`, and an unprefixed number of 10 digits or fewer
/// gains a `63` prefix. Anything else is left as-is. Total over all inputs;
/// callers that need rejection of bad input validate the original string
/// first (see [`Recipient::new`]).
fn normalize_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix('0') {
        return format!("63{rest}");
    }
    if !digits.starts_with("63") && digits.len() <= 10 {
        return format!("63{digits}");
    }
    digits
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Semaphore `apikey` credential.
///
/// Unlike the other value types, a blank key is tolerated: the configuration
/// collaborator may supply an empty string, in which case the client
/// constructs normally but starts disabled.
pub struct ApiKey(String);

impl ApiKey {
    /// Body field name used by Semaphore (`apikey`).
    pub const FIELD: &'static str = "apikey";

    /// Create an [`ApiKey`], trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_owned())
    }

    /// Whether the key is empty, i.e. the service is unconfigured.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Semaphore sender name (`sendername`), shown to the recipient as the
/// message origin.
///
/// Invariant: non-empty after trimming. The value must be registered with
/// your Semaphore account.
pub struct SenderName(String);

impl SenderName {
    /// Body field name used by Semaphore (`sendername`).
    pub const FIELD: &'static str = "sendername";

    /// Create a validated [`SenderName`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Blank-tolerant intake for configuration strings: blank means absent.
    pub fn opt(value: impl Into<String>) -> Option<Self> {
        Self::new(value).ok()
    }

    /// Borrow the validated sender name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`message`).
///
/// Invariant: non-empty after trimming. The original value (including
/// whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Body field name used by Semaphore (`message`).
    pub const FIELD: &'static str = "message";

    /// Longest text that fits a single SMS segment.
    pub const SINGLE_SEGMENT_MAX: usize = 160;

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the text is longer than one SMS segment (160 characters).
    ///
    /// Not an error: the gateway accepts long texts and may split them into
    /// several messages. The client emits an advisory when sending one.
    pub fn exceeds_single_segment(&self) -> bool {
        self.0.chars().count() > Self::SINGLE_SEGMENT_MAX
    }
}

#[derive(Debug, Clone)]
/// Validated, normalized recipient phone number (`number`).
///
/// Validation runs against the *original* string (non-blank, 10–13 digits);
/// normalization to the gateway's `63…` digit format happens afterwards.
/// Equality, ordering, and hashing are based on the normalized form.
pub struct Recipient {
    raw: String,
    msisdn: String,
}

impl Recipient {
    /// Body field name used by Semaphore (`number`).
    pub const FIELD: &'static str = "number";

    /// Minimum digit count accepted in the raw input.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum digit count accepted in the raw input.
    pub const MAX_DIGITS: usize = 13;

    /// Validate and normalize a recipient phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let raw = value.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let digits = raw.chars().filter(|c| c.is_ascii_digit()).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(ValidationError::DigitCountOutOfRange {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                actual: digits,
            });
        }

        let msisdn = normalize_number(&raw);
        Ok(Self { raw, msisdn })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized digit string as sent to the gateway.
    pub fn msisdn(&self) -> &str {
        &self.msisdn
    }
}

impl PartialEq for Recipient {
    fn eq(&self, other: &Self) -> bool {
        self.msisdn == other.msisdn
    }
}

impl Eq for Recipient {}

impl std::hash::Hash for Recipient {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.msisdn.hash(state);
    }
}

impl std::cmp::PartialOrd for Recipient {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for Recipient {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.msisdn.cmp(&other.msisdn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_rewrites_leading_zero() {
        assert_eq!(normalize_number("09171234567"), "639171234567");
        assert_eq!(normalize_number("0917-123-4567"), "639171234567");
    }

    #[test]
    fn normalization_keeps_country_prefixed_input() {
        assert_eq!(normalize_number("+639171234567"), "639171234567");
        assert_eq!(normalize_number("639171234567"), "639171234567");
    }

    #[test]
    fn normalization_prepends_prefix_to_short_bare_numbers() {
        assert_eq!(normalize_number("9171234567"), "639171234567");
    }

    #[test]
    fn normalization_leaves_long_foreign_numbers_alone() {
        // 11 digits, no leading zero, not 63-prefixed: out of rewrite reach.
        assert_eq!(normalize_number("77171234567"), "77171234567");
    }

    #[test]
    fn api_key_trims_and_reports_blank() {
        let key = ApiKey::new("  key ");
        assert_eq!(key.as_str(), "key");
        assert!(!key.is_blank());
        assert!(ApiKey::new("   ").is_blank());
    }

    #[test]
    fn sender_name_validates_or_maps_blank_to_absent() {
        let sender = SenderName::new(" RMCRS ").unwrap();
        assert_eq!(sender.as_str(), "RMCRS");
        assert!(SenderName::new("  ").is_err());

        assert_eq!(SenderName::opt(" RMCRS ").unwrap().as_str(), "RMCRS");
        assert!(SenderName::opt("   ").is_none());
    }

    #[test]
    fn message_text_rejects_blank_and_preserves_original() {
        let msg = MessageText::new(" hi ").unwrap();
        assert_eq!(msg.as_str(), " hi ");
        assert!(MessageText::new("  ").is_err());
    }

    #[test]
    fn message_text_flags_multi_segment_lengths() {
        let short = MessageText::new("a".repeat(160)).unwrap();
        assert!(!short.exceeds_single_segment());

        let long = MessageText::new("a".repeat(200)).unwrap();
        assert!(long.exceeds_single_segment());
    }

    #[test]
    fn recipient_validates_digit_count_on_the_original_string() {
        assert!(matches!(
            Recipient::new("917123456"),
            Err(ValidationError::DigitCountOutOfRange { actual: 9, .. })
        ));
        assert!(Recipient::new("9171234567").is_ok());
        assert!(Recipient::new("0917-123-4567").is_ok());
        assert!(Recipient::new("6391712345678").is_ok());
        assert!(matches!(
            Recipient::new("63917123456789"),
            Err(ValidationError::DigitCountOutOfRange { actual: 14, .. })
        ));
        assert!(matches!(
            Recipient::new("   "),
            Err(ValidationError::Empty {
                field: Recipient::FIELD
            })
        ));
    }

    #[test]
    fn recipient_exposes_raw_and_normalized_forms() {
        let recipient = Recipient::new(" 09171234567 ").unwrap();
        assert_eq!(recipient.raw(), "09171234567");
        assert_eq!(recipient.msisdn(), "639171234567");
    }

    #[test]
    fn recipient_equality_uses_the_normalized_form() {
        let local = Recipient::new("09171234567").unwrap();
        let international = Recipient::new("+63 917 123 4567").unwrap();
        assert_eq!(local, international);
    }
}
