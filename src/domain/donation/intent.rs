//! Donation intent and the checkout-session metadata codec.
//!
//! A [`DonationIntent`] is the validated, ephemeral description of a donation
//! before any payment happens. It is never persisted; instead it rides along
//! inside the gateway's checkout-session metadata and is decoded back at
//! confirmation time.
//!
//! # Wire Convention
//!
//! Gateway metadata is a string-only map. The codec owns the translation in
//! both directions:
//!
//! | key | value |
//! |---|---|
//! | `projectId` | project UUID |
//! | `donorName` | display name |
//! | `donorEmail` | contact email |
//! | `userId` | user id, empty string (or `"null"`) when anonymous |
//! | `amount` | decimal amount encoded as a string |
//!
//! Decoding is strict and fails closed: missing or malformed fields yield a
//! [`MetadataError`] and the session is treated as unconfirmable. No other
//! code interprets the wire convention.

use std::collections::HashMap;

use crate::domain::foundation::{DonationAmount, ProjectId, UserId, ValidationError};

/// Validated donation request, prior to checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationIntent {
    /// Donated amount.
    pub amount: DonationAmount,

    /// Target project.
    pub project_id: ProjectId,

    /// Donor display name.
    pub donor_name: String,

    /// Donor contact email.
    pub donor_email: String,

    /// Authenticated user, if any. Verified at confirmation, not here.
    pub user_id: Option<UserId>,
}

impl DonationIntent {
    /// Builds a validated intent from raw request fields.
    pub fn new(
        amount: f64,
        project_id: ProjectId,
        donor_name: impl Into<String>,
        donor_email: impl Into<String>,
        user_id: Option<UserId>,
    ) -> Result<Self, ValidationError> {
        let donor_name = donor_name.into();
        if donor_name.trim().is_empty() {
            return Err(ValidationError::empty_field("donor_name"));
        }

        let donor_email = donor_email.into();
        if donor_email.trim().is_empty() {
            return Err(ValidationError::empty_field("donor_email"));
        }

        Ok(Self {
            amount: DonationAmount::new(amount)?,
            project_id,
            donor_name,
            donor_email,
            user_id,
        })
    }
}

/// Error decoding session metadata back into a [`DonationIntent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A required key is absent from the metadata map.
    MissingField(&'static str),
    /// A value is present but cannot be parsed.
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "Missing metadata field '{}'", field),
            Self::InvalidField { field, reason } => {
                write!(f, "Invalid metadata field '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for MetadataError {}

/// Codec between [`DonationIntent`] and the gateway's string-only metadata.
pub struct SessionMetadata;

impl SessionMetadata {
    const KEY_PROJECT_ID: &'static str = "projectId";
    const KEY_DONOR_NAME: &'static str = "donorName";
    const KEY_DONOR_EMAIL: &'static str = "donorEmail";
    const KEY_USER_ID: &'static str = "userId";
    const KEY_AMOUNT: &'static str = "amount";

    /// Encodes an intent into session metadata.
    ///
    /// The amount is string-encoded to survive the gateway's string-only
    /// metadata constraint; an absent user becomes the empty string.
    pub fn encode(intent: &DonationIntent) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert(
            Self::KEY_PROJECT_ID.to_string(),
            intent.project_id.to_string(),
        );
        metadata.insert(Self::KEY_DONOR_NAME.to_string(), intent.donor_name.clone());
        metadata.insert(
            Self::KEY_DONOR_EMAIL.to_string(),
            intent.donor_email.clone(),
        );
        metadata.insert(
            Self::KEY_USER_ID.to_string(),
            intent
                .user_id
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_default(),
        );
        metadata.insert(Self::KEY_AMOUNT.to_string(), intent.amount.to_string());
        metadata
    }

    /// Decodes session metadata back into an intent.
    ///
    /// Strict: every required key must be present and parse; the decoded
    /// amount is re-validated against the donation minimum. The user id is
    /// translated from the wire convention (empty or `"null"` means absent)
    /// but NOT verified against the user directory; that happens at
    /// confirmation.
    pub fn decode(metadata: &HashMap<String, String>) -> Result<DonationIntent, MetadataError> {
        let project_id: ProjectId = Self::required(metadata, Self::KEY_PROJECT_ID)?
            .parse()
            .map_err(|e: uuid::Error| MetadataError::InvalidField {
                field: Self::KEY_PROJECT_ID,
                reason: e.to_string(),
            })?;

        let donor_name = Self::required(metadata, Self::KEY_DONOR_NAME)?;
        let donor_email = Self::required(metadata, Self::KEY_DONOR_EMAIL)?;

        let amount_raw = Self::required(metadata, Self::KEY_AMOUNT)?;
        let amount_value: f64 =
            amount_raw
                .parse()
                .map_err(|_| MetadataError::InvalidField {
                    field: Self::KEY_AMOUNT,
                    reason: format!("'{}' is not a decimal number", amount_raw),
                })?;
        let amount =
            DonationAmount::new(amount_value).map_err(|e| MetadataError::InvalidField {
                field: Self::KEY_AMOUNT,
                reason: e.to_string(),
            })?;

        let user_id = Self::decode_user_id(metadata.get(Self::KEY_USER_ID));

        DonationIntent::new(
            amount.value(),
            project_id,
            donor_name,
            donor_email,
            user_id,
        )
        .map_err(|e| MetadataError::InvalidField {
            field: "intent",
            reason: e.to_string(),
        })
    }

    /// Translates the wire convention for optional user references.
    ///
    /// Absent key, empty string, and the literal `"null"` all mean "no user".
    fn decode_user_id(raw: Option<&String>) -> Option<UserId> {
        let raw = raw?;
        if raw.is_empty() || raw == "null" {
            return None;
        }
        UserId::new(raw.clone()).ok()
    }

    fn required<'a>(
        metadata: &'a HashMap<String, String>,
        key: &'static str,
    ) -> Result<&'a str, MetadataError> {
        let value = metadata
            .get(key)
            .ok_or(MetadataError::MissingField(key))?;
        if value.trim().is_empty() {
            return Err(MetadataError::MissingField(key));
        }
        Ok(value)
    }
}
