//! Public order identifiers.
//!
//! Every order — standard or custom — is addressed by a human-readable id of
//! the form `ORD-{PRM|CUS}-{YYYYMMDD}-{seq}`, where the sequence is a
//! zero-padded daily counter. When the sequence source is unavailable the
//! generator falls back to a timestamp-derived suffix, so parsing accepts any
//! numeric suffix of four or more digits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PREFIX: &str = "ORD";

/// The kind of order an id addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// A standard order for catalogue products.
    Retail,
    /// A made-to-order custom cake.
    Custom,
}

impl OrderKind {
    /// Returns the type code embedded in the order id.
    pub fn code(&self) -> &'static str {
        match self {
            OrderKind::Retail => "PRM",
            OrderKind::Custom => "CUS",
        }
    }

    /// Resolves a type code back to a kind.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PRM" => Some(OrderKind::Retail),
            "CUS" => Some(OrderKind::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised when parsing an order id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderIdError {
    /// The id does not have the `ORD-TYPE-DATE-SEQ` shape.
    #[error("malformed order id: {0}")]
    Malformed(String),

    /// The type code is not one of the known kinds.
    #[error("unknown order type code: {0}")]
    UnknownKind(String),

    /// The date segment is not a valid `YYYYMMDD` date.
    #[error("invalid date segment: {0}")]
    InvalidDate(String),

    /// The sequence segment is not numeric or is too short.
    #[error("invalid sequence segment: {0}")]
    InvalidSequence(String),
}

/// The components recovered from a well-formed order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedOrderId {
    pub kind: OrderKind,
    pub date: NaiveDate,
    pub sequence: u32,
}

/// Public, human-readable order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Wraps an already-formatted id without validation.
    ///
    /// Used when rehydrating entities from storage; freshly generated ids go
    /// through [`OrderId::with_sequence`] or [`OrderId::with_suffix`].
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Formats an id from a daily sequence number (zero-padded to 4 digits).
    pub fn with_sequence(kind: OrderKind, date: NaiveDate, sequence: u32) -> Self {
        Self(format!(
            "{PREFIX}-{}-{}-{:04}",
            kind.code(),
            date.format("%Y%m%d"),
            sequence
        ))
    }

    /// Formats an id from an arbitrary numeric suffix.
    ///
    /// The fallback path for when the daily sequence cannot be determined.
    pub fn with_suffix(kind: OrderKind, date: NaiveDate, suffix: &str) -> Self {
        Self(format!(
            "{PREFIX}-{}-{}-{suffix}",
            kind.code(),
            date.format("%Y%m%d"),
        ))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the id back into its kind, date and sequence.
    pub fn parse(&self) -> Result<ParsedOrderId, OrderIdError> {
        let mut parts = self.0.split('-');

        let prefix = parts.next().unwrap_or_default();
        let (Some(kind), Some(date), Some(seq), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(OrderIdError::Malformed(self.0.clone()));
        };
        if prefix != PREFIX {
            return Err(OrderIdError::Malformed(self.0.clone()));
        }

        let kind =
            OrderKind::from_code(kind).ok_or_else(|| OrderIdError::UnknownKind(kind.to_string()))?;
        let date = NaiveDate::parse_from_str(date, "%Y%m%d")
            .map_err(|_| OrderIdError::InvalidDate(date.to_string()))?;
        if seq.len() < 4 || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderIdError::InvalidSequence(seq.to_string()));
        }
        let sequence = seq
            .parse::<u32>()
            .map_err(|_| OrderIdError::InvalidSequence(seq.to_string()))?;

        Ok(ParsedOrderId {
            kind,
            date,
            sequence,
        })
    }

    /// Returns the kind encoded in the id, if well-formed.
    pub fn kind(&self) -> Option<OrderKind> {
        self.parse().ok().map(|p| p.kind)
    }

    /// Returns the date encoded in the id, if well-formed.
    pub fn date(&self) -> Option<NaiveDate> {
        self.parse().ok().map(|p| p.date)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
