use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use fight_caves_core::{Criteria, Round};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "fightcaves";
const SNAPSHOT_VERSION: &str = "v1";
const SESSION_KIND: &str = "session";
const CRITERIA_KIND: &str = "criteria";

/// Identifier prefix emitted before the encoded payload.
pub const SNAPSHOT_HEADER: &str = "fightcaves:v1";
/// Delimiter used to separate the prefix, payload kind and payload.
const FIELD_DELIMITER: char = ':';

/// Persistable state of a session, sufficient to resume it after a restart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Observations gathered so far.
    pub criteria: Criteria,
    /// Last round announced before the snapshot was taken.
    pub last_round: Option<Round>,
    /// Whether the arena was paused when the snapshot was taken.
    pub paused: bool,
}

impl SessionSnapshot {
    /// Encodes the snapshot into a single-line string.
    pub fn encode(&self) -> Result<String, TransferError> {
        encode(SESSION_KIND, self)
    }

    /// Decodes a snapshot from the provided string representation.
    pub fn decode(value: &str) -> Result<Self, TransferError> {
        decode(SESSION_KIND, value)
    }
}

/// Encodes criteria alone into a single-line string.
pub fn dump_criteria(criteria: &Criteria) -> Result<String, TransferError> {
    encode(CRITERIA_KIND, criteria)
}

/// Decodes criteria produced by [`dump_criteria`].
///
/// Rounds outside `1..=63` and unknown locations or kinds are rejected.
pub fn load_criteria(value: &str) -> Result<Criteria, TransferError> {
    decode(CRITERIA_KIND, value)
}

/// Errors that can occur while encoding or decoding persisted state.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot payload was empty")]
    EmptyPayload,
    /// The encoded string did not contain a version segment.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The encoded string did not name its payload kind.
    #[error("snapshot string is missing the payload kind")]
    MissingKind,
    /// The encoded string did not include the payload segment.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The encoded string used an unexpected prefix segment.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded string used an unsupported version identifier.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The encoded string holds a different kind of payload.
    #[error("expected a {expected} snapshot but found '{found}'")]
    UnexpectedKind {
        /// Kind the caller asked for.
        expected: &'static str,
        /// Kind found in the string.
        found: String,
    },
    /// The encoded string carried segments after the payload.
    #[error("snapshot string has trailing segments")]
    TrailingSegments,
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The value could not be serialised.
    #[error("could not serialise snapshot: {0}")]
    Serialization(#[source] serde_json::Error),
}

fn encode<T: Serialize>(kind: &str, value: &T) -> Result<String, TransferError> {
    let json = serde_json::to_vec(value).map_err(TransferError::Serialization)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SNAPSHOT_HEADER}:{kind}:{encoded}"))
}

fn decode<T: DeserializeOwned>(expected: &'static str, value: &str) -> Result<T, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::EmptyPayload)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let kind = parts.next().ok_or(TransferError::MissingKind)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;
    if parts.next().is_some() {
        return Err(TransferError::TrailingSegments);
    }

    if domain != SNAPSHOT_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }
    if kind != expected {
        return Err(TransferError::UnexpectedKind {
            expected,
            found: kind.to_owned(),
        });
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)
}
