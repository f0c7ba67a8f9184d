//! Round token codec.
//!
//! A token is the hex encoding of a small JSON record. It is self-describing
//! and carries the answer in the clear: anyone holding a token can decode
//! it. Tokens are neither authenticated nor confidential, and every decoded
//! field is treated as untrusted input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dex::{CreatureId, Generation};
use crate::engine::PUZZLE_SIZE;

/// Why a token was rejected.
#[derive(Debug)]
pub enum TokenError {
    /// Not valid hex.
    Hex(hex::FromHexError),
    /// Hex decoded, but the payload is not a round record.
    Payload(serde_json::Error),
    /// Too long to be a token.
    TooLong(usize),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hex(e) => write!(f, "malformed round token: {e}"),
            Self::Payload(e) => write!(f, "malformed round token payload: {e}"),
            Self::TooLong(len) => write!(f, "round token too long ({len} characters)"),
        }
    }
}

impl std::error::Error for TokenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hex(e) => Some(e),
            Self::Payload(e) => Some(e),
            Self::TooLong(_) => None,
        }
    }
}

impl From<hex::FromHexError> for TokenError {
    fn from(e: hex::FromHexError) -> Self {
        Self::Hex(e)
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(e: serde_json::Error) -> Self {
        Self::Payload(e)
    }
}

/// Upper bound on encoded token length.
pub const MAX_TOKEN_LEN: usize = 4096;

/// State needed to resume a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoundToken {
    /// The answer.
    pub creature_id: CreatureId,
    /// Names of the moves presented, ascending by move id.
    pub moves: [String; PUZZLE_SIZE],
    /// Cutoff the round was started with.
    pub generation: Generation,
}

impl RoundToken {
    /// Encode to the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialised.
    pub fn encode(&self) -> Result<String, TokenError> {
        Ok(hex::encode(serde_json::to_vec(self)?))
    }

    /// Decode a wire-form token.
    ///
    /// # Errors
    ///
    /// Returns an error for anything that is not a well-formed token.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let token = token.trim();
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLong(token.len()));
        }
        let bytes = hex::decode(token)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
