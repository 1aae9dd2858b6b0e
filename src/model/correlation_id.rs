//! Correlation-ID is a UUID to use for correlation logs/query together

use http::HeaderMap;
use serde_derive::{Deserialize, Serialize};
use thiserror::*;
use uuid::{fmt::Hyphenated, Uuid};

/// Correlation-ID for correlating logs together
#[derive(Clone, Debug, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CorrelationId(Uuid);

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(c: Uuid) -> Self {
        CorrelationId(c)
    }
}

impl From<CorrelationId> for Uuid {
    fn from(c: CorrelationId) -> Self {
        c.0
    }
}

impl<'a> TryFrom<&'a str> for CorrelationId {
    type Error = InvalidCorrelationId;

    fn try_from(input: &'a str) -> Result<Self, Self::Error> {
        Uuid::parse_str(input)
            .map(CorrelationId)
            .map_err(|_| InvalidCorrelationId::InvalidString(input.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum InvalidCorrelationId {
    #[error("correlation-id not found")]
    NotFound(),
    #[error("Invalid correlation-id string {0}")]
    InvalidString(String),
}

impl CorrelationId {
    pub const HEADER_NAME: &'static str = "correlation-id";

    /// Extract correlation-id from a set of HTTP headers
    ///
    /// # Examples
    ///
    /// Basic usage
    ///
    /// ```
    /// # use http::HeaderMap;
    /// # use taskboard::model::CorrelationId;
    /// # use uuid::Uuid;
    /// let mut headers = HeaderMap::new();
    ///
    /// let cid = CorrelationId::from(Uuid::new_v4());
    /// cid.insert_into_header_map(&mut headers).unwrap();
    /// let cid_extracted = CorrelationId::from_header_map(&headers);
    ///
    /// assert_eq!(cid_extracted.unwrap(), cid);
    /// ```
    pub fn from_header_map(h: &HeaderMap) -> Result<Self, InvalidCorrelationId> {
        h.get(Self::HEADER_NAME)
            .ok_or(InvalidCorrelationId::NotFound())
            .and_then(|x| {
                x.to_str()
                    .map_err(|err| InvalidCorrelationId::InvalidString(err.to_string()))
            })
            .and_then(|x| {
                Uuid::parse_str(x)
                    .map_err(|err| InvalidCorrelationId::InvalidString(err.to_string()))
            })
            .map(|cid| cid.into())
    }

    pub fn insert_into_header_map(&self, h: &mut HeaderMap) -> anyhow::Result<()> {
        h.insert(
            Self::HEADER_NAME,
            http::HeaderValue::from_str(
                self.as_hyphenated()
                    .encode_lower(&mut Uuid::encode_buffer()),
            )?,
        );
        Ok(())
    }

    pub fn as_hyphenated(&self) -> Hyphenated {
        self.0.hyphenated()
    }
}
