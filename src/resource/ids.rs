//! Resource identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An internal numeric id or a caller-assigned external id.
///
/// Serialized as `{"id": 1}` or `{"externalId": "pump-7"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdEither {
    Id {
        id: u64,
    },
    ExternalId {
        #[serde(rename = "externalId")]
        external_id: String,
    },
}

impl IdEither {
    pub fn id(id: u64) -> Self {
        IdEither::Id { id }
    }

    pub fn external_id(external_id: impl Into<String>) -> Self {
        IdEither::ExternalId {
            external_id: external_id.into(),
        }
    }
}

impl From<u64> for IdEither {
    fn from(id: u64) -> Self {
        IdEither::id(id)
    }
}

impl From<&str> for IdEither {
    fn from(external_id: &str) -> Self {
        IdEither::external_id(external_id)
    }
}

impl From<String> for IdEither {
    fn from(external_id: String) -> Self {
        IdEither::external_id(external_id)
    }
}

impl fmt::Display for IdEither {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdEither::Id { id } => write!(f, "id:{id}"),
            IdEither::ExternalId { external_id } => write!(f, "externalId:{external_id}"),
        }
    }
}
