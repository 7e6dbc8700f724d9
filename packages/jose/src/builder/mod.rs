//! Token builders
//!
//! Builders accumulate configuration through `#[must_use]` setters and do all
//! validation in a single pass when the token is produced. They are consumed
//! by `compact()`.

pub mod jwe;
pub mod jws;

pub use self::jwe::JweBuilder;
pub use self::jws::JwsBuilder;

use crate::encoding::Serializer;
use crate::error::{JoseError, JoseResult};
use serde_json::{Map, Value};

/// Payload bytes from exactly one of raw payload or claims.
pub(crate) fn resolve_payload(
    payload: Option<Vec<u8>>,
    claims: Option<Map<String, Value>>,
    serializer: &dyn Serializer,
) -> JoseResult<Vec<u8>> {
    match (payload, claims) {
        (Some(_), Some(_)) => Err(JoseError::builder_state(
            "Both payload and claims are set; only one may be used",
        )),
        (None, None) => Err(JoseError::builder_state(
            "Either payload or claims must be set",
        )),
        (Some(payload), None) if payload.is_empty() => {
            Err(JoseError::builder_state("Payload cannot be empty"))
        }
        (Some(payload), None) => Ok(payload),
        (None, Some(claims)) if claims.is_empty() => {
            Err(JoseError::builder_state("Claims cannot be empty"))
        }
        (None, Some(claims)) => {
            let bytes = serializer.serialize(&claims)?;
            if bytes.is_empty() {
                return Err(JoseError::internal("Serializer produced no claims bytes"));
            }
            Ok(bytes)
        }
    }
}
