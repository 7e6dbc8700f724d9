//! Base64URL, constant-time comparison and the pluggable JSON serializer

use crate::error::{JoseError, JoseResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;

/// Base64 URL-safe encoding without padding (RFC 7515 §2)
#[inline]
#[must_use]
pub fn base64_url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Base64 URL-safe decoding without padding (RFC 7515 §2)
#[inline]
pub fn base64_url_decode(input: &str) -> JoseResult<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(input)?)
}

/// Constant-time comparison. Unequal lengths compare unequal without
/// inspecting contents.
#[inline]
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Turns header and claims maps into bytes.
pub trait Serializer: Send + Sync {
    /// Serialize `map` to its wire bytes.
    fn serialize(&self, map: &Map<String, Value>) -> JoseResult<Vec<u8>>;

    /// Parse wire bytes back into a map.
    fn deserialize(&self, bytes: &[u8]) -> JoseResult<Map<String, Value>>;
}

/// `serde_json` backed serializer, the default for every builder.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, map: &Map<String, Value>) -> JoseResult<Vec<u8>> {
        Ok(serde_json::to_vec(map)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> JoseResult<Map<String, Value>> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(JoseError::serialization(format!(
                "expected a JSON object, found {}",
                json_type_name(&other)
            ))),
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
