//! Mutable field map a JWK factory fills in while building a [`Jwk`](super::Jwk)

use crate::encoding::{base64_url_decode, base64_url_encode, json_type_name};
use crate::error::{JoseError, JoseResult};
use crate::key::Key;
use serde_json::{Map, Value};

/// Fields and native key collected while a JWK is being built.
#[derive(Clone, Debug, Default)]
pub struct JwkContext {
    fields: Map<String, Value>,
    key: Option<Key>,
}

impl JwkContext {
    /// Context for exporting `key`. `kty` is filled in by the factory.
    #[must_use]
    pub fn for_key(key: Key) -> Self {
        Self {
            fields: Map::new(),
            key: Some(key),
        }
    }

    /// Context for importing already-parsed JWK members.
    #[must_use]
    pub fn for_values(fields: Map<String, Value>) -> Self {
        Self { fields, key: None }
    }

    /// `kty` member, if present.
    #[must_use]
    pub fn kty(&self) -> Option<&str> {
        self.fields.get("kty").and_then(Value::as_str)
    }

    /// Native key, once known.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Record the native key.
    pub fn set_key(&mut self, key: Key) {
        self.key = Some(key);
    }

    /// Set a member.
    pub fn put(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Set a member to the Base64URL encoding of `bytes`.
    pub fn put_bytes(&mut self, name: &str, bytes: &[u8]) {
        self.put(name, base64_url_encode(bytes));
    }

    /// Whether a member is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Required string member.
    pub fn required_string(&self, name: &str) -> JoseResult<&str> {
        match self.fields.get(name) {
            Some(Value::String(value)) if !value.is_empty() => Ok(value),
            Some(Value::String(_)) => Err(JoseError::malformed_jwk(name, "cannot be empty")),
            Some(other) => Err(JoseError::malformed_jwk(
                name,
                format!("must be a string, found {}", json_type_name(other)),
            )),
            None => Err(JoseError::malformed_jwk(name, "is required")),
        }
    }

    /// Required Base64URL member, decoded.
    pub fn required_bytes(&self, name: &str) -> JoseResult<Vec<u8>> {
        let encoded = self.required_string(name)?;
        let bytes = base64_url_decode(encoded)
            .map_err(|_| JoseError::malformed_jwk(name, "is not valid Base64URL"))?;
        if bytes.is_empty() {
            return Err(JoseError::malformed_jwk(name, "decodes to zero bytes"));
        }
        Ok(bytes)
    }

    /// Optional Base64URL member, decoded.
    pub fn optional_bytes(&self, name: &str) -> JoseResult<Option<Vec<u8>>> {
        if self.contains(name) {
            self.required_bytes(name).map(Some)
        } else {
            Ok(None)
        }
    }

    pub(crate) fn into_parts(self) -> (Map<String, Value>, Option<Key>) {
        (self.fields, self.key)
    }
}
