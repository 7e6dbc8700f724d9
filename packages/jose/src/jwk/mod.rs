//! JSON Web Keys (RFC 7517)
//!
//! A [`Jwk`] pairs the JSON members with the native [`Key`] they describe.
//! Factories per `kty` family convert in both directions and are selected by
//! [`DispatchingJwkFactory`].

pub mod context;
pub mod ec;
pub mod rsa;
pub mod secret;

pub use self::context::JwkContext;
pub use self::ec::EcJwkFactory;
pub use self::rsa::RsaJwkFactory;
pub use self::secret::SecretJwkFactory;

use crate::encoding::base64_url_encode;
use crate::error::{JoseError, JoseResult};
use crate::key::Key;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Members that carry secret or private key material.
const PRIVATE_MEMBERS: &[&str] = &["k", "d", "p", "q", "dp", "dq", "qi", "oth"];

/// Converts between native keys and JWK members for one `kty` family.
pub trait FamilyJwkFactory: Send + Sync {
    /// `kty` value handled by this factory.
    fn kty(&self) -> &'static str;

    /// Whether this factory can export `key`.
    fn supports_key(&self, key: &Key) -> bool;

    /// Export the context's key into JWK members.
    fn create_from_key(&self, ctx: JwkContext) -> JoseResult<Jwk>;

    /// Rebuild the native key from the context's members.
    fn create_from_values(&self, ctx: JwkContext) -> JoseResult<Jwk>;
}

static FACTORIES: [&dyn FamilyJwkFactory; 3] = [&SecretJwkFactory, &RsaJwkFactory, &EcJwkFactory];

/// Selects a family factory by key type or by `kty`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DispatchingJwkFactory;

impl DispatchingJwkFactory {
    /// Build a JWK from a context holding either a key or parsed members.
    pub fn create_jwk(&self, ctx: JwkContext) -> JoseResult<Jwk> {
        if let Some(key) = ctx.key() {
            let factory = FACTORIES
                .iter()
                .find(|factory| factory.supports_key(key))
                .ok_or_else(|| {
                    JoseError::unsupported_key(format!(
                        "A {} cannot be represented as a JWK",
                        key.describe()
                    ))
                })?;
            return factory.create_from_key(ctx);
        }

        let kty = ctx.kty().ok_or_else(|| JoseError::malformed_jwk("kty", "is required"))?;
        let factory = FACTORIES
            .iter()
            .find(|factory| factory.kty() == kty)
            .ok_or_else(|| {
                JoseError::unsupported_key(format!("Unrecognized JWK kty (key type) value '{kty}'"))
            })?;
        factory.create_from_values(ctx)
    }
}

/// An immutable JSON Web Key.
#[derive(Clone)]
pub struct Jwk {
    params: Map<String, Value>,
    key: Key,
}

impl Jwk {
    pub(crate) fn from_context(ctx: JwkContext) -> JoseResult<Self> {
        let (params, key) = ctx.into_parts();
        let key = key.ok_or_else(|| JoseError::internal("JWK context has no key"))?;
        Ok(Self { params, key })
    }

    /// Export a native key.
    pub fn from_key(key: impl Into<Key>) -> JoseResult<Self> {
        DispatchingJwkFactory.create_jwk(JwkContext::for_key(key.into()))
    }

    /// Import parsed JWK members.
    pub fn from_values(fields: Map<String, Value>) -> JoseResult<Self> {
        DispatchingJwkFactory.create_jwk(JwkContext::for_values(fields))
    }

    /// Parse a JWK from JSON text.
    pub fn from_json(json: &str) -> JoseResult<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(fields) => Self::from_values(fields),
            _ => Err(JoseError::serialization("A JWK must be a JSON object")),
        }
    }

    /// `kty`
    #[must_use]
    pub fn kty(&self) -> &str {
        self.params.get("kty").and_then(Value::as_str).unwrap_or_default()
    }

    /// Member value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// All members.
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Native key.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Whether this JWK carries private or secret material.
    #[must_use]
    pub fn is_private(&self) -> bool {
        PRIVATE_MEMBERS.iter().any(|name| self.params.contains_key(*name))
    }

    /// Public JWK for an asymmetric key, dropping private members.
    pub fn to_public_jwk(&self) -> JoseResult<Jwk> {
        let public = self.key.public_key().ok_or_else(|| {
            JoseError::unsupported_key(format!("A {} has no public form", self.key.describe()))
        })?;
        let mut params = self.params.clone();
        for name in PRIVATE_MEMBERS {
            params.remove(*name);
        }
        Ok(Jwk {
            params,
            key: public,
        })
    }

    /// RFC 7638 thumbprint: SHA-256 over the required members in
    /// lexicographic order, Base64URL encoded.
    pub fn thumbprint(&self) -> JoseResult<String> {
        let required: &[&str] = match self.kty() {
            "oct" => &["k", "kty"],
            "RSA" => &["e", "kty", "n"],
            "EC" => &["crv", "kty", "x", "y"],
            other => {
                return Err(JoseError::unsupported_key(format!(
                    "No thumbprint members defined for kty '{other}'"
                )))
            }
        };
        let mut canonical = String::from("{");
        for (i, name) in required.iter().enumerate() {
            let value = self
                .params
                .get(*name)
                .ok_or_else(|| JoseError::malformed_jwk(*name, "is required"))?;
            if i > 0 {
                canonical.push(',');
            }
            canonical.push_str(&serde_json::to_string(name)?);
            canonical.push(':');
            canonical.push_str(&serde_json::to_string(value)?);
        }
        canonical.push('}');
        Ok(base64_url_encode(&Sha256::digest(canonical.as_bytes())))
    }

    /// JSON text of the members.
    pub fn to_json(&self) -> JoseResult<String> {
        Ok(serde_json::to_string(&self.params)?)
    }
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.params.serialize(serializer)
    }
}

impl PartialEq for Jwk {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.params {
            if PRIVATE_MEMBERS.contains(&name.as_str()) {
                map.entry(name, &"<redacted>");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}
