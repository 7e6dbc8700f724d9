//! `oct` JWKs (RFC 7518 §6.4)

use super::{FamilyJwkFactory, Jwk, JwkContext};
use crate::error::{JoseError, JoseResult};
use crate::key::{Key, SecretKey};
use zeroize::Zeroizing;

/// Factory for symmetric keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecretJwkFactory;

impl FamilyJwkFactory for SecretJwkFactory {
    fn kty(&self) -> &'static str {
        "oct"
    }

    fn supports_key(&self, key: &Key) -> bool {
        matches!(key, Key::Secret(_))
    }

    fn create_from_key(&self, mut ctx: JwkContext) -> JoseResult<Jwk> {
        let Some(Key::Secret(secret)) = ctx.key() else {
            return Err(JoseError::internal("oct factory given a non-secret key"));
        };
        let encoded = match secret.encoded() {
            Some(bytes) if !bytes.is_empty() => Zeroizing::new(bytes.to_vec()),
            _ => {
                return Err(JoseError::unsupported_key(
                    "Unable to encode secret key to JWK: the key has no exportable bytes",
                ))
            }
        };
        ctx.put("kty", self.kty());
        ctx.put_bytes("k", &encoded);
        Jwk::from_context(ctx)
    }

    fn create_from_values(&self, mut ctx: JwkContext) -> JoseResult<Jwk> {
        let bytes = ctx.required_bytes("k")?;
        let algorithm = if ctx.contains("alg") {
            ctx.required_string("alg")?.to_string()
        } else {
            "AES".to_string()
        };
        ctx.set_key(Key::Secret(SecretKey::with_algorithm(bytes, algorithm)));
        Jwk::from_context(ctx)
    }
}
