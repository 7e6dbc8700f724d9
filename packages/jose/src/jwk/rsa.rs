//! `RSA` JWKs (RFC 7518 §6.3)

use super::{FamilyJwkFactory, Jwk, JwkContext};
use crate::error::{JoseError, JoseResult};
use crate::key::Key;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

/// Largest modulus accepted for an imported public key.
pub const MAX_PUBLIC_MODULUS_BITS: usize = 16_384;

/// Factory for RSA public and private keys.
///
/// Public keys are accepted up to [`MAX_PUBLIC_MODULUS_BITS`]. Private keys
/// are limited to the 4096-bit ceiling of the `rsa` crate's key validation.
#[derive(Clone, Copy, Debug, Default)]
pub struct RsaJwkFactory;

fn put_uint(ctx: &mut JwkContext, name: &str, value: &BigUint) {
    ctx.put_bytes(name, &value.to_bytes_be());
}

fn required_uint(ctx: &JwkContext, name: &str) -> JoseResult<BigUint> {
    Ok(BigUint::from_bytes_be(&ctx.required_bytes(name)?))
}

impl RsaJwkFactory {
    fn export_public(ctx: &mut JwkContext, public: &RsaPublicKey) {
        put_uint(ctx, "n", public.n());
        put_uint(ctx, "e", public.e());
    }

    fn export_private(ctx: &mut JwkContext, private: &RsaPrivateKey) -> JoseResult<()> {
        Self::export_public(ctx, &private.to_public_key());
        put_uint(ctx, "d", private.d());

        let primes = private.primes();
        if primes.len() != 2 {
            return Err(JoseError::unsupported_key(
                "Multi-prime RSA keys cannot be represented as a JWK",
            ));
        }
        put_uint(ctx, "p", &primes[0]);
        put_uint(ctx, "q", &primes[1]);
        if let (Some(dp), Some(dq), Some(qi)) =
            (private.dp(), private.dq(), private.crt_coefficient())
        {
            put_uint(ctx, "dp", dp);
            put_uint(ctx, "dq", dq);
            put_uint(ctx, "qi", &qi);
        }
        Ok(())
    }
}

impl FamilyJwkFactory for RsaJwkFactory {
    fn kty(&self) -> &'static str {
        "RSA"
    }

    fn supports_key(&self, key: &Key) -> bool {
        matches!(key, Key::RsaPublic(_) | Key::RsaPrivate(_))
    }

    fn create_from_key(&self, mut ctx: JwkContext) -> JoseResult<Jwk> {
        let key = ctx
            .key()
            .cloned()
            .ok_or_else(|| JoseError::internal("JWK context has no key"))?;
        ctx.put("kty", self.kty());
        match &key {
            Key::RsaPublic(public) => Self::export_public(&mut ctx, public),
            Key::RsaPrivate(private) => Self::export_private(&mut ctx, private)?,
            other => {
                return Err(JoseError::internal(format!(
                    "RSA factory given a {}",
                    other.describe()
                )))
            }
        }
        Jwk::from_context(ctx)
    }

    fn create_from_values(&self, mut ctx: JwkContext) -> JoseResult<Jwk> {
        let n = required_uint(&ctx, "n")?;
        let e = required_uint(&ctx, "e")?;

        if !ctx.contains("d") {
            let public = RsaPublicKey::new_with_max_size(n, e, MAX_PUBLIC_MODULUS_BITS)
                .map_err(|err| {
                    JoseError::malformed_jwk("n", format!("is not a valid RSA modulus: {err}"))
                })?;
            ctx.set_key(Key::RsaPublic(public));
            return Jwk::from_context(ctx);
        }

        let d = required_uint(&ctx, "d")?;
        let p = required_uint(&ctx, "p")?;
        let q = required_uint(&ctx, "q")?;
        let invalid = |err: rsa::Error| {
            JoseError::malformed_jwk("d", format!("does not form a valid RSA key: {err}"))
        };
        let mut private =
            RsaPrivateKey::from_components(n, e, d, vec![p, q]).map_err(invalid)?;
        private.validate().map_err(invalid)?;
        private.precompute().map_err(invalid)?;

        for (name, expected) in [
            ("dp", private.dp().cloned()),
            ("dq", private.dq().cloned()),
            ("qi", private.crt_coefficient()),
        ] {
            if let (Some(supplied), Some(expected)) = (ctx.optional_bytes(name)?, expected) {
                if BigUint::from_bytes_be(&supplied) != expected {
                    return Err(JoseError::malformed_jwk(
                        name,
                        "does not match the value computed from p, q and d",
                    ));
                }
            }
        }

        ctx.set_key(Key::RsaPrivate(private));
        Jwk::from_context(ctx)
    }
}
