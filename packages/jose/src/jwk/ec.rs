//! `EC` JWKs (RFC 7518 §6.2)

use super::{FamilyJwkFactory, Jwk, JwkContext};
use crate::encoding::base64_url_encode;
use crate::error::{JoseError, JoseResult};
use crate::key::{EcCurve, EcPrivateKey, EcPublicKey, Key};
use p256::elliptic_curve::sec1::FromEncodedPoint;
use serde_json::{Map, Value};

/// Factory for P-256 and P-384 keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct EcJwkFactory;

/// `kty`, `crv`, `x` and `y` members for a public key.
#[must_use]
pub fn public_key_params(key: &EcPublicKey) -> Map<String, Value> {
    let (x, y) = key.coordinates();
    let mut params = Map::new();
    params.insert("kty".to_string(), Value::from("EC"));
    params.insert("crv".to_string(), Value::from(key.curve().jwa_name()));
    params.insert("x".to_string(), Value::from(base64_url_encode(&x)));
    params.insert("y".to_string(), Value::from(base64_url_encode(&y)));
    params
}

/// Parse an EC public key from JWK members, checking the point is on the curve.
pub fn parse_public_key(fields: &Map<String, Value>) -> JoseResult<EcPublicKey> {
    let ctx = JwkContext::for_values(fields.clone());
    match ctx.kty() {
        Some("EC") => {}
        Some(other) => {
            return Err(JoseError::malformed_jwk(
                "kty",
                format!("must be 'EC', found '{other}'"),
            ))
        }
        None => return Err(JoseError::malformed_jwk("kty", "is required")),
    }
    read_public(&ctx)
}

fn read_curve(ctx: &JwkContext) -> JoseResult<EcCurve> {
    let crv = ctx.required_string("crv")?;
    EcCurve::from_jwa_name(crv)
        .ok_or_else(|| JoseError::malformed_jwk("crv", format!("curve '{crv}' is not supported")))
}

fn read_coordinate(ctx: &JwkContext, name: &str, curve: EcCurve) -> JoseResult<Vec<u8>> {
    let bytes = ctx.required_bytes(name)?;
    if bytes.len() != curve.field_len() {
        return Err(JoseError::malformed_jwk(
            name,
            format!(
                "must be {} bytes for {}, found {}",
                curve.field_len(),
                curve.jwa_name(),
                bytes.len()
            ),
        ));
    }
    Ok(bytes)
}

fn read_public(ctx: &JwkContext) -> JoseResult<EcPublicKey> {
    let curve = read_curve(ctx)?;
    let x = read_coordinate(ctx, "x", curve)?;
    let y = read_coordinate(ctx, "y", curve)?;
    let off_curve = || JoseError::malformed_jwk("x", "and 'y' do not form a point on the curve");
    match curve {
        EcCurve::P256 => {
            let point = p256::EncodedPoint::from_affine_coordinates(
                p256::FieldBytes::from_slice(&x),
                p256::FieldBytes::from_slice(&y),
                false,
            );
            let key: Option<p256::PublicKey> = p256::PublicKey::from_encoded_point(&point).into();
            key.map(EcPublicKey::P256).ok_or_else(off_curve)
        }
        EcCurve::P384 => {
            let point = p384::EncodedPoint::from_affine_coordinates(
                p384::FieldBytes::from_slice(&x),
                p384::FieldBytes::from_slice(&y),
                false,
            );
            let key: Option<p384::PublicKey> = p384::PublicKey::from_encoded_point(&point).into();
            key.map(EcPublicKey::P384).ok_or_else(off_curve)
        }
    }
}

fn read_private(ctx: &JwkContext, public: &EcPublicKey) -> JoseResult<EcPrivateKey> {
    let curve = public.curve();
    let d = zeroize::Zeroizing::new(read_coordinate(ctx, "d", curve)?);
    let invalid = |_: p256::elliptic_curve::Error| {
        JoseError::malformed_jwk("d", "is not a valid private scalar")
    };
    let private = match curve {
        EcCurve::P256 => {
            let scalar = p256::SecretKey::from_bytes(p256::FieldBytes::from_slice(&d));
            EcPrivateKey::P256(scalar.map_err(invalid)?)
        }
        EcCurve::P384 => {
            let scalar = p384::SecretKey::from_bytes(p384::FieldBytes::from_slice(&d));
            EcPrivateKey::P384(scalar.map_err(invalid)?)
        }
    };
    if &private.public_key() != public {
        return Err(JoseError::malformed_jwk(
            "d",
            "does not correspond to the public point 'x', 'y'",
        ));
    }
    Ok(private)
}

impl FamilyJwkFactory for EcJwkFactory {
    fn kty(&self) -> &'static str {
        "EC"
    }

    fn supports_key(&self, key: &Key) -> bool {
        matches!(key, Key::EcPublic(_) | Key::EcPrivate(_))
    }

    fn create_from_key(&self, mut ctx: JwkContext) -> JoseResult<Jwk> {
        let (public, private) = match ctx.key() {
            Some(Key::EcPublic(public)) => (public.clone(), None),
            Some(Key::EcPrivate(private)) => (private.public_key(), Some(private.scalar_bytes())),
            Some(other) => {
                return Err(JoseError::internal(format!(
                    "EC factory given a {}",
                    other.describe()
                )))
            }
            None => return Err(JoseError::internal("JWK context has no key")),
        };
        for (name, value) in public_key_params(&public) {
            ctx.put(&name, value);
        }
        if let Some(d) = private {
            ctx.put_bytes("d", &d);
        }
        Jwk::from_context(ctx)
    }

    fn create_from_values(&self, mut ctx: JwkContext) -> JoseResult<Jwk> {
        let public = read_public(&ctx)?;
        let key = if ctx.contains("d") {
            Key::EcPrivate(read_private(&ctx, &public)?)
        } else {
            Key::EcPublic(public)
        };
        ctx.set_key(key);
        Jwk::from_context(ctx)
    }
}
