//! ECDSA signatures (ES256 on P-256, ES384 on P-384)
//!
//! Signatures use the JOSE fixed-width `R || S` encoding, not DER.

use crate::algorithms::{Identifiable, SignatureAlgorithm};
use crate::error::{JoseError, JoseResult};
use crate::key::{EcCurve, EcPrivateKey, EcPublicKey, Key};
use crate::random::Randomness;
use crate::request::{SignatureRequest, VerifySignatureRequest};
use p256::ecdsa::signature::{RandomizedSigner, Verifier};
use tracing::debug;

/// ECDSA bound to one curve and its matching SHA-2 digest.
#[derive(Debug)]
pub struct EcSignatureAlgorithm {
    id: &'static str,
    curve: EcCurve,
}

impl EcSignatureAlgorithm {
    pub(crate) const fn new(id: &'static str, curve: EcCurve) -> Self {
        Self { id, curve }
    }

    /// Curve this algorithm requires.
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        self.curve
    }

    /// Length of an encoded signature in bytes.
    #[must_use]
    pub fn signature_len(&self) -> usize {
        self.curve.field_len() * 2
    }

    /// Generate a private key on this algorithm's curve.
    #[must_use]
    pub fn generate_key_pair(&self, random: &mut Randomness<'_>) -> EcPrivateKey {
        let mut rng = random.bridge();
        match self.curve {
            EcCurve::P256 => EcPrivateKey::P256(p256::SecretKey::random(&mut rng)),
            EcCurve::P384 => EcPrivateKey::P384(p384::SecretKey::random(&mut rng)),
        }
    }

    fn curve_mismatch(&self, found: EcCurve) -> JoseError {
        JoseError::invalid_key(format!(
            "{} requires a {} key, found {}",
            self.id,
            self.curve.jwa_name(),
            found.jwa_name()
        ))
    }

    fn signing_key<'k>(&self, key: &'k Key) -> JoseResult<&'k EcPrivateKey> {
        match key {
            Key::EcPrivate(private) if private.curve() == self.curve => Ok(private),
            Key::EcPrivate(private) => Err(self.curve_mismatch(private.curve())),
            other => Err(JoseError::invalid_key(format!(
                "{} signing requires an EC private key, found {}",
                self.id,
                other.describe()
            ))),
        }
    }

    fn verification_key(&self, key: &Key) -> JoseResult<EcPublicKey> {
        let public = match key {
            Key::EcPublic(public) => public.clone(),
            Key::EcPrivate(private) => private.public_key(),
            other => {
                return Err(JoseError::invalid_key(format!(
                    "{} verification requires an EC key, found {}",
                    self.id,
                    other.describe()
                )))
            }
        };
        if public.curve() != self.curve {
            return Err(self.curve_mismatch(public.curve()));
        }
        Ok(public)
    }
}

impl Identifiable for EcSignatureAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl SignatureAlgorithm for EcSignatureAlgorithm {
    fn validate_key(&self, key: &Key, signing: bool) -> JoseResult<()> {
        if signing {
            self.signing_key(key).map(|_| ())
        } else {
            self.verification_key(key).map(|_| ())
        }
    }

    fn sign(&self, mut request: SignatureRequest<'_>) -> JoseResult<Vec<u8>> {
        if request.payload.is_empty() {
            return Err(JoseError::invalid_request("Signing input cannot be empty"));
        }
        let key = self.signing_key(request.key)?;
        debug!(alg = self.id, "Computing ECDSA signature");
        let mut rng = request.random.bridge();
        let signature = match key {
            EcPrivateKey::P256(secret) => {
                let signing_key = p256::ecdsa::SigningKey::from(secret);
                let signature: p256::ecdsa::Signature = signing_key
                    .try_sign_with_rng(&mut rng, request.payload)
                    .map_err(|e| JoseError::signature(format!("ECDSA signing failed: {e}")))?;
                signature.to_bytes().to_vec()
            }
            EcPrivateKey::P384(secret) => {
                let signing_key = p384::ecdsa::SigningKey::from(secret);
                let signature: p384::ecdsa::Signature = signing_key
                    .try_sign_with_rng(&mut rng, request.payload)
                    .map_err(|e| JoseError::signature(format!("ECDSA signing failed: {e}")))?;
                signature.to_bytes().to_vec()
            }
        };
        Ok(signature)
    }

    fn verify(&self, request: VerifySignatureRequest<'_>) -> JoseResult<bool> {
        if request.payload.is_empty() {
            return Err(JoseError::invalid_request("Signing input cannot be empty"));
        }
        let public = self.verification_key(request.key)?;
        if request.signature.len() != self.signature_len() {
            return Ok(false);
        }
        let verified = match public {
            EcPublicKey::P256(point) => p256::ecdsa::Signature::from_slice(request.signature)
                .map(|signature| {
                    p256::ecdsa::VerifyingKey::from(&point)
                        .verify(request.payload, &signature)
                        .is_ok()
                })
                .unwrap_or(false),
            EcPublicKey::P384(point) => p384::ecdsa::Signature::from_slice(request.signature)
                .map(|signature| {
                    p384::ecdsa::VerifyingKey::from(&point)
                        .verify(request.payload, &signature)
                        .is_ok()
                })
                .unwrap_or(false),
        };
        Ok(verified)
    }
}
