//! Native key material accepted by the JOSE algorithms
//!
//! Secret material is held in `Zeroizing` buffers and is wiped when the key
//! is dropped. `Debug` output never includes key bytes.

use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use zeroize::Zeroizing;

/// Symmetric key bytes, or an opaque handle to a key that cannot be exported.
#[derive(Clone)]
pub struct SecretKey {
    material: Option<Zeroizing<Vec<u8>>>,
    algorithm: String,
}

impl SecretKey {
    /// Secret key from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            material: Some(Zeroizing::new(bytes.into())),
            algorithm: "AES".to_string(),
        }
    }

    /// Secret key from raw bytes, tagged with the algorithm it is meant for.
    #[must_use]
    pub fn with_algorithm(bytes: impl Into<Vec<u8>>, algorithm: impl Into<String>) -> Self {
        Self {
            material: Some(Zeroizing::new(bytes.into())),
            algorithm: algorithm.into(),
        }
    }

    /// A key whose bytes live elsewhere (hardware module, remote KMS) and
    /// cannot be read back.
    #[must_use]
    pub fn opaque(algorithm: impl Into<String>) -> Self {
        Self {
            material: None,
            algorithm: algorithm.into(),
        }
    }

    /// Raw key bytes, `None` for opaque keys.
    #[must_use]
    pub fn encoded(&self) -> Option<&[u8]> {
        self.material.as_deref().map(Vec::as_slice)
    }

    /// Name of the algorithm this key is tagged with.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Key size in bits, `None` for opaque keys.
    #[must_use]
    pub fn bit_len(&self) -> Option<usize> {
        self.encoded().map(|bytes| bytes.len() * 8)
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        match (self.encoded(), other.encoded()) {
            (Some(a), Some(b)) => a.len() == b.len() && bool::from(a.ct_eq(b)),
            _ => false,
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("algorithm", &self.algorithm)
            .field("bits", &self.bit_len())
            .finish_non_exhaustive()
    }
}

/// Password used for PBES2 key derivation.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    /// UTF-8 bytes of the password.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(REDACTED)")
    }
}

/// Elliptic curves supported for ECDSA and ECDH-ES.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EcCurve {
    /// NIST P-256
    P256,
    /// NIST P-384
    P384,
}

impl EcCurve {
    /// JWK `crv` value.
    #[must_use]
    pub fn jwa_name(self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
        }
    }

    /// Curve for a JWK `crv` value.
    #[must_use]
    pub fn from_jwa_name(name: &str) -> Option<Self> {
        match name {
            "P-256" => Some(EcCurve::P256),
            "P-384" => Some(EcCurve::P384),
            _ => None,
        }
    }

    /// Field element size in bytes.
    #[must_use]
    pub fn field_len(self) -> usize {
        match self {
            EcCurve::P256 => 32,
            EcCurve::P384 => 48,
        }
    }
}

/// EC public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EcPublicKey {
    /// P-256 point
    P256(p256::PublicKey),
    /// P-384 point
    P384(p384::PublicKey),
}

impl EcPublicKey {
    /// Curve of this key.
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self {
            EcPublicKey::P256(_) => EcCurve::P256,
            EcPublicKey::P384(_) => EcCurve::P384,
        }
    }

    /// Uncompressed SEC1 encoding split into affine `(x, y)` coordinates.
    #[must_use]
    pub fn coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        use p256::elliptic_curve::sec1::ToEncodedPoint;
        match self {
            EcPublicKey::P256(key) => {
                let point = key.to_encoded_point(false);
                (
                    point.x().map(|x| x.to_vec()).unwrap_or_default(),
                    point.y().map(|y| y.to_vec()).unwrap_or_default(),
                )
            }
            EcPublicKey::P384(key) => {
                let point = key.to_encoded_point(false);
                (
                    point.x().map(|x| x.to_vec()).unwrap_or_default(),
                    point.y().map(|y| y.to_vec()).unwrap_or_default(),
                )
            }
        }
    }
}

/// EC private key.
#[derive(Clone)]
pub enum EcPrivateKey {
    /// P-256 scalar
    P256(p256::SecretKey),
    /// P-384 scalar
    P384(p384::SecretKey),
}

impl EcPrivateKey {
    /// Curve of this key.
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self {
            EcPrivateKey::P256(_) => EcCurve::P256,
            EcPrivateKey::P384(_) => EcCurve::P384,
        }
    }

    /// Matching public key.
    #[must_use]
    pub fn public_key(&self) -> EcPublicKey {
        match self {
            EcPrivateKey::P256(key) => EcPublicKey::P256(key.public_key()),
            EcPrivateKey::P384(key) => EcPublicKey::P384(key.public_key()),
        }
    }

    /// Big-endian scalar bytes, zeroed on drop.
    #[must_use]
    pub fn scalar_bytes(&self) -> Zeroizing<Vec<u8>> {
        match self {
            EcPrivateKey::P256(key) => Zeroizing::new(key.to_bytes().to_vec()),
            EcPrivateKey::P384(key) => Zeroizing::new(key.to_bytes().to_vec()),
        }
    }
}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPrivateKey")
            .field("curve", &self.curve())
            .finish_non_exhaustive()
    }
}

/// Any key a JOSE algorithm can be asked to use.
#[derive(Clone, Debug)]
pub enum Key {
    /// Symmetric key
    Secret(SecretKey),
    /// Password for PBES2
    Password(Password),
    /// RSA public key
    RsaPublic(RsaPublicKey),
    /// RSA private key
    RsaPrivate(RsaPrivateKey),
    /// EC public key
    EcPublic(EcPublicKey),
    /// EC private key
    EcPrivate(EcPrivateKey),
}

impl Key {
    /// JWK `kty` family of this key. Passwords have no JWK form.
    #[must_use]
    pub fn kty(&self) -> Option<&'static str> {
        match self {
            Key::Secret(_) => Some("oct"),
            Key::Password(_) => None,
            Key::RsaPublic(_) | Key::RsaPrivate(_) => Some("RSA"),
            Key::EcPublic(_) | Key::EcPrivate(_) => Some("EC"),
        }
    }

    /// Short description used in error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Key::Secret(_) => "secret key",
            Key::Password(_) => "password",
            Key::RsaPublic(_) => "RSA public key",
            Key::RsaPrivate(_) => "RSA private key",
            Key::EcPublic(_) => "EC public key",
            Key::EcPrivate(_) => "EC private key",
        }
    }

    /// Whether this is a private or secret key.
    #[must_use]
    pub fn is_private(&self) -> bool {
        matches!(
            self,
            Key::Secret(_) | Key::Password(_) | Key::RsaPrivate(_) | Key::EcPrivate(_)
        )
    }

    /// RSA modulus size in bits, `None` for non-RSA keys.
    #[must_use]
    pub fn rsa_modulus_bits(&self) -> Option<usize> {
        match self {
            Key::RsaPublic(key) => Some(key.n().bits()),
            Key::RsaPrivate(key) => Some(key.n().bits()),
            _ => None,
        }
    }

    /// Public half of an asymmetric key.
    #[must_use]
    pub fn public_key(&self) -> Option<Key> {
        match self {
            Key::RsaPublic(_) | Key::EcPublic(_) => Some(self.clone()),
            Key::RsaPrivate(key) => Some(Key::RsaPublic(key.to_public_key())),
            Key::EcPrivate(key) => Some(Key::EcPublic(key.public_key())),
            Key::Secret(_) | Key::Password(_) => None,
        }
    }
}

impl From<SecretKey> for Key {
    fn from(key: SecretKey) -> Self {
        Key::Secret(key)
    }
}

impl From<Password> for Key {
    fn from(password: Password) -> Self {
        Key::Password(password)
    }
}

impl From<RsaPublicKey> for Key {
    fn from(key: RsaPublicKey) -> Self {
        Key::RsaPublic(key)
    }
}

impl From<RsaPrivateKey> for Key {
    fn from(key: RsaPrivateKey) -> Self {
        Key::RsaPrivate(key)
    }
}

impl From<EcPublicKey> for Key {
    fn from(key: EcPublicKey) -> Self {
        Key::EcPublic(key)
    }
}

impl From<EcPrivateKey> for Key {
    fn from(key: EcPrivateKey) -> Self {
        Key::EcPrivate(key)
    }
}
