//! Standard JWA algorithm instances and lookup by identifier

use crate::algorithms::aead::{GcmAeadAlgorithm, HmacAesAeadAlgorithm};
use crate::algorithms::key::{
    AesWrapKeyAlgorithm, DirectKeyAlgorithm, EcdhKeyAlgorithm, OaepHash, Pbes2KeyAlgorithm,
    RsaOaepKeyAlgorithm,
};
use crate::algorithms::signature::{
    EcSignatureAlgorithm, HmacSignatureAlgorithm, RsaSignatureAlgorithm,
};
use crate::algorithms::{
    AeadAlgorithm, HashAlgorithm, Identifiable, KeyAlgorithm, SignatureAlgorithm,
};
use crate::error::{JoseError, JoseResult};
use crate::key::EcCurve;

/// HMAC using SHA-256
pub static HS256: HmacSignatureAlgorithm =
    HmacSignatureAlgorithm::new("HS256", HashAlgorithm::Sha256);
/// HMAC using SHA-384
pub static HS384: HmacSignatureAlgorithm =
    HmacSignatureAlgorithm::new("HS384", HashAlgorithm::Sha384);
/// HMAC using SHA-512
pub static HS512: HmacSignatureAlgorithm =
    HmacSignatureAlgorithm::new("HS512", HashAlgorithm::Sha512);

/// RSASSA-PKCS1-v1_5 using SHA-256
pub static RS256: RsaSignatureAlgorithm =
    RsaSignatureAlgorithm::pkcs1v15("RS256", HashAlgorithm::Sha256, 2048);
/// RSASSA-PKCS1-v1_5 using SHA-384
pub static RS384: RsaSignatureAlgorithm =
    RsaSignatureAlgorithm::pkcs1v15("RS384", HashAlgorithm::Sha384, 3072);
/// RSASSA-PKCS1-v1_5 using SHA-512
pub static RS512: RsaSignatureAlgorithm =
    RsaSignatureAlgorithm::pkcs1v15("RS512", HashAlgorithm::Sha512, 4096);

/// RSASSA-PSS using SHA-256 and MGF1 with SHA-256
pub static PS256: RsaSignatureAlgorithm =
    RsaSignatureAlgorithm::pss("PS256", HashAlgorithm::Sha256, 32, 2048);
/// RSASSA-PSS using SHA-384 and MGF1 with SHA-384
pub static PS384: RsaSignatureAlgorithm =
    RsaSignatureAlgorithm::pss("PS384", HashAlgorithm::Sha384, 48, 3072);
/// RSASSA-PSS using SHA-512 and MGF1 with SHA-512
pub static PS512: RsaSignatureAlgorithm =
    RsaSignatureAlgorithm::pss("PS512", HashAlgorithm::Sha512, 64, 4096);

/// ECDSA using P-256 and SHA-256
pub static ES256: EcSignatureAlgorithm = EcSignatureAlgorithm::new("ES256", EcCurve::P256);
/// ECDSA using P-384 and SHA-384
pub static ES384: EcSignatureAlgorithm = EcSignatureAlgorithm::new("ES384", EcCurve::P384);

/// AES-128-CBC with HMAC-SHA-256
pub static A128CBC_HS256: HmacAesAeadAlgorithm =
    HmacAesAeadAlgorithm::new("A128CBC-HS256", 16, HashAlgorithm::Sha256);
/// AES-192-CBC with HMAC-SHA-384
pub static A192CBC_HS384: HmacAesAeadAlgorithm =
    HmacAesAeadAlgorithm::new("A192CBC-HS384", 24, HashAlgorithm::Sha384);
/// AES-256-CBC with HMAC-SHA-512
pub static A256CBC_HS512: HmacAesAeadAlgorithm =
    HmacAesAeadAlgorithm::new("A256CBC-HS512", 32, HashAlgorithm::Sha512);

/// AES-GCM with a 128-bit key
pub static A128GCM: GcmAeadAlgorithm = GcmAeadAlgorithm::new("A128GCM", 16);
/// AES-GCM with a 192-bit key
pub static A192GCM: GcmAeadAlgorithm = GcmAeadAlgorithm::new("A192GCM", 24);
/// AES-GCM with a 256-bit key
pub static A256GCM: GcmAeadAlgorithm = GcmAeadAlgorithm::new("A256GCM", 32);

/// Direct use of a shared symmetric key
pub static DIRECT: DirectKeyAlgorithm = DirectKeyAlgorithm;

/// AES key wrap with a 128-bit key
pub static A128KW: AesWrapKeyAlgorithm = AesWrapKeyAlgorithm::new("A128KW", 16);
/// AES key wrap with a 192-bit key
pub static A192KW: AesWrapKeyAlgorithm = AesWrapKeyAlgorithm::new("A192KW", 24);
/// AES key wrap with a 256-bit key
pub static A256KW: AesWrapKeyAlgorithm = AesWrapKeyAlgorithm::new("A256KW", 32);

/// RSAES-OAEP with SHA-1
pub static RSA_OAEP: RsaOaepKeyAlgorithm =
    RsaOaepKeyAlgorithm::new("RSA-OAEP", OaepHash::Sha1);
/// RSAES-OAEP with SHA-256
pub static RSA_OAEP_256: RsaOaepKeyAlgorithm =
    RsaOaepKeyAlgorithm::new("RSA-OAEP-256", OaepHash::Sha256);

/// ECDH-ES with the derived key used as CEK
pub static ECDH_ES: EcdhKeyAlgorithm = EcdhKeyAlgorithm::new("ECDH-ES", None);
/// ECDH-ES with A128KW
pub static ECDH_ES_A128KW: EcdhKeyAlgorithm =
    EcdhKeyAlgorithm::new("ECDH-ES+A128KW", Some(16));
/// ECDH-ES with A192KW
pub static ECDH_ES_A192KW: EcdhKeyAlgorithm =
    EcdhKeyAlgorithm::new("ECDH-ES+A192KW", Some(24));
/// ECDH-ES with A256KW
pub static ECDH_ES_A256KW: EcdhKeyAlgorithm =
    EcdhKeyAlgorithm::new("ECDH-ES+A256KW", Some(32));

/// PBES2 with HMAC-SHA-256 and A128KW
pub static PBES2_HS256_A128KW: Pbes2KeyAlgorithm =
    Pbes2KeyAlgorithm::new("PBES2-HS256+A128KW", HashAlgorithm::Sha256, 16, 310_000);
/// PBES2 with HMAC-SHA-384 and A192KW
pub static PBES2_HS384_A192KW: Pbes2KeyAlgorithm =
    Pbes2KeyAlgorithm::new("PBES2-HS384+A192KW", HashAlgorithm::Sha384, 24, 250_000);
/// PBES2 with HMAC-SHA-512 and A256KW
pub static PBES2_HS512_A256KW: Pbes2KeyAlgorithm =
    Pbes2KeyAlgorithm::new("PBES2-HS512+A256KW", HashAlgorithm::Sha512, 32, 120_000);

/// Every signature algorithm in the catalog.
#[must_use]
pub fn signature_algorithms() -> [&'static dyn SignatureAlgorithm; 11] {
    [
        &HS256, &HS384, &HS512, &RS256, &RS384, &RS512, &PS256, &PS384, &PS512, &ES256, &ES384,
    ]
}

/// Every content encryption algorithm in the catalog.
#[must_use]
pub fn aead_algorithms() -> [&'static dyn AeadAlgorithm; 6] {
    [
        &A128CBC_HS256,
        &A192CBC_HS384,
        &A256CBC_HS512,
        &A128GCM,
        &A192GCM,
        &A256GCM,
    ]
}

/// Every key management algorithm in the catalog.
#[must_use]
pub fn key_algorithms() -> [&'static dyn KeyAlgorithm; 13] {
    [
        &DIRECT,
        &A128KW,
        &A192KW,
        &A256KW,
        &RSA_OAEP,
        &RSA_OAEP_256,
        &ECDH_ES,
        &ECDH_ES_A128KW,
        &ECDH_ES_A192KW,
        &ECDH_ES_A256KW,
        &PBES2_HS256_A128KW,
        &PBES2_HS384_A192KW,
        &PBES2_HS512_A256KW,
    ]
}

/// Signature algorithm for a JWS `alg` value.
pub fn signature_algorithm(id: &str) -> JoseResult<&'static dyn SignatureAlgorithm> {
    signature_algorithms()
        .into_iter()
        .find(|alg| alg.id() == id)
        .ok_or_else(|| {
            JoseError::unsupported_algorithm(format!("Unknown signature algorithm '{id}'"))
        })
}

/// Content encryption algorithm for a JWE `enc` value.
pub fn aead_algorithm(id: &str) -> JoseResult<&'static dyn AeadAlgorithm> {
    aead_algorithms()
        .into_iter()
        .find(|alg| alg.id() == id)
        .ok_or_else(|| {
            JoseError::unsupported_algorithm(format!("Unknown content encryption algorithm '{id}'"))
        })
}

/// Key management algorithm for a JWE `alg` value.
pub fn key_algorithm(id: &str) -> JoseResult<&'static dyn KeyAlgorithm> {
    key_algorithms()
        .into_iter()
        .find(|alg| alg.id() == id)
        .ok_or_else(|| {
            JoseError::unsupported_algorithm(format!("Unknown key management algorithm '{id}'"))
        })
}
