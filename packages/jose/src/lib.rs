//! JOSE algorithm layer
//!
//! This crate provides:
//! - JWS signatures: HMAC, RSA PKCS#1 v1.5, RSA-PSS and ECDSA
//! - JWE content encryption: composite AES-CBC + HMAC and AES-GCM
//! - JWE key management: direct, AES key wrap, RSA-OAEP, ECDH-ES and PBES2
//! - JWK conversion for `oct`, `RSA` and `EC` keys
//! - Compact JWE and JWS builders
//!
//! Algorithms are stateless `static` instances in [`jwa`], looked up by their
//! JWA identifier.

pub mod algorithms;
pub mod builder;
pub mod compact;
pub mod compression;
pub mod config;
pub mod encoding;
mod error;
pub mod header;
pub mod jwk;
pub mod key;
pub mod random;
pub mod request;

pub use algorithms::jwa;
pub use algorithms::provider::{ProviderChain, RsaBackend, RustCryptoRsa};
pub use algorithms::{
    AeadAlgorithm, HashAlgorithm, Identifiable, KeyAlgorithm, KeyAlgorithmCategory,
    SignatureAlgorithm,
};
pub use builder::{JweBuilder, JwsBuilder};
pub use compact::{CompactJwe, CompactJws};
pub use compression::{CompressionCodec, DeflateCodec, GzipCodec};
pub use config::{CompressionConfig, JoseConfig, Pbes2Config, RsaConfig};
pub use error::*;
pub use header::Header;
pub use jwk::Jwk;
pub use key::{EcCurve, EcPrivateKey, EcPublicKey, Key, Password, SecretKey};
pub use random::Randomness;
pub use request::*;
