//! JWS signature algorithms: HMAC, RSA (PKCS#1 v1.5 and PSS) and ECDSA

pub mod ecdsa;
pub mod hmac;
pub mod rsa;

pub use self::ecdsa::EcSignatureAlgorithm;
pub use self::hmac::HmacSignatureAlgorithm;
pub use self::rsa::{RsaPadding, RsaSignatureAlgorithm, RsaSignatureParams};
