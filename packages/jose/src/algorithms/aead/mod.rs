//! JWE content encryption algorithms

pub mod gcm;
pub mod hmac_aes;

pub use self::gcm::GcmAeadAlgorithm;
pub use self::hmac_aes::HmacAesAeadAlgorithm;
