//! JWE key management algorithms

pub mod aes_kw;
pub mod direct;
pub mod ecdh_es;
pub mod pbes2;
pub mod rsa_oaep;

pub use self::aes_kw::AesWrapKeyAlgorithm;
pub use self::direct::DirectKeyAlgorithm;
pub use self::ecdh_es::{concat_kdf, EcdhKeyAlgorithm};
pub use self::pbes2::Pbes2KeyAlgorithm;
pub use self::rsa_oaep::{OaepHash, RsaOaepKeyAlgorithm};
