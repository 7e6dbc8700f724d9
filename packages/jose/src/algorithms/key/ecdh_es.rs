//! Elliptic Curve Diffie-Hellman Ephemeral Static (RFC 7518 §4.6)
//!
//! `ECDH-ES` uses the Concat KDF output directly as the CEK.
//! `ECDH-ES+AxxxKW` derives a key-encryption key and AES-wraps a generated
//! CEK with it.

use crate::algorithms::key::aes_kw;
use crate::algorithms::{secret_bytes, Identifiable, KeyAlgorithm, KeyAlgorithmCategory};
use crate::encoding::base64_url_decode;
use crate::error::{JoseError, JoseResult};
use crate::header::Header;
use crate::jwk::ec::{parse_public_key, public_key_params};
use crate::key::{EcCurve, EcPrivateKey, EcPublicKey, Key, SecretKey};
use crate::random::Randomness;
use crate::request::{DecryptionKeyRequest, KeyRequest, KeyResult};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

/// ECDH-ES, optionally followed by AES key wrap.
#[derive(Debug)]
pub struct EcdhKeyAlgorithm {
    id: &'static str,
    wrap_key_len: Option<usize>,
}

/// Concat KDF (NIST SP 800-56A §5.8.1) over SHA-256 with the JOSE
/// `OtherInfo` layout.
#[must_use]
pub fn concat_kdf(
    z: &[u8],
    algorithm_id: &str,
    apu: &[u8],
    apv: &[u8],
    key_len: usize,
) -> Zeroizing<Vec<u8>> {
    let key_bits = (key_len * 8) as u32;
    let mut output = Zeroizing::new(Vec::with_capacity(key_len + 32));
    let mut counter: u32 = 1;
    while output.len() < key_len {
        let mut hasher = Sha256::new();
        hasher.update(counter.to_be_bytes());
        hasher.update(z);
        for field in [algorithm_id.as_bytes(), apu, apv] {
            hasher.update((field.len() as u32).to_be_bytes());
            hasher.update(field);
        }
        hasher.update(key_bits.to_be_bytes());
        output.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    output.truncate(key_len);
    output
}

fn agree(secret: &EcPrivateKey, public: &EcPublicKey) -> JoseResult<Zeroizing<Vec<u8>>> {
    match (secret, public) {
        (EcPrivateKey::P256(secret), EcPublicKey::P256(public)) => {
            let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
        }
        (EcPrivateKey::P384(secret), EcPublicKey::P384(public)) => {
            let shared = p384::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
        }
        (secret, public) => Err(JoseError::invalid_key(format!(
            "Private key curve {} does not match public key curve {}",
            secret.curve().jwa_name(),
            public.curve().jwa_name()
        ))),
    }
}

fn ephemeral(curve: EcCurve, random: &mut Randomness<'_>) -> EcPrivateKey {
    let mut rng = random.bridge();
    match curve {
        EcCurve::P256 => EcPrivateKey::P256(p256::SecretKey::random(&mut rng)),
        EcCurve::P384 => EcPrivateKey::P384(p384::SecretKey::random(&mut rng)),
    }
}

fn party_info(header: &Header, name: &str) -> JoseResult<Vec<u8>> {
    match header.get(name) {
        None => Ok(Vec::new()),
        Some(Value::String(encoded)) => base64_url_decode(encoded),
        Some(_) => Err(JoseError::invalid_request(format!(
            "Header parameter '{name}' must be a Base64URL string"
        ))),
    }
}

impl EcdhKeyAlgorithm {
    pub(crate) const fn new(id: &'static str, wrap_key_len: Option<usize>) -> Self {
        Self { id, wrap_key_len }
    }

    fn derive(
        &self,
        z: &[u8],
        header: &Header,
        enc_id: &str,
        enc_key_len: usize,
    ) -> JoseResult<Zeroizing<Vec<u8>>> {
        let apu = party_info(header, "apu")?;
        let apv = party_info(header, "apv")?;
        let (algorithm_id, key_len) = match self.wrap_key_len {
            Some(kek_len) => (self.id, kek_len),
            None => (enc_id, enc_key_len),
        };
        debug!(alg = self.id, algorithm_id, key_len, "Deriving key with Concat KDF");
        Ok(concat_kdf(z, algorithm_id, &apu, &apv, key_len))
    }
}

impl Identifiable for EcdhKeyAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl KeyAlgorithm for EcdhKeyAlgorithm {
    fn category(&self) -> KeyAlgorithmCategory {
        if self.wrap_key_len.is_some() {
            KeyAlgorithmCategory::KeyEncryption
        } else {
            KeyAlgorithmCategory::Direct
        }
    }

    fn get_encryption_key(&self, mut request: KeyRequest<'_>) -> JoseResult<KeyResult> {
        let recipient = match request.key {
            Key::EcPublic(public) => public.clone(),
            Key::EcPrivate(private) => private.public_key(),
            other => {
                return Err(JoseError::invalid_key(format!(
                    "{} requires an EC public key, found {}",
                    self.id,
                    other.describe()
                )))
            }
        };
        let ephemeral = ephemeral(recipient.curve(), &mut request.random);
        let z = agree(&ephemeral, &recipient)?;
        let derived = self.derive(
            &z,
            request.header,
            request.enc.id(),
            request.enc.key_bit_length() / 8,
        )?;
        let epk = Value::Object(public_key_params(&ephemeral.public_key()));

        let result = match self.wrap_key_len {
            None => KeyResult::direct(SecretKey::with_algorithm(
                derived.to_vec(),
                request.enc.id(),
            )),
            Some(_) => {
                let cek = request.cek.ok_or_else(|| {
                    JoseError::invalid_request(format!(
                        "{} requires a content encryption key",
                        self.id
                    ))
                })?;
                let encrypted = aes_kw::wrap(&derived, secret_bytes(cek, self.id)?)?;
                KeyResult::wrapped(cek.clone(), encrypted)
            }
        };
        Ok(result.with_header_param("epk", epk))
    }

    fn get_decryption_key(&self, request: DecryptionKeyRequest<'_>) -> JoseResult<SecretKey> {
        let Key::EcPrivate(private) = request.key else {
            return Err(JoseError::invalid_key(format!(
                "{} decryption requires an EC private key, found {}",
                self.id,
                request.key.describe()
            )));
        };
        let epk = match request.header.get("epk") {
            Some(Value::Object(fields)) => parse_public_key(fields)?,
            Some(_) => {
                return Err(JoseError::invalid_request(
                    "Header parameter 'epk' must be a JWK object",
                ))
            }
            None => {
                return Err(JoseError::invalid_request(format!(
                    "{} requires the 'epk' header parameter",
                    self.id
                )))
            }
        };
        if epk.curve() != private.curve() {
            return Err(JoseError::invalid_key(format!(
                "Ephemeral key curve {} does not match recipient curve {}",
                epk.curve().jwa_name(),
                private.curve().jwa_name()
            )));
        }
        let z = agree(private, &epk)?;
        let derived = self.derive(
            &z,
            request.header,
            request.enc.id(),
            request.enc.key_bit_length() / 8,
        )?;
        match self.wrap_key_len {
            None => {
                if !request.encrypted_key.is_empty() {
                    return Err(JoseError::key_management(format!(
                        "{} requires an empty encrypted key segment",
                        self.id
                    )));
                }
                Ok(SecretKey::with_algorithm(derived.to_vec(), request.enc.id()))
            }
            Some(_) => {
                let cek = aes_kw::unwrap(&derived, request.encrypted_key)?;
                Ok(SecretKey::with_algorithm(cek.to_vec(), request.enc.id()))
            }
        }
    }
}
