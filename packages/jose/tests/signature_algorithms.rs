//! JWS signature algorithms: key policy, provider fallback and sign/verify

mod common;

use cryypt_jose::algorithms::signature::{RsaPadding, RsaSignatureParams};
use cryypt_jose::jwa::{
    self, ES256, ES384, HS256, HS512, PS256, PS384, PS512, RS256, RS384, RS512,
};
use cryypt_jose::{
    Identifiable, JoseError, JoseResult, Jwk, Key, ProviderChain, Randomness, RsaBackend,
    RustCryptoRsa, SecretKey, SignatureAlgorithm, SignatureRequest, VerifySignatureRequest,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const INPUT: &[u8] = b"eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJqb2UifQ";

fn sign(alg: &dyn SignatureAlgorithm, key: &Key) -> JoseResult<Vec<u8>> {
    alg.sign(SignatureRequest::new(INPUT, key))
}

fn verify(alg: &dyn SignatureAlgorithm, key: &Key, signature: &[u8]) -> JoseResult<bool> {
    alg.verify(VerifySignatureRequest::new(INPUT, key, signature))
}

#[test]
fn test_hs256_rfc7515_example() {
    common::init_logging();
    let jwk = Jwk::from_json(
        r#"{"kty":"oct","k":"AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow"}"#,
    )
    .expect("jwk");
    let input = b"eyJ0eXAiOiJKV1QiLA0KICJhbGciOiJIUzI1NiJ9.eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAsDQogImh0dHA6Ly9leGFtcGxlLmNvbS9pc19yb290Ijp0cnVlfQ";
    let expected =
        cryypt_jose::encoding::base64_url_decode("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk")
            .expect("b64");

    let signature = HS256
        .sign(SignatureRequest::new(input, jwk.key()))
        .expect("sign");
    assert_eq!(signature, expected);
    assert!(HS256
        .verify(VerifySignatureRequest::new(input, jwk.key(), &signature))
        .expect("verify"));
}

#[test]
fn test_hmac_key_shorter_than_digest_is_weak() {
    let key = Key::from(SecretKey::new(vec![7u8; 32]));
    assert!(sign(&HS256, &key).is_ok());
    match sign(&HS512, &key) {
        Err(JoseError::WeakKey {
            min_bits,
            actual_bits,
            ..
        }) => {
            assert_eq!(min_bits, 512);
            assert_eq!(actual_bits, 256);
        }
        other => panic!("expected weak key, got {other:?}"),
    }
}

#[test]
fn test_hmac_tampered_signature_does_not_verify() {
    let mut rng = common::seeded_rng(3);
    let key = Key::from(HS256.generate_key(&mut Randomness::from_rng(&mut rng)));
    let mut signature = sign(&HS256, &key).expect("sign");
    signature[0] ^= 0x01;
    assert!(!verify(&HS256, &key, &signature).expect("verify"));
    assert!(!verify(&HS256, &key, &signature[..31]).expect("verify"));
}

#[test]
fn test_hmac_rejects_non_secret_key() {
    let key = Key::from(common::rsa_2048().clone());
    assert!(matches!(sign(&HS256, &key), Err(JoseError::InvalidKey(_))));
}

#[test]
fn test_rsa_1024_bit_key_is_weak_for_rs_and_ps() {
    common::init_logging();
    let private = Key::from(common::rsa_1024().clone());
    let public = Key::from(RsaPublicKey::from(common::rsa_1024()));
    for alg in [&RS256 as &dyn SignatureAlgorithm, &PS256] {
        match sign(alg, &private) {
            Err(JoseError::WeakKey {
                min_bits,
                actual_bits,
                message,
            }) => {
                assert_eq!(min_bits, 2048);
                assert_eq!(actual_bits, 1024);
                assert!(message.contains("RFC 7518"), "{message}");
            }
            other => panic!("{}: expected weak key, got {other:?}", alg.id()),
        }
        assert!(matches!(
            verify(alg, &public, &[0u8; 128]),
            Err(JoseError::WeakKey { .. })
        ));
    }
}

#[test]
fn test_rsa_weak_key_reports_sizes_for_every_variant() {
    let private = Key::from(common::rsa_1024().clone());
    for alg in [&RS384 as &dyn SignatureAlgorithm, &RS512, &PS384, &PS512] {
        match sign(alg, &private) {
            Err(JoseError::WeakKey {
                min_bits,
                actual_bits,
                ..
            }) => assert_eq!((min_bits, actual_bits), (2048, 1024), "{}", alg.id()),
            other => panic!("{}: expected weak key, got {other:?}", alg.id()),
        }
    }
}

#[test]
fn test_rsa_2048_bit_key_signs_and_verifies() {
    let private = Key::from(common::rsa_2048().clone());
    let public = Key::from(RsaPublicKey::from(common::rsa_2048()));
    for alg in [&RS256 as &dyn SignatureAlgorithm, &RS512, &PS256, &PS384] {
        let signature = sign(alg, &private).expect("sign");
        assert_eq!(signature.len(), 256, "{}", alg.id());
        assert!(verify(alg, &public, &signature).expect("verify"), "{}", alg.id());
        // legacy allowance: verifying with the private key
        assert!(verify(alg, &private, &signature).expect("verify"), "{}", alg.id());
    }
}

#[test]
fn test_rsa_verify_rejects_other_payload() {
    let private = Key::from(common::rsa_2048().clone());
    let signature = sign(&RS256, &private).expect("sign");
    let accepted = RS256
        .verify(VerifySignatureRequest::new(b"other input", &private, &signature))
        .expect("verify");
    assert!(!accepted);
}

#[test]
fn test_rsa_signing_requires_private_key() {
    let public = Key::from(RsaPublicKey::from(common::rsa_2048()));
    assert!(matches!(sign(&RS256, &public), Err(JoseError::InvalidKey(_))));
}

#[test]
fn test_rsa_generate_key_pair_honours_minimum() {
    let mut rng = common::seeded_rng(11);
    let config = cryypt_jose::RsaConfig {
        sha256_bits: 2048,
        ..Default::default()
    };
    assert_eq!(RS256.preferred_key_bits(Some(&config)), 2048);
    assert_eq!(RS512.preferred_key_bits(None), 4096);
    let key: RsaPrivateKey = RS256
        .generate_key_pair(Some(&config), &mut Randomness::from_rng(&mut rng))
        .expect("generate");
    assert_eq!(Key::from(key).rsa_modulus_bits(), Some(2048));
}

/// Backend that only knows PKCS#1 v1.5.
#[derive(Debug)]
struct Pkcs1OnlyBackend;

impl RsaBackend for Pkcs1OnlyBackend {
    fn name(&self) -> &str {
        "pkcs1-only"
    }

    fn supports(&self, params: &RsaSignatureParams) -> bool {
        matches!(params.padding, RsaPadding::Pkcs1v15)
    }

    fn sign(
        &self,
        params: &RsaSignatureParams,
        key: &RsaPrivateKey,
        payload: &[u8],
        random: &mut Randomness<'_>,
    ) -> JoseResult<Vec<u8>> {
        RustCryptoRsa.sign(params, key, payload, random)
    }

    fn verify(
        &self,
        params: &RsaSignatureParams,
        key: &RsaPublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> JoseResult<bool> {
        RustCryptoRsa.verify(params, key, payload, signature)
    }
}

fn fallback_chain() -> ProviderChain {
    ProviderChain::new(vec![
        Arc::new(Pkcs1OnlyBackend) as Arc<dyn RsaBackend>,
        Arc::new(RustCryptoRsa),
    ])
}

#[test]
fn test_pss_falls_back_to_next_backend() {
    common::init_logging();
    let ps256 = PS256.with_providers(fallback_chain());
    assert_eq!(ps256.providers().selected_name(), None);

    let private = Key::from(common::rsa_2048().clone());
    let signature = sign(&ps256, &private).expect("sign");
    assert_eq!(ps256.providers().selected_name(), Some("rustcrypto-rsa"));
    assert!(verify(&ps256, &private, &signature).expect("verify"));
    assert!(verify(&PS256, &private, &signature).expect("verify"));
}

#[test]
fn test_pkcs1_uses_first_supporting_backend() {
    let rs256 = RS256.with_providers(fallback_chain());
    let private = Key::from(common::rsa_2048().clone());
    let signature = sign(&rs256, &private).expect("sign");
    assert_eq!(rs256.providers().selected_name(), Some("pkcs1-only"));
    assert!(verify(&RS256, &private, &signature).expect("verify"));
}

#[test]
fn test_chain_without_pss_backend_is_unsupported() {
    let chain = ProviderChain::new(vec![Arc::new(Pkcs1OnlyBackend) as Arc<dyn RsaBackend>]);
    let ps256 = PS256.with_providers(chain);
    let private = Key::from(common::rsa_2048().clone());
    assert!(matches!(
        sign(&ps256, &private),
        Err(JoseError::UnsupportedAlgorithm(_))
    ));
}

/// PKCS#1-only backend that counts how often selection consults it.
#[derive(Debug, Default)]
struct CountingBackend {
    consulted: AtomicUsize,
}

impl RsaBackend for CountingBackend {
    fn name(&self) -> &str {
        "counting"
    }

    fn supports(&self, params: &RsaSignatureParams) -> bool {
        self.consulted.fetch_add(1, Ordering::SeqCst);
        Pkcs1OnlyBackend.supports(params)
    }

    fn sign(
        &self,
        params: &RsaSignatureParams,
        key: &RsaPrivateKey,
        payload: &[u8],
        random: &mut Randomness<'_>,
    ) -> JoseResult<Vec<u8>> {
        RustCryptoRsa.sign(params, key, payload, random)
    }

    fn verify(
        &self,
        params: &RsaSignatureParams,
        key: &RsaPublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> JoseResult<bool> {
        RustCryptoRsa.verify(params, key, payload, signature)
    }
}

#[test]
fn test_shared_signer_selects_backend_once_across_threads() {
    common::init_logging();
    let counting = Arc::new(CountingBackend::default());
    let ps256 = PS256.with_providers(ProviderChain::new(vec![
        Arc::clone(&counting) as Arc<dyn RsaBackend>,
        Arc::new(RustCryptoRsa),
    ]));
    let private = Key::from(common::rsa_2048().clone());
    let public = Key::from(RsaPublicKey::from(common::rsa_2048()));

    std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8u8)
            .map(|n| {
                let (ps256, private, public) = (&ps256, &private, &public);
                scope.spawn(move || {
                    let input = [b"thread-".as_slice(), &[n]].concat();
                    let signature = ps256
                        .sign(SignatureRequest::new(&input, private))
                        .expect("sign");
                    ps256
                        .verify(VerifySignatureRequest::new(&input, public, &signature))
                        .expect("verify")
                })
            })
            .collect();
        for worker in workers {
            assert!(worker.join().expect("worker panicked"));
        }
    });

    assert_eq!(counting.consulted.load(Ordering::SeqCst), 1);
    assert_eq!(ps256.providers().selected_name(), Some("rustcrypto-rsa"));
}

#[test]
fn test_ecdsa_fixed_width_signatures() {
    let mut rng = common::seeded_rng(5);
    let mut random = Randomness::from_rng(&mut rng);
    for (alg, width) in [(&ES256, 64), (&ES384, 96)] {
        let private = Key::from(alg.generate_key_pair(&mut random));
        let public = private.public_key().expect("public");
        let signature = sign(alg, &private).expect("sign");
        assert_eq!(signature.len(), width, "{}", alg.id());
        assert!(verify(alg, &public, &signature).expect("verify"));
        assert!(!verify(alg, &public, &signature[1..]).expect("verify"));

        let mut tampered = signature.clone();
        tampered[width - 1] ^= 0x80;
        assert!(!verify(alg, &public, &tampered).expect("verify"));
    }
}

#[test]
fn test_ecdsa_curve_mismatch_is_invalid_key() {
    let mut rng = common::seeded_rng(6);
    let p384 = Key::from(ES384.generate_key_pair(&mut Randomness::from_rng(&mut rng)));
    assert!(matches!(sign(&ES256, &p384), Err(JoseError::InvalidKey(_))));
    assert!(matches!(
        ES256.validate_key(&p384, false),
        Err(JoseError::InvalidKey(_))
    ));
}

#[test]
fn test_empty_signing_input_is_invalid_request() {
    let key = Key::from(SecretKey::new(vec![1u8; 32]));
    let err = HS256
        .sign(SignatureRequest::new(b"", &key))
        .expect_err("empty input");
    assert!(matches!(err, JoseError::InvalidRequest(_)));
}

#[test]
fn test_catalog_lookup() {
    for alg in jwa::signature_algorithms() {
        assert_eq!(jwa::signature_algorithm(alg.id()).expect("lookup").id(), alg.id());
    }
    assert!(matches!(
        jwa::signature_algorithm("none"),
        Err(JoseError::UnsupportedAlgorithm(_))
    ));
    assert!(matches!(
        jwa::signature_algorithm("hs256"),
        Err(JoseError::UnsupportedAlgorithm(_))
    ));
}
