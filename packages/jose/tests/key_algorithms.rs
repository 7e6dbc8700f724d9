//! JWE key management: direct, AES key wrap, RSA-OAEP, ECDH-ES and PBES2

mod common;

use cryypt_jose::algorithms::key::concat_kdf;
use cryypt_jose::jwa::{
    self, A128GCM, A128KW, A256CBC_HS512, A256KW, DIRECT, ECDH_ES, ECDH_ES_A128KW,
    ECDH_ES_A256KW, ES256, ES384, PBES2_HS256_A128KW, PBES2_HS512_A256KW, RSA_OAEP,
    RSA_OAEP_256,
};
use cryypt_jose::{
    AeadAlgorithm, DecryptionKeyRequest, Header, Identifiable, JoseError, JoseResult, Jwk, Key,
    KeyAlgorithm, KeyAlgorithmCategory, KeyRequest, KeyResult, Password, Pbes2Config, Randomness,
    SecretKey,
};
use hex_literal::hex;
use rsa::RsaPublicKey;
use serde_json::Value;

fn encrypt_key(
    alg: &dyn KeyAlgorithm,
    key: &Key,
    enc: &dyn AeadAlgorithm,
    header: &Header,
    seed: u64,
) -> JoseResult<(Option<SecretKey>, KeyResult)> {
    let mut rng = common::seeded_rng(seed);
    let mut random = Randomness::from_rng(&mut rng);
    let cek = match alg.category() {
        KeyAlgorithmCategory::KeyEncryption => Some(enc.generate_key(&mut random)),
        KeyAlgorithmCategory::Direct => None,
    };
    let result = alg.get_encryption_key(KeyRequest {
        cek: cek.as_ref(),
        key,
        enc,
        header,
        random,
    })?;
    Ok((cek, result))
}

/// Encrypt for `recipient`, then recover with `decryption_key` from the
/// published header.
fn round_trip(
    alg: &dyn KeyAlgorithm,
    recipient: &Key,
    decryption_key: &Key,
    enc: &dyn AeadAlgorithm,
    mut header: Header,
) -> (KeyResult, SecretKey) {
    let (cek, result) = encrypt_key(alg, recipient, enc, &header, 42).expect("encryption key");
    if let Some(cek) = &cek {
        assert_eq!(&result.key, cek, "{} must keep the generated CEK", alg.id());
    }
    header.extend(result.header_params.clone());
    let recovered = alg
        .get_decryption_key(DecryptionKeyRequest {
            encrypted_key: &result.encrypted_key,
            key: decryption_key,
            enc,
            header: &header,
        })
        .expect("decryption key");
    (result, recovered)
}

#[test]
fn test_dir_returns_key_with_empty_encrypted_key() {
    common::init_logging();
    let shared = SecretKey::new(vec![9u8; 32]);
    let key = Key::from(shared.clone());
    let (result, recovered) = round_trip(&DIRECT, &key, &key, &A256CBC_HS512, Header::new());
    assert!(result.encrypted_key.is_empty());
    assert!(result.header_params.is_empty());
    assert_eq!(result.key, shared);
    assert_eq!(recovered, shared);
}

#[test]
fn test_dir_rejects_non_empty_encrypted_key() {
    let key = Key::from(SecretKey::new(vec![9u8; 32]));
    let err = DIRECT
        .get_decryption_key(DecryptionKeyRequest {
            encrypted_key: &[1, 2, 3],
            key: &key,
            enc: &A128GCM,
            header: &Header::new(),
        })
        .expect_err("non-empty key segment");
    assert!(matches!(err, JoseError::KeyManagement(_)));
}

#[test]
fn test_a128kw_rfc3394_vector() {
    let kek = Key::from(SecretKey::new(
        hex!("000102030405060708090a0b0c0d0e0f").to_vec(),
    ));
    let cek = SecretKey::new(hex!("00112233445566778899aabbccddeeff").to_vec());
    let result = A128KW
        .get_encryption_key(KeyRequest {
            cek: Some(&cek),
            key: &kek,
            enc: &A128GCM,
            header: &Header::new(),
            random: Randomness::system(),
        })
        .expect("wrap");
    assert_eq!(
        result.encrypted_key,
        hex!("1fa68b0a8112b447aef34bd8fb5a7b829d3e862371d2cfe5")
    );
}

#[test]
fn test_aes_kw_round_trip_and_kek_size() {
    let kek = Key::from(SecretKey::new(vec![3u8; 32]));
    let (result, recovered) = round_trip(&A256KW, &kek, &kek, &A256CBC_HS512, Header::new());
    assert_eq!(result.encrypted_key.len(), 64 + 8);
    assert_eq!(recovered, result.key);

    let short = Key::from(SecretKey::new(vec![3u8; 16]));
    let err = encrypt_key(&A256KW, &short, &A128GCM, &Header::new(), 1).expect_err("short kek");
    assert!(matches!(err, JoseError::WeakKey { min_bits: 256, .. }));
}

#[test]
fn test_aes_kw_wrong_kek_fails_integrity_check() {
    let kek = Key::from(SecretKey::new(vec![3u8; 16]));
    let other = Key::from(SecretKey::new(vec![4u8; 16]));
    let (_, result) = encrypt_key(&A128KW, &kek, &A128GCM, &Header::new(), 7).expect("wrap");
    let err = A128KW
        .get_decryption_key(DecryptionKeyRequest {
            encrypted_key: &result.encrypted_key,
            key: &other,
            enc: &A128GCM,
            header: &Header::new(),
        })
        .expect_err("wrong kek");
    assert!(matches!(err, JoseError::KeyManagement(_)));
}

#[test]
fn test_rsa_oaep_round_trip() {
    let private = Key::from(common::rsa_2048().clone());
    let public = Key::from(RsaPublicKey::from(common::rsa_2048()));
    for alg in [&RSA_OAEP, &RSA_OAEP_256] {
        let (result, recovered) = round_trip(alg, &public, &private, &A128GCM, Header::new());
        assert_eq!(result.encrypted_key.len(), 256, "{}", alg.id());
        assert_eq!(recovered, result.key);
    }
}

#[test]
fn test_rsa_oaep_rejects_small_modulus() {
    let public = Key::from(RsaPublicKey::from(common::rsa_1024()));
    let err = encrypt_key(&RSA_OAEP_256, &public, &A128GCM, &Header::new(), 1)
        .expect_err("1024-bit key");
    assert!(matches!(
        err,
        JoseError::WeakKey {
            min_bits: 2048,
            actual_bits: 1024,
            ..
        }
    ));
}

#[test]
fn test_ecdh_es_direct_derives_cek_and_publishes_epk() {
    let mut rng = common::seeded_rng(12);
    let recipient = ES256.generate_key_pair(&mut Randomness::from_rng(&mut rng));
    let public = Key::from(recipient.public_key());
    let private = Key::from(recipient);

    let mut header = Header::new();
    header.put("apu", "QWxpY2U");
    header.put("apv", "Qm9i");
    let (result, recovered) = round_trip(&ECDH_ES, &public, &private, &A128GCM, header);
    assert!(result.encrypted_key.is_empty());
    assert_eq!(result.key.bit_len(), Some(128));
    assert_eq!(recovered, result.key);

    let epk = result.header_params.get("epk").expect("epk");
    assert_eq!(epk["kty"], "EC");
    assert_eq!(epk["crv"], "P-256");
    assert!(epk.get("d").is_none());
}

#[test]
fn test_ecdh_es_key_wrap_variants() {
    let mut rng = common::seeded_rng(13);
    let recipient = ES384.generate_key_pair(&mut Randomness::from_rng(&mut rng));
    let public = Key::from(recipient.public_key());
    let private = Key::from(recipient);
    for alg in [&ECDH_ES_A128KW, &ECDH_ES_A256KW] {
        assert_eq!(alg.category(), KeyAlgorithmCategory::KeyEncryption);
        let (result, recovered) =
            round_trip(alg, &public, &private, &A256CBC_HS512, Header::new());
        assert_eq!(result.encrypted_key.len(), 72, "{}", alg.id());
        assert_eq!(recovered, result.key);
    }
}

#[test]
fn test_ecdh_es_rfc7518_appendix_c() {
    let bob = Jwk::from_json(
        r#"{"kty":"EC","crv":"P-256",
            "x":"weNJy2HscCSM6AEDTDg04biOvhFhyyWvOHQfeF_PxMQ",
            "y":"e8lnCO-AlStT-NJVX-crhB7QRYhiix03illJOVAOyck",
            "d":"VEmDZpDXXK8p8N0Cndsxs924q6nS1RXFASRl6BfUqdw"}"#,
    )
    .expect("bob");
    let mut header = Header::new();
    header.put("alg", "ECDH-ES");
    header.put("enc", "A128GCM");
    header.put("apu", "QWxpY2U");
    header.put("apv", "Qm9i");
    header.put(
        "epk",
        serde_json::json!({
            "kty": "EC",
            "crv": "P-256",
            "x": "gI0GAILBdu7T53akrFmMyGcsF3n5dO7MmwNBHKW5SV0",
            "y": "SLW_xSffzlPWrHEVI30DHM_4egVwt3NQqeUD7nMFpps"
        }),
    );
    let cek = ECDH_ES
        .get_decryption_key(DecryptionKeyRequest {
            encrypted_key: &[],
            key: bob.key(),
            enc: &A128GCM,
            header: &header,
        })
        .expect("derive");
    let expected =
        cryypt_jose::encoding::base64_url_decode("VqqN6vgjbSBcIijNcacQGg").expect("b64");
    assert_eq!(cek.encoded(), Some(&expected[..]));
}

#[test]
fn test_ecdh_es_missing_epk_is_invalid_request() {
    let mut rng = common::seeded_rng(14);
    let private = Key::from(ES256.generate_key_pair(&mut Randomness::from_rng(&mut rng)));
    let err = ECDH_ES
        .get_decryption_key(DecryptionKeyRequest {
            encrypted_key: &[],
            key: &private,
            enc: &A128GCM,
            header: &Header::new(),
        })
        .expect_err("no epk");
    assert!(matches!(err, JoseError::InvalidRequest(_)));
}

#[test]
fn test_ecdh_es_curve_mismatch_names_each_curve() {
    let mut rng = common::seeded_rng(15);
    let mut random = Randomness::from_rng(&mut rng);
    let p256 = Key::from(ES256.generate_key_pair(&mut random).public_key());
    let p384 = Key::from(ES384.generate_key_pair(&mut random));

    let (_, result) =
        encrypt_key(&ECDH_ES, &p256, &A128GCM, &Header::new(), 16).expect("encrypt");
    let mut header = Header::new();
    header.put("epk", result.header_params["epk"].clone());
    let err = ECDH_ES
        .get_decryption_key(DecryptionKeyRequest {
            encrypted_key: &[],
            key: &p384,
            enc: &A128GCM,
            header: &header,
        })
        .expect_err("curve mismatch");
    match err {
        JoseError::InvalidKey(message) => assert!(
            message.contains("Ephemeral key curve P-256 does not match recipient curve P-384"),
            "{message}"
        ),
        other => panic!("expected invalid key, got {other:?}"),
    }
}

#[test]
fn test_concat_kdf_output_length_and_party_info() {
    let z = [7u8; 32];
    let short = concat_kdf(&z, "A128GCM", b"", b"", 16);
    let long = concat_kdf(&z, "A256CBC-HS512", b"", b"", 64);
    assert_eq!(short.len(), 16);
    assert_eq!(long.len(), 64);
    assert_ne!(
        concat_kdf(&z, "A128GCM", b"Alice", b"Bob", 16),
        concat_kdf(&z, "A128GCM", b"Bob", b"Alice", 16)
    );
}

#[test]
fn test_pbes2_round_trip_with_fixed_count() {
    common::init_logging();
    let password = Key::from(Password::new("Thus from my lips, by yours, my sin is purged."));
    let mut header = Header::new();
    header.put("p2c", 1000);
    let (result, recovered) =
        round_trip(&PBES2_HS256_A128KW, &password, &password, &A128GCM, header);
    assert_eq!(result.header_params.get("p2c"), Some(&Value::from(1000)));
    let p2s = result.header_params.get("p2s").and_then(Value::as_str).expect("p2s");
    assert_eq!(
        cryypt_jose::encoding::base64_url_decode(p2s).expect("b64").len(),
        16
    );
    assert_eq!(recovered, result.key);
}

#[test]
fn test_pbes2_wrong_password_fails() {
    let password = Key::from(Password::new("correct horse"));
    let wrong = Key::from(Password::new("battery staple"));
    let mut header = Header::new();
    header.put("p2c", 1000);
    let (_, result) =
        encrypt_key(&PBES2_HS512_A256KW, &password, &A128GCM, &header, 3).expect("encrypt");
    header.extend(result.header_params);
    let err = PBES2_HS512_A256KW
        .get_decryption_key(DecryptionKeyRequest {
            encrypted_key: &result.encrypted_key,
            key: &wrong,
            enc: &A128GCM,
            header: &header,
        })
        .expect_err("wrong password");
    assert!(matches!(err, JoseError::KeyManagement(_)));
}

#[test]
fn test_pbes2_iteration_bounds() {
    let password = Key::from(Password::new("pw"));
    for count in [999u64, 1_000_001] {
        let mut header = Header::new();
        header.put("p2c", count);
        let err = encrypt_key(&PBES2_HS256_A128KW, &password, &A128GCM, &header, 1)
            .expect_err("out of range");
        assert!(matches!(err, JoseError::InvalidRequest(_)), "{count}");
    }

    let relaxed = PBES2_HS256_A128KW.with_config(&Pbes2Config {
        hs256_iterations: 2_000,
        min_iterations: 1_000,
        ..Pbes2Config::default()
    });
    assert_eq!(relaxed.default_iterations(), 2_000);
    let (_, result) =
        encrypt_key(&relaxed, &password, &A128GCM, &Header::new(), 5).expect("encrypt");
    assert_eq!(result.header_params.get("p2c"), Some(&Value::from(2_000)));
}

#[test]
fn test_pbes2_rejects_non_password_key() {
    let key = Key::from(SecretKey::new(vec![1u8; 16]));
    let err = encrypt_key(&PBES2_HS256_A128KW, &key, &A128GCM, &Header::new(), 1)
        .expect_err("secret key");
    assert!(matches!(err, JoseError::InvalidKey(_)));
}

#[test]
fn test_catalog_categories() {
    for alg in jwa::key_algorithms() {
        let expected = match alg.id() {
            "dir" | "ECDH-ES" => KeyAlgorithmCategory::Direct,
            _ => KeyAlgorithmCategory::KeyEncryption,
        };
        assert_eq!(alg.category(), expected, "{}", alg.id());
        assert_eq!(jwa::key_algorithm(alg.id()).expect("lookup").id(), alg.id());
    }
    assert!(matches!(
        jwa::key_algorithm("A128GCMKW"),
        Err(JoseError::UnsupportedAlgorithm(_))
    ));
}
