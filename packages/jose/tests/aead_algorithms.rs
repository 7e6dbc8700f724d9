//! Content encryption: RFC 7518 Appendix B vectors, round trips and tampering

mod common;

use cryypt_jose::jwa::{self, A128CBC_HS256, A192CBC_HS384, A256CBC_HS512, A256GCM};
use cryypt_jose::{
    AeadAlgorithm, AeadRequest, DecryptAeadRequest, JoseError, Randomness, SecretKey,
};
use hex_literal::hex;
use proptest::prelude::*;

const PLAINTEXT: &[u8] = b"A cipher system must not be required to be secret, and it must be able \
to fall into the hands of the enemy without inconvenience";
const AAD: &[u8] = b"The second principle of Auguste Kerckhoffs";
const IV: [u8; 16] = hex!("1af38c2dc2b96ffdd86694092341bc04");

fn counting_key(len: u8) -> SecretKey {
    SecretKey::new((0..len).collect::<Vec<u8>>())
}

fn check_vector(alg: &dyn AeadAlgorithm, key_len: u8, ciphertext: &[u8], tag: &[u8]) {
    common::init_logging();
    let key = counting_key(key_len);
    let sealed = alg
        .encrypt(AeadRequest::new(PLAINTEXT, &key).with_aad(AAD).with_iv(&IV))
        .expect("encrypt");
    assert_eq!(sealed.iv, IV);
    assert_eq!(sealed.ciphertext, ciphertext);
    assert_eq!(sealed.tag, tag);

    let opened = alg
        .decrypt(DecryptAeadRequest::new(ciphertext, &key, &IV, tag).with_aad(AAD))
        .expect("decrypt");
    assert_eq!(opened.as_bytes(), PLAINTEXT);
}

#[test]
fn test_a128cbc_hs256_known_answer() {
    check_vector(
        &A128CBC_HS256,
        32,
        &hex!(
            "c80edfa32ddf39d5ef00c0b468834279a2e46a1b8049f792f76bfe54b903a9c9"
            "a94ac9b47ad2655c5f10f9aef71427e2fc6f9b3f399a221489f16362c7032336"
            "09d45ac69864e3321cf82935ac4096c86e133314c54019e8ca7980dfa4b9cf1b"
            "384c486f3a54c51078158ee5d79de59fbd34d848b3d69550a67646344427ade5"
            "4b8851ffb598f7f80074b9473c82e2db"
        ),
        &hex!("652c3fa36b0a7c5b3219fab3a30bc1c4"),
    );
}

#[test]
fn test_a192cbc_hs384_known_answer() {
    check_vector(
        &A192CBC_HS384,
        48,
        &hex!(
            "ea65da6b59e61edb419be62d19712ae5d303eeb50052d0dfd6697f77224c8edb"
            "000d279bdc14c1072654bd30944230c657bed4ca0c9f4a8466f22b226d174621"
            "4bf8cfc2400add9f5126e479663fc90b3bed787a2f0ffcbf3904be2a641d5c21"
            "05bfe591bae23b1d7449e532eef60a9ac8bb6c6b01d35d49787bcd57ef484927"
            "f280adc91ac0c4e79c7b11efc60054e3"
        ),
        &hex!("8490ac0e58949bfe51875d733f93ac2075168039ccc733d7"),
    );
}

#[test]
fn test_a256cbc_hs512_known_answer() {
    check_vector(
        &A256CBC_HS512,
        64,
        &hex!(
            "4affaaadb78c31c5da4b1b590d10ffbd3dd8d5d302423526912da037ecbcc7bd"
            "822c301dd67c373bccb584ad3e9279c2e6d12a1374b77f077553df829410446b"
            "36ebd97066296ae6427ea75c2e0846a11a09ccf5370dc80bfecbad28c73f09b3"
            "a3b75e662a2594410ae496b2e2e6609e31e6e02cc837f053d21f37ff4f51950b"
            "be2638d09dd7a4930930806d0703b1f6"
        ),
        &hex!("4dd3b4c088a7f45c216839645b2012bf2e6269a8c56a816dbc1b267761955bc5"),
    );
}

#[test]
fn test_short_composite_key_rejected_as_weak() {
    let key = counting_key(31);
    let err = A128CBC_HS256
        .encrypt(AeadRequest::new(b"data", &key))
        .expect_err("short key");
    match err {
        JoseError::WeakKey {
            min_bits,
            actual_bits,
            ..
        } => {
            assert_eq!(min_bits, 256);
            assert_eq!(actual_bits, 248);
        }
        other => panic!("expected weak key, got {other:?}"),
    }
}

#[test]
fn test_oversized_composite_key_rejected() {
    let key = counting_key(48);
    let err = A128CBC_HS256
        .encrypt(AeadRequest::new(b"data", &key))
        .expect_err("long key");
    assert!(matches!(err, JoseError::InvalidKey(_)));
}

#[test]
fn test_opaque_key_is_unsupported() {
    let key = SecretKey::opaque("AES");
    let err = A256GCM
        .encrypt(AeadRequest::new(b"data", &key))
        .expect_err("opaque key");
    assert!(matches!(err, JoseError::UnsupportedKey(_)));
}

#[test]
fn test_wrong_iv_length_is_invalid_request() {
    let key = counting_key(32);
    let err = A128CBC_HS256
        .encrypt(AeadRequest::new(b"data", &key).with_iv(&[0u8; 12]))
        .expect_err("bad iv");
    assert!(matches!(err, JoseError::InvalidRequest(_)));
}

#[test]
fn test_generated_iv_comes_from_request_randomness() {
    let key = counting_key(32);
    let mut first = common::seeded_rng(1);
    let mut second = common::seeded_rng(1);
    let a = A128CBC_HS256
        .encrypt(AeadRequest::new(b"data", &key).with_random(Randomness::from_rng(&mut first)))
        .expect("encrypt");
    let b = A128CBC_HS256
        .encrypt(AeadRequest::new(b"data", &key).with_random(Randomness::from_rng(&mut second)))
        .expect("encrypt");
    assert_eq!(a.iv.len(), 16);
    assert_eq!(a, b);
}

#[test]
fn test_absent_aad_is_not_interchangeable_with_present_aad() {
    let key = counting_key(32);
    let with_aad = A128CBC_HS256
        .encrypt(AeadRequest::new(b"data", &key).with_iv(&IV).with_aad(b"x"))
        .expect("encrypt");
    let without = A128CBC_HS256
        .encrypt(AeadRequest::new(b"data", &key).with_iv(&IV))
        .expect("encrypt");
    assert_eq!(with_aad.ciphertext, without.ciphertext);
    assert_ne!(with_aad.tag, without.tag);

    let err = A128CBC_HS256
        .decrypt(DecryptAeadRequest::new(
            &with_aad.ciphertext,
            &key,
            &with_aad.iv,
            &with_aad.tag,
        ))
        .expect_err("aad dropped");
    assert!(matches!(err, JoseError::Signature(_)));
}

#[test]
fn test_gcm_wrong_tag_length_is_authentication_failure() {
    let key = counting_key(32);
    let sealed = A256GCM
        .encrypt(AeadRequest::new(b"data", &key))
        .expect("encrypt");
    assert_eq!(sealed.iv.len(), 12);
    assert_eq!(sealed.tag.len(), 16);
    let err = A256GCM
        .decrypt(DecryptAeadRequest::new(
            &sealed.ciphertext,
            &key,
            &sealed.iv,
            &sealed.tag[..15],
        ))
        .expect_err("short tag");
    assert!(matches!(err, JoseError::Signature(_)));
}

#[test]
fn test_generate_key_matches_key_bit_length() {
    let mut rng = common::seeded_rng(9);
    let mut random = Randomness::from_rng(&mut rng);
    for alg in jwa::aead_algorithms() {
        let key = alg.generate_key(&mut random);
        assert_eq!(key.bit_len(), Some(alg.key_bit_length()), "{}", alg.id());
    }
}

#[derive(Clone, Copy, Debug)]
enum Field {
    Ciphertext,
    Tag,
    Iv,
    Aad,
}

fn aead_strategy() -> impl Strategy<Value = &'static dyn AeadAlgorithm> {
    (0..jwa::aead_algorithms().len()).prop_map(|i| jwa::aead_algorithms()[i])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_round_trip_any_content(
        alg in aead_strategy(),
        seed in any::<u64>(),
        content in proptest::collection::vec(any::<u8>(), 1..300),
        aad in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..64)),
    ) {
        let mut rng = common::seeded_rng(seed);
        let mut random = Randomness::from_rng(&mut rng);
        let key = alg.generate_key(&mut random);

        let mut request = AeadRequest::new(&content, &key).with_random(random);
        if let Some(aad) = &aad {
            request = request.with_aad(aad);
        }
        let sealed = alg.encrypt(request).expect("encrypt");
        if alg.id() == "A256CBC-HS512" {
            prop_assert_eq!(sealed.tag.len(), 32);
        }

        let mut decrypt =
            DecryptAeadRequest::new(&sealed.ciphertext, &key, &sealed.iv, &sealed.tag);
        if let Some(aad) = &aad {
            decrypt = decrypt.with_aad(aad);
        }
        let opened = alg.decrypt(decrypt).expect("decrypt");
        prop_assert_eq!(opened.as_bytes(), &content[..]);
    }

    #[test]
    fn test_single_bit_flip_fails_authentication(
        alg in aead_strategy(),
        content in proptest::collection::vec(any::<u8>(), 1..100),
        field in prop_oneof![
            Just(Field::Ciphertext),
            Just(Field::Tag),
            Just(Field::Iv),
            Just(Field::Aad),
        ],
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = counting_key((alg.key_bit_length() / 8) as u8);
        let aad = b"protected header".to_vec();
        let sealed = alg
            .encrypt(AeadRequest::new(&content, &key).with_aad(&aad))
            .expect("encrypt");

        let (mut ciphertext, mut tag, mut iv, mut aad) =
            (sealed.ciphertext, sealed.tag, sealed.iv, aad);
        let target = match field {
            Field::Ciphertext => &mut ciphertext,
            Field::Tag => &mut tag,
            Field::Iv => &mut iv,
            Field::Aad => &mut aad,
        };
        let index = position.index(target.len());
        target[index] ^= 1 << bit;

        let err = alg
            .decrypt(DecryptAeadRequest::new(&ciphertext, &key, &iv, &tag).with_aad(&aad))
            .expect_err("tampered input");
        prop_assert!(matches!(err, JoseError::Signature(_)), "{:?} gave {:?}", field, err);
    }
}
