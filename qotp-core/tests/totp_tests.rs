#![allow(missing_docs)]
use qotp_core::totp::{self, HashAlgorithm};
use qotp_core::{Error, SecretSeed, TotpConfig, TotpEngine};

const RFC_SHA1_KEY: &[u8] = b"12345678901234567890";
const RFC_SHA256_KEY: &[u8] = b"12345678901234567890123456789012";
const RFC_SHA512_KEY: &[u8] =
    b"1234567890123456789012345678901234567890123456789012345678901234";

fn seed(bytes: &[u8]) -> SecretSeed {
    SecretSeed::from_bytes(bytes.to_vec()).expect("non-empty seed")
}

fn engine(digits: u32, algorithm: HashAlgorithm) -> TotpEngine {
    TotpEngine::new(TotpConfig {
        digits,
        algorithm,
        ..TotpConfig::default()
    })
    .expect("valid configuration")
}

fn default_engine() -> TotpEngine {
    TotpEngine::new(TotpConfig::default()).expect("default configuration is valid")
}

#[test]
fn test_zero_seed_at_59_seconds() {
    // Counter 1 under a 20-byte all-zero key, HMAC-SHA1, 6 digits.
    let engine = default_engine();
    let zero = seed(&[0u8; 20]);
    assert_eq!(engine.time_step(59), 1);
    assert_eq!(engine.compute_code(&zero, 59).expect("code"), "812658");
}

#[test]
fn test_rfc6238_reference_vectors() {
    let cases: [(u64, &str, &str, &str); 6] = [
        (59, "94287082", "46119246", "90693936"),
        (1_111_111_109, "07081804", "68084774", "25091201"),
        (1_111_111_111, "14050471", "67062674", "99943326"),
        (1_234_567_890, "89005924", "91819424", "93441116"),
        (2_000_000_000, "69279037", "90698825", "38618901"),
        (20_000_000_000, "65353130", "77737706", "47863826"),
    ];

    let sha1 = engine(8, HashAlgorithm::Sha1);
    let sha256 = engine(8, HashAlgorithm::Sha256);
    let sha512 = engine(8, HashAlgorithm::Sha512);
    for (time, expected_sha1, expected_sha256, expected_sha512) in cases {
        assert_eq!(sha1.compute_code(&seed(RFC_SHA1_KEY), time).expect("code"), expected_sha1, "SHA1 at {time}");
        assert_eq!(sha256.compute_code(&seed(RFC_SHA256_KEY), time).expect("code"), expected_sha256, "SHA256 at {time}");
        assert_eq!(sha512.compute_code(&seed(RFC_SHA512_KEY), time).expect("code"), expected_sha512, "SHA512 at {time}");
    }
}

#[test]
fn test_rfc4226_hotp_values() {
    let expected = ["755224", "287082", "359152", "969429", "338314", "254676"];
    for (counter, code) in expected.iter().enumerate() {
        assert_eq!(totp::hotp(HashAlgorithm::Sha1, RFC_SHA1_KEY, counter as u64, 6).expect("code"), *code);
    }
}

#[test]
fn test_six_digit_codes_are_zero_padded() {
    let engine = default_engine();
    // HOTP value 081804 at T = 1111111109.
    assert_eq!(engine.compute_code(&seed(RFC_SHA1_KEY), 1_111_111_109).expect("code"), "081804");
}

#[test]
fn test_verify_accepts_current_code() {
    let engine = default_engine();
    let key = seed(b"a fairly ordinary twenty-byte seed");
    for time in [0, 29, 30, 59, 1_700_000_000, 4_102_444_800] {
        let code = engine.compute_code(&key, time).expect("code");
        assert!(engine.verify(&key, &code, time), "rejected own code at {time}");
    }
}

#[test]
fn test_verify_window_is_bounded() {
    // 1. Setup
    let engine = default_engine();
    let key = seed(RFC_SHA1_KEY);
    let now = 1_234_567_890;

    // 2. One step of drift on either side is tolerated.
    let previous = engine.compute_code(&key, now - 30).expect("code");
    let next = engine.compute_code(&key, now + 30).expect("code");
    assert!(engine.verify(&key, &previous, now));
    assert!(engine.verify(&key, &next, now));

    // 3. Two steps is too far.
    let stale = engine.compute_code(&key, now - 60).expect("code");
    let early = engine.compute_code(&key, now + 60).expect("code");
    assert!(!engine.verify(&key, &stale, now));
    assert!(!engine.verify(&key, &early, now));
}

#[test]
fn test_zero_window_only_accepts_current_step() {
    let engine = TotpEngine::new(TotpConfig {
        window: 0,
        ..TotpConfig::default()
    })
    .expect("valid configuration");
    let key = seed(RFC_SHA1_KEY);
    let now = 1_111_111_111;

    assert!(engine.verify(&key, &engine.compute_code(&key, now).expect("code"), now));
    assert!(!engine.verify(&key, &engine.compute_code(&key, now - 30).expect("code"), now));
}

#[test]
fn test_all_zero_code_matches_only_by_coincidence() {
    let engine = default_engine();
    let zero = seed(&[0u8; 20]);
    let now = 59;
    let candidates = [
        engine.compute_code(&zero, now - 30).expect("code"),
        engine.compute_code(&zero, now).expect("code"),
        engine.compute_code(&zero, now + 30).expect("code"),
    ];
    assert_eq!(candidates, ["328482", "812658", "073348"]);

    let expected = candidates.iter().any(|c| c == "000000");
    assert_eq!(engine.verify(&zero, "000000", now), expected);
}

#[test]
fn test_verify_near_epoch_skips_negative_steps() {
    let engine = default_engine();
    let key = seed(RFC_SHA1_KEY);
    assert!(engine.verify(&key, &engine.compute_code(&key, 0).expect("code"), 0));
    assert!(engine.verify(&key, &engine.compute_code(&key, 30).expect("code"), 0));
}

#[test]
fn test_verify_rejects_malformed_codes() {
    let engine = default_engine();
    let key = seed(RFC_SHA1_KEY);
    let code = engine.compute_code(&key, 59).expect("code");

    assert!(!engine.verify(&key, "", 59));
    assert!(!engine.verify(&key, "12345", 59));
    assert!(!engine.verify(&key, "12a456", 59));
    assert!(!engine.verify(&key, &format!("{code}0"), 59));
    assert!(!engine.verify(&key, &format!(" {code}"), 59));
}

#[test]
fn test_wrong_seed_does_not_verify() {
    let engine = default_engine();
    let code = engine.compute_code(&seed(RFC_SHA1_KEY), 59).expect("code");
    assert!(!engine.verify(&seed(&[0u8; 20]), &code, 59));
}

#[test]
fn test_invalid_configurations_fail_at_construction() {
    for digits in [0, 5, 9, 10] {
        let result = TotpEngine::new(TotpConfig {
            digits,
            ..TotpConfig::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))), "digits {digits}");
    }

    let result = TotpEngine::new(TotpConfig {
        step_seconds: 0,
        ..TotpConfig::default()
    });
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
}

#[test]
fn test_window_is_capped() {
    let at_cap = TotpEngine::new(TotpConfig {
        window: totp::MAX_WINDOW,
        ..TotpConfig::default()
    });
    assert!(at_cap.is_ok());

    for window in [totp::MAX_WINDOW + 1, u32::MAX] {
        let result = TotpEngine::new(TotpConfig {
            window,
            ..TotpConfig::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))), "window {window}");
    }
}

#[test]
fn test_hmac_accepts_keys_of_any_length() {
    // Keys longer than every hash block size are hashed first, not rejected.
    for algorithm in [HashAlgorithm::Sha1, HashAlgorithm::Sha256, HashAlgorithm::Sha512] {
        for len in [1, 20, 64, 129, 200] {
            let code = totp::hotp(algorithm, &vec![0x5a; len], 1, 6)
                .unwrap_or_else(|e| panic!("{algorithm} with a {len}-byte key: {e}"));
            assert_eq!(code.len(), 6);
        }
    }
}

#[test]
fn test_custom_step_length() {
    let engine = TotpEngine::new(TotpConfig {
        step_seconds: 60,
        ..TotpConfig::default()
    })
    .expect("valid configuration");
    let key = seed(RFC_SHA1_KEY);

    assert_eq!(engine.time_step(119), 1);
    assert_eq!(engine.compute_code(&key, 119).expect("code"), "287082");
    assert_eq!(engine.seconds_remaining(119), 1);
    assert_eq!(engine.seconds_remaining(120), 60);
}

#[test]
fn test_hash_algorithm_names() {
    assert_eq!(HashAlgorithm::Sha256.uri_name(), "SHA256");
    assert_eq!(
        HashAlgorithm::from_uri_name("sha512").expect("known algorithm"),
        HashAlgorithm::Sha512
    );
    assert!(HashAlgorithm::from_uri_name("MD5").is_err());
}

#[test]
fn test_current_code_uses_wall_clock() {
    let engine = default_engine();
    let key = seed(RFC_SHA1_KEY);
    let code = engine.current_code(&key).expect("clock after epoch");
    let now = totp::unix_now().expect("clock after epoch");
    assert!(engine.verify(&key, &code, now));
}
