#![allow(missing_docs)]
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

fn qotp() -> Command {
    let mut cmd = Command::cargo_bin("qotp-cli").unwrap();
    cmd.env_remove("QOTP_CONFIG");
    cmd
}

#[test]
fn test_full_provisioning_workflow() {
    // 1. Setup a settings file
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("qotp.json");
    qotp()
        .arg("config")
        .arg("init")
        .arg("--output")
        .arg(&config_path)
        .assert()
        .success();
    assert!(config_path.exists());

    // 2. Provision a secret as JSON
    let output = qotp()
        .arg("--config")
        .arg(&config_path)
        .arg("provision")
        .arg("--account")
        .arg("alice@example.com")
        .arg("--json")
        .output()
        .expect("Failed to execute provision");
    assert!(output.status.success());
    let provisioned: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("provision prints JSON");
    assert_eq!(provisioned["algorithm"], "hqc-128");
    let id = provisioned["id"].as_str().expect("enrollment id is a string");
    assert_eq!(id.len(), 36, "hyphenated UUID");
    let uri = provisioned["otpauth_uri"].as_str().unwrap();
    assert!(uri.starts_with("otpauth://totp/QOTP:alice@example.com?secret="));
    assert!(uri.contains("&kem_ct="));
    let secret = provisioned["bundle"]["otp_seed"].as_str().unwrap().to_string();
    assert_eq!(secret.len(), 32, "20-byte seed is 32 base32 characters");

    // 3. Compute a code for a fixed time
    let code_output = qotp()
        .arg("--config")
        .arg(&config_path)
        .arg("code")
        .arg("--secret")
        .arg(&secret)
        .arg("--time")
        .arg("1700000000")
        .output()
        .expect("Failed to execute code");
    assert!(code_output.status.success());
    let code = String::from_utf8(code_output.stdout).unwrap().trim().to_string();
    assert_eq!(code.len(), 6);

    // 4. That code verifies at the same time and one step later
    for time in ["1700000000", "1700000030"] {
        qotp()
            .arg("--config")
            .arg(&config_path)
            .arg("verify")
            .arg("--secret")
            .arg(&secret)
            .arg("--code")
            .arg(&code)
            .arg("--time")
            .arg(time)
            .assert()
            .success()
            .stdout(predicate::str::diff("valid\n"));
    }

    // 5. But not once the window has passed
    qotp()
        .arg("--config")
        .arg(&config_path)
        .arg("verify")
        .arg("--secret")
        .arg(&secret)
        .arg("--code")
        .arg(&code)
        .arg("--time")
        .arg("1700000090")
        .assert()
        .failure()
        .stdout(predicate::str::diff("invalid\n"));
}

#[test]
fn test_code_matches_reference_value() {
    qotp()
        .arg("code")
        .arg("--secret")
        .arg(RFC_SECRET)
        .arg("--time")
        .arg("59")
        .assert()
        .success()
        .stdout(predicate::str::diff("287082\n"));
}

#[test]
fn test_verify_window_override() {
    // 287082 is the code for T = 59; at T = 89 it is one step old.
    qotp()
        .arg("verify")
        .arg("--secret")
        .arg(RFC_SECRET)
        .arg("--code")
        .arg("287082")
        .arg("--time")
        .arg("89")
        .assert()
        .success();

    qotp()
        .arg("verify")
        .arg("--secret")
        .arg(RFC_SECRET)
        .arg("--code")
        .arg("287082")
        .arg("--time")
        .arg("89")
        .arg("--window")
        .arg("0")
        .assert()
        .failure();
}

#[test]
fn test_settings_file_changes_code_parameters() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("eight.json");
    fs::write(&config_path, r#"{ "totp": { "digits": 8 } }"#).unwrap();

    qotp()
        .env("QOTP_CONFIG", &config_path)
        .arg("code")
        .arg("--secret")
        .arg(RFC_SECRET)
        .arg("--time")
        .arg("59")
        .assert()
        .success()
        .stdout(predicate::str::diff("94287082\n"));
}

#[test]
fn test_invalid_settings_are_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("bad.json");
    fs::write(&config_path, r#"{ "seed_bytes": 4 }"#).unwrap();

    qotp()
        .arg("--config")
        .arg(&config_path)
        .arg("code")
        .arg("--secret")
        .arg(RFC_SECRET)
        .assert()
        .failure();
}

#[test]
fn test_malformed_secret_is_rejected() {
    qotp()
        .arg("code")
        .arg("--secret")
        .arg("not-a-secret!")
        .assert()
        .failure();
}

#[test]
fn test_config_init_does_not_overwrite() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("qotp.json");
    fs::write(&config_path, "{}").unwrap();

    qotp()
        .arg("config")
        .arg("init")
        .arg("--output")
        .arg(&config_path)
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "{}");

    qotp()
        .arg("config")
        .arg("init")
        .arg("--output")
        .arg(&config_path)
        .arg("--force")
        .assert()
        .success();
    assert!(fs::read_to_string(&config_path).unwrap().contains("\"issuer\": \"QOTP\""));
}

#[test]
fn test_kem_self_test() {
    qotp()
        .arg("kem-test")
        .arg("--kem")
        .arg("ntru-hrss-701")
        .assert()
        .success()
        .stdout(predicate::str::contains("ntru-hrss-701: ok"));

    qotp()
        .arg("kem-test")
        .arg("--kem")
        .arg("kyber-512")
        .assert()
        .failure();
}

#[test]
fn test_provision_plain_text_output() {
    qotp()
        .arg("provision")
        .arg("--issuer")
        .arg("Acme Corp")
        .arg("--kem")
        .arg("ntru-hrss-701")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("otpauth://totp/Acme%20Corp:user?secret="))
        .stdout(predicate::str::contains("KEM:         ntru-hrss-701"));
}
