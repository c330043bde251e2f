#![deny(missing_docs)]
//! A command-line interface for provisioning and checking QOTP secrets.

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use qotp_core::kem::{KemAlgorithm, KemTransport};
use qotp_core::provision::EncodedBundle;
use qotp_core::{Settings, TotpConfig, TotpEngine, encoding, unix_now};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Write a settings file with the defaults\nqotp-cli config init --output ./qotp.json\n\n# Provision a secret for an account\nqotp-cli --config ./qotp.json provision --account alice@example.com\n\n# Show the current code for a base32 secret\nqotp-cli code --secret <BASE32_SECRET>\n\n# Check a code submitted by a user\nqotp-cli verify --secret <BASE32_SECRET> --code 123456"
)]
struct Cli {
    /// Path to a JSON settings file. Defaults are used when omitted.
    #[arg(long, global = true, env = "QOTP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision a new TOTP secret protected by a KEM exchange
    Provision {
        /// Account name written into the otpauth:// URI
        #[arg(short, long, default_value = "user")]
        account: String,

        /// Issuer written into the otpauth:// URI. Overrides the settings file.
        #[arg(long)]
        issuer: Option<String>,

        /// KEM to use (hqc-128 or ntru-hrss-701). Overrides the settings file.
        #[arg(long)]
        kem: Option<KemAlgorithm>,

        /// Print the result as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Print the code for a secret at the given time
    Code {
        /// Base32 secret
        #[arg(short, long)]
        secret: String,

        /// Unix time in seconds. Defaults to now.
        #[arg(long)]
        time: Option<u64>,
    },
    /// Check a submitted code; exits with status 1 when it is rejected
    Verify {
        /// Base32 secret
        #[arg(short, long)]
        secret: String,

        /// The code to check
        #[arg(short, long)]
        code: String,

        /// Unix time in seconds. Defaults to now.
        #[arg(long)]
        time: Option<u64>,

        /// Accepted drift in time steps on each side. Overrides the settings file.
        #[arg(long)]
        window: Option<u32>,
    },
    /// Run a keypair, encapsulate and decapsulate cycle for each KEM
    KemTest {
        /// Only test this KEM
        #[arg(long)]
        kem: Option<KemAlgorithm>,
    },
    /// Manage the settings file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write the default settings to a file
    Init {
        /// Where to write the settings
        #[arg(short, long, value_name = "OUTPUT_FILE")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// What `provision --json` prints.
#[derive(Serialize)]
struct ProvisionOutput {
    id: Uuid,
    algorithm: &'static str,
    public_key_fingerprint: String,
    otpauth_uri: String,
    bundle: EncodedBundle,
}

fn load_settings(path: Option<&Path>) -> Settings {
    let settings = Settings::load_or_default(path).unwrap_or_else(|e| {
        error!("Failed to load settings: {e}");
        std::process::exit(1);
    });
    if let Err(e) = settings.validate() {
        error!("Invalid settings: {e}");
        std::process::exit(1);
    }
    settings
}

fn totp_engine(config: TotpConfig) -> TotpEngine {
    TotpEngine::new(config).unwrap_or_else(|e| {
        error!("Invalid TOTP parameters: {e}");
        std::process::exit(1);
    })
}

fn decode_secret(secret: &str) -> qotp_core::SecretSeed {
    encoding::decode_seed(secret).unwrap_or_else(|e| {
        error!("Failed to read secret: {e}");
        std::process::exit(1);
    })
}

fn time_or_now(time: Option<u64>) -> u64 {
    time.map_or_else(unix_now, Ok).unwrap_or_else(|e| {
        error!("Failed to read the system clock: {e}");
        std::process::exit(1);
    })
}

fn provision(settings: &Settings, account: &str, json: bool) {
    let provisioner = settings.provisioner().unwrap_or_else(|e| {
        error!("Failed to set up provisioning: {e}");
        std::process::exit(1);
    });
    let provisioned = provisioner.provision().unwrap_or_else(|e| {
        error!("Provisioning failed: {e}");
        std::process::exit(1);
    });
    warn!(
        "Enrollment {} retains its private key only for this process; it is not stored.",
        provisioned.id
    );

    let otpauth_uri = provisioned.bundle.otpauth_uri(
        &settings.issuer,
        account,
        settings.totp,
        settings.embed_ciphertext,
    );
    let bundle = provisioned.bundle.encode();

    if json {
        let output = ProvisionOutput {
            id: provisioned.id,
            algorithm: provisioned.algorithm,
            public_key_fingerprint: provisioned.public_key_fingerprint,
            otpauth_uri,
            bundle,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!("Failed to serialize provisioning result: {e}");
                std::process::exit(1);
            }
        }
    } else {
        println!("{otpauth_uri}");
        println!();
        println!("Enrollment:  {}", provisioned.id);
        println!("KEM:         {}", provisioned.algorithm);
        println!("Public key:  {}", provisioned.public_key_fingerprint);
        println!("Secret:      {}", bundle.otp_seed);
        println!("Ciphertext:  {}", bundle.ciphertext);
    }
}

fn kem_test(kem: Option<KemAlgorithm>) {
    let algorithms = kem.map_or_else(|| KemAlgorithm::ALL.to_vec(), |kem| vec![kem]);
    let mut failed = false;
    for algorithm in algorithms {
        match algorithm.transport().self_test() {
            Ok(()) => println!("{algorithm}: ok"),
            Err(e) => {
                println!("{algorithm}: FAILED");
                error!("Self test for {algorithm} failed: {e}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

fn config_init(output: &Path, force: bool) {
    if output.exists() && !force {
        error!(
            "'{}' already exists. Use --force to overwrite it.",
            output.display()
        );
        std::process::exit(1);
    }
    if let Err(e) = Settings::default().save(output) {
        error!("Failed to write settings: {e}");
        std::process::exit(1);
    }
    info!("Wrote default settings to '{}'", output.display());
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Provision {
            account,
            issuer,
            kem,
            json,
        } => {
            let mut settings = load_settings(cli.config.as_deref());
            if let Some(issuer) = issuer {
                settings.issuer = issuer;
            }
            if let Some(kem) = kem {
                settings.kem = kem;
            }
            provision(&settings, &account, json);
        }
        Commands::Code { secret, time } => {
            let settings = load_settings(cli.config.as_deref());
            let engine = totp_engine(settings.totp);
            let seed = decode_secret(&secret);
            let now = time_or_now(time);
            let code = engine.compute_code(&seed, now).unwrap_or_else(|e| {
                error!("Failed to compute code: {e}");
                std::process::exit(1);
            });
            println!("{code}");
            info!("Code valid for another {} seconds.", engine.seconds_remaining(now));
        }
        Commands::Verify {
            secret,
            code,
            time,
            window,
        } => {
            let settings = load_settings(cli.config.as_deref());
            let config = TotpConfig {
                window: window.unwrap_or(settings.totp.window),
                ..settings.totp
            };
            let engine = totp_engine(config);
            let seed = decode_secret(&secret);
            if engine.verify(&seed, &code, time_or_now(time)) {
                println!("valid");
            } else {
                println!("invalid");
                std::process::exit(1);
            }
        }
        Commands::KemTest { kem } => kem_test(kem),
        Commands::Config { command } => match command {
            ConfigCommands::Init { output, force } => config_init(&output, force),
        },
    }
}
