#![deny(missing_docs)]
//! HTTP boundary for QOTP: provisioning, code verification and a health check.
//!
//! Provisioning runs on the blocking thread pool, at most `kem_workers` at a
//! time. Retained KEM secrets are dropped once the response is built; this
//! server keeps no per-enrollment state.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use log::{error, info};
use qotp_core::kem::KemTransport as _;
use qotp_core::settings::DefaultProvisioner;
use qotp_core::{SecretSeed, Settings, TotpEngine, encoding, unix_now};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;

/// Account label used when a provisioning request names none.
pub const DEFAULT_ACCOUNT: &str = "user";

/// Shared application state
pub struct AppState {
    settings: Settings,
    provisioner: Arc<DefaultProvisioner>,
    engine: TotpEngine,
    kem_slots: Arc<Semaphore>,
}

impl AppState {
    /// Builds the state from `settings`, allowing `kem_workers` concurrent
    /// provisioning runs.
    ///
    /// # Errors
    ///
    /// Returns [`qotp_core::Error::InvalidConfiguration`] for invalid settings
    /// or a zero worker count.
    pub fn new(settings: Settings, kem_workers: usize) -> qotp_core::Result<Self> {
        settings.validate()?;
        if kem_workers == 0 {
            return Err(qotp_core::Error::config("kem_workers must be at least 1"));
        }
        Ok(Self {
            provisioner: Arc::new(settings.provisioner()?),
            engine: settings.totp_engine()?,
            kem_slots: Arc::new(Semaphore::new(kem_workers)),
            settings,
        })
    }
}

/// Builds the router with all API routes and a permissive CORS layer.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/provision", post(provision_handler))
        .route("/api/verify", post(verify_handler))
        .route("/api/health", get(health_handler))
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
}

#[derive(Debug)]
enum ApiError {
    Provisioning(qotp_core::Error),
    Worker(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Provisioning(e) => error!("Provisioning failed: {e}"),
            Self::Worker(e) => error!("Provisioning worker failed: {e}"),
        }
        let body = json!({ "error": "provisioning failed" });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
struct ProvisionRequest {
    account: Option<String>,
}

#[derive(Serialize)]
struct ProvisionResponse {
    id: String,
    qr_payload: String,
    otp_seed_b64: String,
    algorithm: &'static str,
}

#[derive(Deserialize)]
struct VerifyRequest {
    otp: String,
    secret_b64: String,
}

#[derive(Serialize)]
struct VerifyResponse {
    valid: bool,
}

async fn provision_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ProvisionRequest>>,
) -> Result<Json<ProvisionResponse>, ApiError> {
    let account = body
        .and_then(|Json(request)| request.account)
        .filter(|account| !account.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ACCOUNT.to_string());

    // The permit moves into the blocking task so a dropped request still
    // holds its slot until the KEM work finishes.
    let permit = Arc::clone(&state.kem_slots)
        .acquire_owned()
        .await
        .map_err(|e| ApiError::Worker(e.to_string()))?;
    let provisioner = Arc::clone(&state.provisioner);
    let provisioned = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        provisioner.provision()
    })
    .await
    .map_err(|e| ApiError::Worker(e.to_string()))?
    .map_err(ApiError::Provisioning)?;

    let qr_payload = provisioned.bundle.otpauth_uri(
        &state.settings.issuer,
        &account,
        state.settings.totp,
        state.settings.embed_ciphertext,
    );
    info!("Issued enrollment {} over HTTP", provisioned.id);

    Ok(Json(ProvisionResponse {
        id: provisioned.id.to_string(),
        qr_payload,
        otp_seed_b64: encoding::encode_base64(provisioned.bundle.otp_seed().as_bytes()),
        algorithm: provisioned.algorithm,
    }))
}

fn decode_secret(secret_b64: &str) -> Option<SecretSeed> {
    let bytes = encoding::decode_base64(secret_b64).ok()?;
    SecretSeed::from_bytes(bytes).ok()
}

async fn verify_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<VerifyRequest>>,
) -> Json<VerifyResponse> {
    // A missing or malformed body is just another rejected code.
    let Some(Json(request)) = body else {
        return Json(VerifyResponse { valid: false });
    };
    let valid = match (decode_secret(&request.secret_b64), unix_now()) {
        (Some(seed), Ok(now)) => state.engine.verify(&seed, &request.otp, now),
        (None, _) => false,
        (_, Err(e)) => {
            error!("Cannot verify without a clock: {e}");
            false
        }
    };
    Json(VerifyResponse { valid })
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "kem": state.provisioner.kem().algorithm(),
    }))
}
