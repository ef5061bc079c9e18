//! # Merch Shop API
//!
//! HTTP surface for coin transfers and merch purchases.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shop API Routes                                 │
//! │                                                                         │
//! │  POST /api/auth      {"username","password"}  ──► {"token"}            │
//! │  GET  /api/info      (bearer)                 ──► coins, inventory,    │
//! │                                                    coinHistory          │
//! │  GET  /api/buy/{item} (bearer)                ──► PurchaseEngine       │
//! │  POST /api/sendCoin  (bearer) {"toUser","amount"} ──► TransferEngine   │
//! │  GET  /health                                 ──► "ok"                 │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      AppState (cloned per request)               │  │
//! │  │  Database · JwtManager · TransferEngine · PurchaseEngine         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::AppConfig`]):
//! - `SERVER_HOST`, `SERVER_PORT` - listen address (default: 0.0.0.0:8080)
//! - `DATABASE_PATH` - SQLite file (default: ./merch.db)
//! - `DATABASE_MAX_CONNECTIONS`, `DATABASE_CONNECT_TIMEOUT_SECS` - pool
//! - `JWT_SECRET_KEY` - token signing secret
//! - `JWT_LIFETIME_SECS` - token lifetime (default: 259200)
//! - `OPERATION_TIMEOUT_MS` - transfer/purchase deadline (default: 5000)
//! - `LOG_LEVEL` - default log filter (default: info)

pub mod account;
pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use merch_db::{Database, SqliteLedger};
use merch_engine::{PurchaseEngine, TransferEngine};

pub use config::AppConfig;
pub use error::ApiError;
pub use routes::router;

use crate::auth::JwtManager;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub transfers: TransferEngine<SqliteLedger>,
    pub purchases: PurchaseEngine<SqliteLedger>,
}

impl AppState {
    /// Wires the engines and token manager over an open database.
    pub fn new(db: Database, config: &AppConfig) -> Self {
        let engine_config = config.engine_config();

        AppState {
            jwt: Arc::new(JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs)),
            transfers: TransferEngine::new(db.ledger(), engine_config),
            purchases: PurchaseEngine::new(db.ledger(), engine_config),
            db,
        }
    }
}
