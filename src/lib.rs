//! Guardian portal library
//!
//! Server-rendered pages gated by gateway-issued session tokens, plus a thin
//! GraphQL proxy to the gateway.

#![deny(dead_code)]

pub mod auth;
pub mod config;
pub mod gateway;
pub mod web;

use auth::jwt::JwtVerifier;
use config::Config;
use gateway::{GatewayApi, GatewayClient};
use std::sync::Arc;

/// Per-process context handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: GatewayApi,
    pub verifier: Arc<JwtVerifier>,
}

impl AppState {
    /// Build the gateway client and token verifier from configuration
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let client = GatewayClient::new(
            config.graphql_url(),
            config.http_connect_timeout_secs,
            config.http_request_timeout_secs,
        )?;
        let gateway = GatewayApi::new(
            client,
            config.app_id.clone(),
            config.server_side_access_token.clone(),
        );

        let verifier = Arc::new(
            JwtVerifier::new(
                config.jwks_url(),
                config.jwt_shared_secret.clone(),
                config.http_connect_timeout_secs,
                config.http_request_timeout_secs,
                config.jwks_cache_ttl_secs,
            )
            .map_err(|e| anyhow::anyhow!("Failed to initialize session token verifier: {}", e))?,
        );

        Ok(Self {
            config: Arc::new(config),
            gateway,
            verifier,
        })
    }
}
