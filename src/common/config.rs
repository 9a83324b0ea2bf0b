// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Platform configuration, read from a YAML file with environment overrides.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const ENV_JWT_SECRET: &str = "CLINICA_JWT_SECRET";
pub const ENV_REDIS_URL: &str = "CLINICA_REDIS_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub bind: String,
    /// HMAC secret, at least 32 bytes. A random key is used when unset.
    pub jwt_secret: Option<String>,
    pub token_ttl_seconds: u64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteConfig {
    pub prefix: String,
    pub upstream: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    /// Paths forwarded without a bearer token.
    pub public_paths: Vec<String>,
    pub routes: Vec<RouteConfig>,
    pub upstream_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlatformConfig {
    pub pacientes: ServiceConfig,
    pub administrative: ServiceConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    /// Shared revocation list. In-memory when unset.
    pub redis_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8083".to_string(),
            jwt_secret: None,
            token_ttl_seconds: 3600,
            bootstrap_admin: None,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let route = |prefix: &str, upstream: &str| RouteConfig {
            prefix: prefix.to_string(),
            upstream: upstream.to_string(),
        };
        Self {
            bind: "0.0.0.0:8080".to_string(),
            public_paths: vec![
                "/api/auth/login".to_string(),
                "/api/auth/register".to_string(),
                "/health".to_string(),
            ],
            routes: vec![
                route("/api/pacientes", "http://127.0.0.1:8081"),
                route("/api/historias", "http://127.0.0.1:8081"),
                route("/api/consultas", "http://127.0.0.1:8081"),
                route("/api/citas", "http://127.0.0.1:8081"),
                route("/api/documentos", "http://127.0.0.1:8081"),
                route("/api/cups", "http://127.0.0.1:8082"),
                route("/api/empleados", "http://127.0.0.1:8082"),
                route("/api/nominas", "http://127.0.0.1:8082"),
                route("/api/facturas", "http://127.0.0.1:8082"),
                route("/api/auth", "http://127.0.0.1:8083"),
                route("/api/usuarios", "http://127.0.0.1:8083"),
            ],
            upstream_timeout_seconds: 30,
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            pacientes: ServiceConfig {
                bind: "0.0.0.0:8081".to_string(),
            },
            administrative: ServiceConfig {
                bind: "0.0.0.0:8082".to_string(),
            },
            auth: AuthConfig::default(),
            gateway: GatewayConfig::default(),
            redis_url: None,
        }
    }
}

impl PlatformConfig {
    pub fn from_yaml(source: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(source).context("Failed to parse platform configuration")
    }

    /// Read `path` if it exists (defaults otherwise), then apply environment
    /// overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_yaml(&source)?
        } else {
            info!("{} not found, using default configuration", path.display());
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(ENV_JWT_SECRET) {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(url) = lookup(ENV_REDIS_URL) {
            self.redis_url = Some(url);
        }
    }
}
