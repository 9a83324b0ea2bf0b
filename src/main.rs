// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clinica_server::common::config::PlatformConfig;
use clinica_server::common::revocation;
use clinica_server::common::serve;
use clinica_server::common::token::TokenSigner;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const ENV_BIND: &str = "CLINICA_BIND";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Service {
    Pacientes,
    Administrative,
    Auth,
    Gateway,
}

#[derive(Parser)]
#[command(name = "clinica-server")]
#[command(about = "Clinic administration platform services")]
struct Cli {
    /// Service to run
    #[arg(short, long, value_enum)]
    service: Service,
    /// YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = PlatformConfig::load(&cli.config)?;
    let bind_override = std::env::var(ENV_BIND).ok();

    match cli.service {
        #[cfg(feature = "pacientes")]
        Service::Pacientes => {
            use clinica_server::apps::pacientes::{router, PacientesState};
            let bind = bind_override.unwrap_or(config.pacientes.bind);
            serve(router(PacientesState::new()), &bind, "pacientes").await
        }
        #[cfg(feature = "administrative")]
        Service::Administrative => {
            use clinica_server::apps::administrative::{router, AdministrativeState};
            let bind = bind_override.unwrap_or(config.administrative.bind);
            serve(router(AdministrativeState::new()), &bind, "administrative").await
        }
        #[cfg(feature = "auth")]
        Service::Auth => {
            use clinica_server::apps::auth::{router, AuthState};
            let signer = TokenSigner::from_secret(
                config.auth.jwt_secret.as_deref(),
                config.auth.token_ttl_seconds,
            )?;
            let revocations = revocation::open(config.redis_url.as_deref()).await?;
            let state = AuthState::new(signer, revocations);
            if let Some(admin) = &config.auth.bootstrap_admin {
                state
                    .users
                    .ensure_admin(admin)
                    .await
                    .context("Failed to create bootstrap administrator")?;
            }
            let bind = bind_override.unwrap_or(config.auth.bind);
            serve(router(state), &bind, "auth").await
        }
        #[cfg(feature = "gateway")]
        Service::Gateway => {
            use clinica_server::apps::gateway::{router, GatewayState};
            // Tokens are issued by the auth service, so the key must be shared.
            let secret = config
                .auth
                .jwt_secret
                .as_deref()
                .context(
                    "The gateway needs auth.jwt_secret (or CLINICA_JWT_SECRET) to verify tokens",
                )?;
            let signer = TokenSigner::from_secret(Some(secret), config.auth.token_ttl_seconds)?;
            let revocations = revocation::open(config.redis_url.as_deref()).await?;
            let state = GatewayState::new(&config.gateway, signer, revocations)?;
            info!("Gateway routing {} prefixes", config.gateway.routes.len());
            let bind = bind_override.unwrap_or(config.gateway.bind);
            serve(router(state), &bind, "gateway").await
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("{other:?} is not compiled into this binary"),
    }
}
