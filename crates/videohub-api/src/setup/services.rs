//! Service initialization and application state setup

use super::database::setup_database;
use crate::auth::{AuthGate, JwtSessionProvider, SessionProvider, SupabaseSessionProvider};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use videohub_core::Config;
use videohub_db::{
    InMemoryProfileRepository, PgProfileRepository, PostgrestProfileRepository, ProfileRepository,
};
use videohub_infra::{create_rate_limit_store, RateLimitConfig, RateLimiter};
use videohub_storage::create_bucket_registry;

/// Initialize all clients and repositories, returning the application state
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let store = create_rate_limit_store(&config.rate_limit)
        .context("Failed to create rate limit store")?;
    let theme_limiter = RateLimiter::new(RateLimitConfig::theme(&config.rate_limit), store)
        .context("Failed to create theme rate limiter")?;

    let buckets =
        create_bucket_registry(&config.storage).context("Failed to configure storage buckets")?;

    let sessions = session_provider(config)?;
    let profiles = profile_repository(config).await?;

    Ok(Arc::new(AppState {
        sessions,
        buckets,
        profiles,
        theme_limiter: Arc::new(theme_limiter),
        auth_gate: AuthGate::from_settings(&config.auth_gate),
    }))
}

/// Local JWT verification when the secret is known, the Auth API otherwise.
fn session_provider(config: &Config) -> Result<Arc<dyn SessionProvider>> {
    if let Some(secret) = &config.supabase.jwt_secret {
        tracing::info!("Verifying sessions locally with SUPABASE_JWT_SECRET");
        return Ok(Arc::new(JwtSessionProvider::new(secret)));
    }

    let (url, anon_key) = config.supabase.rest_credentials().ok_or_else(|| {
        anyhow::anyhow!("SUPABASE_URL and SUPABASE_ANON_KEY are required without SUPABASE_JWT_SECRET")
    })?;
    tracing::info!(supabase_url = %url, "Resolving sessions through the Supabase Auth API");
    Ok(Arc::new(SupabaseSessionProvider::new(url, anon_key)?))
}

async fn profile_repository(config: &Config) -> Result<Arc<dyn ProfileRepository>> {
    if let Some(database_url) = &config.supabase.database_url {
        let pool = setup_database(database_url).await?;
        return Ok(Arc::new(PgProfileRepository::new(pool)));
    }

    if let Some((url, anon_key)) = config.supabase.rest_credentials() {
        tracing::info!("Using PostgREST for profile storage");
        return Ok(Arc::new(
            PostgrestProfileRepository::new(url, anon_key)
                .map_err(|e| anyhow::anyhow!("Failed to create PostgREST client: {}", e))?,
        ));
    }

    tracing::warn!(
        "Neither DATABASE_URL nor Supabase REST credentials are set; theme preferences are kept in memory"
    );
    Ok(Arc::new(InMemoryProfileRepository::new()))
}
