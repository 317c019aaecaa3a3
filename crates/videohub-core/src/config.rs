//! Configuration module
//!
//! Typed settings for the HTTP service, object storage buckets, Supabase,
//! rate limiting and the page auth gate. Everything is read from the process
//! environment (optionally seeded from a `.env` file) and validated once at
//! startup.

use std::env;
use std::str::FromStr;

use crate::constants::RATE_LIMIT_WINDOW_SECS;
use crate::models::BucketType;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const THEME_RATE_LIMIT_PER_MINUTE: u32 = 30;
const PROTECTED_ROUTES: &[&str] = &["/upload", "/profile", "/settings"];
const AUTH_ONLY_ROUTES: &[&str] = &["/login", "/signup"];

/// Base configuration for the HTTP service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_body_bytes: usize,
}

/// Name and public base URL of one storage bucket.
#[derive(Clone, Debug, Default)]
pub struct BucketSettings {
    pub bucket_name: Option<String>,
    pub public_url: Option<String>,
}

impl BucketSettings {
    /// A bucket can only be used when both its name and public URL are known.
    pub fn is_configured(&self) -> bool {
        self.bucket_name.as_deref().is_some_and(|s| !s.is_empty())
            && self.public_url.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Cloudflare R2 (or any S3 compatible store) settings
#[derive(Clone, Debug, Default)]
pub struct StorageSettings {
    pub account_id: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Explicit endpoint, overrides the one derived from `account_id`.
    pub endpoint: Option<String>,
    pub videos: BucketSettings,
    pub images: BucketSettings,
}

impl StorageSettings {
    pub fn bucket(&self, bucket_type: BucketType) -> &BucketSettings {
        match bucket_type {
            BucketType::Videos => &self.videos,
            BucketType::Images => &self.images,
        }
    }

    pub fn endpoint_url(&self) -> Option<String> {
        self.endpoint.clone().or_else(|| {
            self.account_id
                .as_ref()
                .map(|account| format!("https://{}.r2.cloudflarestorage.com", account))
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct SupabaseSettings {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    /// HS256 secret used to verify access tokens locally.
    pub jwt_secret: Option<String>,
    /// Direct Postgres connection; PostgREST is used when absent.
    pub database_url: Option<String>,
}

impl SupabaseSettings {
    /// URL and anon key are both required to talk to the hosted APIs.
    pub fn rest_credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.anon_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }
}

/// How the rate limiter behaves when its store is missing or failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enforcement {
    /// Deny requests when the store fails; refuse to start without a store.
    Strict,
    /// Allow requests with a generous fixed quota when the store is unavailable.
    BestEffort,
}

impl FromStr for Enforcement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Enforcement::Strict),
            "best-effort" | "best_effort" | "besteffort" => Ok(Enforcement::BestEffort),
            other => Err(format!("Unknown rate limit enforcement mode: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitBackend {
    Upstash,
    Memory,
}

impl FromStr for RateLimitBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upstash" | "redis" => Ok(RateLimitBackend::Upstash),
            "memory" | "in-memory" => Ok(RateLimitBackend::Memory),
            other => Err(format!("Unknown rate limit backend: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RateLimitSettings {
    pub enforcement: Enforcement,
    /// `None` when no store is configured.
    pub backend: Option<RateLimitBackend>,
    pub upstash_url: Option<String>,
    pub upstash_token: Option<String>,
    pub theme_per_minute: u32,
    pub window_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthGateSettings {
    pub protected_routes: Vec<String>,
    pub auth_only_routes: Vec<String>,
}

impl Default for AuthGateSettings {
    fn default() -> Self {
        Self {
            protected_routes: PROTECTED_ROUTES.iter().map(|s| s.to_string()).collect(),
            auth_only_routes: AUTH_ONLY_ROUTES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageSettings,
    pub supabase: SupabaseSettings,
    pub rate_limit: RateLimitSettings,
    pub auth_gate: AuthGateSettings,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_either = |primary: &str, fallback: &str| get(primary).or_else(|| get(fallback));

        let environment = get_either("ENVIRONMENT", "APP_ENV")
            .unwrap_or_else(|| "development".to_string());

        let server_port = match get("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number"))?,
            None => DEFAULT_PORT,
        };

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a positive integer"))?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let cors_origins = split_list(&get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        let storage = StorageSettings {
            account_id: get("R2_ACCOUNT_ID"),
            access_key_id: get("R2_ACCESS_KEY_ID"),
            secret_access_key: get("R2_SECRET_ACCESS_KEY"),
            endpoint: get("R2_ENDPOINT"),
            videos: BucketSettings {
                bucket_name: get("R2_BUCKET_NAME"),
                public_url: get("R2_PUBLIC_URL"),
            },
            images: BucketSettings {
                bucket_name: get("R2_IMAGES_BUCKET_NAME"),
                public_url: get("R2_IMAGES_PUBLIC_URL"),
            },
        };

        let supabase = SupabaseSettings {
            url: get_either("SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"),
            anon_key: get_either("SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"),
            jwt_secret: get("SUPABASE_JWT_SECRET"),
            database_url: get("DATABASE_URL"),
        };

        let enforcement = match get("RATE_LIMIT_ENFORCEMENT") {
            Some(v) => v.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            None => Enforcement::BestEffort,
        };

        let upstash_url = get("UPSTASH_REDIS_REST_URL");
        let upstash_token = get("UPSTASH_REDIS_REST_TOKEN");
        let backend = match get("RATE_LIMIT_BACKEND") {
            Some(v) => Some(v.parse().map_err(|e: String| anyhow::anyhow!(e))?),
            None if upstash_url.is_some() && upstash_token.is_some() => {
                Some(RateLimitBackend::Upstash)
            }
            None => None,
        };

        let theme_per_minute = match get("RATE_LIMIT_THEME_PER_MINUTE") {
            Some(v) => v.parse().map_err(|_| {
                anyhow::anyhow!("RATE_LIMIT_THEME_PER_MINUTE must be a positive integer")
            })?,
            None => THEME_RATE_LIMIT_PER_MINUTE,
        };

        let rate_limit = RateLimitSettings {
            enforcement,
            backend,
            upstash_url,
            upstash_token,
            theme_per_minute,
            window_secs: RATE_LIMIT_WINDOW_SECS,
        };

        let defaults = AuthGateSettings::default();
        let auth_gate = AuthGateSettings {
            protected_routes: get("AUTH_PROTECTED_ROUTES")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.protected_routes),
            auth_only_routes: get("AUTH_ONLY_ROUTES")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.auth_only_routes),
        };

        Ok(Config {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
                max_body_bytes,
            },
            storage,
            supabase,
            rate_limit,
            auth_gate,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.supabase.jwt_secret.is_none() && self.supabase.rest_credentials().is_none() {
            return Err(anyhow::anyhow!(
                "Either SUPABASE_JWT_SECRET or SUPABASE_URL and SUPABASE_ANON_KEY must be set"
            ));
        }

        if let Some(database_url) = &self.supabase.database_url {
            if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://")
            {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.rate_limit.backend == Some(RateLimitBackend::Upstash)
            && (self.rate_limit.upstash_url.is_none() || self.rate_limit.upstash_token.is_none())
        {
            return Err(anyhow::anyhow!(
                "UPSTASH_REDIS_REST_URL and UPSTASH_REDIS_REST_TOKEN must be set when using the upstash rate limit backend"
            ));
        }

        if self.rate_limit.enforcement == Enforcement::Strict && self.rate_limit.backend.is_none() {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_ENFORCEMENT=strict requires a rate limit store (set UPSTASH_REDIS_REST_URL/UPSTASH_REDIS_REST_TOKEN or RATE_LIMIT_BACKEND=memory)"
            ));
        }

        if self.rate_limit.theme_per_minute == 0 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_THEME_PER_MINUTE must be greater than zero"
            ));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }
}

/// `production` and `prod` (any case) count as production.
pub fn is_production_environment(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
