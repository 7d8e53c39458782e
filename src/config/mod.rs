use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;

/// Where the ledger tables live.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Memory,
    Csv { dir: PathBuf },
    Postgres { database_url: String },
    Http { base_url: String, api_key: Option<String> },
}

/// Bounds applied when a wager is logged. Mirrors the limits of the entry
/// form the ledger was originally driven from.
#[derive(Debug, Clone, PartialEq)]
pub struct WagerLimits {
    pub odds_min: Decimal,
    pub odds_max: Decimal,
    pub stake_max: Decimal,
}

impl Default for WagerLimits {
    fn default() -> Self {
        Self {
            odds_min: Decimal::new(101, 2), // 1.01
            odds_max: Decimal::from(100),
            stake_max: Decimal::from(50_000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Shared bearer token. `None` disables the gate (dev mode).
    pub api_token: Option<String>,
    pub store: StoreBackend,
    pub limits: WagerLimits,
}

fn decimal_var(name: &str, default: Decimal) -> anyhow::Result<Decimal> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{name} must be a decimal number: {e}")),
        _ => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "csv".into());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "csv" => StoreBackend::Csv {
                dir: env::var("LEDGER_DATA_DIR")
                    .unwrap_or_else(|_| "./data".into())
                    .into(),
            },
            "postgres" => StoreBackend::Postgres {
                database_url: env::var("DATABASE_URL").map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL must be set for the postgres store")
                })?,
            },
            "http" => StoreBackend::Http {
                base_url: env::var("SHEETS_API_URL")
                    .map_err(|_| anyhow::anyhow!("SHEETS_API_URL must be set for the http store"))?,
                api_key: env::var("SHEETS_API_KEY").ok().filter(|k| !k.is_empty()),
            },
            other => anyhow::bail!("unknown STORE_BACKEND {other:?} (memory, csv, postgres, http)"),
        };

        let defaults = WagerLimits::default();
        let limits = WagerLimits {
            odds_min: decimal_var("ODDS_MIN", defaults.odds_min)?,
            odds_max: decimal_var("ODDS_MAX", defaults.odds_max)?,
            stake_max: decimal_var("STAKE_MAX", defaults.stake_max)?,
        };
        if limits.odds_min > limits.odds_max {
            anyhow::bail!("ODDS_MIN ({}) exceeds ODDS_MAX ({})", limits.odds_min, limits.odds_max);
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
            store,
            limits,
        })
    }

    /// Returns true if requests must carry the bearer token.
    pub fn auth_enabled(&self) -> bool {
        self.api_token.is_some()
    }
}
