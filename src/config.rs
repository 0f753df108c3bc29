use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Pricing engine tuning
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Cached prices are served for this long before recomputation
    pub cache_ttl_secs: u64,
    /// Upper bound on cache entries; oldest captures are evicted past this
    pub cache_max_entries: usize,
    /// Budget for a single weather/traffic provider call
    pub provider_timeout_secs: u64,
    /// Neutral weather factor used when the provider fails or no location is given
    pub default_weather_factor: f64,
    /// Neutral traffic factor used when the provider fails or no location is given
    pub default_traffic_factor: f64,
    /// Platform share of the adjusted product price when a supplier has no settings row
    pub default_product_commission_rate: f64,
    /// Platform share of the adjusted delivery fee when a supplier has no settings row
    pub default_delivery_commission_rate: f64,
    /// Supplier earnings settle this many hours after payment
    pub supplier_settlement_delay_hours: i64,
    /// Courier earnings settle this many hours after payment
    pub courier_settlement_delay_hours: i64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pricing: PricingConfig,
    pub log_level: String,
    pub environment: String,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        // Validate configuration
        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/gascart".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl PricingConfig {
    /// Create pricing config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let cache_ttl_secs = env::var("PRICE_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(300); // 5 minutes

        let cache_max_entries = env::var("PRICE_CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1024);

        let provider_timeout_secs = env::var("FACTOR_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3);

        let default_product_commission_rate = env::var("DEFAULT_PRODUCT_COMMISSION_RATE")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.15);

        let default_delivery_commission_rate = env::var("DEFAULT_DELIVERY_COMMISSION_RATE")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.10);

        // Validate configuration
        if cache_max_entries == 0 {
            return Err("PRICE_CACHE_MAX_ENTRIES must be greater than 0".to_string());
        }

        if provider_timeout_secs == 0 {
            return Err("FACTOR_PROVIDER_TIMEOUT_SECS must be greater than 0".to_string());
        }

        for (name, rate) in [
            ("DEFAULT_PRODUCT_COMMISSION_RATE", default_product_commission_rate),
            ("DEFAULT_DELIVERY_COMMISSION_RATE", default_delivery_commission_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("{} must be between 0.0 and 1.0", name));
            }
        }

        Ok(Self {
            cache_ttl_secs,
            cache_max_entries,
            provider_timeout_secs,
            default_product_commission_rate,
            default_delivery_commission_rate,
            ..Self::default()
        })
    }

    /// Get cache TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Get provider timeout as Duration
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            cache_max_entries: 1024,
            provider_timeout_secs: 3,
            default_weather_factor: 0.2,
            default_traffic_factor: 0.3,
            default_product_commission_rate: 0.15,
            default_delivery_commission_rate: 0.10,
            supplier_settlement_delay_hours: 24,
            courier_settlement_delay_hours: 48,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let pricing = PricingConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            pricing,
            log_level: log_level.to_lowercase(),
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            pricing: PricingConfig::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Initialize tracing for a hosting application or test harness
pub fn init_tracing(log_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("gascart_pricing={},sqlx=warn", log_level).into()
            }),
        )
        .try_init();
}
