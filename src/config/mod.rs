use serde::Deserialize;
use std::env;

// Top-level configuration container, populated from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub reservation: ReservationConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationConfig {
    /// Probability of the deliberate transient failure per reserve attempt.
    pub failure_rate: f64,
}

// Optional bootstrap admin account, provisioned at startup when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "seat_reservation=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
                access_ttl_minutes: env::var("JWT_ACCESS_TTL_MINUTES")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .expect("JWT_ACCESS_TTL_MINUTES must be a valid number"),
                refresh_ttl_days: env::var("JWT_REFRESH_TTL_DAYS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .expect("JWT_REFRESH_TTL_DAYS must be a valid number"),
            },
            reservation: ReservationConfig {
                failure_rate: env::var("RESERVATION_FAILURE_RATE")
                    .unwrap_or_else(|_| "0.01".to_string())
                    .parse()
                    .expect("RESERVATION_FAILURE_RATE must be a valid number"),
            },
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME").ok(),
                password: env::var("ADMIN_PASSWORD").ok(),
            },
        }
    }
}
