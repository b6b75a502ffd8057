/// Configuration management for the API server
///
/// Loads configuration from environment variables into a type-safe struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `JWT_SECRET`: Secret key for JWT signing, >= 32 chars (required)
/// - `MAIL_USERNAME`: SMTP relay login (required)
/// - `MAIL_PASSWORD`: SMTP relay password (required)
/// - `SMTP_HOST`: SMTP relay host (default: smtp.gmail.com)
/// - `SMTP_PORT`: SMTP relay STARTTLS port (default: 587)
/// - `MAIL_FROM`: Sender address (default: MAIL_USERNAME)
/// - `ANONYMOUS_USER_ID`: Reserved account UUID for anonymized reviews
/// - `COLLATION_LOCALE`: BCP-47 tag for name ordering (default: cs)
/// - `TERMS_URL`: Content-policy URL cited in moderation mail
/// - `ARGON2_MEMORY_KIB`: Password hash memory cost (default: 65536)
/// - `RUST_LOG`: Log filter (default: info)
///
/// # Example
///
/// ```no_run
/// use firmrate_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use firmrate_shared::auth::password::HashCost;
use firmrate_shared::mail::MailConfig;
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

/// Default UUID of the reserved anonymous account
///
/// Overridable via `ANONYMOUS_USER_ID`; the account is created at startup
/// and never handed out to a real registration.
pub const DEFAULT_ANONYMOUS_USER_ID: &str = "00000000-0000-0000-0000-00000000a707";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// SMTP relay configuration
    pub mail: MailSettings,

    /// Application-level settings
    pub app: AppSettings,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// SMTP relay settings
///
/// Serialization skips the password so a dumped config never leaks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub from: String,
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Reserved account that anonymized reviews are reassigned to
    pub anonymous_user_id: Uuid,

    /// BCP-47 locale tag for name collation
    pub collation_locale: String,

    /// Content-policy URL cited in rejection/retraction mail
    pub terms_url: String,

    /// Argon2id memory cost in KiB
    pub argon2_memory_kib: u32,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let mail_username = env::var("MAIL_USERNAME")
            .map_err(|_| anyhow::anyhow!("MAIL_USERNAME environment variable is required"))?;
        let mail_password = env::var("MAIL_PASSWORD")
            .map_err(|_| anyhow::anyhow!("MAIL_PASSWORD environment variable is required"))?;
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()?;
        let mail_from = env::var("MAIL_FROM").unwrap_or_else(|_| mail_username.clone());

        let anonymous_user_id = env::var("ANONYMOUS_USER_ID")
            .unwrap_or_else(|_| DEFAULT_ANONYMOUS_USER_ID.to_string())
            .parse::<Uuid>()?;

        let collation_locale = env::var("COLLATION_LOCALE").unwrap_or_else(|_| "cs".to_string());

        let terms_url = env::var("TERMS_URL")
            .unwrap_or_else(|_| "https://recenze-spolecnosti.cz/terms_conditions".to_string());

        let argon2_memory_kib = env::var("ARGON2_MEMORY_KIB")
            .unwrap_or_else(|_| "65536".to_string())
            .parse::<u32>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            mail: MailSettings {
                smtp_host,
                smtp_port,
                username: mail_username,
                password: mail_password,
                from: mail_from,
            },
            app: AppSettings {
                anonymous_user_id,
                collation_locale,
                terms_url,
                argon2_memory_kib,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Password hash cost derived from configuration
    pub fn hash_cost(&self) -> HashCost {
        HashCost {
            memory_kib: self.app.argon2_memory_kib,
            ..HashCost::default()
        }
    }

    /// SMTP configuration for the mailer
    pub fn mail_config(&self) -> MailConfig {
        MailConfig {
            smtp_host: self.mail.smtp_host.clone(),
            smtp_port: self.mail.smtp_port,
            username: self.mail.username.clone(),
            password: self.mail.password.clone(),
            from: self.mail.from.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            mail: MailSettings {
                smtp_host: "smtp.example.com".to_string(),
                smtp_port: 587,
                username: "mailer@example.com".to_string(),
                password: "secret".to_string(),
                from: "mailer@example.com".to_string(),
            },
            app: AppSettings {
                anonymous_user_id: DEFAULT_ANONYMOUS_USER_ID.parse().unwrap(),
                collation_locale: "cs".to_string(),
                terms_url: "https://example.com/terms".to_string(),
                argon2_memory_kib: 65536,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_hash_cost_from_config() {
        let mut config = test_config();
        config.app.argon2_memory_kib = 32768;
        assert_eq!(config.hash_cost().memory_kib, 32768);
    }

    #[test]
    fn test_password_not_serialized() {
        let json = serde_json::to_string(&test_config()).unwrap();
        assert!(!json.contains("\"password\""));
        assert!(!json.contains("secret\":\"secret"));
    }

    #[test]
    fn test_default_anonymous_id_parses() {
        let id: Uuid = DEFAULT_ANONYMOUS_USER_ID.parse().unwrap();
        assert!(!id.is_nil());
    }
}
