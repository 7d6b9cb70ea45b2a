use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub sms: Option<SmsConfig>,
    #[serde(default)]
    pub pdf: Option<PdfConfig>,
    #[serde(default)]
    pub images: Option<ImagesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_duration_hours: i64,
    pub otp_ttl_minutes: i64,
    /// Echo issued OTP codes in the send-otp response. Development only;
    /// lets the flow be exercised without a working SMS gateway.
    #[serde(default)]
    pub expose_otp: bool,
}

/// Admin account seeded at startup when the mobile number is not yet
/// present in the database.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub mobile: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmsConfig {
    pub enabled: bool,
    pub gateway_url: String,
    pub api_key: String,
    pub sender_id: String,
    /// Appended to outbound member messages when include_link is set.
    pub portal_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PdfConfig {
    pub enabled: bool,
    /// HTML-to-PDF renderer endpoint (a headless-chromium service).
    pub renderer_url: String,
    /// Object storage base URL; generated PDFs are PUT beneath it.
    pub storage_url: String,
    pub storage_api_key: String,
    /// Public base for download links returned to clients.
    pub public_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    pub enabled: bool,
    /// Image-ingest endpoint; accepts a source (data URL or remote URL)
    /// and returns the stored public URL.
    pub upload_url: String,
    pub api_key: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("auth.token_duration_hours", 24)?
            .set_default("auth.otp_ttl_minutes", 10)?
            .set_default("auth.expose_otp", false)?
            .set_default("admin.name", "Gym Admin")?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with FITDESK__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("FITDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://fitdesk.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_duration_hours: 24,
                otp_ttl_minutes: 10,
                expose_otp: true,
            },
            admin: AdminConfig {
                mobile: "+911234567890".to_string(),
                name: "Gym Admin".to_string(),
            },
            sms: None,
            pdf: None,
            images: None,
        }
    }
}
