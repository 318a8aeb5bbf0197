//! Configuration management for the daily planner
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `PLANNER_` prefix, `__` for nesting)
//! 2. Flat environment variables of the original deployment (`PORT`,
//!    `EMAILJS_SERVICE_ID`, `CLOUDINARY_API_KEY`, ...)
//! 3. `./config.toml` (development)
//! 4. `~/.config/daily-planner/config.toml` (user config, XDG)
//! 5. `/etc/daily-planner/config.toml` (system config)
//! 6. Hardcoded defaults (fallback)
//!
//! Environment variable format: `PLANNER_SECTION__FIELD_NAME`, e.g.
//! `PLANNER_UPLOAD__BACKEND=cloudinary`.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! port = 3000
//! public_url = "https://planner.example.com"
//!
//! [upload]
//! backend = "cloudinary"
//!
//! [upload.cloudinary]
//! cloud_name = "demo"
//! api_key = "1234"
//! api_secret = "abcd"
//!
//! [email]
//! backend = "emailjs"  # or "console" to log emails instead of sending
//! public_key = "pk_live"
//! service_id = "service_planner"
//! template_id = "template_daily"
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name used for configuration and data directories
pub const APP_NAME: &str = "daily-planner";

/// Flat environment variables and the configuration keys they feed
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("EMAILJS_PUBLIC_KEY", "email.public_key"),
    ("EMAILJS_PRIVATE_KEY", "email.private_key"),
    ("EMAILJS_SERVICE_ID", "email.service_id"),
    ("EMAILJS_TEMPLATE_ID", "email.template_id"),
    ("QUOTES_API_KEY", "quotes.api_key"),
    ("CLOUDINARY_CLOUD_NAME", "upload.cloudinary.cloud_name"),
    ("CLOUDINARY_API_KEY", "upload.cloudinary.api_key"),
    ("CLOUDINARY_API_SECRET", "upload.cloudinary.api_secret"),
];

/// Upload server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind
    pub host: IpAddr,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when building links to stored files
    ///
    /// Defaults to `http://localhost:{port}`.
    pub public_url: Option<String>,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,

    /// Allow cross-origin requests from any origin
    pub cors_enabled: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            public_url: None,
            max_upload_bytes: 50 * 1024 * 1024,
            cors_enabled: true,
        }
    }
}

impl ServerSettings {
    /// Socket address to bind
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Base URL for links to stored files, without trailing slash
    #[must_use]
    pub fn public_base_url(&self) -> String {
        self.public_url.as_deref().map_or_else(
            || format!("http://localhost:{}", self.port),
            |url| url.trim_end_matches('/').to_string(),
        )
    }
}

/// Where uploaded images end up
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadBackend {
    /// Local directory served under `/uploads`
    #[default]
    Disk,
    /// Cloudinary image hosting
    Cloudinary,
}

/// Cloudinary credentials and placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudinarySettings {
    /// Cloud name
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret used to sign uploads
    pub api_secret: String,
    /// Folder images are stored under
    pub folder: String,
    /// Upload API base URL
    pub api_base: String,
}

impl Default for CloudinarySettings {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "daily_planner".to_string(),
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
        }
    }
}

/// Upload storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Storage backend
    pub backend: UploadBackend,
    /// Directory for the disk backend
    pub dir: PathBuf,
    /// Cloudinary settings for the cloud backend
    pub cloudinary: CloudinarySettings,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            backend: UploadBackend::default(),
            dir: PathBuf::from("./uploads"),
            cloudinary: CloudinarySettings::default(),
        }
    }
}

/// Settings for the planner client side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Upload endpoint exported images are posted to
    pub upload_endpoint: String,

    /// Location of the persisted planner fields
    pub store_path: PathBuf,

    /// Timeout for outbound requests in milliseconds (none when unset)
    pub request_timeout_ms: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            upload_endpoint: "http://localhost:3000/upload".to_string(),
            store_path: default_store_path(),
            request_timeout_ms: None,
        }
    }
}

impl ClientSettings {
    /// Request timeout as a `Duration`
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from("./planner.json"),
        |dir| dir.join(APP_NAME).join("planner.json"),
    )
}

/// Quotes API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSettings {
    /// Endpoint returning a JSON array of quotes
    pub endpoint: String,
    /// API key sent in the `X-Api-Key` header
    pub api_key: String,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.api-ninjas.com/v1/quotes".to_string(),
            api_key: String::new(),
        }
    }
}

/// Where planner emails go
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackend {
    /// EmailJS REST API
    #[default]
    EmailJs,
    /// Logged through `tracing`, nothing is delivered
    Console,
}

/// Transactional email settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// Delivery backend
    pub backend: EmailBackend,
    /// EmailJS REST endpoint
    pub endpoint: String,
    /// Public key (EmailJS user id)
    pub public_key: String,
    /// Private key (access token), required for server-side sends when
    /// strict mode is enabled on the account
    pub private_key: Option<String>,
    /// Service identifier
    pub service_id: String,
    /// Template identifier
    pub template_id: String,
    /// Support address included in every email
    pub company_email: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            backend: EmailBackend::default(),
            endpoint: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
            public_key: String::new(),
            private_key: None,
            service_id: String::new(),
            template_id: String::new(),
            company_email: "support@dailyplanner.com".to_string(),
        }
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlannerConfig {
    /// Upload server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Upload storage settings
    #[serde(default)]
    pub upload: UploadSettings,

    /// Client settings
    #[serde(default)]
    pub client: ClientSettings,

    /// Quotes API settings
    #[serde(default)]
    pub quotes: QuoteSettings,

    /// Email settings
    #[serde(default)]
    pub email: EmailSettings,
}

impl PlannerConfig {
    /// Load configuration from every standard location
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file cannot be read or parsed
    /// - Configuration values fail type conversion
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Self::defaults()?;

        let system_config = PathBuf::from("/etc").join(APP_NAME).join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        Ok(Self::with_env(figment).extract()?)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file falls back to defaults. Environment variables still
    /// override file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or values fail
    /// type conversion
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let figment = Self::defaults()?.merge(Toml::file(path.as_ref()));
        Ok(Self::with_env(figment).extract()?)
    }

    /// Recommended XDG config path
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| config_dir.join(APP_NAME).join("config.toml"),
        )
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }

    fn with_env(figment: Figment) -> Figment {
        figment
            .merge(legacy_env())
            .merge(Env::prefixed("PLANNER_").split("__").lowercase(true))
    }
}

fn legacy_env() -> Env {
    Env::raw().filter_map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.upload.backend, UploadBackend::Disk);
        assert_eq!(config.upload.cloudinary.folder, "daily_planner");
        assert_eq!(config.email.company_email, "support@dailyplanner.com");
        assert_eq!(config.email.backend, EmailBackend::EmailJs);
        assert_eq!(config.client.upload_endpoint, "http://localhost:3000/upload");
        assert!(config.client.request_timeout().is_none());
    }

    #[test]
    fn test_public_base_url() {
        let mut server = ServerSettings::default();
        assert_eq!(server.public_base_url(), "http://localhost:3000");

        server.public_url = Some("https://planner.example.com/".to_string());
        assert_eq!(server.public_base_url(), "https://planner.example.com");
    }

    #[test]
    fn test_load_from_file_and_env() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "planner.toml",
                r#"
[server]
port = 8080

[upload]
backend = "cloudinary"

[email]
service_id = "from_file"
"#,
            )?;
            jail.set_env("PLANNER_EMAIL__TEMPLATE_ID", "template_env");
            jail.set_env("CLOUDINARY_CLOUD_NAME", "demo-cloud");

            let config = PlannerConfig::load_from("planner.toml").expect("config loads");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.upload.backend, UploadBackend::Cloudinary);
            assert_eq!(config.upload.cloudinary.cloud_name, "demo-cloud");
            assert_eq!(config.email.service_id, "from_file");
            assert_eq!(config.email.template_id, "template_env");
            Ok(())
        });
    }

    #[test]
    fn test_console_email_backend_is_opt_in() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config = PlannerConfig::load_from("missing.toml").expect("config loads");
            assert_eq!(config.email.backend, EmailBackend::EmailJs);

            jail.set_env("PLANNER_EMAIL__BACKEND", "console");
            let config = PlannerConfig::load_from("missing.toml").expect("config loads");
            assert_eq!(config.email.backend, EmailBackend::Console);
            Ok(())
        });
    }

    #[test]
    fn test_legacy_port_overridden_by_prefixed() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("PORT", "4000");
            let config = PlannerConfig::load_from("missing.toml").expect("config loads");
            assert_eq!(config.server.port, 4000);

            jail.set_env("PLANNER_SERVER__PORT", "5000");
            let config = PlannerConfig::load_from("missing.toml").expect("config loads");
            assert_eq!(config.server.port, 5000);
            Ok(())
        });
    }
}
