use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default VK OAuth base URL used when `VK_OAUTH_URL` is not set.
pub const DEFAULT_VK_OAUTH_URL: &str = "https://oauth.vk.com";
/// Default VK API base URL used when `VK_API_URL` is not set.
pub const DEFAULT_VK_API_URL: &str = "https://api.vk.com";
/// Default GitHub OAuth base URL used when `GITHUB_OAUTH_URL` is not set.
pub const DEFAULT_GITHUB_OAUTH_URL: &str = "https://github.com";
/// Default GitHub REST API base URL used when `GITHUB_API_URL` is not set.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default session database, an in-memory SQLite database.
pub const DEFAULT_SESSION_STORE_URL: &str = "sqlite::memory:";

/// The cookie signing key is derived from the session secret and needs at least this many bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

/// Every problem found while validating a `Config` at startup.
#[derive(Debug, PartialEq)]
pub struct ConfigError {
    pub problems: Vec<String>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.problems.join("; "))
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 5000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Session expiry duration in seconds of inactivity (default: 24 hours = 86400 seconds)
    #[arg(long, env, default_value_t = 86400)]
    pub backend_session_expiry_seconds: u64,

    /// Database the sessions are stored in. The default keeps them in memory for the life
    /// of the process; point it at a file (e.g. sqlite://sessions.db?mode=rwc) to keep them.
    #[arg(long, env, default_value = DEFAULT_SESSION_STORE_URL)]
    session_store_url: String,

    /// How often expired sessions are deleted from the store, in seconds
    #[arg(long, env, default_value_t = 60)]
    pub session_cleanup_interval_seconds: u64,

    /// Secret used to sign the session cookie. Must be at least 64 bytes long.
    #[arg(long, env)]
    session_secret: Option<String>,

    /// The VK application (client) ID.
    #[arg(long, env)]
    vk_client_id: Option<String>,

    /// The VK application secret key.
    #[arg(long, env)]
    vk_client_secret: Option<String>,

    /// The VK redirect URI registered for this application, e.g. http://localhost:5000/vk/callback/
    #[arg(long, env)]
    vk_redirect_uri: Option<String>,

    /// The GitHub OAuth app client ID.
    #[arg(long, env)]
    github_client_id: Option<String>,

    /// The GitHub OAuth app client secret.
    #[arg(long, env)]
    github_client_secret: Option<String>,

    /// The GitHub redirect URI registered for this application, e.g. http://localhost:5000/github/callback/
    #[arg(long, env)]
    github_redirect_uri: Option<String>,

    /// Base URL of the VK OAuth server.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_VK_OAUTH_URL)]
    vk_oauth_url: String,

    /// Base URL of the VK API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_VK_API_URL)]
    vk_api_url: String,

    /// Base URL of the GitHub OAuth server.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_GITHUB_OAUTH_URL)]
    github_oauth_url: String,

    /// Base URL of the GitHub REST API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_GITHUB_API_URL)]
    github_api_url: String,

    /// Timeout in seconds applied to the GitHub authorization code exchange
    #[arg(long, env, default_value_t = 10)]
    pub github_exchange_timeout_secs: u64,

    /// Optional timeout in seconds for every other outbound provider call.
    /// When unset those calls wait for as long as the provider takes.
    #[arg(long, env)]
    pub provider_request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Checks every value the application cannot run without.
    ///
    /// All problems are collected so a single startup attempt reports the full list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        match self.session_secret.as_deref() {
            None | Some("") => problems.push("SESSION_SECRET is not set".to_string()),
            Some(secret) if secret.len() < MIN_SESSION_SECRET_LEN => problems.push(format!(
                "SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes long"
            )),
            Some(_) => {}
        }

        let required = [
            ("VK_CLIENT_ID", &self.vk_client_id),
            ("VK_CLIENT_SECRET", &self.vk_client_secret),
            ("VK_REDIRECT_URI", &self.vk_redirect_uri),
            ("GITHUB_CLIENT_ID", &self.github_client_id),
            ("GITHUB_CLIENT_SECRET", &self.github_client_secret),
            ("GITHUB_REDIRECT_URI", &self.github_redirect_uri),
        ];
        for (name, value) in required {
            if value.as_deref().map_or(true, str::is_empty) {
                problems.push(format!("{name} is not set"));
            }
        }

        if self.github_exchange_timeout_secs == 0 {
            problems.push("GITHUB_EXCHANGE_TIMEOUT_SECS must be greater than 0".to_string());
        }
        if self.session_cleanup_interval_seconds == 0 {
            problems.push("SESSION_CLEANUP_INTERVAL_SECONDS must be greater than 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { problems })
        }
    }

    pub fn session_secret(&self) -> Option<String> {
        self.session_secret.clone()
    }

    pub fn session_store_url(&self) -> &str {
        &self.session_store_url
    }

    pub fn session_cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.session_cleanup_interval_seconds)
    }

    pub fn vk_client_id(&self) -> Option<String> {
        self.vk_client_id.clone()
    }

    pub fn vk_client_secret(&self) -> Option<String> {
        self.vk_client_secret.clone()
    }

    pub fn vk_redirect_uri(&self) -> Option<String> {
        self.vk_redirect_uri.clone()
    }

    pub fn github_client_id(&self) -> Option<String> {
        self.github_client_id.clone()
    }

    pub fn github_client_secret(&self) -> Option<String> {
        self.github_client_secret.clone()
    }

    pub fn github_redirect_uri(&self) -> Option<String> {
        self.github_redirect_uri.clone()
    }

    /// Returns the VK OAuth base URL.
    pub fn vk_oauth_url(&self) -> &str {
        &self.vk_oauth_url
    }

    /// Returns the VK API base URL.
    pub fn vk_api_url(&self) -> &str {
        &self.vk_api_url
    }

    /// Returns the GitHub OAuth base URL.
    pub fn github_oauth_url(&self) -> &str {
        &self.github_oauth_url
    }

    /// Returns the GitHub REST API base URL.
    pub fn github_api_url(&self) -> &str {
        &self.github_api_url
    }

    pub fn github_exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.github_exchange_timeout_secs)
    }

    pub fn provider_request_timeout(&self) -> Option<Duration> {
        self.provider_request_timeout_secs.map(Duration::from_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn full_args() -> Vec<String> {
        [
            "oauth_profiles",
            "--session-secret",
            SECRET,
            "--vk-client-id",
            "vk-id",
            "--vk-client-secret",
            "vk-secret",
            "--vk-redirect-uri",
            "http://localhost:5000/vk/callback/",
            "--github-client-id",
            "gh-id",
            "--github-client-secret",
            "gh-secret",
            "--github-redirect-uri",
            "http://localhost:5000/github/callback/",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_rust_env_from_str_is_case_insensitive() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("nope".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    fn test_complete_config_validates() {
        let config = Config::try_parse_from(full_args()).unwrap();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.vk_client_id(), Some("vk-id".to_string()));
    }

    #[test]
    fn test_defaults_point_at_real_providers() {
        let config = Config::try_parse_from(full_args()).unwrap();
        assert_eq!(config.vk_oauth_url(), DEFAULT_VK_OAUTH_URL);
        assert_eq!(config.vk_api_url(), DEFAULT_VK_API_URL);
        assert_eq!(config.github_oauth_url(), DEFAULT_GITHUB_OAUTH_URL);
        assert_eq!(config.github_api_url(), DEFAULT_GITHUB_API_URL);
        assert_eq!(config.github_exchange_timeout(), Duration::from_secs(10));
        assert_eq!(config.provider_request_timeout(), None);
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_credential_is_reported_by_name() {
        let args: Vec<String> = full_args()
            .into_iter()
            .filter(|a| a != "--github-client-secret" && a != "gh-secret")
            .collect();
        let config = Config::try_parse_from(args).unwrap();

        let err = config.validate().unwrap_err();
        assert_eq!(err.problems, vec!["GITHUB_CLIENT_SECRET is not set".to_string()]);
    }

    #[test]
    fn test_short_session_secret_is_rejected() {
        let mut args = full_args();
        args[2] = "too-short".to_string();
        let config = Config::try_parse_from(args).unwrap();

        let err = config.validate().unwrap_err();
        assert_eq!(err.problems.len(), 1);
        assert!(err.to_string().contains("at least 64 bytes"));
    }

    #[test]
    fn test_zero_github_exchange_timeout_is_rejected() {
        let mut args = full_args();
        args.extend(["--github-exchange-timeout-secs".to_string(), "0".to_string()]);
        let config = Config::try_parse_from(args).unwrap();

        let err = config.validate().unwrap_err();
        assert_eq!(
            err.problems,
            vec!["GITHUB_EXCHANGE_TIMEOUT_SECS must be greater than 0".to_string()]
        );
    }

    #[test]
    fn test_zero_session_cleanup_interval_is_rejected() {
        let mut args = full_args();
        args.extend(["--session-cleanup-interval-seconds".to_string(), "0".to_string()]);
        let config = Config::try_parse_from(args).unwrap();

        let err = config.validate().unwrap_err();
        assert_eq!(
            err.problems,
            vec!["SESSION_CLEANUP_INTERVAL_SECONDS must be greater than 0".to_string()]
        );
    }
}
