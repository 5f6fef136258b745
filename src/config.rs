use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Default CORS origins accepted when `CORS_ORIGINS` is not set
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "*",
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
    "https://www.wellnesssentinel.ir",
];

const DEFAULT_APP_NAME: &str = "پیشگامان سلامت API";
const DEFAULT_APP_DESCRIPTION: &str = "راهکارهای پیشگیری و سلامت جامع - Backend API";

/// Wellness Sentinel - preventive health portal backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server host address
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// OpenAI API key used by the symptom checker
    #[arg(short = 'k', long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Chat completion model
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    pub openai_model: String,

    /// Public URL of the frontend (always allowed by CORS)
    #[arg(long, env = "FRONTEND_URL", default_value = "https://www.wellnesssentinel.ir")]
    pub frontend_url: String,

    /// SQLite file for saved assessments (in-memory when unset)
    #[arg(short = 'd', long, env = "DATABASE_URL")]
    pub database_file: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Application metadata
    pub app_name: String,
    pub app_description: String,
    pub app_version: String,
    pub debug: bool,
    pub api_prefix: String,

    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,

    // CORS
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub cors_allow_credentials: bool,
    pub socket_cors_origins: Vec<String>,

    // Storage
    pub database_file: Option<PathBuf>,

    // HTTP client
    pub proxy_url: Option<String>,
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
    pub http_max_retries: u32,

    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Ok(Self::from_args(args))
    }

    /// Build configuration from parsed CLI arguments plus env-only settings
    pub fn from_args(args: CliArgs) -> Self {
        Config {
            app_name: env_string("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            app_description: env_string("APP_DESCRIPTION")
                .unwrap_or_else(|| DEFAULT_APP_DESCRIPTION.to_string()),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            debug: args.debug,
            api_prefix: normalize_prefix(&env_string("API_PREFIX").unwrap_or_else(|| "/api".to_string())),

            server_host: args.host,
            server_port: args.port,

            openai_api_key: args.openai_api_key.filter(|k| !k.trim().is_empty()),
            openai_base_url: args.openai_base_url.trim_end_matches('/').to_string(),
            openai_model: args.openai_model,

            frontend_url: args.frontend_url,
            cors_origins: env_string("CORS_ORIGINS")
                .map(|s| parse_list(&s))
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect()),
            cors_allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS").unwrap_or(true),
            socket_cors_origins: env_string("SOCKETIO_CORS_ORIGINS")
                .map(|s| parse_list(&s))
                .unwrap_or_else(|| vec!["*".to_string()]),

            database_file: args.database_file.map(PathBuf::from),

            proxy_url: env_string("PROXY_URL")
                .or_else(|| env_string("HTTPS_PROXY"))
                .or_else(|| env_string("HTTP_PROXY")),
            http_connect_timeout: env_parse("HTTP_CONNECT_TIMEOUT").unwrap_or(10),
            http_request_timeout: env_parse("HTTP_REQUEST_TIMEOUT").unwrap_or(30),
            http_max_retries: env_parse("HTTP_MAX_RETRIES").unwrap_or(2),

            log_level: args.log_level,
        }
    }

    /// Validate configuration
    ///
    /// A missing or malformed OpenAI key is not fatal: the symptom checker
    /// reports it per request. The frontend URL is always added to CORS.
    pub fn validate(&mut self) -> Result<()> {
        match self.openai_api_key.as_deref() {
            None => tracing::warn!("OPENAI_API_KEY not found in environment variables"),
            Some(key) if !key.starts_with("sk-") => {
                tracing::warn!("OPENAI_API_KEY format appears invalid")
            }
            Some(_) => {}
        }

        if self.frontend_url != "*" && !self.cors_origins.contains(&self.frontend_url) {
            self.cors_origins.push(self.frontend_url.clone());
        }

        if self.server_port == 0 {
            anyhow::bail!("PORT must be a non-zero port number");
        }

        Ok(())
    }

    /// Whether an OpenAI key is present and plausibly formatted
    pub fn has_valid_openai_key(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .map(|key| key.starts_with("sk-") && key.len() > 20)
            .unwrap_or(false)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Parse a comma separated list, dropping blanks
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}

/// Ensure the API prefix starts with '/' and has no trailing slash
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
