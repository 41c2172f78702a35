use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Syntax Health";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

pub const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Default `tracing` filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "syntax_health=info,tower_http=info"
}

/// Get the application data directory.
/// ~/SyntaxHealth/ on all platforms, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("SyntaxHealth")
}

/// File holding the key-value bucket when the file backend is used.
pub fn bucket_file(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("storage.json")
}

/// Which bucket backend to open at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    Memory,
}

/// Which LLM provider the chat proxy forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatProviderKind {
    Gemini,
    OpenAi,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings, resolved from the process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    pub static_dir: Option<PathBuf>,
    pub chat_provider: ChatProviderKind,
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
}

impl Settings {
    /// Load settings from the environment. A `.env` file in the working
    /// directory is read first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr_raw = get("SYNTAX_HEALTH_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "SYNTAX_HEALTH_ADDR",
                value: addr_raw.clone(),
            })?;

        let storage = match get("SYNTAX_HEALTH_STORAGE").as_deref() {
            None | Some("file") => StorageBackend::File,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "SYNTAX_HEALTH_STORAGE",
                    value: other.to_string(),
                })
            }
        };

        let chat_provider = match get("CHAT_PROVIDER").as_deref() {
            None | Some("gemini") => ChatProviderKind::Gemini,
            Some("openai") => ChatProviderKind::OpenAi,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "CHAT_PROVIDER",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            addr,
            data_dir: get("SYNTAX_HEALTH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(app_data_dir),
            storage,
            static_dir: get("SYNTAX_HEALTH_STATIC_DIR").map(PathBuf::from),
            chat_provider,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_api_url: get("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_api_url: get("OPENAI_API_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        })
    }
}
