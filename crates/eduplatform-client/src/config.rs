//! Client configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use eduplatform_core::model::{Difficulty, DEFAULT_NUM_QUESTIONS};
use eduplatform_core::traits::{Backend, TokenStore};

use crate::http::{HttpBackend, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::token::FileTokenStore;

/// Environment variable that replaces `backend_url`.
pub const BACKEND_URL_ENV: &str = "EDUPLATFORM_BACKEND_URL";

/// Top-level eduplatform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Transport timeout for every request.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Where the session token is kept between runs.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
    /// `limit` sent when listing forum posts.
    #[serde(default = "default_page_size")]
    pub forum_page_size: u32,
    #[serde(default = "default_num_questions")]
    pub default_num_questions: u32,
    #[serde(default)]
    pub default_difficulty: Difficulty,
}

fn default_backend_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_token_path() -> PathBuf {
    config_dir()
        .map(|dir| dir.join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".eduplatform-session.json"))
}
fn default_page_size() -> u32 {
    50
}
fn default_num_questions() -> u32 {
    DEFAULT_NUM_QUESTIONS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            timeout_secs: default_timeout(),
            token_path: default_token_path(),
            forum_page_size: default_page_size(),
            default_num_questions: default_num_questions(),
            default_difficulty: Difficulty::default(),
        }
    }
}

/// Starter file written by `eduplatform init`.
pub const STARTER_CONFIG: &str = r#"# eduplatform configuration

# REST backend. EDUPLATFORM_BACKEND_URL overrides this.
backend_url = "http://localhost:8001"

# Request timeout in seconds.
timeout_secs = 30

# Session token location. ${VAR} references are expanded.
# token_path = "${HOME}/.config/eduplatform/session.json"

# Forum posts fetched per page.
forum_page_size = 50

# Quiz generation defaults.
default_num_questions = 5
default_difficulty = "intermediate"
"#;

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to nothing.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        // Substituted values are not rescanned.
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `eduplatform.toml` in the current directory
/// 2. `~/.config/eduplatform/config.toml`
///
/// Falls back to defaults when neither exists.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("eduplatform.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClientConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClientConfig::default(),
    };
    tracing::debug!(path = ?config_path, "configuration loaded");

    if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
        if !url.trim().is_empty() {
            config.backend_url = url;
        }
    }

    config.backend_url = resolve_env_vars(&config.backend_url);
    config.token_path = PathBuf::from(resolve_env_vars(&config.token_path.to_string_lossy()));

    Ok(config)
}

/// The token store and backend described by `config`. Both share the store
/// so a 401 from the backend is visible to the session.
pub fn create_backend(config: &ClientConfig) -> (Arc<dyn Backend>, Arc<dyn TokenStore>) {
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_path));
    let backend = HttpBackend::new(&config.backend_url, config.timeout_secs, Arc::clone(&tokens));
    tracing::debug!(backend = %backend.base_url(), "backend configured");
    (Arc::new(backend), tokens)
}

/// `~/.config/eduplatform`, when `HOME` is set.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("eduplatform"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EDUPLATFORM_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_EDUPLATFORM_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_EDUPLATFORM_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_EDUPLATFORM_UNSET_VAR}x"), "x");
        assert_eq!(resolve_env_vars("no ${ closing"), "no ${ closing");
        std::env::remove_var("_EDUPLATFORM_TEST_VAR");
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        std::env::set_var("_EDUPLATFORM_SELF_REF", "a${_EDUPLATFORM_SELF_REF}b");
        assert_eq!(
            resolve_env_vars("<${_EDUPLATFORM_SELF_REF}>"),
            "<a${_EDUPLATFORM_SELF_REF}b>"
        );
        std::env::remove_var("_EDUPLATFORM_SELF_REF");
    }

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.backend_url, "http://localhost:8001");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.forum_page_size, 50);
        assert_eq!(config.default_num_questions, 5);
        assert_eq!(config.default_difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn starter_config_parses_to_defaults() {
        let config: ClientConfig = toml::from_str(STARTER_CONFIG).unwrap();
        let defaults = ClientConfig::default();
        assert_eq!(config.backend_url, defaults.backend_url);
        assert_eq!(config.forum_page_size, defaults.forum_page_size);
        assert_eq!(config.default_difficulty, defaults.default_difficulty);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eduplatform.toml");
        std::fs::write(
            &path,
            "timeout_secs = 5\ndefault_difficulty = \"Advanced\"\ntoken_path = \"/tmp/tok.json\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.default_difficulty, Difficulty::Advanced);
        assert_eq!(config.token_path, PathBuf::from("/tmp/tok.json"));
        assert_eq!(config.forum_page_size, 50);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_difficulty_is_rejected() {
        let err = toml::from_str::<ClientConfig>("default_difficulty = \"expert\"").unwrap_err();
        assert!(err.to_string().contains("unknown difficulty"));
    }
}
