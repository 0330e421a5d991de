use reqwest::Url;
use std::env;
use std::error::Error;
use std::fmt;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful and intelligent AI assistant. \
     Use Google Search to find information when needed to provide accurate and up-to-date responses.";
const DEFAULT_WEB_SEARCH: bool = true;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingCredential,
    InvalidEndpoint { url: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(
                f,
                "{API_KEY_VAR} not found in environment variables. \
                 Export it in your shell or create a .env file containing \
                 {API_KEY_VAR}='your-api-key-here'. \
                 Keys are available at https://aistudio.google.com/app/apikey"
            ),
            Self::InvalidEndpoint { url, reason } => {
                write!(f, "Invalid Gemini endpoint '{url}': {reason}. Check GEMINI_BASE_URL.")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub endpoint: Url,
    pub system_instruction: String,
    pub web_search: bool,
    pub model_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub(crate) fn from_env_with(
        mut get_var: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = get_var(API_KEY_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingCredential)?;
        let model = non_blank(get_var("GEMINI_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base_url = non_blank(get_var("GEMINI_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let system_instruction = non_blank(get_var("SYSTEM_INSTRUCTION"))
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string());
        let web_search = parse_bool(get_var("GEMINI_WEB_SEARCH").as_deref(), DEFAULT_WEB_SEARCH);
        let model_timeout_secs = parse_positive_u64(get_var("MODEL_TIMEOUT_SECS").as_deref());
        let endpoint = build_endpoint(&api_base_url, &model, &api_key)?;

        Ok(Self {
            api_key,
            model,
            api_base_url,
            endpoint,
            system_instruction,
            web_search,
            model_timeout_secs,
        })
    }

    /// Endpoint without the query string, safe to show in logs and error messages.
    pub fn redacted_endpoint(&self) -> String {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.to_string()
    }

    pub fn masked_api_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

fn build_endpoint(base_url: &str, model: &str, api_key: &str) -> Result<Url, ConfigError> {
    let raw = format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    );
    Url::parse_with_params(&raw, &[("key", api_key)]).map_err(|err| {
        ConfigError::InvalidEndpoint {
            url: raw,
            reason: err.to_string(),
        }
    })
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive_u64(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
pub(crate) fn config_from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
    use std::collections::HashMap;

    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    Config::from_env_with(|key| vars.get(key).cloned())
}
