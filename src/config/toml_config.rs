use crate::core::classifier::{
    KeywordRule, KeywordTable, VerdictTitles, DEFAULT_DANGER_PHRASES, DEFAULT_WARNING_PHRASES,
};
use crate::core::extractor::ResponseFormat;
use crate::utils::error::{MedGuardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "medguard.toml";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const OPENFDA_BASE_URL: &str = "https://api.fda.gov";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// 整個服務的設定；啟動時載入一次，之後唯讀
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
    pub verification: VerificationConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: Option<u64>,
    /// 請求本體上限；base64 相片通常超過 axum 預設的 2 MB
    pub max_body_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_seconds: None,
            max_body_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    Gemini,
    None,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::None => "none",
        }
    }

    /// Anthropic 的 temperature 只接受 0.0 到 1.0
    pub fn max_temperature(&self) -> f32 {
        match self {
            ProviderKind::Anthropic => 1.0,
            _ => 2.0,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => GEMINI_DEFAULT_MODEL,
            _ => ANTHROPIC_DEFAULT_MODEL,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub response_format: ResponseFormat,
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(1000)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub enabled: bool,
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: ProviderKind::Gemini,
            api_key: None,
            model: None,
            base_url: None,
        }
    }
}

impl OcrConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

impl VerificationConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENFDA_BASE_URL)
    }
}

/// 關鍵字表可用 `danger`/`warning` 清單或 `[[classifier.rules]]` 指定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub danger: Option<Vec<String>>,
    pub warning: Option<Vec<String>>,
    pub rules: Option<Vec<KeywordRule>>,
    pub titles: Option<VerdictTitles>,
}

impl ClassifierConfig {
    pub fn keyword_table(&self) -> KeywordTable {
        if let Some(rules) = &self.rules {
            return KeywordTable::new(rules.clone());
        }

        let danger: Vec<String> = match &self.danger {
            Some(list) => list.clone(),
            None => DEFAULT_DANGER_PHRASES.iter().map(|p| p.to_string()).collect(),
        };
        let warning: Vec<String> = match &self.warning {
            Some(list) => list.clone(),
            None => DEFAULT_WARNING_PHRASES.iter().map(|p| p.to_string()).collect(),
        };
        KeywordTable::from_phrases(&danger, &warning)
    }

    pub fn titles(&self) -> VerdictTitles {
        self.titles.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MedGuardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MedGuardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有設定檔時，從環境變數組出預設配置
    pub fn from_env() -> Self {
        let anthropic_key = non_empty_env("ANTHROPIC_API_KEY");
        let gemini_key = non_empty_env("GEMINI_API_KEY");

        let mut config = Self::default();
        match (anthropic_key, &gemini_key) {
            (Some(key), _) => {
                config.llm.provider = ProviderKind::Anthropic;
                config.llm.api_key = Some(key);
            }
            (None, Some(key)) => {
                config.llm.provider = ProviderKind::Gemini;
                config.llm.api_key = Some(key.clone());
            }
            (None, None) => {
                config.llm.provider = ProviderKind::None;
            }
        }

        if let Some(key) = gemini_key {
            config.ocr.enabled = true;
            config.ocr.provider = ProviderKind::Gemini;
            config.ocr.api_key = Some(key);
        }

        if let Some(port) = non_empty_env("MEDGUARD_PORT").and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }

        config
    }

    /// 指定路徑必須存在；未指定時找預設檔，找不到就用環境變數
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => {
                tracing::debug!("No {} found, using environment defaults", DEFAULT_CONFIG_PATH);
                Ok(Self::from_env())
            }
        }
    }

    /// 替換環境變數 (例如 ${ANTHROPIC_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MedGuardError::ConfigError {
            message: format!("env pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds.unwrap_or(30))
    }

    pub fn max_body_bytes(&self) -> usize {
        self.server.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_range("server.port", self.server.port, 1, u16::MAX)?;
        if let Some(timeout) = self.server.request_timeout_seconds {
            validation::validate_range("server.request_timeout_seconds", timeout, 1, 600)?;
        }
        validation::validate_positive_number("server.max_body_bytes", self.max_body_bytes(), 1024)?;

        if self.llm.provider != ProviderKind::None {
            validation::validate_secret("llm.api_key", &self.llm.api_key)?;
            validation::validate_non_empty_string("llm.model", self.llm.model())?;
            if let Some(base_url) = &self.llm.base_url {
                validation::validate_url("llm.base_url", base_url)?;
            }
            validation::validate_positive_number("llm.max_tokens", self.llm.max_tokens() as usize, 1)?;
            validation::validate_range(
                "llm.temperature",
                self.llm.temperature(),
                0.0,
                self.llm.provider.max_temperature(),
            )?;
        }

        if self.ocr.enabled {
            if self.ocr.provider == ProviderKind::None {
                return Err(MedGuardError::InvalidConfigValueError {
                    field: "ocr.provider".to_string(),
                    value: "none".to_string(),
                    reason: "OCR is enabled but no provider is selected".to_string(),
                });
            }
            validation::validate_secret("ocr.api_key", &self.ocr.api_key)?;
            if let Some(base_url) = &self.ocr.base_url {
                validation::validate_url("ocr.base_url", base_url)?;
            }
        }

        if self.verification.enabled {
            validation::validate_url("verification.base_url", self.verification.base_url())?;
        }

        if self.classifier.keyword_table().rules().is_empty() {
            return Err(MedGuardError::ConfigValidationError {
                field: "classifier".to_string(),
                message: "keyword table has no phrases".to_string(),
            });
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
