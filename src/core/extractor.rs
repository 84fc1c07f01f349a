use crate::domain::model::MedicationInfo;
use crate::utils::error::{MedGuardError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// 模型回應的格式；兩種策略都回傳帶預設值的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Json,
    #[default]
    LineTagged,
}

/// 從第一個 `{` 到最後一個 `}` 切出 JSON 後解析
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl JsonFormat {
    pub fn slice(text: &str) -> Option<&str> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        (end > start).then(|| &text[start..=end])
    }

    pub fn extract<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        let body = Self::slice(text).ok_or_else(|| MedGuardError::ExtractionError {
            message: "no JSON object found in response".to_string(),
        })?;

        serde_json::from_str(body).map_err(|e| MedGuardError::ExtractionError {
            message: format!("invalid JSON object: {}", e),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Drug,
    Usage,
    Dosage,
    Warning,
}

const TAGS: &[(Field, &str)] = &[
    (Field::Drug, "DRUG"),
    (Field::Usage, "USAGE"),
    (Field::Dosage, "DOSAGE"),
    (Field::Warning, "WARN"),
];

/// `DRUG:` / `USAGE:` / `DOSAGE:` / `WARN:` 標記行
#[derive(Debug, Clone)]
pub struct LineTaggedFormat {
    patterns: Vec<(Field, Regex)>,
}

impl LineTaggedFormat {
    pub fn new() -> Self {
        let patterns = TAGS
            .iter()
            .map(|(field, tag)| {
                let pattern = format!(r"(?m)^[ \t]*{}:[ \t]*(.*)$", regex::escape(tag));
                (*field, Regex::new(&pattern).expect("tag pattern is a valid regex"))
            })
            .collect();
        Self { patterns }
    }

    /// 只取每個標記的第一次出現；缺少或空白的欄位保留預設值
    pub fn extract(&self, text: &str) -> MedicationInfo {
        let mut info = MedicationInfo::default();

        for (field, regex) in &self.patterns {
            let Some(value) = regex
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty())
            else {
                continue;
            };

            let slot = match field {
                Field::Drug => &mut info.drug,
                Field::Usage => &mut info.usage,
                Field::Dosage => &mut info.dosage,
                Field::Warning => &mut info.warning,
            };
            *slot = value.to_string();
        }

        info
    }
}

impl Default for LineTaggedFormat {
    fn default() -> Self {
        Self::new()
    }
}

/// 統一入口：依格式把模型回應轉成 MedicationInfo
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    format: ResponseFormat,
    json: JsonFormat,
    tagged: LineTaggedFormat,
}

impl Extractor {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            json: JsonFormat,
            tagged: LineTaggedFormat::new(),
        }
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    pub fn extract_medication(&self, text: &str) -> Result<MedicationInfo> {
        match self.format {
            ResponseFormat::Json => self.json.extract(text),
            ResponseFormat::LineTagged => Ok(self.tagged.extract(text)),
        }
    }

    pub fn extract_json<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        self.json.extract(text)
    }
}
