use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_DRUG: &str = "Unknown";
pub const DEFAULT_USAGE: &str = "See label.";
pub const DEFAULT_DOSAGE: &str = "As directed.";
pub const DEFAULT_WARNING: &str = "Consult doctor.";

/// 關鍵字表中每個片語的嚴重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Danger,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SafetyLevel {
    Safe,
    Caution,
    HighRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficColor {
    Red,
    Yellow,
    Green,
}

impl SafetyLevel {
    pub fn color(&self) -> TrafficColor {
        match self {
            SafetyLevel::HighRisk => TrafficColor::Red,
            SafetyLevel::Caution => TrafficColor::Yellow,
            SafetyLevel::Safe => TrafficColor::Green,
        }
    }

    /// caution 仍視為可使用，只是附帶提醒
    pub fn is_safe(&self) -> bool {
        !matches!(self, SafetyLevel::HighRisk)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub level: SafetyLevel,
    pub title: String,
    /// 觸發判定的片語；safe 時為 None
    pub matched: Option<String>,
}

impl SafetyVerdict {
    pub fn color(&self) -> TrafficColor {
        self.level.color()
    }

    pub fn is_safe(&self) -> bool {
        self.level.is_safe()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationInfo {
    #[serde(default = "default_drug", alias = "drugName")]
    pub drug: String,
    #[serde(default = "default_usage")]
    pub usage: String,
    #[serde(default = "default_dosage")]
    pub dosage: String,
    #[serde(default = "default_warning")]
    pub warning: String,
}

fn default_drug() -> String {
    DEFAULT_DRUG.to_string()
}

fn default_usage() -> String {
    DEFAULT_USAGE.to_string()
}

fn default_dosage() -> String {
    DEFAULT_DOSAGE.to_string()
}

fn default_warning() -> String {
    DEFAULT_WARNING.to_string()
}

impl Default for MedicationInfo {
    fn default() -> Self {
        Self {
            drug: default_drug(),
            usage: default_usage(),
            dosage: default_dosage(),
            warning: default_warning(),
        }
    }
}

impl MedicationInfo {
    pub fn has_known_drug(&self) -> bool {
        let name = self.drug.trim();
        !name.is_empty() && name != DEFAULT_DRUG
    }
}

/// 用戶端朗讀結果時使用的語音提示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechCue {
    pub lang: String,
    pub rate: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub safe: bool,
    pub color: TrafficColor,
    pub title: String,
    pub data: MedicationInfo,
    pub fda: String,
    pub speech: SpeechCue,
}

/// 第一版伺服器的簡易回應
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickCheck {
    pub safe: bool,
    pub message: String,
}

/// LLM 常以 `null` 表示「沒有」，視同欄位缺漏
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub drugs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReport {
    #[serde(rename = "safetyScore", default, deserialize_with = "null_as_default")]
    pub safety_score: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interactions: Vec<Interaction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule_advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportOutcome {
    Report(SafetyReport),
    Failed { error: String },
}

/// openFDA 查到的標籤摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub brand_name: String,
    pub generic_name: Option<String>,
    pub manufacturer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}
