use crate::config::AppConfig;
use crate::core::classifier::SafetyClassifier;
use crate::core::extractor::{Extractor, ResponseFormat};
use crate::core::{prompts, speech};
use crate::domain::model::{
    AnalysisResult, CompletionRequest, ImageInput, MedicationInfo, QuickCheck, ReportOutcome,
    SafetyReport,
};
use crate::domain::ports::{LabelLookup, LlmClient, OcrEngine};
use crate::utils::error::{MedGuardError, Result};
use std::sync::Arc;

pub const REPORT_FAILURE_MESSAGE: &str = "Safety check failed. Please consult a pharmacist.";
pub const FDA_SKIPPED: &str = "FDA check skipped: medication name not recognized.";
pub const FDA_NOT_FOUND: &str = "Not found in FDA database.";
pub const FDA_DISABLED: &str = "FDA verification is disabled.";

/// 一次請求的完整流程：分類、模型摘要、解析、FDA 查詢
pub struct LabelAnalyzer {
    classifier: SafetyClassifier,
    quick_checker: SafetyClassifier,
    extractor: Extractor,
    llm: Option<Arc<dyn LlmClient>>,
    lookup: Option<Arc<dyn LabelLookup>>,
    ocr: Option<Arc<dyn OcrEngine>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ScanResult {
    pub text: String,
    pub result: AnalysisResult,
}

impl LabelAnalyzer {
    pub fn new(classifier: SafetyClassifier, format: ResponseFormat) -> Self {
        Self {
            classifier,
            quick_checker: SafetyClassifier::legacy(),
            extractor: Extractor::new(format),
            llm: None,
            lookup: None,
            ocr: None,
            max_tokens: 1000,
            temperature: 0.0,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        llm: Option<Arc<dyn LlmClient>>,
        lookup: Option<Arc<dyn LabelLookup>>,
        ocr: Option<Arc<dyn OcrEngine>>,
    ) -> Self {
        let classifier = SafetyClassifier::new(
            config.classifier.keyword_table(),
            config.classifier.titles(),
        );
        let mut analyzer = Self::new(classifier, config.llm.response_format)
            .with_sampling(config.llm.max_tokens(), config.llm.temperature());
        analyzer.llm = llm;
        analyzer.lookup = lookup;
        analyzer.ocr = ocr;
        analyzer
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn LabelLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn llm_provider(&self) -> Option<&str> {
        self.llm.as_ref().map(|llm| llm.provider())
    }

    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some()
    }

    pub fn classifier(&self) -> &SafetyClassifier {
        &self.classifier
    }

    pub async fn analyze(&self, text: &str, language: &str) -> AnalysisResult {
        let verdict = self.classifier.classify(text);
        tracing::info!(
            level = ?verdict.level,
            matched = verdict.matched.as_deref().unwrap_or("-"),
            chars = text.len(),
            "Label classified"
        );

        let data = self.summarize(text, language).await;
        let fda = self.verify(&data).await;
        let speech = speech::speech_cue(&verdict.title, &data.warning, language);

        AnalysisResult {
            safe: verdict.is_safe(),
            color: verdict.color(),
            title: verdict.title,
            data,
            fda,
            speech,
        }
    }

    /// 模型呼叫或解析失敗時記錄錯誤並回傳預設值
    async fn summarize(&self, text: &str, language: &str) -> MedicationInfo {
        let Some(llm) = &self.llm else {
            tracing::debug!("No LLM configured, using placeholder medication info");
            return MedicationInfo::default();
        };

        let request = CompletionRequest {
            system: None,
            prompt: prompts::label_prompt(text, language, self.extractor.format()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = match llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("❌ {} call failed: {} ({:?})", llm.provider(), e, e.category());
                return MedicationInfo::default();
            }
        };

        match self.extractor.extract_medication(&response) {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("Could not parse {} response: {}", llm.provider(), e);
                MedicationInfo::default()
            }
        }
    }

    /// FDA 查詢不影響主要結果，任何失敗都降級為說明字串
    async fn verify(&self, info: &MedicationInfo) -> String {
        let Some(lookup) = &self.lookup else {
            return FDA_DISABLED.to_string();
        };
        if !info.has_known_drug() {
            return FDA_SKIPPED.to_string();
        }

        match lookup.find_label(&info.drug).await {
            Ok(Some(record)) => {
                let mut line = format!("FDA verified: {}", record.brand_name);
                if let Some(generic) = &record.generic_name {
                    line.push_str(&format!(" ({})", generic));
                }
                if let Some(manufacturer) = &record.manufacturer {
                    line.push_str(&format!(", by {}", manufacturer));
                }
                line
            }
            Ok(None) => FDA_NOT_FOUND.to_string(),
            Err(e) => {
                tracing::warn!("FDA lookup for '{}' failed: {}", info.drug, e);
                FDA_NOT_FOUND.to_string()
            }
        }
    }

    /// 第一版的簡易關鍵字檢查
    pub fn quick_check(&self, text: &str) -> QuickCheck {
        let verdict = self.quick_checker.classify(text);
        QuickCheck {
            safe: verdict.is_safe(),
            message: verdict.title,
        }
    }

    pub async fn check_interactions(&self, drugs: &[String], language: &str) -> ReportOutcome {
        let failed = || ReportOutcome::Failed {
            error: REPORT_FAILURE_MESSAGE.to_string(),
        };

        let Some(llm) = &self.llm else {
            tracing::warn!("Interaction check requested but no LLM is configured");
            return failed();
        };

        let request = CompletionRequest {
            system: Some(prompts::interaction_system_prompt(drugs, language)),
            prompt: prompts::interaction_user_prompt(drugs),
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };

        let report: Result<SafetyReport> = match llm.complete(&request).await {
            Ok(response) => self.extractor.extract_json(&response),
            Err(e) => Err(e),
        };

        match report {
            Ok(report) => {
                tracing::info!(
                    drugs = drugs.len(),
                    score = %report.safety_score,
                    "Interaction report generated"
                );
                ReportOutcome::Report(report)
            }
            Err(e) => {
                tracing::error!("❌ Interaction check failed: {}", e);
                failed()
            }
        }
    }

    /// OCR 失敗直接回報給使用者，不重試
    pub async fn scan(&self, image: &ImageInput, language: &str) -> Result<ScanResult> {
        let ocr = self.ocr.as_ref().ok_or_else(|| MedGuardError::UnavailableError {
            message: "Image scanning is not enabled on this server.".to_string(),
        })?;

        let text = ocr.recognize(image).await?;
        tracing::info!(chars = text.len(), "OCR completed");

        let result = self.analyze(&text, language).await;
        Ok(ScanResult { text, result })
    }
}
