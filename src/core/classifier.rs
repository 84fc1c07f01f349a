use crate::domain::model::{SafetyLevel, SafetyVerdict, Severity};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DANGER_PHRASES: &[&str] = &[
    "dizziness",
    "faint",
    "interaction",
    "alcohol",
    "bleed",
    "stroke",
    "emergency",
    "fatal",
    "call your doctor",
];

pub const DEFAULT_WARNING_PHRASES: &[&str] = &[
    "drowsy", "food", "milk", "sunlight", "caution", "avoid", "may cause",
];

// 第一版伺服器使用的關鍵字
pub const LEGACY_DANGER_PHRASES: &[&str] = &["expired", "recall"];
pub const LEGACY_WARNING_PHRASES: &[&str] = &["drowsiness", "dizziness"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub phrase: String,
    pub severity: Severity,
}

/// 片語 → 嚴重程度的有序表，片語一律以小寫保存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

impl KeywordTable {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|rule| !rule.phrase.trim().is_empty())
            .map(|rule| KeywordRule {
                phrase: rule.phrase.to_lowercase(),
                severity: rule.severity,
            })
            .collect();
        Self { rules }
    }

    pub fn from_phrases<S: AsRef<str>>(danger: &[S], warning: &[S]) -> Self {
        let danger = danger.iter().map(|p| KeywordRule {
            phrase: p.as_ref().to_string(),
            severity: Severity::Danger,
        });
        let warning = warning.iter().map(|p| KeywordRule {
            phrase: p.as_ref().to_string(),
            severity: Severity::Warning,
        });
        Self::new(danger.chain(warning).collect())
    }

    pub fn legacy() -> Self {
        Self::from_phrases(LEGACY_DANGER_PHRASES, LEGACY_WARNING_PHRASES)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn phrases(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(move |rule| rule.severity == severity)
            .map(|rule| rule.phrase.as_str())
    }

    fn first_match(&self, haystack: &str, severity: Severity) -> Option<&str> {
        self.phrases(severity).find(|phrase| haystack.contains(phrase))
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::from_phrases(DEFAULT_DANGER_PHRASES, DEFAULT_WARNING_PHRASES)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictTitles {
    pub high_risk: String,
    pub caution: String,
    pub safe: String,
}

impl Default for VerdictTitles {
    fn default() -> Self {
        Self {
            high_risk: "High Risk Warning".to_string(),
            caution: "Use With Caution".to_string(),
            // 沒有命中任何關鍵字不代表已證明安全
            safe: "No Known Warnings Found".to_string(),
        }
    }
}

impl VerdictTitles {
    pub fn legacy() -> Self {
        Self {
            high_risk: "WARNING: Label mentions 'expired' or 'recall'. Do not use.".to_string(),
            caution: "Caution: This medication may cause drowsiness. Do not drive.".to_string(),
            safe: "This medication appears safe based on the scanned label.".to_string(),
        }
    }

    fn for_level(&self, level: SafetyLevel) -> &str {
        match level {
            SafetyLevel::HighRisk => &self.high_risk,
            SafetyLevel::Caution => &self.caution,
            SafetyLevel::Safe => &self.safe,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SafetyClassifier {
    table: KeywordTable,
    titles: VerdictTitles,
}

impl SafetyClassifier {
    pub fn new(table: KeywordTable, titles: VerdictTitles) -> Self {
        Self { table, titles }
    }

    pub fn legacy() -> Self {
        Self::new(KeywordTable::legacy(), VerdictTitles::legacy())
    }

    /// danger 優先於 warning，先命中者為準；都沒命中則為 safe
    pub fn classify(&self, text: &str) -> SafetyVerdict {
        let lowered = text.to_lowercase();

        let (level, matched) = if let Some(phrase) = self.table.first_match(&lowered, Severity::Danger) {
            (SafetyLevel::HighRisk, Some(phrase.to_string()))
        } else if let Some(phrase) = self.table.first_match(&lowered, Severity::Warning) {
            (SafetyLevel::Caution, Some(phrase.to_string()))
        } else {
            (SafetyLevel::Safe, None)
        };

        tracing::debug!(?level, matched = ?matched, "Classified label text");

        SafetyVerdict {
            level,
            title: self.titles.for_level(level).to_string(),
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SafetyClassifier {
        SafetyClassifier::default()
    }

    #[test]
    fn test_danger_overrides_warning() {
        let verdict = classifier().classify("Take with food. May cause drowsiness. Avoid alcohol.");
        assert_eq!(verdict.level, SafetyLevel::HighRisk);
        assert_eq!(verdict.matched.as_deref(), Some("alcohol"));
        assert!(!verdict.is_safe());
    }

    #[test]
    fn test_danger_match_is_case_insensitive_anywhere() {
        for text in [
            "STROKE",
            "risk of Bleeding",
            "if symptoms persist CALL YOUR DOCTOR immediately",
            "xxfaintxx",
        ] {
            assert_eq!(classifier().classify(text).level, SafetyLevel::HighRisk, "{}", text);
        }
    }

    #[test]
    fn test_warning_only_is_caution() {
        let verdict = classifier().classify("Do not take with MILK. Avoid direct sunlight.");
        assert_eq!(verdict.level, SafetyLevel::Caution);
        assert_eq!(verdict.matched.as_deref(), Some("milk"));
        assert!(verdict.is_safe());
    }

    #[test]
    fn test_unmatched_and_empty_default_to_safe() {
        // 沒有證據也會得到 safe，這是已知的預設行為
        for text in ["", "   \n  ", "Amoxicillin 500mg capsules"] {
            let verdict = classifier().classify(text);
            assert_eq!(verdict.level, SafetyLevel::Safe);
            assert_eq!(verdict.title, "No Known Warnings Found");
            assert!(verdict.matched.is_none());
        }
    }

    #[test]
    fn test_drowsiness_is_not_drowsy() {
        let verdict = classifier().classify("May make you feel drowsiness");
        // "may cause" 不在句中，"drowsy" 也不是 "drowsiness" 的子字串
        assert_eq!(verdict.level, SafetyLevel::Safe);
    }

    #[test]
    fn test_custom_table_is_lowercased() {
        let table = KeywordTable::from_phrases(&["Grapefruit"], &["Nausea"]);
        let classifier = SafetyClassifier::new(table, VerdictTitles::default());
        assert_eq!(classifier.classify("no GRAPEFRUIT juice").level, SafetyLevel::HighRisk);
        assert_eq!(classifier.classify("mild nausea").level, SafetyLevel::Caution);
        assert_eq!(classifier.classify("alcohol").level, SafetyLevel::Safe);
    }

    #[test]
    fn test_blank_phrases_are_dropped() {
        let table = KeywordTable::from_phrases(&["", "  "], &["food"]);
        assert_eq!(table.rules().len(), 1);
        let classifier = SafetyClassifier::new(table, VerdictTitles::default());
        assert_eq!(classifier.classify("anything").level, SafetyLevel::Safe);
    }

    #[test]
    fn test_legacy_classifier_messages() {
        let legacy = SafetyClassifier::legacy();
        let verdict = legacy.classify("EXPIRED 2021");
        assert!(!verdict.is_safe());
        assert!(verdict.title.starts_with("WARNING"));

        let verdict = legacy.classify("may cause Dizziness");
        assert!(verdict.is_safe());
        assert!(verdict.title.starts_with("Caution"));

        let verdict = legacy.classify("vitamin c");
        assert!(verdict.is_safe());
        assert_eq!(verdict.title, "This medication appears safe based on the scanned label.");
    }
}
