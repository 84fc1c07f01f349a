use crate::domain::model::SpeechCue;

pub const SPEECH_RATE: f32 = 0.9;
const FALLBACK_TAG: &str = "en-US";

const LANGUAGE_TAGS: &[(&str, &str)] = &[
    ("english", "en-US"),
    ("spanish", "es-ES"),
    ("french", "fr-FR"),
    ("arabic", "ar-SA"),
    ("mandarin", "zh-CN"),
];

/// 語言名稱 → BCP 47 標籤，未知語言退回 en-US
pub fn language_tag(language: &str) -> &'static str {
    let wanted = language.trim().to_lowercase();
    LANGUAGE_TAGS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, tag)| *tag)
        .unwrap_or(FALLBACK_TAG)
}

pub fn speech_cue(title: &str, warning: &str, language: &str) -> SpeechCue {
    SpeechCue {
        lang: language_tag(language).to_string(),
        rate: SPEECH_RATE,
        text: format!("Attention. {}. {}", title, warning),
    }
}
