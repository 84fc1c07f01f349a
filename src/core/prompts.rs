use crate::core::extractor::ResponseFormat;

pub const DEFAULT_LANGUAGE: &str = "English";

/// 標籤翻譯／摘要的提示詞，輸出格式必須與 Extractor 的策略一致
pub fn label_prompt(text: &str, language: &str, format: ResponseFormat) -> String {
    let output_rules = match format {
        ResponseFormat::LineTagged => "\
Reply with exactly these four lines and nothing else:
DRUG: <medication name>
USAGE: <what it is used for>
DOSAGE: <how much and how often to take it>
WARN: <the most important warning>"
            .to_string(),
        ResponseFormat::Json => "\
Reply with a single JSON object and nothing else:
{\"drug\": \"...\", \"usage\": \"...\", \"dosage\": \"...\", \"warning\": \"...\"}"
            .to_string(),
    };

    format!(
        "You read text scanned from a medication label. The scan may contain OCR mistakes.\n\
         Summarize it in simple words a patient can follow, written in {language}.\n\
         If a value is not on the label, write \"Unknown\".\n\n\
         {output_rules}\n\n\
         Label text:\n\"\"\"\n{text}\n\"\"\"",
        language = language,
        output_rules = output_rules,
        text = text.trim(),
    )
}

/// 多種藥物交互作用檢查的系統提示詞
pub fn interaction_system_prompt(drugs: &[String], language: &str) -> String {
    format!(
        r#"You are a medication safety assistant helping patients understand their medication list.

Rules:
1. Explain everything at a grade 5 reading level without medical jargon.
2. Be kind but firm about safety.
3. Write the final answer in {language}.

Steps:
1. Identify the active ingredients of: {drugs}.
2. Check for drug-drug interactions and name the specific risk.
3. Check for timing conflicts between the medications.
4. Give an overall safety score of Low, Medium or High risk.

Answer with JSON only, in this shape:
{{
  "safetyScore": "Low | Medium | High",
  "summary": "Two short sentences about the risks.",
  "interactions": [
    {{ "drugs": ["Drug A", "Drug B"], "risk": "What might happen.", "severity": "High" }}
  ],
  "schedule_advice": "Simple timing advice."
}}"#,
        language = language,
        drugs = drugs.join(", "),
    )
}

pub fn interaction_user_prompt(drugs: &[String]) -> String {
    let list = serde_json::to_string(drugs).unwrap_or_else(|_| drugs.join(", "));
    format!("Analyze these drugs: {}", list)
}
