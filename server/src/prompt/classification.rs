use derive_more::derive::Display;
use indoc::formatdoc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

// Models wrap the JSON in a markdown fence often enough that the parser has
// to accept both shapes. Interior-only capture, non-greedy.
static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").unwrap());

/// Business label for an email: work that needs attention vs. everything else.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Produtivo,
    Improdutivo,
}

/// Structured result decoded from the model completion. Wire keys are the
/// Portuguese ones the product's frontend expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAnalysis {
    #[serde(rename = "classificacao")]
    pub classification: Classification,
    #[serde(rename = "sugestao_resposta")]
    pub suggested_reply: String,
    #[serde(rename = "perguntas", default)]
    pub questions: Vec<String>,
    #[serde(rename = "datas", default)]
    pub dates: Vec<String>,
    #[serde(rename = "acoes", default)]
    pub actions: Vec<String>,
}

pub fn classification_prompt(email_text: &str) -> String {
    formatdoc! {r#"
        Analyze the text of an email and perform the following tasks:

        1. Classification: classify the email as "Produtivo" or "Improdutivo".
           - A "Produtivo" email concerns work, tasks, meetings, reports or other professional communication that requires attention.
           - An "Improdutivo" email is marketing, a newsletter, spam or a strictly personal, non-urgent matter.

        2. Suggested reply: write a short, professional reply appropriate to the context of the email.

        3. Information extraction (ONLY for "Produtivo" emails):
           - "perguntas": every explicit question asked in the email.
           - "datas": any dates, deadlines or time mentions (e.g. "tomorrow", "next Friday", "15/10/2025", "at 2pm").
           - "acoes": clear action items or requested tasks (e.g. "send the report", "review the document", "schedule the meeting").

        REQUIRED output format:
        Your answer MUST be a single valid JSON object with exactly the keys "classificacao", "sugestao_resposta", "perguntas", "datas" and "acoes". Do NOT include explanations, only the JSON.
        If the email is "Improdutivo", the extraction fields must be empty arrays.
        If nothing is found for a field, return an empty array [].

        Example output:
        {{
          "classificacao": "Produtivo",
          "sugestao_resposta": "Of course, I will review the document and send my feedback by tomorrow.",
          "perguntas": ["Could you review the attached document?"],
          "datas": ["tomorrow"],
          "acoes": ["review the attached document", "send the feedback"]
        }}

        The email text to analyze is between the dashes below.
        ---
        {email_text}
        ---"#}
}

/// Decode the model's free-text completion into an [`EmailAnalysis`].
///
/// Takes the interior of a ```json fence when one is present, otherwise the
/// whole trimmed completion, and attempts a strict decode of that candidate.
/// No other recovery is attempted; undecodable output surfaces as
/// [`AppError::InvalidAiOutput`] with the raw text kept for server-side logs.
pub fn parse_analysis(raw_text: &str) -> AppResult<EmailAnalysis> {
    let trimmed = raw_text.trim();
    let candidate = match RE_JSON_FENCE.captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    };

    let mut analysis = serde_json::from_str::<EmailAnalysis>(candidate)
        .map_err(|_| AppError::InvalidAiOutput(raw_text.to_string()))?;

    // Extraction fields only carry meaning for productive mail.
    if analysis.classification == Classification::Improdutivo {
        analysis.questions.clear();
        analysis.dates.clear();
        analysis.actions.clear();
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_PRODUCTIVE: &str = r#"{
        "classificacao": "Produtivo",
        "sugestao_resposta": "I will send the report by Friday.",
        "perguntas": ["Can you send the report?"],
        "datas": ["Friday"],
        "acoes": ["send the report"]
    }"#;

    #[test]
    fn test_prompt_mandates_the_five_keys() {
        let prompt = classification_prompt("some email");
        for key in [
            "classificacao",
            "sugestao_resposta",
            "perguntas",
            "datas",
            "acoes",
        ] {
            assert!(prompt.contains(key), "prompt is missing key {}", key);
        }
    }

    #[test]
    fn test_prompt_embeds_the_email_text() {
        let prompt = classification_prompt("Olá, podemos marcar a reunião para quinta?");
        assert!(prompt.contains("Olá, podemos marcar a reunião para quinta?"));
        assert!(prompt.contains("Produtivo"));
        assert!(prompt.contains("Improdutivo"));
    }

    #[test]
    fn test_parse_unfenced_json() {
        let analysis = parse_analysis(RAW_PRODUCTIVE).unwrap();
        assert_eq!(analysis.classification, Classification::Produtivo);
        assert_eq!(analysis.questions, vec!["Can you send the report?"]);
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        let fenced = format!("```json\n{}\n```", RAW_PRODUCTIVE);
        assert_eq!(
            parse_analysis(&fenced).unwrap(),
            parse_analysis(RAW_PRODUCTIVE).unwrap()
        );
    }

    #[test]
    fn test_fence_surrounded_by_prose_is_still_found() {
        let chatty = format!(
            "Here is the analysis you asked for:\n```json\n{}\n```\nLet me know if you need anything else.",
            RAW_PRODUCTIVE
        );
        let analysis = parse_analysis(&chatty).unwrap();
        assert_eq!(analysis.classification, Classification::Produtivo);
    }

    #[test]
    fn test_non_json_output_is_invalid() {
        let result = parse_analysis("Sorry, I cannot help with that.");
        assert!(matches!(result, Err(AppError::InvalidAiOutput(_))));
    }

    #[test]
    fn test_truncated_json_is_invalid_without_recovery() {
        let result = parse_analysis(r#"{"classificacao": "Produtivo", "sugestao_resposta": "ok"#);
        assert!(matches!(result, Err(AppError::InvalidAiOutput(_))));
    }

    #[test]
    fn test_unproductive_extraction_fields_are_cleared() {
        let raw = r#"{
            "classificacao": "Improdutivo",
            "sugestao_resposta": "Thank you for your message.",
            "perguntas": ["Why am I here?"],
            "datas": ["today"],
            "acoes": ["unsubscribe"]
        }"#;
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.classification, Classification::Improdutivo);
        assert!(analysis.questions.is_empty());
        assert!(analysis.dates.is_empty());
        assert!(analysis.actions.is_empty());
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let raw = r#"{"classificacao": "Improdutivo", "sugestao_resposta": "Thanks."}"#;
        let analysis = parse_analysis(raw).unwrap();
        assert!(analysis.questions.is_empty());
        assert!(analysis.dates.is_empty());
        assert!(analysis.actions.is_empty());
    }

    #[test]
    fn test_analysis_round_trips_through_json() {
        let analysis = EmailAnalysis {
            classification: Classification::Produtivo,
            suggested_reply: "On it.".to_string(),
            questions: vec!["When is the deadline?".to_string()],
            dates: vec!["15/10/2025".to_string()],
            actions: vec!["schedule the meeting".to_string()],
        };

        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains("\"classificacao\":\"Produtivo\""));
        assert!(json.contains("\"sugestao_resposta\""));

        let decoded: EmailAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, analysis);
    }
}
