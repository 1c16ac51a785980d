use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ReportError;

/// Lifecycle of the most recent report request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Generating,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiReport {
    pub summary: String,
    pub key_insights: Vec<String>,
    pub recommendation: String,
    pub generated_at: NaiveDate,
}

/// The exact three-field shape the remote service must return
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReportPayload {
    summary: String,
    #[serde(rename = "keyInsights")]
    key_insights: Vec<String>,
    recommendation: String,
}

/// JSON schema of the report payload, in standard JSON Schema form
pub fn report_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "keyInsights": {
                "type": "array",
                "items": { "type": "string" }
            },
            "recommendation": { "type": "string" }
        },
        "required": ["summary", "keyInsights", "recommendation"],
        "additionalProperties": false
    })
}

/// Strictly decode provider text into a report stamped with `completed_on`
pub fn decode_report(text: &str, completed_on: NaiveDate) -> Result<AiReport, ReportError> {
    let text = strip_code_fence(text.trim());
    if text.is_empty() {
        return Err(ReportError::EmptyResponse);
    }

    let payload: ReportPayload = serde_json::from_str(text)
        .map_err(|e| ReportError::malformed(e.to_string()))?;

    if payload.summary.trim().is_empty() {
        return Err(ReportError::malformed("summary is blank"));
    }
    if payload.recommendation.trim().is_empty() {
        return Err(ReportError::malformed("recommendation is blank"));
    }
    if payload.key_insights.is_empty() {
        return Err(ReportError::malformed("keyInsights is empty"));
    }
    if payload.key_insights.iter().any(|i| i.trim().is_empty()) {
        return Err(ReportError::malformed("keyInsights contains a blank entry"));
    }

    Ok(AiReport {
        summary: payload.summary,
        key_insights: payload.key_insights,
        recommendation: payload.recommendation,
        generated_at: completed_on,
    })
}

// Some local models wrap JSON output in a markdown fence even in JSON mode
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn test_decode_valid_payload() {
        let text = r#"{"summary":"Strong month.","keyInsights":["a","b"],"recommendation":"Grow services."}"#;
        let report = decode_report(text, day()).unwrap();
        assert_eq!(report.key_insights, vec!["a", "b"]);
        assert_eq!(report.generated_at, day());
    }

    #[test]
    fn test_decode_rejects_extra_field() {
        let text = r#"{"summary":"s","keyInsights":["a"],"recommendation":"r","score":9}"#;
        assert!(matches!(
            decode_report(text, day()),
            Err(ReportError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        let text = r#"{"summary":"s","keyInsights":["a"]}"#;
        assert!(matches!(
            decode_report(text, day()),
            Err(ReportError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_type() {
        let text = r#"{"summary":"s","keyInsights":"a, b","recommendation":"r"}"#;
        assert!(decode_report(text, day()).is_err());
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(matches!(
            decode_report("Here is your report: great job!", day()),
            Err(ReportError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_decode_empty_text() {
        assert_eq!(decode_report("  \n", day()), Err(ReportError::EmptyResponse));
    }

    #[test]
    fn test_decode_rejects_blank_fields() {
        let text = r#"{"summary":" ","keyInsights":["a"],"recommendation":"r"}"#;
        assert!(decode_report(text, day()).is_err());

        let text = r#"{"summary":"s","keyInsights":[],"recommendation":"r"}"#;
        assert!(decode_report(text, day()).is_err());
    }

    #[test]
    fn test_decode_fenced_json() {
        let text = "```json\n{\"summary\":\"s\",\"keyInsights\":[\"a\"],\"recommendation\":\"r\"}\n```";
        assert!(decode_report(text, day()).is_ok());
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = report_schema();
        assert_eq!(schema["required"].as_array().map(|r| r.len()), Some(3));
    }
}
