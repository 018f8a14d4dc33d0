//! Decoding model replies into [`CameraResult`].
//!
//! The response-format request sent with every call is only a hint, so the
//! reply is treated as untrusted text: JSON is located, keys are matched
//! loosely and every required field is checked.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::CameraResult;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Wire shape after key normalization (lowercase, alphanumerics only).
#[derive(Deserialize)]
struct RawCameraResult {
    #[serde(
        rename = "isbroken",
        alias = "broken",
        alias = "cameraisbroken",
        deserialize_with = "bool_like"
    )]
    is_broken: bool,

    #[serde(
        rename = "congestionlevel",
        alias = "trafficcongestionlevel",
        alias = "trafficcongesionlevel",
        alias = "level"
    )]
    congestion_level: String,

    #[serde(rename = "analysis")]
    analysis: String,
}

/// Parse a raw model reply into a [`CameraResult`].
///
/// Fails with [`AnalysisError::Parse`] when no JSON object can be found, a
/// required field is missing, or a field has the wrong shape.
pub fn parse_camera_result(text: &str) -> AnalysisResult<CameraResult> {
    let value = extract_json_object(text).ok_or_else(|| AnalysisError::Parse {
        message: format!("no JSON object in reply: {}", preview(text)),
    })?;

    let Value::Object(fields) = value else {
        return Err(AnalysisError::Parse {
            message: format!("reply is not a JSON object: {}", preview(text)),
        });
    };

    let normalized: Map<String, Value> = fields
        .into_iter()
        .map(|(key, value)| (normalize_key(&key), value))
        .collect();

    let raw: RawCameraResult =
        serde_json::from_value(Value::Object(normalized)).map_err(|e| AnalysisError::Parse {
            message: e.to_string(),
        })?;

    Ok(CameraResult {
        is_broken: raw.is_broken,
        congestion_level: raw.congestion_level.trim().to_string(),
        analysis: raw.analysis.trim().to_string(),
    })
}

/// `isBroken`, `is_broken`, `Is Broken` and `IS-BROKEN` all become `isbroken`.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locate a JSON object in free text.
///
/// Tries, in order: the whole text, a fenced code block, and the span from
/// the first `{` to the last `}`.
fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(block) = extract_fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&block) {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end]).ok()
}

/// Contents of the first ```json ... ``` (or bare ```) block.
fn extract_fenced_block(text: &str) -> Option<String> {
    for marker in ["```json", "```JSON", "```"] {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim().to_string());
            }
        }
    }
    None
}

/// Accepts JSON booleans, 0/1, and yes/no/true/false strings in any casing.
fn bool_like<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(format!("expected a boolean, found {n}"))),
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(true),
            "false" | "no" | "n" | "0" => Ok(false),
            other => Err(D::Error::custom(format!(
                "expected a boolean, found \"{other}\""
            ))),
        },
        other => Err(D::Error::custom(format!("expected a boolean, found {other}"))),
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CongestionLevel;

    #[test]
    fn test_parse_camel_case_with_misspelled_level() {
        let reply = r#"{"isBroken": true, "trafficCongesionLevel": "HEAVY", "analysis": "bumper to bumper"}"#;
        let result = parse_camera_result(reply).unwrap();
        assert!(result.is_broken);
        assert_eq!(result.congestion_level, "HEAVY");
        assert_eq!(result.level(), CongestionLevel::Heavy);
        assert_eq!(result.analysis, "bumper to bumper");
    }

    #[test]
    fn test_parse_snake_case_and_pascal_case() {
        let snake = r#"{"is_broken": false, "congestion_level": "low", "analysis": "empty road"}"#;
        let pascal = r#"{"IsBroken": false, "TrafficCongestionLevel": "Low", "Analysis": "empty road"}"#;

        let a = parse_camera_result(snake).unwrap();
        let b = parse_camera_result(pascal).unwrap();
        assert!(!a.is_broken && !b.is_broken);
        assert_eq!(a.level(), b.level());
        assert_eq!(a.analysis, b.analysis);
    }

    #[test]
    fn test_parse_boolean_like_values() {
        for (raw, expected) in [
            ("\"True\"", true),
            ("\"no\"", false),
            ("1", true),
            ("0", false),
            ("\"YES\"", true),
        ] {
            let reply = format!(
                r#"{{"isBroken": {raw}, "congestionLevel": "medium", "analysis": "ok"}}"#
            );
            let result = parse_camera_result(&reply).unwrap();
            assert_eq!(result.is_broken, expected, "input {raw}");
        }
    }

    #[test]
    fn test_parse_rejects_non_boolean_is_broken() {
        let reply = r#"{"isBroken": "maybe", "congestionLevel": "low", "analysis": "?"}"#;
        let err = parse_camera_result(reply).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
        assert!(err.to_string().contains("maybe"));

        let reply = r#"{"isBroken": 2, "congestionLevel": "low", "analysis": "?"}"#;
        assert!(parse_camera_result(reply).is_err());
    }

    #[test]
    fn test_parse_missing_field_fails() {
        let missing_analysis = r#"{"isBroken": false, "congestionLevel": "low"}"#;
        let missing_level = r#"{"isBroken": false, "analysis": "fine"}"#;
        let missing_broken = r#"{"congestionLevel": "low", "analysis": "fine"}"#;

        for reply in [missing_analysis, missing_level, missing_broken] {
            let err = parse_camera_result(reply).unwrap_err();
            assert!(err.to_string().contains("missing field"), "{err}");
        }
    }

    #[test]
    fn test_parse_wrong_shape_for_level() {
        let reply = r#"{"isBroken": false, "congestionLevel": 3, "analysis": "fine"}"#;
        assert!(parse_camera_result(reply).is_err());
    }

    #[test]
    fn test_parse_fenced_block() {
        let reply = "Here is my analysis:\n```json\n{\"isBroken\": false, \"congestionLevel\": \"Medium\", \"analysis\": \"many cars, moving\"}\n```";
        let result = parse_camera_result(reply).unwrap();
        assert_eq!(result.level(), CongestionLevel::Medium);
    }

    #[test]
    fn test_parse_embedded_object() {
        let reply = "Sure! {\"isBroken\": true, \"congestionLevel\": \"low\", \"analysis\": \"lens smeared\"} Hope this helps.";
        let result = parse_camera_result(reply).unwrap();
        assert!(result.is_broken);
        assert_eq!(result.analysis, "lens smeared");
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_camera_result("I cannot analyze this image.").unwrap_err();
        assert!(err.to_string().contains("no JSON object"));
    }

    #[test]
    fn test_parse_array_is_rejected() {
        let err = parse_camera_result("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("isBroken"), "isbroken");
        assert_eq!(normalize_key("is_broken"), "isbroken");
        assert_eq!(normalize_key("Traffic Congestion-Level"), "trafficcongestionlevel");
    }
}
