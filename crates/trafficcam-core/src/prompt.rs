//! Fixed instructions and the per-image conversation.

use crate::llm::{ContentPart, Conversation, ExecutionSettings, ImageInput, ResponseSchema};
use serde_json::json;
use std::path::Path;

/// System instruction, identical for every request.
pub const SYSTEM_PROMPT: &str = "You are a traffic analyzer AI that monitors traffic camera images \
and determines the traffic congestion level. Heavy congestion is when there is very little room \
between cars and vehicles are braking. Medium congestion is when there are a lot of cars but they \
are not braking. Low congestion is when there are few cars on the road. In addition, determine \
whether the image was taken with a malfunctioning camera by looking for distorted images.";

/// Instruction sent alongside each image.
pub const USER_PROMPT: &str = "Analyze the traffic congestion level in this image and determine \
if the camera is malfunctioning. Reply with a JSON object with the fields isBroken (boolean), \
trafficCongestionLevel (one of \"low\", \"medium\", \"heavy\") and analysis (a short explanation).";

/// Build the conversation for one camera image.
///
/// The media type is taken from the file extension of `path`.
pub fn camera_conversation(image_bytes: &[u8], path: &Path) -> Conversation {
    Conversation {
        system: SYSTEM_PROMPT.to_string(),
        user: vec![
            ContentPart::Image(ImageInput::from_file_bytes(image_bytes, path)),
            ContentPart::Text(USER_PROMPT.to_string()),
        ],
    }
}

/// JSON schema describing a camera result reply.
pub fn camera_result_schema() -> ResponseSchema {
    ResponseSchema {
        name: "camera_result".to_string(),
        strict: true,
        schema: json!({
            "type": "object",
            "properties": {
                "isBroken": { "type": "boolean" },
                "trafficCongestionLevel": {
                    "type": "string",
                    "enum": ["low", "medium", "heavy"]
                },
                "analysis": { "type": "string" }
            },
            "required": ["isBroken", "trafficCongestionLevel", "analysis"],
            "additionalProperties": false
        }),
    }
}

/// Execution settings that request the camera result shape.
pub fn execution_settings(max_tokens: u32, temperature: f32) -> ExecutionSettings {
    ExecutionSettings {
        max_tokens,
        temperature,
        response_schema: Some(camera_result_schema()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_carries_image_then_instruction() {
        let conversation = camera_conversation(&[0xFF, 0xD8, 0xFF], Path::new("Images/cam.jpg"));
        assert_eq!(conversation.system, SYSTEM_PROMPT);
        assert_eq!(conversation.user.len(), 2);
        match &conversation.user[0] {
            ContentPart::Image(image) => assert_eq!(image.media_type, "image/jpeg"),
            other => panic!("expected image first, got {other:?}"),
        }
        assert!(matches!(&conversation.user[1], ContentPart::Text(t) if t == USER_PROMPT));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = camera_result_schema();
        let required = schema.schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        assert!(schema.strict);
    }

    #[test]
    fn test_schema_matches_reply_parser() {
        let sample = r#"{"isBroken": false, "trafficCongestionLevel": "medium", "analysis": "steady flow"}"#;
        let result = crate::reply::parse_camera_result(sample).unwrap();
        assert_eq!(result.congestion_level, "medium");
    }
}
