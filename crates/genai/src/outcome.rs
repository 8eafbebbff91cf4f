//! Typed decoding of provider responses.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::GenAiError;

/// What a generation or edit call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Decoded image bytes (PNG unless the provider says otherwise).
    Image(Vec<u8>),
    /// The provider answered successfully but returned no image payload.
    Empty,
}

/// Walk a `generateContent` response body and extract the first inline
/// image, if any.
///
/// The provider nests images under
/// `candidates[].content.parts[].inlineData.data` as base64; text-only
/// parts are skipped. Accepts both camelCase and snake_case field names
/// since SDK transcripts differ.
pub fn decode_outcome(body: &serde_json::Value) -> Result<GenerationOutcome, GenAiError> {
    let Some(candidates) = body.get("candidates").and_then(|c| c.as_array()) else {
        return Ok(GenerationOutcome::Empty);
    };

    for candidate in candidates {
        let Some(parts) = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
        else {
            continue;
        };

        for part in parts {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"));
            let Some(data) = inline.and_then(|i| i.get("data")).and_then(|d| d.as_str()) else {
                continue;
            };
            let bytes = BASE64
                .decode(data)
                .map_err(|e| GenAiError::Decode(format!("invalid base64 image data: {e}")))?;
            return Ok(GenerationOutcome::Image(bytes));
        }
    }

    Ok(GenerationOutcome::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn extracts_inline_image() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "here is your flyer" },
                        { "inlineData": { "mimeType": "image/png", "data": BASE64.encode(b"png!") } }
                    ]
                }
            }]
        });
        assert_eq!(
            decode_outcome(&body).unwrap(),
            GenerationOutcome::Image(b"png!".to_vec())
        );
    }

    #[test]
    fn accepts_snake_case_inline_data() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inline_data": { "mime_type": "image/png", "data": BASE64.encode(b"x") } }
                    ]
                }
            }]
        });
        assert_matches!(
            decode_outcome(&body).unwrap(),
            GenerationOutcome::Image(bytes) if bytes == b"x"
        );
    }

    #[test]
    fn text_only_response_is_empty() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "sorry, no image" }] } }]
        });
        assert_eq!(decode_outcome(&body).unwrap(), GenerationOutcome::Empty);
    }

    #[test]
    fn missing_candidates_is_empty() {
        assert_eq!(
            decode_outcome(&json!({})).unwrap(),
            GenerationOutcome::Empty
        );
    }

    #[test]
    fn corrupt_base64_is_a_decode_error() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "data": "!!not-base64!!" } }] }
            }]
        });
        assert_matches!(decode_outcome(&body), Err(GenAiError::Decode(_)));
    }
}
