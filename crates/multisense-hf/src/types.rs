// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serde types for the Hugging Face Inference API.

use serde::{Deserialize, Serialize};

use multisense_core::error::MultisenseError;

/// Request body for the chat-completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ApiChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

/// A chat message in API wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiChatMessage {
    pub role: String,
    pub content: String,
}

/// Response body of the chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ApiChatMessage,
}

/// Error body returned by the Inference API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// Request body for the feature-extraction pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureExtractionRequest {
    pub inputs: String,
}

/// Normalize a feature-extraction response to a flat 1-D embedding.
///
/// The pipeline's output shape varies by model:
/// - 1-D array: already a pooled sentence embedding -- used as-is
/// - 2-D array: per-token embeddings -- mean-pooled across tokens
/// - 3-D array: batch of per-token embeddings -- first element, mean-pooled
pub fn normalize_embedding(value: &serde_json::Value) -> Result<Vec<f32>, MultisenseError> {
    let invalid = |detail: &str| MultisenseError::Embedding {
        message: format!("unexpected feature-extraction response: {detail}"),
        source: None,
    };

    let outer = value.as_array().ok_or_else(|| invalid("not an array"))?;
    if outer.is_empty() {
        return Err(invalid("empty array"));
    }

    // 3-D: take the first batch element.
    let matrix_or_vector = if outer[0].is_array()
        && outer[0]
            .as_array()
            .is_some_and(|inner| inner.first().is_some_and(|v| v.is_array()))
    {
        outer[0].as_array().unwrap_or(outer)
    } else {
        outer
    };

    // 2-D: mean-pool across token rows.
    if matrix_or_vector.first().is_some_and(|v| v.is_array()) {
        let rows: Vec<Vec<f32>> = matrix_or_vector
            .iter()
            .map(|row| {
                row.as_array()
                    .ok_or_else(|| invalid("ragged matrix"))?
                    .iter()
                    .map(|v| v.as_f64().map(|f| f as f32).ok_or_else(|| invalid("non-numeric value")))
                    .collect()
            })
            .collect::<Result<_, _>>()?;

        let dim = rows[0].len();
        if dim == 0 || rows.iter().any(|r| r.len() != dim) {
            return Err(invalid("inconsistent row lengths"));
        }

        let mut pooled = vec![0.0_f32; dim];
        for row in &rows {
            for (i, v) in row.iter().enumerate() {
                pooled[i] += v;
            }
        }
        let count = rows.len() as f32;
        for v in &mut pooled {
            *v /= count;
        }
        return Ok(pooled);
    }

    // 1-D: already flat.
    matrix_or_vector
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32).ok_or_else(|| invalid("non-numeric value")))
        .collect()
}

/// Extract transcript text from an ASR response.
///
/// Accepts `{"text": "..."}` objects or bare JSON strings.
pub fn extract_transcript(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

/// Extract a caption from an image-to-text response.
///
/// Accepts `[{"generated_text": "..."}]` arrays, bare `{"generated_text"}`
/// objects, or bare JSON strings.
pub fn extract_caption(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("generated_text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        serde_json::Value::Array(items) => items.first().and_then(extract_caption),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn normalize_1d_passthrough() {
        let value = json!([0.1, 0.2, 0.3]);
        let embedding = normalize_embedding(&value).unwrap();
        assert_eq!(embedding.len(), 3);
        assert!((embedding[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn normalize_2d_mean_pools() {
        let value = json!([[1.0, 2.0], [3.0, 4.0]]);
        let embedding = normalize_embedding(&value).unwrap();
        assert_eq!(embedding.len(), 2);
        assert!((embedding[0] - 2.0).abs() < 1e-6);
        assert!((embedding[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_3d_takes_first_then_pools() {
        let value = json!([[[1.0, 2.0], [3.0, 4.0]], [[9.0, 9.0], [9.0, 9.0]]]);
        let embedding = normalize_embedding(&value).unwrap();
        assert_eq!(embedding.len(), 2);
        assert!((embedding[0] - 2.0).abs() < 1e-6);
        assert!((embedding[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_rejects_non_array() {
        assert!(normalize_embedding(&json!("oops")).is_err());
        assert!(normalize_embedding(&json!({"a": 1})).is_err());
        assert!(normalize_embedding(&json!([])).is_err());
    }

    #[test]
    fn normalize_rejects_ragged_matrix() {
        let value = json!([[1.0, 2.0], [3.0]]);
        assert!(normalize_embedding(&value).is_err());
    }

    #[test]
    fn transcript_from_object_and_string() {
        assert_eq!(
            extract_transcript(&json!({"text": "hello there"})),
            Some("hello there".to_string())
        );
        assert_eq!(
            extract_transcript(&json!("bare transcript")),
            Some("bare transcript".to_string())
        );
        assert_eq!(extract_transcript(&json!([1, 2])), None);
    }

    #[test]
    fn caption_from_array_object_and_string() {
        assert_eq!(
            extract_caption(&json!([{"generated_text": "a dog on a beach"}])),
            Some("a dog on a beach".to_string())
        );
        assert_eq!(
            extract_caption(&json!({"generated_text": "a cat"})),
            Some("a cat".to_string())
        );
        assert_eq!(
            extract_caption(&json!("plain caption")),
            Some("plain caption".to_string())
        );
        assert_eq!(extract_caption(&json!([])), None);
    }
}
