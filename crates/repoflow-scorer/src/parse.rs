//! Model output parsing and validation
//!
//! The model is asked for a fenced JSON object but prose leaks in; the
//! extractor tolerates leading and trailing text. Scores are clamped, and a
//! wild overall is replaced by the dimension mean rather than trusted.

use serde::Deserialize;

use repoflow_store::ScoreResult;

use crate::error::{Result, ScorerError};

/// How far outside [min, max] of the dimensions the overall may stray
const OVERALL_TOLERANCE: i64 = 10;

#[derive(Debug, Deserialize)]
struct DimensionPayload {
    score: i64,
    #[serde(default)]
    feedback: String,
}

#[derive(Debug, Deserialize)]
struct ScorePayload {
    format: DimensionPayload,
    content: DimensionPayload,
    clarity: DimensionPayload,
    actionability: DimensionPayload,
    overall_score: i64,
    #[serde(default)]
    suggestions: String,
}

/// Extract the JSON object from model output
///
/// Prefers a ```json fence, then any ``` fence, then the outermost braces.
pub fn extract_json_block(text: &str) -> Option<String> {
    for fence in ["```json", "```"] {
        if let Some(start) = text.find(fence) {
            let inner = &text[start + fence.len()..];
            if let Some(end) = inner.find("```") {
                let candidate = inner[..end].trim();
                if candidate.starts_with('{') {
                    return Some(candidate.to_string());
                }
            }
        }
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(text[start..=end].to_string())
    } else {
        None
    }
}

/// Parse and validate one scoring response
pub fn parse_score_output(text: &str) -> Result<ScoreResult> {
    let block = extract_json_block(text)
        .ok_or_else(|| ScorerError::parse("no JSON object in model output"))?;
    let payload: ScorePayload = serde_json::from_str(&block)
        .map_err(|err| ScorerError::parse(format!("malformed score JSON: {}", err)))?;

    let format_score = payload.format.score.clamp(0, 100);
    let content_score = payload.content.score.clamp(0, 100);
    let clarity_score = payload.clarity.score.clamp(0, 100);
    let actionability_score = payload.actionability.score.clamp(0, 100);

    let dims = [format_score, content_score, clarity_score, actionability_score];
    let min = *dims.iter().min().unwrap_or(&0);
    let max = *dims.iter().max().unwrap_or(&100);
    let mut overall = payload.overall_score.clamp(0, 100);
    if overall < min - OVERALL_TOLERANCE || overall > max + OVERALL_TOLERANCE {
        // the model's aggregate is out of line with its own dimensions
        overall = (dims.iter().sum::<i64>() as f64 / dims.len() as f64).round() as i64;
    }

    Ok(ScoreResult {
        format_score,
        format_feedback: payload.format.feedback,
        content_score,
        content_feedback: payload.content.feedback,
        clarity_score,
        clarity_feedback: payload.clarity.feedback,
        actionability_score,
        actionability_feedback: payload.actionability.feedback,
        overall_score: overall,
        suggestions: payload.suggestions,
    })
}
