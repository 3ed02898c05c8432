//! Feedback analysis
//!
//! Each user feedback item is distilled into a structured
//! (sentiment, type, dimension, deviation) record. The model does this
//! when available; a bilingual keyword fallback produces the same shape
//! with lower fidelity when it is not, so ingestion never blocks on the
//! model being up.

use regex::Regex;
use serde::Deserialize;

use repoflow_store::{Dimension, FeedbackAnalysis, FeedbackType, Sentiment};

use crate::parse::extract_json_block;

/// Prompt for the model-based analysis
pub fn analysis_prompt(feedback: &str) -> String {
    format!(
        "A user left feedback on an automated quality score. Classify it.\n\n\
         Feedback:\n{feedback}\n\n\
         Respond with a fenced JSON object and nothing else:\n\
         ```json\n\
         {{\n\
           \"sentiment\": \"positive|negative|neutral\",\n\
           \"feedback_type\": \"too_harsh|too_lenient|missed_issue|good_feedback|unclear|other\",\n\
           \"dimension\": \"format|content|clarity|actionability|overall\",\n\
           \"score_deviation\": <signed integer: how many points higher (positive) or lower \
         (negative) the user thinks the score should be; 0 if unstated>,\n\
           \"identified_issue\": \"...\",\n\
           \"suggested_adjustment\": \"...\"\n\
         }}\n\
         ```",
        feedback = feedback
    )
}

/// Parse the model's analysis response
pub fn parse_analysis_output(text: &str) -> Option<FeedbackAnalysis> {
    #[derive(Deserialize)]
    struct Payload {
        sentiment: Sentiment,
        feedback_type: FeedbackType,
        dimension: Dimension,
        #[serde(default)]
        score_deviation: i64,
        #[serde(default)]
        identified_issue: String,
        #[serde(default)]
        suggested_adjustment: String,
    }
    let block = extract_json_block(text)?;
    let payload: Payload = serde_json::from_str(&block).ok()?;
    Some(FeedbackAnalysis {
        sentiment: payload.sentiment,
        feedback_type: payload.feedback_type,
        dimension: payload.dimension,
        score_deviation: payload.score_deviation.clamp(-100, 100),
        identified_issue: payload.identified_issue,
        suggested_adjustment: payload.suggested_adjustment,
    })
}

/// Keyword-based fallback analysis (English and Chinese)
pub fn analyze_with_rules(feedback: &str) -> FeedbackAnalysis {
    let lower = feedback.to_lowercase();

    let feedback_type = detect_type(&lower);
    let sentiment = match feedback_type {
        FeedbackType::GoodFeedback => Sentiment::Positive,
        FeedbackType::Other => detect_sentiment(&lower),
        _ => Sentiment::Negative,
    };
    let dimension = detect_dimension(&lower);
    let score_deviation = detect_deviation(&lower, feedback_type);

    let identified_issue = match feedback_type {
        FeedbackType::TooHarsh => format!("users report the {} score runs too low", dimension),
        FeedbackType::TooLenient => format!("users report the {} score runs too high", dimension),
        FeedbackType::MissedIssue => "the scorer overlooked a real problem".to_string(),
        FeedbackType::Unclear => "score feedback is hard to understand".to_string(),
        FeedbackType::GoodFeedback => String::new(),
        FeedbackType::Other => String::new(),
    };
    let suggested_adjustment = match feedback_type {
        FeedbackType::TooHarsh => format!("loosen {} expectations", dimension),
        FeedbackType::TooLenient => format!("tighten {} expectations", dimension),
        FeedbackType::MissedIssue => "widen the checks for missed problems".to_string(),
        FeedbackType::Unclear => "make per-dimension feedback more concrete".to_string(),
        _ => String::new(),
    };

    FeedbackAnalysis {
        sentiment,
        feedback_type,
        dimension,
        score_deviation,
        identified_issue,
        suggested_adjustment,
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

fn detect_type(lower: &str) -> FeedbackType {
    if contains_any(
        lower,
        &["too strict", "too harsh", "too low", "should be higher", "太严", "太嚴", "苛刻", "太低"],
    ) {
        FeedbackType::TooHarsh
    } else if contains_any(
        lower,
        &["too lenient", "too generous", "too high", "should be lower", "太宽松", "太寬鬆", "太高"],
    ) {
        FeedbackType::TooLenient
    } else if contains_any(lower, &["miss", "overlook", "didn't catch", "遗漏", "遺漏", "漏掉"]) {
        FeedbackType::MissedIssue
    } else if contains_any(lower, &["unclear", "confusing", "hard to understand", "不清楚", "看不懂"]) {
        FeedbackType::Unclear
    } else if contains_any(
        lower,
        &["good", "great", "accurate", "helpful", "agree", "spot on", "很好", "准确", "準確", "同意"],
    ) {
        FeedbackType::GoodFeedback
    } else {
        FeedbackType::Other
    }
}

fn detect_sentiment(lower: &str) -> Sentiment {
    if contains_any(lower, &["good", "great", "thanks", "helpful", "agree", "好", "谢", "謝"]) {
        Sentiment::Positive
    } else if contains_any(lower, &["bad", "wrong", "unfair", "disagree", "差", "错", "錯", "不公平"]) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn detect_dimension(lower: &str) -> Dimension {
    if contains_any(lower, &["format", "structure", "template", "格式"]) {
        Dimension::Format
    } else if contains_any(lower, &["content", "substance", "detail", "内容", "內容"]) {
        Dimension::Content
    } else if contains_any(lower, &["clarity", "readab", "清晰", "清楚"]) {
        Dimension::Clarity
    } else if contains_any(lower, &["actionab", "可操作", "可執行", "可执行"]) {
        Dimension::Actionability
    } else {
        Dimension::Overall
    }
}

fn detect_deviation(lower: &str, feedback_type: FeedbackType) -> i64 {
    let magnitude = Regex::new(r"[+-]?\s*(\d{1,3})")
        .ok()
        .and_then(|pattern| pattern.captures(lower))
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .map(|n| n.min(100));
    match (feedback_type, magnitude) {
        (FeedbackType::TooHarsh, Some(n)) => n,
        (FeedbackType::TooLenient, Some(n)) => -n,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_strict_with_magnitude() {
        let analysis = analyze_with_rules("too strict, +10");
        assert_eq!(analysis.feedback_type, FeedbackType::TooHarsh);
        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert_eq!(analysis.score_deviation, 10);
    }

    #[test]
    fn higher_by_n_reads_the_magnitude() {
        let analysis = analyze_with_rules("score should be higher by 5");
        assert_eq!(analysis.feedback_type, FeedbackType::TooHarsh);
        assert_eq!(analysis.score_deviation, 5);
    }

    #[test]
    fn lenient_deviation_is_negative() {
        let analysis = analyze_with_rules("way too generous, about 15 points too high");
        assert_eq!(analysis.feedback_type, FeedbackType::TooLenient);
        assert_eq!(analysis.score_deviation, -15);
    }

    #[test]
    fn dimension_detection() {
        assert_eq!(
            analyze_with_rules("the format score is too strict").dimension,
            Dimension::Format
        );
        assert_eq!(
            analyze_with_rules("內容 太低").dimension,
            Dimension::Content
        );
        assert_eq!(analyze_with_rules("too harsh overall").dimension, Dimension::Overall);
    }

    #[test]
    fn chinese_keywords_classify() {
        let analysis = analyze_with_rules("格式 太严 +8");
        assert_eq!(analysis.feedback_type, FeedbackType::TooHarsh);
        assert_eq!(analysis.dimension, Dimension::Format);
        assert_eq!(analysis.score_deviation, 8);
    }

    #[test]
    fn praise_is_good_feedback() {
        let analysis = analyze_with_rules("spot on, very helpful");
        assert_eq!(analysis.feedback_type, FeedbackType::GoodFeedback);
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.score_deviation, 0);
    }

    #[test]
    fn unknown_text_is_other_neutral() {
        let analysis = analyze_with_rules("interesting");
        assert_eq!(analysis.feedback_type, FeedbackType::Other);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn model_output_round_trips() {
        let text = r#"```json
{"sentiment": "negative", "feedback_type": "too_harsh", "dimension": "format",
 "score_deviation": 9, "identified_issue": "format graded too strictly",
 "suggested_adjustment": "loosen format expectations"}
```"#;
        let analysis = parse_analysis_output(text).unwrap();
        assert_eq!(analysis.feedback_type, FeedbackType::TooHarsh);
        assert_eq!(analysis.dimension, Dimension::Format);
        assert_eq!(analysis.score_deviation, 9);
    }

    #[test]
    fn malformed_model_output_is_none() {
        assert!(parse_analysis_output("no json here").is_none());
        assert!(parse_analysis_output(r#"{"sentiment": "angry"}"#).is_none());
    }
}
