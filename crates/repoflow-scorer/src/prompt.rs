//! Scoring prompt assembly

use repoflow_store::{ContentType, ScoreRecord};

/// Marker opening every posted score comment; also used to keep the worker
/// from scoring its own comments
pub const SCORE_COMMENT_HEADER: &str = "## Quality score";

/// Rubric text for one content type
fn rubric(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Bug => {
            "This is a BUG REPORT. Required elements: reproduction steps, expected vs actual \
             behaviour, environment (version, platform), severity or impact. Red flags: \
             \"doesn't work\" without detail, missing versions, screenshots standing in for text."
        }
        ContentType::Task => {
            "This is a TASK. Required elements: a clear goal, acceptance criteria, scope \
             boundaries, dependencies if any. Red flags: no definition of done, unbounded scope, \
             a title-only body."
        }
        ContentType::Feature => {
            "This is a FEATURE REQUEST. Required elements: motivation or problem statement, \
             proposed solution, alternatives considered, impact on existing behaviour. Red \
             flags: solution without a problem, no user story, duplicate of existing behaviour."
        }
        ContentType::TestResult => {
            "This is a TEST RESULT. Required elements: test environment, pass/fail summary, \
             detail for each failure, links to logs or artifacts. Red flags: totals without \
             failure detail, missing environment, stale results."
        }
        ContentType::Comment => {
            "This is an ISSUE COMMENT. Judge it as a contribution to the thread: relevance to \
             the issue, new information or reasoning, constructive tone, actionable content. \
             Red flags: \"+1\" noise, restating the issue, unexplained disagreement."
        }
    }
}

/// Build the scoring prompt
///
/// The insight block, when present, is injected verbatim so recent
/// calibration feedback conditions the model.
pub fn build_score_prompt(
    record: &ScoreRecord,
    insight_block: Option<&str>,
    language: &str,
) -> String {
    let mut prompt = format!(
        "You are scoring the quality of a GitHub contribution.\n\n\
         {rubric}\n\n\
         Repository: {repo}\n\
         Issue #{number}: {title}\n\
         Author: {author}\n\n\
         Content to score:\n\
         ----------------\n\
         {body}\n\
         ----------------\n",
        rubric = rubric(record.content_type),
        repo = record.repo,
        number = record.issue_number,
        title = record.title,
        author = record.author,
        body = if record.body.is_empty() { "(empty)" } else { &record.body },
    );

    if let Some(block) = insight_block {
        prompt.push_str("\n");
        prompt.push_str(block);
        prompt.push_str(
            "\nTreat these user-reported calibration signals as guidance, especially the \
             per-dimension deviations.\n",
        );
    }

    prompt.push_str(&format!(
        "\nWrite all feedback text in {language}.\n\n{format_instruction}",
        language = language,
        format_instruction = json_format_instruction(),
    ));
    prompt
}

/// The required output shape
pub fn json_format_instruction() -> &'static str {
    "Respond with a fenced JSON object and nothing else:\n\
     ```json\n\
     {\n\
       \"format\": {\"score\": 0-100, \"feedback\": \"...\"},\n\
       \"content\": {\"score\": 0-100, \"feedback\": \"...\"},\n\
       \"clarity\": {\"score\": 0-100, \"feedback\": \"...\"},\n\
       \"actionability\": {\"score\": 0-100, \"feedback\": \"...\"},\n\
       \"overall_score\": 0-100,\n\
       \"suggestions\": \"...\"\n\
     }\n\
     ```"
}

/// Stricter reprompt used after a parse failure
pub fn strict_reprompt(original_prompt: &str) -> String {
    format!(
        "{}\n\nYour previous reply could not be parsed. Respond with ONLY the JSON object, \
         no prose, no markdown outside the fence.",
        original_prompt
    )
}

/// Render the posted score comment
pub fn format_score_comment(record: &ScoreRecord, result: &repoflow_store::ScoreResult) -> String {
    format!(
        "{header} ({content_type})\n\n\
         | Dimension | Score | Feedback |\n\
         |-----------|-------|----------|\n\
         | Format | {format_score} | {format_feedback} |\n\
         | Content | {content_score} | {content_feedback} |\n\
         | Clarity | {clarity_score} | {clarity_feedback} |\n\
         | Actionability | {actionability_score} | {actionability_feedback} |\n\n\
         **Overall: {overall}/100**\n\n\
         **Suggestions:** {suggestions}\n\n\
         ---\n\
         *Automated score by repoflow. Reply via the feedback API to help calibrate future scores.*",
        header = SCORE_COMMENT_HEADER,
        content_type = record.content_type,
        format_score = result.format_score,
        format_feedback = cell(&result.format_feedback),
        content_score = result.content_score,
        content_feedback = cell(&result.content_feedback),
        clarity_score = result.clarity_score,
        clarity_feedback = cell(&result.clarity_feedback),
        actionability_score = result.actionability_score,
        actionability_feedback = cell(&result.actionability_feedback),
        overall = result.overall_score,
        suggestions = result.suggestions,
    )
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
