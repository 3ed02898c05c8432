//! Schema bootstrap
//!
//! Idempotent DDL executed at startup. Uniqueness constraints here are the
//! idempotency mechanism for webhook re-delivery; do not relax them.

/// DDL statements, executed in order
pub const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS review_tasks (
        task_id        TEXT PRIMARY KEY,
        repo           TEXT NOT NULL,
        pr_number      INTEGER NOT NULL,
        pr_title       TEXT NOT NULL,
        pr_author      TEXT NOT NULL,
        pr_url         TEXT NOT NULL,
        status         TEXT NOT NULL,
        progress       INTEGER NOT NULL DEFAULT 0,
        message        TEXT NOT NULL DEFAULT '',
        review_content TEXT,
        error_message  TEXT,
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL,
        completed_at   TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_review_tasks_status ON review_tasks(status)",
    "CREATE INDEX IF NOT EXISTS idx_review_tasks_created ON review_tasks(created_at)",
    "CREATE TABLE IF NOT EXISTS copy_records (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        source_repo         TEXT NOT NULL,
        source_issue_number INTEGER NOT NULL,
        source_issue_url    TEXT NOT NULL DEFAULT '',
        target_repo         TEXT NOT NULL,
        target_issue_number INTEGER,
        target_issue_url    TEXT,
        labels_copied       TEXT NOT NULL DEFAULT '[]',
        images_reuploaded   TEXT NOT NULL DEFAULT '[]',
        status              TEXT NOT NULL,
        error_message       TEXT,
        created_at          TEXT NOT NULL,
        UNIQUE(source_repo, source_issue_number, target_repo)
    )",
    "CREATE INDEX IF NOT EXISTS idx_copy_records_status ON copy_records(status)",
    "CREATE INDEX IF NOT EXISTS idx_copy_records_source
        ON copy_records(source_repo, source_issue_number)",
    "CREATE TABLE IF NOT EXISTS comment_sync_records (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        source_comment_id   INTEGER NOT NULL,
        source_repo         TEXT NOT NULL,
        source_issue_number INTEGER NOT NULL,
        target_repo         TEXT NOT NULL,
        target_issue_number INTEGER NOT NULL,
        target_comment_id   INTEGER,
        status              TEXT NOT NULL,
        created_at          TEXT NOT NULL,
        UNIQUE(source_comment_id, target_repo, target_issue_number)
    )",
    "CREATE INDEX IF NOT EXISTS idx_comment_sync_source
        ON comment_sync_records(source_repo, source_issue_number)",
    "CREATE TABLE IF NOT EXISTS score_records (
        score_id              TEXT PRIMARY KEY,
        dedupe_key            TEXT NOT NULL UNIQUE,
        repo                  TEXT NOT NULL,
        issue_number          INTEGER NOT NULL,
        comment_id            INTEGER,
        content_type          TEXT NOT NULL,
        title                 TEXT NOT NULL,
        body                  TEXT NOT NULL,
        author                TEXT NOT NULL,
        issue_url             TEXT NOT NULL,
        format_score          INTEGER,
        format_feedback       TEXT,
        content_score         INTEGER,
        content_feedback      TEXT,
        clarity_score         INTEGER,
        clarity_feedback      TEXT,
        actionability_score   INTEGER,
        actionability_feedback TEXT,
        overall_score         INTEGER,
        suggestions           TEXT,
        status                TEXT NOT NULL,
        error_message         TEXT,
        user_feedback         TEXT,
        created_at            TEXT NOT NULL,
        completed_at          TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_score_records_status ON score_records(status)",
    "CREATE INDEX IF NOT EXISTS idx_score_records_repo ON score_records(repo, issue_number)",
    "CREATE INDEX IF NOT EXISTS idx_score_records_created ON score_records(created_at)",
    "CREATE TABLE IF NOT EXISTS feedback_events (
        id                   INTEGER PRIMARY KEY AUTOINCREMENT,
        score_id             TEXT NOT NULL,
        sentiment            TEXT NOT NULL,
        feedback_type        TEXT NOT NULL,
        dimension            TEXT NOT NULL,
        score_deviation      INTEGER NOT NULL,
        identified_issue     TEXT NOT NULL DEFAULT '',
        suggested_adjustment TEXT NOT NULL DEFAULT '',
        raw_text             TEXT NOT NULL,
        analyzer             TEXT NOT NULL,
        created_at           TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_feedback_events_created ON feedback_events(created_at)",
    "CREATE TABLE IF NOT EXISTS feedback_patterns (
        pattern_key          TEXT PRIMARY KEY,
        pattern_type         TEXT NOT NULL,
        dimension            TEXT NOT NULL,
        occurrence_count     INTEGER NOT NULL,
        deviation_sum        REAL NOT NULL,
        avg_score_deviation  REAL NOT NULL,
        example_feedbacks    TEXT NOT NULL DEFAULT '[]',
        identified_issue     TEXT NOT NULL DEFAULT '',
        suggested_adjustment TEXT NOT NULL DEFAULT '',
        last_seen            TEXT NOT NULL,
        created_at           TEXT NOT NULL,
        updated_at           TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_feedback_patterns_seen ON feedback_patterns(last_seen)",
    "CREATE TABLE IF NOT EXISTS feedback_snapshots (
        id                 INTEGER PRIMARY KEY AUTOINCREMENT,
        snapshot_date      TEXT NOT NULL,
        total_feedback     INTEGER NOT NULL,
        positive_count     INTEGER NOT NULL,
        negative_count     INTEGER NOT NULL,
        neutral_count      INTEGER NOT NULL,
        top_issues         TEXT NOT NULL DEFAULT '[]',
        learning_insights  TEXT NOT NULL DEFAULT '[]',
        prompt_adjustments TEXT NOT NULL DEFAULT '[]',
        created_at         TEXT NOT NULL
    )",
];
