//! Review prompt assembly

use repoflow_config::ReviewConfig;
use repoflow_github::{ChangedFile, PullDetails};

/// Marker appended when the diff exceeds its character budget
pub const TRUNCATION_MARKER: &str = "\n\n[diff truncated: character budget exceeded]";

/// Render changed files as a fenced, file-scoped diff within `budget` chars
pub fn render_diff(files: &[ChangedFile], budget: usize) -> String {
    let mut out = String::new();
    let mut truncated = false;
    for file in files {
        let mut section = format!(
            "### {} (+{} -{})\n",
            file.filename, file.additions, file.deletions
        );
        match &file.patch {
            Some(patch) => {
                section.push_str("```diff\n");
                section.push_str(patch);
                section.push_str("\n```\n\n");
            }
            None => section.push_str("(binary or too large, patch omitted)\n\n"),
        }
        if out.len() + section.len() > budget {
            truncated = true;
            break;
        }
        out.push_str(&section);
    }
    if truncated {
        out.push_str(TRUNCATION_MARKER);
    }
    out
}

/// Build the full review prompt
///
/// The wording is ours; the contract is the content: PR metadata, the
/// file-scoped diff, the focus-area list, and the language directive.
pub fn build_prompt(repo: &str, pull: &PullDetails, diff: &str, config: &ReviewConfig) -> String {
    let focus = if config.focus_areas.is_empty() {
        "general code quality".to_string()
    } else {
        config.focus_areas.join(", ")
    };
    format!(
        "You are reviewing a pull request.\n\n\
         Repository: {repo}\n\
         PR #{number}: {title}\n\
         Author: {author}\n\n\
         Description:\n{body}\n\n\
         Focus areas: {focus}\n\
         Write the review in {language}.\n\n\
         Changed files:\n\n{diff}\n\
         Give a concise review: concrete findings first, each tied to a file, \
         then a short overall assessment. Do not restate the diff.",
        repo = repo,
        number = pull.number,
        title = pull.title,
        author = pull.author,
        body = if pull.body.is_empty() { "(no description)" } else { &pull.body },
        focus = focus,
        language = config.language,
        diff = diff,
    )
}

/// Attribution appended to every posted review
pub const ATTRIBUTION: &str = "\n\n---\n*Automated review by repoflow*";

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            filename: name.to_string(),
            additions: 3,
            deletions: 1,
            patch: patch.map(|p| p.to_string()),
        }
    }

    #[test]
    fn diff_is_file_scoped() {
        let diff = render_diff(
            &[file("src/a.rs", Some("@@ -1 +1 @@\n-x\n+y")), file("img.png", None)],
            10_000,
        );
        assert!(diff.contains("### src/a.rs (+3 -1)"));
        assert!(diff.contains("```diff"));
        assert!(diff.contains("patch omitted"));
        assert!(!diff.contains(TRUNCATION_MARKER.trim()));
    }

    #[test]
    fn over_budget_diff_is_truncated_with_marker() {
        let big = "x".repeat(500);
        let files: Vec<ChangedFile> = (0..10)
            .map(|i| file(&format!("f{}.rs", i), Some(&big)))
            .collect();
        let diff = render_diff(&files, 1_200);
        assert!(diff.contains("### f0.rs"));
        assert!(!diff.contains("### f9.rs"));
        assert!(diff.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn prompt_carries_the_contract() {
        let pull = PullDetails {
            number: 42,
            title: "Add thing".to_string(),
            body: String::new(),
            author: "dev".to_string(),
            html_url: String::new(),
            draft: false,
        };
        let config = ReviewConfig {
            language: "zh-TW".to_string(),
            ..ReviewConfig::default()
        };
        let prompt = build_prompt("acme/foo", &pull, "### src/a.rs", &config);
        assert!(prompt.contains("PR #42: Add thing"));
        assert!(prompt.contains("Author: dev"));
        assert!(prompt.contains("(no description)"));
        assert!(prompt.contains("correctness, security, readability"));
        assert!(prompt.contains("Write the review in zh-TW."));
        assert!(prompt.contains("### src/a.rs"));
    }
}
