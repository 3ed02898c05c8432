//! Body transformations
//!
//! Two rewrites are applied to every replicated body, in order: image
//! re-hosting (URL substitution; the upload itself lives in the service)
//! and issue-reference qualification. Both are pure text operations here.

use regex::Regex;
use sha2::{Digest, Sha256};

/// Qualify bare `#n` tokens with the source repository
///
/// `#123` becomes `owner/repo#123`; already-qualified `owner/repo#123` and
/// URL fragments (`http://x#frag`) are untouched because the character
/// before their `#` is a word character or `/`.
pub fn rewrite_issue_refs(body: &str, source_repo: &str) -> String {
    let pattern = match Regex::new(r"(^|[^\w/])#(\d+)\b") {
        Ok(pattern) => pattern,
        Err(_) => return body.to_string(),
    };
    pattern
        .replace_all(body, |caps: &regex::Captures<'_>| {
            format!("{}{}#{}", &caps[1], source_repo, &caps[2])
        })
        .into_owned()
}

/// Image references found in a body, in order of first appearance
pub fn find_image_urls(body: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    let markdown = Regex::new(r"!\[[^\]]*\]\(([^)\s]+)(?:\s+[^)]*)?\)");
    let html = Regex::new(r#"<img[^>]*\bsrc\s*=\s*["']([^"']+)["']"#);
    for pattern in [markdown, html].into_iter().flatten() {
        for caps in pattern.captures_iter(body) {
            let url = caps[1].to_string();
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    urls
}

/// Whether a URL already lives on GitHub-owned hosting
pub fn is_github_hosted(url: &str) -> bool {
    let host = match url.split("://").nth(1) {
        Some(rest) => rest.split(['/', '?', '#']).next().unwrap_or(""),
        None => return false,
    };
    host == "github.com" || host == "githubusercontent.com" || host.ends_with(".githubusercontent.com")
}

/// Stable asset name for a re-hosted image: content-free, derived from the
/// source URL so retries land on the same path
pub fn stable_asset_name(url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let short = &digest[..16];
    match extension_of(url) {
        Some(ext) => format!("{}.{}", short, ext),
        None => short.to_string(),
    }
}

/// Raw-view URL for a path on a target's `assets` branch
pub fn asset_raw_url(target_repo: &str, path: &str) -> String {
    format!("https://github.com/{}/blob/assets/{}?raw=true", target_repo, path)
}

/// Whether a body carries image or attachment references
pub fn has_attachments(body: &str) -> bool {
    !find_image_urls(body).is_empty() || body.contains("github.com/user-attachments/")
}

fn extension_of(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_refs_are_qualified() {
        let body = "See #77 and owner/other#5, http://x#frag";
        assert_eq!(
            rewrite_issue_refs(body, "Acme/src"),
            "See Acme/src#77 and owner/other#5, http://x#frag"
        );
    }

    #[test]
    fn qualified_refs_are_untouched_even_with_same_number() {
        let body = "both #123 and owner/repo#123";
        assert_eq!(
            rewrite_issue_refs(body, "acme/src"),
            "both acme/src#123 and owner/repo#123"
        );
    }

    #[test]
    fn ref_at_start_of_body_is_rewritten() {
        assert_eq!(rewrite_issue_refs("#9 first", "acme/src"), "acme/src#9 first");
    }

    #[test]
    fn url_paths_are_untouched() {
        let body = "https://github.com/a/b/issues/7#issuecomment-1 and #7";
        assert_eq!(
            rewrite_issue_refs(body, "acme/src"),
            "https://github.com/a/b/issues/7#issuecomment-1 and acme/src#7"
        );
    }

    #[test]
    fn non_numeric_tokens_are_untouched() {
        let body = "#123abc stays, # 5 stays";
        assert_eq!(rewrite_issue_refs(body, "acme/src"), body);
    }

    #[test]
    fn finds_markdown_and_html_images() {
        let body = r#"intro ![shot](http://pics.example/a.png)
<img src="https://cdn.example/b.jpg" alt="b"> and ![again](http://pics.example/a.png)"#;
        assert_eq!(
            find_image_urls(body),
            vec![
                "http://pics.example/a.png".to_string(),
                "https://cdn.example/b.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn github_hosting_detection() {
        assert!(is_github_hosted("https://github.com/a/b/raw/x.png"));
        assert!(is_github_hosted("https://user-images.githubusercontent.com/1/x.png"));
        assert!(is_github_hosted("https://githubusercontent.com/x.png"));
        assert!(!is_github_hosted("https://cdn.example/x.png"));
        assert!(!is_github_hosted("not a url"));
    }

    #[test]
    fn stable_names_are_deterministic() {
        let a = stable_asset_name("http://pics.example/shot.PNG?v=2");
        let b = stable_asset_name("http://pics.example/shot.PNG?v=2");
        assert_eq!(a, b);
        assert!(a.ends_with(".png"));
        assert_ne!(a, stable_asset_name("http://pics.example/other.png"));
    }

    #[test]
    fn extension_fallback() {
        assert!(!stable_asset_name("http://pics.example/noext").contains('.'));
        assert!(!stable_asset_name("http://pics.example/weird.superlongext").contains('.'));
    }

    #[test]
    fn raw_url_shape() {
        assert_eq!(
            asset_raw_url("acme/os3", "images/abc.png"),
            "https://github.com/acme/os3/blob/assets/images/abc.png?raw=true"
        );
    }

    #[test]
    fn attachment_detection() {
        assert!(has_attachments("![x](http://a/b.png)"));
        assert!(has_attachments("see https://github.com/user-attachments/assets/abc"));
        assert!(!has_attachments("plain text #5"));
    }
}
