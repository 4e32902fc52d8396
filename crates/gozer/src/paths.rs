use chrono::NaiveDate;
use std::path::Path;

pub const CONTENT_EXTENSIONS: &[&str] = &[".md", ".dj", ".html"];

const INDEX_STEM: &str = "index";

/// Derives the site-relative url path and optional publish date for a content
/// file. `content/blog/2023-11-23-here-we-are.md` becomes
/// `("blog/here-we-are/", Some(2023-11-23))`; the root index maps to `""`.
pub fn resolve(path: &Path, content_dir: &Path) -> (String, Option<NaiveDate>) {
    let relative = path.strip_prefix(content_dir).unwrap_or(path);
    let relative = relative.to_string_lossy().replace('\\', "/");

    let mut url_path = relative.trim_start_matches('/');
    for extension in CONTENT_EXTENSIONS {
        if let Some(stripped) = url_path.strip_suffix(extension) {
            url_path = stripped;
            break;
        }
    }

    let url_path = strip_index(url_path).trim_end_matches('/');

    let (parent, stem) = match url_path.rfind('/') {
        Some(position) => url_path.split_at(position + 1),
        None => ("", url_path),
    };

    if let Some((date, slug)) = parse_date_prefix(stem) {
        return (format!("{parent}{slug}/"), Some(date));
    }

    if url_path.is_empty() {
        (String::new(), None)
    } else {
        (format!("{url_path}/"), None)
    }
}

fn strip_index(path: &str) -> &str {
    if path == INDEX_STEM {
        ""
    } else {
        path.strip_suffix(INDEX_STEM)
            .filter(|parent| parent.ends_with('/'))
            .unwrap_or(path)
    }
}

pub fn parse_date_prefix(stem: &str) -> Option<(NaiveDate, &str)> {
    let bytes = stem.as_bytes();
    if bytes.len() <= 11 || bytes[4] != b'-' || bytes[7] != b'-' || bytes[10] != b'-' {
        return None;
    }

    let date = NaiveDate::parse_from_str(&stem[..10], "%Y-%m-%d").ok()?;
    Some((date, &stem[11..]))
}
