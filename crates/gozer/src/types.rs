use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::resolve;

pub const DEFAULT_TEMPLATE: &str = "default.html";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page {
    pub title: String,
    pub template: String,
    pub date_published: Option<NaiveDate>,
    pub date_modified: DateTime<Utc>,
    pub permalink: String,
    pub url_path: String,
    pub source_path: PathBuf,
    pub draft: bool,
    pub tags: Vec<String>,
}

impl Page {
    pub fn from_path(
        source_path: &Path,
        content_dir: &Path,
        site_url: &str,
        date_modified: DateTime<Utc>,
    ) -> Self {
        let (url_path, date_published) = resolve(source_path, content_dir);

        Self {
            title: String::new(),
            template: DEFAULT_TEMPLATE.to_string(),
            date_published,
            date_modified,
            permalink: format!("{site_url}{url_path}"),
            url_path,
            source_path: source_path.to_path_buf(),
            draft: false,
            tags: Vec::new(),
        }
    }

    /// Overrides the path-derived defaults with whatever the block declared.
    /// The publish date is not part of [`Frontmatter`] and stays pinned to
    /// the filename.
    pub fn apply_frontmatter(&mut self, frontmatter: Frontmatter) {
        if let Some(title) = frontmatter.title {
            self.title = title;
        }
        if let Some(template) = frontmatter.template {
            self.template = template;
        }
        if let Some(draft) = frontmatter.draft {
            self.draft = draft;
        }
        if let Some(tags) = frontmatter.tags {
            self.tags = tags;
        }
    }

    pub fn is_post(&self) -> bool {
        self.date_published.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

pub const FRONTMATTER_KEYS: &[&str] = &["title", "template", "draft", "tags", "date"];

#[derive(Debug, Clone)]
pub struct Site {
    pub title: String,
    pub url: String,
    pub root_dir: PathBuf,
    pub pages: Vec<Page>,
    pub posts: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostGroup {
    pub key: String,
    pub posts: Vec<Page>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Siblings<'a> {
    pub prev: Option<&'a Page>,
    pub next: Option<&'a Page>,
}
