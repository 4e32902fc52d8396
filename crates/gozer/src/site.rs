use crate::config::SiteConfig;
use crate::error::{GozerError, IoContext, Result};
use crate::parsing::read_frontmatter;
use crate::types::{GroupOrder, Page, PostGroup, Siblings, Site};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

pub const CONTENT_DIR: &str = "content";

pub struct SiteBuilder {
    root_dir: PathBuf,
    include_drafts: bool,
}

impl SiteBuilder {
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
            include_drafts: false,
        }
    }

    pub fn include_drafts(mut self, include: bool) -> Self {
        self.include_drafts = include;
        self
    }

    pub fn build(&self, config: &SiteConfig) -> Result<Site> {
        let start = Instant::now();
        let content_dir = self.root_dir.join(CONTENT_DIR);
        let mut pages = Vec::new();
        let mut posts = Vec::new();

        for entry in WalkDir::new(&content_dir).sort_by_file_name() {
            let entry = entry.map_err(|error| GozerError::WalkDir {
                path: content_dir.clone(),
                message: error.to_string(),
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let page = match load_page(path, &content_dir, &config.url) {
                Ok(page) => page,
                Err(error) => {
                    warn!("Error reading {}: {error}", path.display());
                    continue;
                }
            };

            if page.draft && !self.include_drafts {
                debug!("Skipping draft {}", path.display());
                continue;
            }

            if page.is_post() {
                posts.push(page.clone());
            }
            pages.push(page);
        }

        sort_posts(&mut posts);

        debug!("Content walk took {:.2?}", start.elapsed());

        Ok(Site {
            title: config.title.clone(),
            url: config.url.clone(),
            root_dir: self.root_dir.clone(),
            pages,
            posts,
        })
    }
}

pub fn load_page(path: &Path, content_dir: &Path, site_url: &str) -> Result<Page> {
    let modified = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .io_context("reading metadata of", path)?;

    let mut page = Page::from_path(path, content_dir, site_url, DateTime::<Utc>::from(modified));

    if let Some(frontmatter) = read_frontmatter(path)? {
        page.apply_frontmatter(frontmatter);
    }

    Ok(page)
}

/// Newest first. The sort is stable, so posts published on the same day keep
/// their walk order.
pub fn sort_posts(posts: &mut [Page]) {
    posts.sort_by(|a, b| b.date_published.cmp(&a.date_published));
}

impl Site {
    /// Finds `page` in the post ordering. `next` is the newer neighbour and
    /// `prev` the older one.
    pub fn siblings(&self, page: &Page) -> Siblings<'_> {
        let Some(position) = self
            .posts
            .iter()
            .position(|post| post.source_path == page.source_path)
        else {
            return Siblings::default();
        };

        Siblings {
            prev: self.posts.get(position + 1),
            next: position
                .checked_sub(1)
                .and_then(|newer| self.posts.get(newer)),
        }
    }

    pub fn group_posts(&self, format: &str, order: GroupOrder) -> Vec<PostGroup> {
        let mut groups: BTreeMap<String, Vec<Page>> = BTreeMap::new();

        for post in &self.posts {
            if let Some(date) = post.date_published {
                groups
                    .entry(date.format(format).to_string())
                    .or_default()
                    .push(post.clone());
            }
        }

        groups
            .into_iter()
            .rev()
            .map(|(key, mut posts)| {
                if order == GroupOrder::OldestFirst {
                    posts.reverse();
                }
                PostGroup { key, posts }
            })
            .collect()
    }
}
