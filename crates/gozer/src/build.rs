use crate::assets::{STATIC_DIR, copy_dir_recursive};
use crate::config::{DEFAULT_CONFIG_FILE, SiteConfig};
use crate::content::ContentRenderer;
use crate::error::{IoContext, Result};
use crate::feeds::generate_rss;
use crate::site::SiteBuilder;
use crate::sitemap::generate_sitemap;
use crate::templates::{PageBuilder, TEMPLATES_DIR, TemplateSet, clean_output_dir};
use chrono::Utc;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const OUTPUT_DIR: &str = "build";

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub root_dir: PathBuf,
    pub config_file: PathBuf,
    pub output_dir: PathBuf,
    pub include_drafts: bool,
    pub clean: bool,
}

impl BuildOptions {
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        let root_dir = root_dir.as_ref().to_path_buf();
        Self {
            output_dir: root_dir.join(OUTPUT_DIR),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            root_dir,
            include_drafts: false,
            clean: false,
        }
    }

    pub fn config_file(mut self, config_file: impl AsRef<Path>) -> Self {
        self.config_file = config_file.as_ref().to_path_buf();
        self
    }

    pub fn output_dir(mut self, output_dir: impl AsRef<Path>) -> Self {
        self.output_dir = output_dir.as_ref().to_path_buf();
        self
    }

    pub fn include_drafts(mut self, include: bool) -> Self {
        self.include_drafts = include;
        self
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    fn config_path(&self) -> PathBuf {
        self.root_dir.join(&self.config_file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub posts: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

pub fn build_site(options: &BuildOptions) -> Result<BuildSummary> {
    let start = Instant::now();

    if options.clean {
        clean_output_dir(&options.output_dir)?;
    }

    let templates = TemplateSet::load(&options.root_dir.join(TEMPLATES_DIR))?;
    let config = SiteConfig::load(&options.config_path())?;
    let site = SiteBuilder::new(&options.root_dir)
        .include_drafts(options.include_drafts)
        .build(&config)?;

    fs::create_dir_all(&options.output_dir)
        .io_context("creating directory", &options.output_dir)?;

    let content = ContentRenderer::new();
    let builder = PageBuilder::new(&site, &templates, &content, &options.output_dir, Utc::now());

    let render_start = Instant::now();
    let failed = site
        .pages
        .par_iter()
        .filter(|page| match builder.build(page) {
            Ok(_) => false,
            Err(error) => {
                warn!("Error processing {}: {error}", page.source_path.display());
                true
            }
        })
        .count();
    debug!(
        "Rendered {} pages in {} ms",
        site.pages.len() - failed,
        render_start.elapsed().as_millis()
    );

    let sitemap_start = Instant::now();
    match generate_sitemap(&site, &options.output_dir) {
        Ok(()) => debug!(
            "Generated sitemap in {} ms",
            sitemap_start.elapsed().as_millis()
        ),
        Err(error) => warn!("Error generating sitemap: {error}"),
    }

    let feed_start = Instant::now();
    match generate_rss(
        &site,
        config.description.as_deref(),
        &content,
        &options.output_dir,
    ) {
        Ok(()) => debug!("Generated feed in {} ms", feed_start.elapsed().as_millis()),
        Err(error) => warn!("Error generating feed: {error}"),
    }

    let static_dir = options.root_dir.join(STATIC_DIR);
    if static_dir.is_dir() {
        let copied = copy_dir_recursive(&static_dir, &options.output_dir)?;
        debug!("Copied {copied} static files from {}", static_dir.display());
    } else {
        debug!("No static directory at {}, skipping", static_dir.display());
    }

    let elapsed = start.elapsed();
    info!(
        "Built site containing {} pages in {} ms",
        site.pages.len(),
        elapsed.as_millis()
    );

    Ok(BuildSummary {
        pages: site.pages.len(),
        posts: site.posts.len(),
        failed,
        elapsed,
    })
}
