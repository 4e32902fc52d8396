use crate::content::ContentRenderer;
use crate::error::{GozerError, IoContext, Result};
use crate::types::{GroupOrder, Page, Site};
use crate::xml::escape;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

pub const TEMPLATES_DIR: &str = "templates";

pub struct TemplateSet {
    tera: Tera,
}

impl TemplateSet {
    pub fn load(templates_dir: &Path) -> Result<Self> {
        if !templates_dir.is_dir() {
            return Err(GozerError::TemplatesNotFound {
                path: templates_dir.to_path_buf(),
            });
        }

        let pattern = templates_dir.join("**").join("*.html");
        let mut tera = Tera::new(&pattern.to_string_lossy())?;
        tera.set_escape_fn(escape);

        Ok(Self { tera })
    }

    pub fn from_raw(templates: &[(&str, &str)]) -> Result<Self> {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape);
        tera.add_raw_templates(templates.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|template| template == name)
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        if !self.contains(name) {
            return Err(GozerError::InvalidTemplate {
                name: name.to_string(),
            });
        }

        Ok(self.tera.render(name, context)?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SiteVars<'a> {
    url: &'a str,
    title: &'a str,
}

pub struct PageBuilder<'a> {
    site: &'a Site,
    templates: &'a TemplateSet,
    content: &'a ContentRenderer,
    output_dir: &'a Path,
    shared: Context,
}

impl<'a> PageBuilder<'a> {
    pub fn new(
        site: &'a Site,
        templates: &'a TemplateSet,
        content: &'a ContentRenderer,
        output_dir: &'a Path,
        now: DateTime<Utc>,
    ) -> Self {
        let mut shared = Context::new();
        shared.insert("Posts", &site.posts);
        shared.insert("Pages", &site.pages);
        shared.insert(
            "Site",
            &SiteVars {
                url: &site.url,
                title: &site.title,
            },
        );
        shared.insert(
            "PostsByYear",
            &site.group_posts("%Y", GroupOrder::NewestFirst),
        );
        shared.insert("Now", &now);

        Self {
            site,
            templates,
            content,
            output_dir,
            shared,
        }
    }

    pub fn output_path(&self, page: &Page) -> PathBuf {
        self.output_dir.join(&page.url_path).join("index.html")
    }

    pub fn build(&self, page: &Page) -> Result<PathBuf> {
        let body = self.content.render_body(&page.source_path)?;

        let dest = self.output_path(page);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).io_context("creating directory", parent)?;
        }

        let siblings = self.site.siblings(page);

        let mut context = self.shared.clone();
        context.insert("Page", page);
        context.insert("Title", &page.title);
        context.insert("Content", &body);
        context.insert("Prev", &siblings.prev);
        context.insert("Next", &siblings.next);

        let rendered = self.templates.render(&page.template, &context)?;
        fs::write(&dest, rendered).io_context("writing", &dest)?;

        Ok(dest)
    }
}

pub fn clean_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir).io_context("removing", output_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::site::SiteBuilder;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const NAV_TEMPLATE: &str = "<title>{{ Title }}</title>\
        {% if Prev %}<a rel=\"prev\" href=\"{{ Prev.Permalink }}\">{{ Prev.Title }}</a>{% endif %}\
        {% if Next %}<a rel=\"next\" href=\"{{ Next.Permalink }}\">{{ Next.Title }}</a>{% endif %}\
        <main>{{ Content | safe }}</main>\
        <footer>{{ Site.Title }} {{ Site.Url }} {{ Posts | length }}/{{ Pages | length }}</footer>\
        <time>{{ Now }}</time>";

    fn create_site(dir: &TempDir) -> Site {
        let content = dir.path().join("content");
        fs::create_dir_all(content.join("blog")).unwrap();
        fs::write(content.join("index.md"), "+++\ntitle = \"Home\"\n+++\n\nHey there").unwrap();
        fs::write(
            content.join("blog/2023-01-01-old.md"),
            "+++\ntitle = \"Old\"\n+++\n\nOld post",
        )
        .unwrap();
        fs::write(
            content.join("blog/2023-02-01-mid.md"),
            "+++\ntitle = \"Mid\"\n+++\n\nMid post",
        )
        .unwrap();
        fs::write(
            content.join("blog/2023-03-01-new.md"),
            "+++\ntitle = \"New\"\n+++\n\nNew post",
        )
        .unwrap();
        fs::write(
            content.join("odd.md"),
            "+++\ntitle = \"Odd\"\ntemplate = \"missing.html\"\n+++\n\nOdd",
        )
        .unwrap();

        let config = SiteConfig {
            url: "http://localhost:8080/".to_string(),
            title: "My site".to_string(),
            description: None,
        };
        SiteBuilder::new(dir.path()).build(&config).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn find<'s>(site: &'s Site, title: &str) -> &'s Page {
        site.pages.iter().find(|page| page.title == title).unwrap()
    }

    #[test]
    fn test_build_page_writes_index_html() {
        let dir = TempDir::new().unwrap();
        let site = create_site(&dir);
        let templates = TemplateSet::from_raw(&[("default.html", NAV_TEMPLATE)]).unwrap();
        let content = ContentRenderer::new();
        let output = dir.path().join("build");
        let builder = PageBuilder::new(&site, &templates, &content, &output, now());

        let written = builder.build(find(&site, "Home")).unwrap();
        assert_eq!(written, output.join("index.html"));

        let html = fs::read_to_string(written).unwrap();
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("<main><p>Hey there</p>\n</main>"));
        assert!(html.contains("My site http://localhost:8080/ 3/5"));
        assert!(html.contains("<time>2024-01-01T00:00:00Z</time>"));
    }

    #[test]
    fn test_build_page_prev_next() {
        let dir = TempDir::new().unwrap();
        let site = create_site(&dir);
        let templates = TemplateSet::from_raw(&[("default.html", NAV_TEMPLATE)]).unwrap();
        let content = ContentRenderer::new();
        let output = dir.path().join("build");
        let builder = PageBuilder::new(&site, &templates, &content, &output, now());

        let html = fs::read_to_string(builder.build(find(&site, "Mid")).unwrap()).unwrap();
        assert!(html.contains("<a rel=\"prev\" href=\"http://localhost:8080/blog/old/\">Old</a>"));
        assert!(html.contains("<a rel=\"next\" href=\"http://localhost:8080/blog/new/\">New</a>"));

        let html = fs::read_to_string(builder.build(find(&site, "New")).unwrap()).unwrap();
        assert!(html.contains("rel=\"prev\""));
        assert!(!html.contains("rel=\"next\""));

        let html = fs::read_to_string(builder.build(find(&site, "Old")).unwrap()).unwrap();
        assert!(!html.contains("rel=\"prev\""));
        assert!(html.contains("rel=\"next\""));
    }

    #[test]
    fn test_build_page_invalid_template() {
        let dir = TempDir::new().unwrap();
        let site = create_site(&dir);
        let templates = TemplateSet::from_raw(&[("default.html", NAV_TEMPLATE)]).unwrap();
        let content = ContentRenderer::new();
        let output = dir.path().join("build");
        let builder = PageBuilder::new(&site, &templates, &content, &output, now());

        let error = builder.build(find(&site, "Odd")).unwrap_err();
        assert!(matches!(error, GozerError::InvalidTemplate { ref name } if name == "missing.html"));
        assert!(!output.join("odd/index.html").exists());
    }

    #[test]
    fn test_build_page_escapes_title_but_not_content() {
        let dir = TempDir::new().unwrap();
        let content_dir = dir.path().join("content");
        fs::create_dir_all(&content_dir).unwrap();
        fs::write(
            content_dir.join("raw.html"),
            "+++\ntitle = \"A & B\"\n+++\n<b>bold</b>",
        )
        .unwrap();
        let config = SiteConfig {
            url: "http://localhost:8080".to_string(),
            title: String::new(),
            description: None,
        };
        let site = SiteBuilder::new(dir.path()).build(&config).unwrap();
        let templates = TemplateSet::from_raw(&[("default.html", NAV_TEMPLATE)]).unwrap();
        let content = ContentRenderer::new();
        let output = dir.path().join("build");
        let builder = PageBuilder::new(&site, &templates, &content, &output, now());

        let html = fs::read_to_string(builder.build(&site.pages[0]).unwrap()).unwrap();
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<main><b>bold</b></main>"));
    }

    #[test]
    fn test_load_templates_from_directory() {
        let dir = TempDir::new().unwrap();
        let templates_dir = dir.path().join(TEMPLATES_DIR);
        fs::create_dir_all(templates_dir.join("partials")).unwrap();
        fs::write(templates_dir.join("default.html"), "{% include \"partials/nav.html\" %}").unwrap();
        fs::write(templates_dir.join("partials/nav.html"), "<nav></nav>").unwrap();

        let templates = TemplateSet::load(&templates_dir).unwrap();
        assert!(templates.contains("default.html"));
        assert!(templates.contains("partials/nav.html"));
        assert!(!templates.contains("post.html"));
    }

    #[test]
    fn test_load_templates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = TemplateSet::load(&dir.path().join(TEMPLATES_DIR));
        assert!(matches!(result, Err(GozerError::TemplatesNotFound { .. })));
    }

    #[test]
    fn test_clean_output_dir() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("build");
        fs::create_dir_all(output.join("stale")).unwrap();

        clean_output_dir(&output).unwrap();
        assert!(!output.exists());
        clean_output_dir(&output).unwrap();
    }
}
