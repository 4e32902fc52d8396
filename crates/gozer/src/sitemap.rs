use crate::error::{IoContext, Result};
use crate::types::Site;
use crate::xml::escape;
use std::fs;
use std::path::Path;

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const SITEMAP_STYLESHEET_FILE: &str = "sitemap.xsl";

const SITEMAP_STYLESHEET: &str = include_str!("../assets/sitemap.xsl");

const SCHEMA_LOCATION: &str = "http://www.sitemaps.org/schemas/sitemap/0.9 \
    http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd \
    http://www.google.com/schemas/sitemap-image/1.1 \
    http://www.google.com/schemas/sitemap-image/1.1/sitemap-image.xsd";

pub fn generate_sitemap(site: &Site, output_dir: &Path) -> Result<()> {
    let mut urls = String::new();

    for page in &site.pages {
        urls.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
            escape(&page.permalink),
            page.date_modified.to_rfc3339()
        ));
    }

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><?xml-stylesheet type="text/xsl" href="/{}"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:image="http://www.google.com/schemas/sitemap-image/1.1" xsi:schemaLocation="{}">
{}</urlset>
"#,
        SITEMAP_STYLESHEET_FILE, SCHEMA_LOCATION, urls
    );

    let sitemap_path = output_dir.join(SITEMAP_FILE);
    fs::write(&sitemap_path, sitemap).io_context("writing", &sitemap_path)?;

    let stylesheet_path = output_dir.join(SITEMAP_STYLESHEET_FILE);
    fs::write(&stylesheet_path, SITEMAP_STYLESHEET).io_context("writing", &stylesheet_path)?;

    Ok(())
}
