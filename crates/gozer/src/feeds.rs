use crate::content::ContentRenderer;
use crate::error::{IoContext, Result};
use crate::types::Site;
use crate::xml::escape;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use log::warn;
use std::fs;
use std::path::Path;

pub const FEED_FILE: &str = "feed.xml";

pub const FEED_ITEM_LIMIT: usize = 10;

const GENERATOR: &str = "Gozer";

pub fn generate_rss(
    site: &Site,
    description: Option<&str>,
    content: &ContentRenderer,
    output_dir: &Path,
) -> Result<()> {
    let mut items = String::new();
    for post in site.posts.iter().take(FEED_ITEM_LIMIT) {
        let body = match content.render_body(&post.source_path) {
            Ok(body) => body,
            Err(error) => {
                warn!(
                    "Error parsing content of {}: {error}",
                    post.source_path.display()
                );
                continue;
            }
        };

        let pub_date = post.date_published.map(rfc2822).unwrap_or_default();

        items.push_str(&format!(
            r#"    <item>
      <title>{}</title>
      <link>{}</link>
      <description>{}</description>
      <pubDate>{}</pubDate>
      <guid>{}</guid>
    </item>
"#,
            escape(&post.title),
            escape(&post.permalink),
            escape(&body),
            pub_date,
            escape(&post.permalink),
        ));
    }

    let last_build_date = site
        .posts
        .first()
        .and_then(|post| post.date_published)
        .map(|date| format!("    <lastBuildDate>{}</lastBuildDate>\n", rfc2822(date)))
        .unwrap_or_default();

    let rss = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <generator>{}</generator>
{}    <atom:link href="{}{}" rel="self" type="application/rss+xml"/>
{}  </channel>
</rss>
"#,
        escape(&site.title),
        escape(&site.url),
        escape(description.unwrap_or("")),
        GENERATOR,
        last_build_date,
        escape(&site.url),
        FEED_FILE,
        items
    );

    let path = output_dir.join(FEED_FILE);
    fs::write(&path, rss).io_context("writing", &path)?;

    Ok(())
}

fn rfc2822(date: NaiveDate) -> String {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .format("%a, %d %b %Y %H:%M:%S +0000")
        .to_string()
}
