use crate::error::{GozerError, IoContext, Result};
use crate::types::{FRONTMATTER_KEYS, Frontmatter};
use log::warn;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

pub const FRONTMATTER_DELIMITER: &[u8] = b"+++";

pub const FRONTMATTER_SCAN_LIMIT: u64 = 64 * 1024;

const HIGHLIGHT_THEME: &str = "base16-ocean.dark";

pub fn read_frontmatter(path: &Path) -> Result<Option<Frontmatter>> {
    let file = File::open(path).io_context("opening", path)?;
    let mut reader = BufReader::new(file.take(FRONTMATTER_SCAN_LIMIT));

    let mut line = Vec::new();
    reader
        .read_until(b'\n', &mut line)
        .io_context("reading", path)?;
    if !is_delimiter(&line) {
        return Ok(None);
    }

    let mut block = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .io_context("reading", path)?;
        if read == 0 {
            return Err(GozerError::MissingFrontmatterEnd {
                path: path.to_path_buf(),
            });
        }
        if is_delimiter(&line) {
            break;
        }
        block.extend_from_slice(&line);
    }

    let block = std::str::from_utf8(&block).map_err(|_| GozerError::FrontmatterEncoding {
        path: path.to_path_buf(),
    })?;

    decode_frontmatter(block, path).map(Some)
}

pub fn decode_frontmatter(block: &str, path: &Path) -> Result<Frontmatter> {
    let table: toml::Table = toml::from_str(block).map_err(|error| GozerError::TomlParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;

    for key in table.keys() {
        if !FRONTMATTER_KEYS.contains(&key.as_str()) {
            warn!("Unknown front-matter key in {}: {key:?}", path.display());
        }
    }

    toml::Value::Table(table)
        .try_into()
        .map_err(|error: toml::de::Error| GozerError::TomlParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })
}

pub fn strip_frontmatter<'a>(content: &'a str, path: &Path) -> Result<&'a str> {
    let Some(first_line_end) = content.find('\n') else {
        return Ok(if is_delimiter(content.as_bytes()) { "" } else { content });
    };

    if !is_delimiter(content[..first_line_end].as_bytes()) {
        return Ok(content);
    }

    let mut position = first_line_end + 1;
    for line in content[position..].split_inclusive('\n') {
        position += line.len();
        if is_delimiter(line.as_bytes()) {
            return Ok(&content[position..]);
        }
    }

    Err(GozerError::MissingFrontmatterEnd {
        path: path.to_path_buf(),
    })
}

fn is_delimiter(line: &[u8]) -> bool {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    line == FRONTMATTER_DELIMITER
}

pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .remove(HIGHLIGHT_THEME)
            .unwrap_or_default();

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    pub fn render(&self, content: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        let mut events = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let html = self.highlight(lang.as_deref(), &code);
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        pulldown_cmark::html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    fn highlight(&self, lang: Option<&str>, code: &str) -> String {
        let Some(lang) = lang else {
            return format!("<pre><code>{}</code></pre>\n", escape_html(code));
        };

        self.syntax_set
            .find_syntax_by_token(lang)
            .and_then(|syntax| {
                highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme).ok()
            })
            .unwrap_or_else(|| {
                format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>\n",
                    escape_html(lang),
                    escape_html(code)
                )
            })
    }
}

pub fn render_djot(content: &str) -> String {
    jotdown::html::render_to_string(jotdown::Parser::new(content))
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
