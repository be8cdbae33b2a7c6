/* Markdown rendering.

Turns assembled markdown into the JSON-serializable document the frontend
consumes: rendered HTML with self-linking heading anchors, a table of
contents over heading levels 2 and 3, the page title and any YAML front
matter. */

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;
use serde_json::{Map, Value};

use docsite_base::{DocsiteError, DocsiteResult};

/// A rendered markdown document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDoc {
    /// Rendered page body
    pub html: String,
    /// Nested list over heading levels 2 and 3
    pub toc_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub frontmatter: Map<String, Value>,
}

/// Render a markdown document to HTML.
///
/// Headings get a slug id and wrap their content in a self link. The title
/// comes from the `title` front matter key, falling back to the first
/// level-1 heading.
pub fn render_markdown(source: &str) -> DocsiteResult<RenderedDoc> {
    let (frontmatter, body) = split_frontmatter(source)?;

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let events: Vec<Event> = Parser::new_ext(body, options).collect();

    let mut out_events: Vec<Event> = Vec::with_capacity(events.len() + 16);
    let mut toc: Vec<(HeadingLevel, String, String)> = Vec::new();
    let mut first_h1: Option<String> = None;

    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading { level, .. }) => {
                let level = *level;
                let end = heading_end(&events, i, level);
                let text = heading_text(&events[i + 1..end]);
                let slug = slugify(&text);

                if level == HeadingLevel::H1 && first_h1.is_none() {
                    first_h1 = Some(text.clone());
                }
                if matches!(level, HeadingLevel::H2 | HeadingLevel::H3) {
                    toc.push((level, slug.clone(), text.clone()));
                }

                out_events.push(Event::Html(
                    format!("<{level} id=\"{slug}\"><a href=\"#{slug}\">").into(),
                ));
                out_events.extend(events[i + 1..end].iter().cloned());
                out_events.push(Event::Html(format!("</a></{level}>").into()));
                i = end + 1;
            }
            event => {
                out_events.push(event.clone());
                i += 1;
            }
        }
    }

    let mut html_out = String::new();
    html::push_html(&mut html_out, out_events.into_iter());

    let title = frontmatter
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or(first_h1);

    Ok(RenderedDoc {
        html: html_out,
        toc_html: toc_html(&toc),
        title,
        frontmatter,
    })
}

/// Split leading YAML front matter from the markdown body.
fn split_frontmatter(source: &str) -> DocsiteResult<(Map<String, Value>, &str)> {
    let Some(rest) = source.strip_prefix("---\n") else {
        return Ok((Map::new(), source));
    };
    let Some(end) = rest.find("\n---\n") else {
        return Ok((Map::new(), source));
    };
    let yaml = &rest[..end];
    let body = &rest[end + "\n---\n".len()..];

    let value: Value = serde_yaml::from_str(yaml)
        .map_err(|e| Box::new(DocsiteError::render(format!("invalid front matter: {e}"))))?;
    match value {
        Value::Object(map) => Ok((map, body)),
        Value::Null => Ok((Map::new(), body)),
        _ => Err(Box::new(DocsiteError::render(
            "front matter must be a mapping",
        ))),
    }
}

/// Index of the TagEnd event closing the heading that starts at `start`.
fn heading_end(events: &[Event], start: usize, level: HeadingLevel) -> usize {
    events[start + 1..]
        .iter()
        .position(|e| matches!(e, Event::End(TagEnd::Heading(l)) if *l == level))
        .map(|pos| start + 1 + pos)
        .unwrap_or(events.len() - 1)
}

/// Plain text content of the events inside a heading.
fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Lowercase, alphanumerics kept, everything else collapsed to single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Nested unordered list: level-3 entries nest under the preceding level-2.
fn toc_html(entries: &[(HeadingLevel, String, String)]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul>\n");
    let mut open_sublist = false;
    for (level, slug, text) in entries {
        match level {
            HeadingLevel::H2 => {
                if open_sublist {
                    out.push_str("</ul></li>\n");
                    open_sublist = false;
                } else if out.len() > "<ul>\n".len() {
                    out.push_str("</li>\n");
                }
                out.push_str(&format!("<li><a href=\"#{slug}\">{text}</a>"));
            }
            HeadingLevel::H3 => {
                if !open_sublist {
                    out.push_str("<ul>\n");
                    open_sublist = true;
                }
                out.push_str(&format!("<li><a href=\"#{slug}\">{text}</a></li>\n"));
            }
            _ => {}
        }
    }
    if open_sublist {
        out.push_str("</ul></li>\n");
    } else {
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
    out
}
