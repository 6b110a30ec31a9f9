//! Markdown body processing: strip presentation markup, split on heading
//! boundaries, assemble breadcrumb trails and deep links.
//!
//! The split covers four levels of depth: the document title (level 1,
//! from frontmatter) and `##`/`###`/`####` headings. Deeper headings are
//! not split points; their text flows into the enclosing section. For each
//! section, the prose before its first child heading becomes that node's
//! content.
//!
//! Stripped on the way through:
//! - callout container fences (`::callout` / `:::tip` ... `:::`), keeping
//!   the inner text;
//! - raw embedded HTML, block and inline;
//! - blockquote alert markers (`[!NOTE]` and friends), keeping the quoted
//!   prose.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use super::document::SourceDocument;
use crate::types::SearchNode;
use crate::utils::slugify;

/// Lines that are purely callout fences: `::name`, `:::name{attr}`, or a
/// bare closing `::` / `:::`. The fence line goes away, the wrapped text
/// stays.
static CALLOUT_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*:{2,}[^\n]*$").unwrap());

/// One heading-delimited slice of a document, before breadcrumb assembly.
struct Section {
    /// 1 for the document root, 2..=4 for heading sections.
    level: usize,
    title: String,
    content: String,
}

/// Flatten one document into its indexable nodes.
pub fn extract_nodes(document: &SourceDocument, route_prefix: &str) -> Vec<SearchNode> {
    let sections = split_sections(&document.title, &document.body);
    assemble(sections, route_prefix, &document.slug)
}

fn split_sections(title: &str, body: &str) -> Vec<Section> {
    let body = CALLOUT_FENCE.replace_all(body, "");
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_GFM;

    let mut sections = vec![Section {
        level: 1,
        title: title.to_string(),
        content: String::new(),
    }];
    // Heading text accumulates here while we are inside a split-point
    // heading; everything else accumulates on the last section.
    let mut heading: Option<(usize, String)> = None;

    for event in Parser::new_ext(&body, options) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                let level = level as usize;
                if level <= 4 {
                    // A body `#` heading sits directly under the document
                    // title, same as `##`.
                    heading = Some((level.max(2), String::new()));
                }
            }
            Event::End(TagEnd::Heading(_)) => match heading.take() {
                Some((level, text)) => sections.push(Section {
                    level,
                    title: collapse_whitespace(&text),
                    content: String::new(),
                }),
                // A deep heading that stayed inline still ends a block.
                None => content_of(&mut sections).push(' '),
            },
            Event::Text(text) | Event::Code(text) => match &mut heading {
                Some((_, buf)) => buf.push_str(&text),
                None => content_of(&mut sections).push_str(&text),
            },
            Event::SoftBreak | Event::HardBreak => match &mut heading {
                Some((_, buf)) => buf.push(' '),
                None => content_of(&mut sections).push(' '),
            },
            // Raw embedded markup is not prose.
            Event::Html(_) | Event::InlineHtml(_) => {}
            Event::End(end) if is_block_end(&end) => {
                if heading.is_none() {
                    content_of(&mut sections).push(' ');
                }
            }
            _ => {}
        }
    }

    sections
}

fn content_of(sections: &mut [Section]) -> &mut String {
    &mut sections
        .last_mut()
        .expect("the root section is always present")
        .content
}

fn is_block_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Paragraph
            | TagEnd::Item
            | TagEnd::CodeBlock
            | TagEnd::List(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::Table
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell
            | TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
    )
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn flat sections into nodes with breadcrumb trails and hrefs.
fn assemble(sections: Vec<Section>, route_prefix: &str, slug: &str) -> Vec<SearchNode> {
    let root_href = format!("{}/{}", route_prefix.trim_end_matches('/'), slug);
    let mut nodes = Vec::with_capacity(sections.len());
    let mut trail: Vec<(usize, String)> = Vec::new();

    for section in sections {
        while trail.last().is_some_and(|(level, _)| *level >= section.level) {
            trail.pop();
        }
        trail.push((section.level, section.title));
        let (level, title) = trail.last().expect("just pushed");

        let href = if *level == 1 {
            root_href.clone()
        } else {
            format!("{}/#{}", root_href, slugify(title))
        };
        let content = collapse_whitespace(&section.content);
        nodes.push(SearchNode {
            breadcrumbs: trail.iter().map(|(_, title)| title.clone()).collect(),
            content: (!content.is_empty()).then_some(content),
            href,
        });
    }

    nodes
}
