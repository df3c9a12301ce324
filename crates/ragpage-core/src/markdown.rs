//! Message text formatting
//!
//! Only `**bold**` is recognised. Spans are matched lazily within a single
//! line; there is no nesting and no escape for a literal `**`.

use std::sync::OnceLock;

use regex::Regex;

use crate::api::Source;

/// A run of message text with its emphasis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Strong(&'a str),
}

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

/// Split text into plain and bold runs. Empty plain runs are dropped.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in bold_pattern().captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Segment::Plain(&text[last..whole.start()]));
        }
        out.push(Segment::Strong(inner.as_str()));
        last = whole.end();
    }

    if last < text.len() {
        out.push(Segment::Plain(&text[last..]));
    }
    out
}

/// Render message text as HTML, wrapping bold runs in `<strong>`.
/// The rest of the text is passed through untouched.
pub fn to_html(text: &str) -> String {
    bold_pattern()
        .replace_all(text, "<strong>$1</strong>")
        .into_owned()
}

/// Relevance score as a whole percentage
pub fn relevance_percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// One line of the sources block: `Doc [guide] 87% relevant`
pub fn format_source(source: &Source) -> String {
    format!(
        "{} [{}] {}% relevant",
        source.title,
        source.source_type,
        relevance_percent(source.relevance_score)
    )
}
