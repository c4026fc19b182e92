#![forbid(unsafe_code)]

//! Minimal HTML fragment parsing and serialization.
//!
//! Supported: elements, text, comments (dropped), doctypes (dropped), void
//! elements, double-quoted, single-quoted, unquoted and bare attributes, and
//! the common character references. Unclosed elements are closed at the end
//! of input and stray end tags are ignored, as a browser would. An
//! unterminated tag is an error.

use crate::{Document, DomError, NodeId, NodeKind, Result};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse `markup` into detached nodes and return the top-level ones in order.
///
/// Building the fragment never produces mutation records: the nodes are not
/// attached to any observed tree until the caller inserts them.
pub fn parse_fragment(doc: &mut Document, markup: &str) -> Result<Vec<NodeId>> {
    let mut parser = Parser {
        src: markup,
        pos: 0,
    };
    let mut top: Vec<NodeId> = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();

    while parser.pos < markup.len() {
        let rest = parser.rest();
        if rest.starts_with("<!--") {
            let end = rest.find("-->").ok_or(DomError::Markup {
                offset: parser.pos,
                reason: "unterminated comment",
            })?;
            parser.pos += end + 3;
        } else if rest.starts_with("<!") {
            let end = rest.find('>').ok_or(DomError::Markup {
                offset: parser.pos,
                reason: "unterminated declaration",
            })?;
            parser.pos += end + 1;
        } else if rest.starts_with("</") {
            let tag = parser.end_tag()?;
            let open = stack
                .iter()
                .rposition(|open| doc.tag_name(*open) == Some(tag.as_str()));
            if let Some(depth) = open {
                stack.truncate(depth);
            }
        } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
        {
            let (tag, attributes, self_closing) = parser.start_tag()?;
            let element = doc.create_element(&tag);
            for (name, value) in &attributes {
                if !doc.has_attribute(element, name) {
                    doc.set_attribute(element, name, value)?;
                }
            }
            attach(doc, &mut top, &stack, element)?;
            if !self_closing && !is_void(&tag) {
                stack.push(element);
            }
        } else {
            let text = parser.text();
            let node = doc.create_text(&decode_entities(text));
            attach(doc, &mut top, &stack, node)?;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(bytes = markup.len(), top_level = top.len(), "markup parsed");
    Ok(top)
}

fn attach(
    doc: &mut Document,
    top: &mut Vec<NodeId>,
    stack: &[NodeId],
    node: NodeId,
) -> Result<()> {
    match stack.last() {
        Some(&parent) => doc.append_child(parent, node),
        None => {
            top.push(node);
            Ok(())
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error(&self, reason: &'static str) -> DomError {
        DomError::Markup {
            offset: self.pos,
            reason,
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn text(&mut self) -> &'a str {
        let rest = self.rest();
        // A lone '<' that does not open a tag is literal text.
        let skip = usize::from(rest.starts_with('<'));
        let len = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
        self.pos += len;
        &rest[..len]
    }

    fn name(&mut self) -> &'a str {
        self.take_while(|c| !c.is_whitespace() && c != '>' && c != '/' && c != '=')
    }

    fn end_tag(&mut self) -> Result<String> {
        self.pos += 2;
        let tag = self.name().to_ascii_lowercase();
        self.skip_whitespace();
        if !self.rest().starts_with('>') {
            return Err(self.error("unterminated end tag"));
        }
        self.pos += 1;
        Ok(tag)
    }

    #[allow(clippy::type_complexity)]
    fn start_tag(&mut self) -> Result<(String, Vec<(String, String)>, bool)> {
        self.pos += 1;
        let tag = self.name().to_ascii_lowercase();
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error("unterminated start tag"));
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return Ok((tag, attributes, true));
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return Ok((tag, attributes, false));
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let name = self.name().to_ascii_lowercase();
            if name.is_empty() {
                return Err(self.error("expected attribute name"));
            }
            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.attribute_value()?
            } else {
                String::new()
            };
            attributes.push((name, value));
        }
    }

    fn attribute_value(&mut self) -> Result<String> {
        let rest = self.rest();
        let quote = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                let raw = self.take_while(|c| !c.is_whitespace() && c != '>');
                return Ok(decode_entities(raw));
            }
        };
        let end = rest[1..]
            .find(quote)
            .ok_or_else(|| self.error("unterminated attribute value"))?;
        self.pos += end + 2;
        Ok(decode_entities(&rest[1..=end]))
    }
}

/// Replace the common named and numeric character references.
/// Unknown references are kept verbatim.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let name = &rest[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_into(out: &mut String, raw: &str, in_attribute: bool) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Serialize `node` and its subtree.
#[must_use]
pub fn outer_markup(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

/// Serialize the children of `node`.
#[must_use]
pub fn inner_markup(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for &child in doc.children(node) {
        write_node(doc, child, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.kind(node) {
        Ok(NodeKind::Text(text)) => escape_into(out, text, false),
        Ok(NodeKind::Element { tag, attributes }) => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(out, value, true);
                out.push('"');
            }
            out.push('>');
            if is_void(tag) {
                return;
            }
            for &child in doc.children(node) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        Err(_) => {}
    }
}
