//! Tolerant markup parser for Angular HTML templates.
//!
//! Produces a tree of elements, text and comments where every node and every
//! attribute carries its source span. Parsing never fails: stray closing tags
//! and unclosed elements are recorded in [`HtmlDocument::errors`] and the tree
//! is repaired the way browsers do it (implicit close).
//!
//! Angular binding syntax (`[prop]`, `(event)`, `*ngIf`, `#ref`) is accepted in
//! attribute names; `{{ }}` interpolations are plain text to this parser.

use std::ops::Range;

/// Position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Byte offset in source
    pub offset: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

/// Span in source text, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Raw attribute value; empty for valueless attributes.
    pub value: String,
    pub name_span: Span,
    /// Span of the value without its quotes. `None` for valueless attributes.
    pub value_span: Option<Span>,
    /// Whole attribute, name through closing quote.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Start tag through end tag (or through the start tag for void elements).
    pub source_span: Span,
    pub start_span: Span,
    pub end_span: Option<Span>,
    /// Everything between the start tag and the end tag.
    /// `None` for void and self-closing elements.
    pub content_span: Option<Span>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    pub fn has_child_elements(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Node::Element(_)))
    }

    /// Concatenated text of all descendant text nodes, element wrappers dropped.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&text.value),
            Node::Element(element) => collect_text(&element.children, out),
            Node::Comment(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

/// Parsed template.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    pub source_id: String,
    pub source: String,
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

impl HtmlDocument {
    /// Source text covered by `span`.
    pub fn slice(&self, span: Span) -> &str {
        &self.source[span.range()]
    }

    /// Full text of the 0-indexed line, without the line terminator.
    pub fn line_text(&self, line: usize) -> &str {
        self.source
            .split('\n')
            .nth(line)
            .map(|l| l.trim_end_matches('\r'))
            .unwrap_or("")
    }
}

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_void_element(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_raw_text_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}

fn is_tag_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'')
}

/// Byte offset to line/column lookup.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    fn position(&self, text: &str, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let col = text[self.line_starts[line]..offset].chars().count();
        Position { offset, line, col }
    }
}

/// Parse a template into a tree.
///
/// `source_id` identifies the document in errors (usually the file path).
pub fn parse_html(source: String, source_id: &str) -> HtmlDocument {
    let (root_nodes, errors) = TreeBuilder::new(&source).build();
    HtmlDocument {
        source_id: source_id.to_string(),
        source,
        root_nodes,
        errors,
    }
}

struct TreeBuilder<'a> {
    source: &'a str,
    bytes: &'a [u8],
    lines: LineIndex,
    pos: usize,
    stack: Vec<Element>,
    roots: Vec<Node>,
    errors: Vec<ParseError>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            lines: LineIndex::new(source),
            pos: 0,
            stack: Vec::new(),
            roots: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span {
            start: self.lines.position(self.source, start),
            end: self.lines.position(self.source, end),
        }
    }

    fn build(mut self) -> (Vec<Node>, Vec<ParseError>) {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'<' {
                let rest = &self.source[self.pos..];
                let next = self.bytes.get(self.pos + 1).copied();
                if rest.starts_with(COMMENT_START) {
                    self.consume_comment();
                    continue;
                }
                match next {
                    Some(b'!' | b'?') => {
                        self.consume_declaration();
                        continue;
                    }
                    Some(b'/')
                        if self
                            .bytes
                            .get(self.pos + 2)
                            .is_some_and(|b| b.is_ascii_alphabetic()) =>
                    {
                        self.consume_end_tag();
                        continue;
                    }
                    Some(b) if b.is_ascii_alphabetic() => {
                        self.consume_start_tag();
                        continue;
                    }
                    _ => {}
                }
            }
            self.consume_text();
        }

        let eof = self.bytes.len();
        while let Some(element) = self.stack.pop() {
            self.errors.push(ParseError {
                message: format!("Unclosed element <{}>", element.name),
                span: element.start_span,
            });
            self.finish_element(element, eof, None);
        }

        (self.roots, self.errors)
    }

    fn is_markup_start(&self, at: usize) -> bool {
        if self.bytes.get(at) != Some(&b'<') {
            return false;
        }
        match self.bytes.get(at + 1) {
            Some(b'!' | b'?') => true,
            Some(b'/') => self
                .bytes
                .get(at + 2)
                .is_some_and(|b| b.is_ascii_alphabetic()),
            Some(b) => b.is_ascii_alphabetic(),
            None => false,
        }
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn consume_text(&mut self) {
        let start = self.pos;
        // The current byte is either plain text or a '<' that opens nothing.
        self.pos += 1;
        while self.pos < self.bytes.len() && !self.is_markup_start(self.pos) {
            self.pos += 1;
        }
        // Only stop at ASCII '<' or EOF, so the slice stays on char boundaries.
        while !self.source.is_char_boundary(self.pos) {
            self.pos += 1;
        }
        let node = Node::Text(Text {
            value: self.source[start..self.pos].to_string(),
            span: self.span(start, self.pos),
        });
        self.push_node(node);
    }

    fn consume_comment(&mut self) {
        let start = self.pos;
        let body_start = start + COMMENT_START.len();
        let (body_end, end) = match self.source[body_start..].find(COMMENT_END) {
            Some(rel) => (body_start + rel, body_start + rel + COMMENT_END.len()),
            None => (self.bytes.len(), self.bytes.len()),
        };
        self.pos = end;
        let node = Node::Comment(Comment {
            value: self.source[body_start..body_end].to_string(),
            span: self.span(start, end),
        });
        self.push_node(node);
    }

    /// `<!doctype ...>`, `<?xml ...?>` and friends carry nothing we index.
    fn consume_declaration(&mut self) {
        self.pos = match self.source[self.pos..].find('>') {
            Some(rel) => self.pos + rel + 1,
            None => self.bytes.len(),
        };
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn consume_end_tag(&mut self) {
        let start = self.pos;
        let name_start = start + 2;
        let mut name_end = name_start;
        while name_end < self.bytes.len() && is_tag_name_char(self.bytes[name_end]) {
            name_end += 1;
        }
        let name = &self.source[name_start..name_end];
        self.pos = match self.source[name_end..].find('>') {
            Some(rel) => name_end + rel + 1,
            None => self.bytes.len(),
        };
        let end_span = self.span(start, self.pos);

        let Some(depth) = self
            .stack
            .iter()
            .rposition(|open| open.name.eq_ignore_ascii_case(name))
        else {
            self.errors.push(ParseError {
                message: format!("Unexpected closing tag </{}>", name),
                span: end_span,
            });
            return;
        };

        while self.stack.len() > depth + 1 {
            if let Some(unclosed) = self.stack.pop() {
                self.errors.push(ParseError {
                    message: format!("Unclosed element <{}>", unclosed.name),
                    span: unclosed.start_span,
                });
                self.finish_element(unclosed, start, None);
            }
        }
        if let Some(element) = self.stack.pop() {
            self.finish_element(element, start, Some(end_span));
        }
    }

    fn finish_element(&mut self, mut element: Element, content_end: usize, end_span: Option<Span>) {
        let content_start = element.start_span.end.offset;
        element.content_span = Some(self.span(content_start, content_end));
        element.source_span = Span {
            start: element.start_span.start,
            end: end_span
                .map(|span| span.end)
                .unwrap_or_else(|| self.lines.position(self.source, content_end)),
        };
        element.end_span = end_span;
        self.push_node(Node::Element(element));
    }

    fn consume_start_tag(&mut self) {
        let start = self.pos;
        let name_start = start + 1;
        let mut name_end = name_start;
        while name_end < self.bytes.len() && is_tag_name_char(self.bytes[name_end]) {
            name_end += 1;
        }
        let name = self.source[name_start..name_end].to_string();
        self.pos = name_end;

        let mut attrs = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            match self.bytes[self.pos] {
                b'>' => {
                    self.pos += 1;
                    break;
                }
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'>') => {
                    self_closing = true;
                    self.pos += 2;
                    break;
                }
                b if !is_attr_name_char(b) => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }
            attrs.push(self.consume_attribute());
        }

        let start_span = self.span(start, self.pos);
        let element = Element {
            name,
            attrs,
            children: Vec::new(),
            source_span: start_span,
            start_span,
            end_span: None,
            content_span: None,
        };

        if self_closing || is_void_element(&element.name) {
            self.push_node(Node::Element(element));
            return;
        }

        let raw_text = is_raw_text_element(&element.name);
        let close_tag = format!("</{}", element.name.to_ascii_lowercase());
        self.stack.push(element);

        if raw_text {
            let body_start = self.pos;
            // ASCII lowercasing keeps byte offsets intact.
            let body_end = self.source[body_start..]
                .to_ascii_lowercase()
                .find(&close_tag)
                .map(|rel| body_start + rel)
                .unwrap_or(self.bytes.len());
            if body_end > body_start {
                let node = Node::Text(Text {
                    value: self.source[body_start..body_end].to_string(),
                    span: self.span(body_start, body_end),
                });
                self.push_node(node);
            }
            self.pos = body_end;
            if body_end < self.bytes.len() {
                self.consume_end_tag();
            }
        }
    }

    fn consume_attribute(&mut self) -> Attribute {
        let name_start = self.pos;
        while self.pos < self.bytes.len() && is_attr_name_char(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let name_end = self.pos;
        let name = self.source[name_start..name_end].to_string();
        let name_span = self.span(name_start, name_end);

        let before_eq = self.pos;
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'=') {
            self.pos = before_eq;
            return Attribute {
                name,
                value: String::new(),
                name_span,
                value_span: None,
                span: name_span,
            };
        }
        self.pos += 1;
        self.skip_whitespace();

        let (value_start, value_end) = match self.bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let value_start = self.pos + 1;
                let value_end = self.source[value_start..]
                    .find(quote as char)
                    .map(|rel| value_start + rel)
                    .unwrap_or(self.bytes.len());
                self.pos = (value_end + 1).min(self.bytes.len());
                (value_start, value_end)
            }
            _ => {
                let value_start = self.pos;
                while self.pos < self.bytes.len() {
                    let b = self.bytes[self.pos];
                    if b.is_ascii_whitespace()
                        || b == b'>'
                        || (b == b'/' && self.bytes.get(self.pos + 1) == Some(&b'>'))
                    {
                        break;
                    }
                    self.pos += 1;
                }
                (value_start, self.pos)
            }
        };

        Attribute {
            name,
            value: self.source[value_start..value_end].to_string(),
            name_span,
            value_span: Some(self.span(value_start, value_end)),
            span: self.span(name_start, self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(source: &str) -> HtmlDocument {
        parse_html(source.to_string(), "test.html")
    }

    fn first_element(doc: &HtmlDocument) -> &Element {
        doc.root_nodes
            .iter()
            .find_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_parse_element_with_attributes() {
        let doc = parse(r#"<div i18n="@@greet" class='x' hidden>Hi</div>"#);
        let div = first_element(&doc);

        assert_eq!(div.name, "div");
        assert_eq!(div.attrs.len(), 3);
        assert_eq!(div.attrs[0].name, "i18n");
        assert_eq!(div.attrs[0].value, "@@greet");
        assert_eq!(doc.slice(div.attrs[0].value_span.unwrap()), "@@greet");
        assert_eq!(div.attrs[1].value, "x");
        assert_eq!(div.attrs[2].name, "hidden");
        assert!(div.attrs[2].value_span.is_none());
        assert_eq!(doc.slice(div.content_span.unwrap()), "Hi");
        assert_eq!(doc.slice(div.source_span), doc.source.as_str());
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn test_angular_binding_attributes() {
        let doc = parse(r#"<button (click)="go()" [disabled]="busy" *ngIf="x" #btn>Go</button>"#);
        let button = first_element(&doc);
        let names: Vec<&str> = button.attrs.iter().map(|a| a.name.as_str()).collect();

        assert_eq!(names, vec!["(click)", "[disabled]", "*ngIf", "#btn"]);
    }

    #[test]
    fn test_void_and_self_closing_elements_have_no_content() {
        let doc = parse(r#"<img alt="A cat"><br/><p>after</p>"#);
        let elements: Vec<&Element> = doc
            .root_nodes
            .iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None,
            })
            .collect();

        assert_eq!(elements.len(), 3);
        assert!(elements[0].content_span.is_none());
        assert!(elements[1].content_span.is_none());
        assert_eq!(elements[2].text_content(), "after");
    }

    #[test]
    fn test_nested_positions() {
        let doc = parse("<div>\n  <span i18n-title=\"@@t\" title=\"Hello\">x</span>\n</div>");
        let div = first_element(&doc);
        let span = div
            .children
            .iter()
            .find_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None,
            })
            .unwrap();
        let title = span.attr("title").unwrap();
        let value_span = title.value_span.unwrap();

        assert_eq!(value_span.start.line, 1);
        assert_eq!(value_span.start.col, 32);
        assert_eq!(doc.slice(value_span), "Hello");
    }

    #[test]
    fn test_text_content_flattens_nested_markup() {
        let doc = parse("<p>Hello <b>brave <i>new</i></b> world<!-- note --></p>");
        let p = first_element(&doc);

        assert!(p.has_child_elements());
        assert_eq!(p.text_content(), "Hello brave new world");
    }

    #[test]
    fn test_unclosed_and_stray_tags_are_recovered() {
        let doc = parse("<div><p>one</div></span>");
        let div = first_element(&doc);

        assert_eq!(div.children.len(), 1);
        assert_eq!(doc.errors.len(), 2);
        assert!(doc.errors[0].message.contains("<p>"));
        assert!(doc.errors[1].message.contains("</span>"));
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let doc = parse("<p>a < b {{ x }}</p>");
        let p = first_element(&doc);

        assert_eq!(p.text_content(), "a < b {{ x }}");
        assert!(!p.has_child_elements());
    }

    #[test]
    fn test_script_body_is_raw_text() {
        let doc = parse("<script>if (a<b) { x = '<div>'; }</script><p>x</p>");
        let script = first_element(&doc);

        assert_eq!(script.children.len(), 1);
        assert!(!script.has_child_elements());
        assert_eq!(doc.root_nodes.len(), 2);
    }

    #[test]
    fn test_multibyte_columns_count_characters() {
        let doc = parse("<p>héllo</p><b i18n=\"@@x\">y</b>");
        let b = doc
            .root_nodes
            .iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None,
            })
            .nth(1)
            .unwrap();

        assert_eq!(b.start_span.start.col, 12);
        assert_eq!(b.start_span.start.offset, 13);
    }
}
