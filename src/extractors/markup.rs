// src/extractors/markup.rs
//! Read-only access to a page's markup, independent of how it was parsed.
//!
//! The extractor only ever asks three questions of a page: which elements
//! carry a marker, what an element's attribute holds, and what text it
//! shows. [`DomMarkup`] answers them from a full html5ever DOM; [`ScanMarkup`]
//! answers them from a single regex pass over the raw tags, for callers that
//! cannot afford a DOM. Both return elements in document order.

// --- Imports ---
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{node::Node, ElementRef, Html, Selector};

/// How an element is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'m> {
    /// Has the CSS class, e.g. `s2skemabrik`.
    Class(&'m str),
    /// Has the exact `id`.
    Id(&'m str),
    /// Element name, e.g. `td`.
    Tag(&'m str),
    /// Carries the attribute at all, e.g. `data-date`.
    Attr(&'m str),
}

impl Marker<'_> {
    fn to_css(self) -> String {
        match self {
            Marker::Class(class) => format!(".{}", class),
            Marker::Id(id) => format!("#{}", id),
            Marker::Tag(tag) => tag.to_string(),
            Marker::Attr(attr) => format!("[{}]", attr),
        }
    }
}

/// The HTML access capability the extractor runs on.
pub trait Markup {
    type Node<'a>: Copy
    where
        Self: 'a;

    /// All elements matching `marker`, in document order.
    fn select<'a>(&'a self, marker: Marker<'_>) -> Vec<Self::Node<'a>>;

    /// Descendants of `scope` matching `marker`, in document order.
    fn select_within<'a>(&'a self, scope: Self::Node<'a>, marker: Marker<'_>) -> Vec<Self::Node<'a>>;

    fn attr<'a>(&'a self, node: Self::Node<'a>, name: &str) -> Option<String>;

    /// Text content with `<br>` rendered as `\n` and entities decoded.
    fn text<'a>(&'a self, node: Self::Node<'a>) -> String;

    fn first<'a>(&'a self, marker: Marker<'_>) -> Option<Self::Node<'a>> {
        self.select(marker).into_iter().next()
    }

    fn first_within<'a>(&'a self, scope: Self::Node<'a>, marker: Marker<'_>) -> Option<Self::Node<'a>> {
        self.select_within(scope, marker).into_iter().next()
    }

    /// True when the element's `class` list contains `class`.
    fn has_class<'a>(&'a self, node: Self::Node<'a>, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

// --- DOM provider ---

/// Markup backed by a parsed html5ever document.
pub struct DomMarkup {
    document: Html,
}

impl DomMarkup {
    pub fn parse(html: &str) -> Self {
        Self { document: Html::parse_document(html) }
    }

    fn selector(marker: Marker<'_>) -> Option<Selector> {
        let css = marker.to_css();
        let selector = match Selector::parse(&css) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!("Unusable marker '{}': {:?}", css, e);
                None
            }
        };
        selector
    }
}

impl Markup for DomMarkup {
    type Node<'a> = ElementRef<'a>;

    fn select<'a>(&'a self, marker: Marker<'_>) -> Vec<ElementRef<'a>> {
        match Self::selector(marker) {
            Some(selector) => self.document.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    fn select_within<'a>(&'a self, scope: ElementRef<'a>, marker: Marker<'_>) -> Vec<ElementRef<'a>> {
        match Self::selector(marker) {
            Some(selector) => scope.select(&selector).filter(|el| el.id() != scope.id()).collect(),
            None => Vec::new(),
        }
    }

    fn attr<'a>(&'a self, node: ElementRef<'a>, name: &str) -> Option<String> {
        node.value().attr(name).map(str::to_string)
    }

    fn text<'a>(&'a self, node: ElementRef<'a>) -> String {
        let mut text = String::new();
        for descendant in node.descendants() {
            match descendant.value() {
                Node::Text(t) => {
                    // Script and style bodies are not page text.
                    let raw_text = descendant
                        .parent()
                        .and_then(|parent| parent.value().as_element())
                        .is_some_and(|el| matches!(el.name(), "script" | "style"));
                    if !raw_text {
                        text.push_str(t);
                    }
                }
                Node::Element(el) if el.name() == "br" => text.push('\n'),
                _ => {}
            }
        }
        text
    }
}

// --- Regex scanner provider ---

// Comments and raw-text elements are swallowed whole so their contents never read as tags.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!\w[^>]*>|<(/)?([a-z][a-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .expect("Failed to compile TAG_RE")
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'=/>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("Failed to compile ATTR_RE")
});

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("Failed to compile ENTITY_RE")
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// An element found by the scanner, located by byte offsets into the source.
#[derive(Debug, Clone)]
pub struct ScannedElement {
    name: String,
    /// Raw attribute text of the opening tag.
    attrs: String,
    start: usize,
    content_start: usize,
    content_end: usize,
}

/// Markup backed by a flat list of elements recovered with regexes.
///
/// Closing tags are paired with a stack; an unmatched closing tag is ignored
/// and elements left open are closed implicitly by their parent's end tag or
/// the end of input.
pub struct ScanMarkup {
    source: String,
    elements: Vec<ScannedElement>,
}

impl ScanMarkup {
    pub fn parse(html: &str) -> Self {
        let mut elements: Vec<ScannedElement> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        for caps in TAG_RE.captures_iter(html) {
            let Some(name) = caps.get(2) else { continue };
            let Some(whole) = caps.get(0) else { continue };
            let name = name.as_str().to_ascii_lowercase();

            if caps.get(1).is_some() {
                if let Some(pos) = open.iter().rposition(|&i| elements[i].name == name) {
                    for idx in open.drain(pos..) {
                        elements[idx].content_end = whole.start();
                    }
                }
                continue;
            }

            let attrs = caps.get(3).map_or("", |m| m.as_str());
            let self_closing = attrs.trim_end().ends_with('/') || VOID_ELEMENTS.contains(&name.as_str());
            elements.push(ScannedElement {
                name,
                attrs: attrs.trim_end_matches('/').to_string(),
                start: whole.start(),
                content_start: whole.end(),
                content_end: whole.end(),
            });
            if !self_closing {
                open.push(elements.len() - 1);
            }
        }
        for idx in open {
            elements[idx].content_end = html.len();
        }

        tracing::trace!("Scanner found {} elements", elements.len());
        Self { source: html.to_string(), elements }
    }

    fn attr_of(element: &ScannedElement, name: &str) -> Option<String> {
        ATTR_RE.captures_iter(&element.attrs).find_map(|caps| {
            let key = caps.get(1)?;
            if !key.as_str().eq_ignore_ascii_case(name) {
                return None;
            }
            let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4));
            Some(decode_entities(value.map_or("", |m| m.as_str())))
        })
    }

    fn matches(element: &ScannedElement, marker: Marker<'_>) -> bool {
        match marker {
            Marker::Tag(tag) => element.name.eq_ignore_ascii_case(tag),
            Marker::Id(id) => Self::attr_of(element, "id").as_deref() == Some(id),
            Marker::Class(class) => Self::attr_of(element, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Marker::Attr(attr) => Self::attr_of(element, attr).is_some(),
        }
    }
}

impl Markup for ScanMarkup {
    type Node<'a> = &'a ScannedElement;

    fn select<'a>(&'a self, marker: Marker<'_>) -> Vec<&'a ScannedElement> {
        self.elements.iter().filter(|el| Self::matches(el, marker)).collect()
    }

    fn select_within<'a>(&'a self, scope: &'a ScannedElement, marker: Marker<'_>) -> Vec<&'a ScannedElement> {
        self.elements
            .iter()
            .filter(|el| el.start >= scope.content_start && el.start < scope.content_end)
            .filter(|el| Self::matches(el, marker))
            .collect()
    }

    fn attr<'a>(&'a self, node: &'a ScannedElement, name: &str) -> Option<String> {
        Self::attr_of(node, name)
    }

    fn text<'a>(&'a self, node: &'a ScannedElement) -> String {
        let inner = &self.source[node.content_start..node.content_end];
        // Same tag grammar as `parse`, so a `>` inside a quoted attribute never ends a tag.
        let stripped = TAG_RE.replace_all(inner, |caps: &Captures| {
            match caps.get(2) {
                Some(name) if name.as_str().eq_ignore_ascii_case("br") => "\n",
                _ => "",
            }
        });
        decode_entities(&stripped)
    }
}

/// Decodes numeric entities and the named ones a Danish portal page uses.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "aelig" => 'æ',
        "AElig" => 'Æ',
        "oslash" => 'ø',
        "Oslash" => 'Ø',
        "aring" => 'å',
        "Aring" => 'Å',
        "eacute" => 'é',
        "Eacute" => 'É',
        "egrave" => 'è',
        "aacute" => 'á',
        "oacute" => 'ó',
        "auml" => 'ä',
        "Auml" => 'Ä',
        "ouml" => 'ö',
        "Ouml" => 'Ö',
        "uuml" => 'ü',
        "Uuml" => 'Ü',
        "szlig" => 'ß',
        "shy" => '\u{ad}',
        "copy" => '©',
        "reg" => '®',
        "deg" => '°',
        "euro" => '€',
        "laquo" => '«',
        "raquo" => '»',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "hellip" => '…',
        "bull" => '•',
        "middot" => '·',
        "ndash" => '–',
        "mdash" => '—',
        _ => return None,
    };
    Some(c)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Skema &amp; mere</title>
        <script>var x = "<td class='s2skemabrik'>";</script></head>
        <body>
        <table id="grid">
          <tr class="row"><td class="cell first">A<br/>B</td><td data-date="2024-03-04" class='cell'>C &#230; D</td></tr>
        </table>
        <!-- <td class="cell">commented</td> -->
        <div class="outer"><div class="inner" title='say "hi"'>x</div></div>
        </body></html>"#;

    fn both() -> (DomMarkup, ScanMarkup) {
        (DomMarkup::parse(PAGE), ScanMarkup::parse(PAGE))
    }

    #[test]
    fn test_select_by_class_in_document_order() {
        let (dom, scan) = both();
        let dom_texts: Vec<String> = dom.select(Marker::Class("cell")).into_iter().map(|n| dom.text(n)).collect();
        let scan_texts: Vec<String> = scan.select(Marker::Class("cell")).into_iter().map(|n| scan.text(n)).collect();
        assert_eq!(dom_texts, vec!["A\nB".to_string(), "C æ D".to_string()]);
        assert_eq!(scan_texts, dom_texts);
    }

    #[test]
    fn test_script_and_comment_content_is_not_markup() {
        let scan = ScanMarkup::parse(PAGE);
        assert!(scan.select(Marker::Class("s2skemabrik")).is_empty());
        assert_eq!(scan.select(Marker::Tag("td")).len(), 2);
    }

    #[test]
    fn test_attr_and_id_lookup() {
        let (dom, scan) = both();
        let d = dom.first(Marker::Attr("data-date")).unwrap();
        let s = scan.first(Marker::Attr("data-date")).unwrap();
        assert_eq!(dom.attr(d, "data-date").as_deref(), Some("2024-03-04"));
        assert_eq!(scan.attr(s, "data-date").as_deref(), Some("2024-03-04"));
        assert!(scan.first(Marker::Id("grid")).is_some());
        let inner = scan.first(Marker::Class("inner")).unwrap();
        assert_eq!(scan.attr(inner, "title").as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn test_select_within_scope() {
        let (dom, scan) = both();
        let d_outer = dom.first(Marker::Class("outer")).unwrap();
        let s_outer = scan.first(Marker::Class("outer")).unwrap();
        assert_eq!(dom.select_within(d_outer, Marker::Tag("div")).len(), 1);
        assert_eq!(scan.select_within(s_outer, Marker::Tag("div")).len(), 1);
        let s_row = scan.first(Marker::Class("row")).unwrap();
        assert_eq!(scan.select_within(s_row, Marker::Tag("td")).len(), 2);
        assert!(scan.has_class(s_row, "row"));
    }

    #[test]
    fn test_unclosed_elements_close_with_parent() {
        let scan = ScanMarkup::parse("<ul><li>one<li>two</ul><p>after</p>");
        let list = scan.first(Marker::Tag("ul")).unwrap();
        assert_eq!(scan.select_within(list, Marker::Tag("li")).len(), 2);
        assert!(scan.select_within(list, Marker::Tag("p")).is_empty());
    }

    #[test]
    fn test_quoted_angle_bracket_stays_inside_tag() {
        let html = r#"<table><tr><td class="day"><span title="a > b">Mandag (4/3)</span><br data-x='>'/>x</td></tr></table>"#;
        let (dom, scan) = (DomMarkup::parse(html), ScanMarkup::parse(html));
        let d = dom.first(Marker::Class("day")).unwrap();
        let s = scan.first(Marker::Class("day")).unwrap();
        assert_eq!(dom.text(d), "Mandag (4/3)\nx");
        assert_eq!(scan.text(s), dom.text(d));
    }

    #[test]
    fn test_script_body_is_not_text() {
        let html = "<div class=\"box\">a<script>var b = 1 < 2;</script>c &lt; d</div>";
        let (dom, scan) = (DomMarkup::parse(html), ScanMarkup::parse(html));
        let d = dom.first(Marker::Class("box")).unwrap();
        let s = scan.first(Marker::Class("box")).unwrap();
        assert_eq!(dom.text(d), "ac < d");
        assert_eq!(scan.text(s), dom.text(d));
    }

    #[test]
    fn test_common_named_entities_match_dom() {
        let html = "<p class=\"t\">caf&eacute; &rsquo;x&lsquo; &hellip; &euro;5 &laquo;a&raquo; &Aring;&aelig;&oslash;</p>";
        let (dom, scan) = (DomMarkup::parse(html), ScanMarkup::parse(html));
        let d = dom.first(Marker::Class("t")).unwrap();
        let s = scan.first(Marker::Class("t")).unwrap();
        assert_eq!(dom.text(d), "café \u{2019}x\u{2018} … €5 «a» Åæø");
        assert_eq!(scan.text(s), dom.text(d));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("L&#230;rer: A &amp; B"), "Lærer: A & B");
        assert_eq!(decode_entities("&#x2022; &oslash; &unknown;"), "• ø &unknown;");
        assert_eq!(decode_entities("plain"), "plain");
    }
}
