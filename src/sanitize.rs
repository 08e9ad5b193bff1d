//! Untrusted-HTML sanitization and plain-text rendering.
//!
//! Mail bodies come straight from unknown senders and are inserted into a
//! hosting page, so nothing here trusts its input. Two paths:
//! - [`sanitize_html`]: neutralize an HTML body (drop active content, strip
//!   event handlers, harden links, tame layout-hijacking styles).
//! - [`render_text`]: escape a plain-text body and turn bare URLs into
//!   hardened anchors.
//!
//! Both are total — malformed input degrades, it never errors.

use std::sync::LazyLock;

use regex::Regex;

use crate::inbox::Message;

/// Element kinds removed entirely, descendants included.
const DANGEROUS_TAGS: &[&str] = &["script", "style", "iframe", "object", "embed", "form"];

/// CSS properties stripped from inline `style` attributes.
const BLOCKED_STYLE_PROPS: &[&str] = &["position", "z-index", "overflow"];

struct TagFilter {
    /// `<tag ...> ... </tag>` including everything between.
    paired: Regex,
    /// A stray opening (or self-closed) tag.
    open: Regex,
    /// A stray closing tag.
    close: Regex,
    /// Raw-text element: a dangling open swallows the rest of the input.
    raw_text: bool,
}

static TAG_FILTERS: LazyLock<Vec<TagFilter>> = LazyLock::new(|| {
    DANGEROUS_TAGS
        .iter()
        .map(|tag| TagFilter {
            paired: Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("paired tag regex is valid"),
            open: Regex::new(&format!(r"(?is)<{tag}\b[^>]*>")).expect("open tag regex is valid"),
            close: Regex::new(&format!(r"(?i)</{tag}\s*>")).expect("close tag regex is valid"),
            raw_text: matches!(*tag, "script" | "style"),
        })
        .collect()
});

/// An opening tag: name plus its attribute run (quote-aware, so `>` inside
/// quoted attribute values does not end the tag).
static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<([a-zA-Z][a-zA-Z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("open tag regex is valid")
});

/// One attribute: name, optionally `= value` (double-quoted, single-quoted
/// or bare).
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+))?"#)
        .expect("attribute regex is valid")
});

/// A bare URL in plain text, optionally wrapped in angle brackets.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<?(https?://[^\s<>]+)>?").expect("url regex is valid"));

/// Runs of three or more newlines.
static NEWLINE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline regex is valid"));

/// Sanitize an untrusted HTML fragment for display inside a hosting page.
///
/// Guarantees:
/// - `script`/`style`/`iframe`/`object`/`embed`/`form` elements are gone,
///   descendants included.
/// - no attribute whose name starts with `on` survives.
/// - no `href` with a `javascript:` scheme survives.
/// - every anchor that keeps an `href` opens in a new context with
///   `rel="noopener noreferrer"` and is tagged `message-link`.
/// - inline styles lose `position`/`z-index`/`overflow` declarations.
/// - remaining text and markup pass through.
pub fn sanitize_html(html: &str) -> String {
    let mut out = html.to_string();

    for filter in TAG_FILTERS.iter() {
        // Repeat paired removal so same-tag nesting collapses fully.
        loop {
            let next = filter.paired.replace_all(&out, "").into_owned();
            if next == out {
                break;
            }
            out = next;
        }
        if filter.raw_text {
            // A dangling <script>/<style> makes the rest of the input raw
            // element content; drop it all.
            let dangling = filter.open.find(&out).map(|m| m.start());
            if let Some(pos) = dangling {
                out.truncate(pos);
            }
        }
        out = filter.open.replace_all(&out, "").into_owned();
        out = filter.close.replace_all(&out, "").into_owned();
    }

    OPEN_TAG_RE
        .replace_all(&out, |caps: &regex::Captures| {
            rewrite_tag(&caps[1], caps.get(2).map_or("", |m| m.as_str()))
        })
        .into_owned()
}

/// Render a plain-text body: escape, linkify, convert newlines.
///
/// Escaping happens segment-by-segment around the URLs, which are emitted
/// as already-safe anchor fragments — never escaped twice.
pub fn render_text(text: &str) -> String {
    let collapsed = NEWLINE_RUN_RE.replace_all(text, "\n\n");
    linkify(&collapsed).replace('\n', "<br>")
}

/// Display-ready markup for a stored message: sanitized HTML when present,
/// rendered plain text otherwise.
pub fn render_body(message: &Message) -> String {
    if let Some(html) = message.body_html.as_deref().filter(|h| !h.is_empty()) {
        return sanitize_html(html);
    }
    if let Some(text) = message.body_text.as_deref().filter(|t| !t.is_empty()) {
        return render_text(text);
    }
    r#"<span class="no-content">No content</span>"#.to_string()
}

/// Escape text for insertion into HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Tag rewriting ───────────────────────────────────────────────────

struct Attr {
    name: String,
    value: Option<String>,
}

fn rewrite_tag(name: &str, attr_run: &str) -> String {
    let self_closing = attr_run.trim_end().ends_with('/');
    let attr_run = attr_run.trim_end().trim_end_matches('/');

    let mut kept: Vec<Attr> = Vec::new();
    for caps in ATTR_RE.captures_iter(attr_run) {
        let attr_name = caps[1].to_ascii_lowercase();
        let value = caps.get(2).map(|m| unquote(m.as_str()));

        // Inline event handlers.
        if attr_name.starts_with("on") {
            continue;
        }
        // javascript: hrefs, tolerating case games and embedded whitespace.
        if attr_name == "href" && value.as_deref().is_some_and(has_javascript_scheme) {
            continue;
        }
        if attr_name == "style" {
            match value.as_deref().map(filter_style) {
                Some(filtered) if !filtered.is_empty() => kept.push(Attr {
                    name: attr_name,
                    value: Some(filtered),
                }),
                _ => {}
            }
            continue;
        }
        kept.push(Attr {
            name: attr_name,
            value,
        });
    }

    // Link hardening: any anchor that still carries an href opens in a new
    // browsing context without opener/referrer leakage.
    if name.eq_ignore_ascii_case("a") && kept.iter().any(|a| a.name == "href") {
        kept.retain(|a| a.name != "target" && a.name != "rel");
        kept.push(Attr {
            name: "target".into(),
            value: Some("_blank".into()),
        });
        kept.push(Attr {
            name: "rel".into(),
            value: Some("noopener noreferrer".into()),
        });
        match kept.iter_mut().find(|a| a.name == "class") {
            Some(class) => {
                let existing = class.value.take().unwrap_or_default();
                class.value = if existing.split_whitespace().any(|c| c == "message-link") {
                    Some(existing)
                } else if existing.is_empty() {
                    Some("message-link".into())
                } else {
                    Some(format!("{existing} message-link"))
                };
            }
            None => kept.push(Attr {
                name: "class".into(),
                value: Some("message-link".into()),
            }),
        }
    }

    let mut out = format!("<{name}");
    for attr in &kept {
        match &attr.value {
            Some(v) => {
                out.push_str(&format!(" {}=\"{}\"", attr.name, escape_attr(v)));
            }
            None => {
                out.push(' ');
                out.push_str(&attr.name);
            }
        }
    }
    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out
}

fn unquote(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

fn has_javascript_scheme(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("javascript:")
}

/// Drop layout-hijacking declarations from an inline style value.
fn filter_style(style: &str) -> String {
    style
        .split(';')
        .map(str::trim)
        .filter(|decl| {
            if decl.is_empty() {
                return false;
            }
            let prop = decl.split(':').next().unwrap_or("").trim().to_ascii_lowercase();
            !BLOCKED_STYLE_PROPS.contains(&prop.as_str())
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Escape a value for a double-quoted attribute position.
fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

// ── Plain-text linkify ──────────────────────────────────────────────

fn linkify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in URL_RE.captures_iter(text) {
        let whole = caps.get(0).expect("match group 0 always present");
        let url = caps.get(1).expect("url group always present").as_str();

        out.push_str(&escape_html(&text[last..whole.start()]));

        let url = url.trim_end_matches([',', '.', ';', ':', ')', ']', '}']);
        out.push_str(&format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="message-link">{}</a>"#,
            escape_attr(url),
            escape_html(url),
        ));

        last = whole.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

// ── Tests ───────────────────────────────────────────────────────────
