use http::Uri;

/// Tags kept in block messages; every other tag is stripped, its text kept.
const ALLOWED_TAGS: [&str; 24] = [
    "a", "abbr", "b", "blockquote", "br", "code", "del", "div", "em", "h1", "h2", "h3", "h4",
    "hr", "i", "li", "ol", "p", "pre", "small", "span", "strong", "u", "ul",
];
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Reduces rich text to a safe subset of HTML.
///
/// Comments and tags outside a small allow-list are removed. Only `title` is kept on
/// every tag, plus `href`, `target` and `rel` on links. Links with a scheme other than
/// `http`, `https` or `mailto` lose their `href`.
pub(crate) fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        push_text(&mut out, &rest[..start]);
        let after = &rest[start + 1..];

        if !after.starts_with(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!') {
            out.push_str("&lt;");
            rest = after;
            continue;
        }

        if let Some(comment) = after.strip_prefix("!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        match after.find('>') {
            Some(end) => {
                if let Some(tag) = Tag::parse(&after[..end]) {
                    tag.render(&mut out);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str("&lt;");
                rest = after;
            }
        }
    }
    push_text(&mut out, rest);
    out
}

/// Keeps `raw` only if it's an absolute `http` or `https` URL.
pub(crate) fn sanitize_redirect_url(raw: &str) -> String {
    let url = raw.trim();
    match url.parse::<Uri>() {
        Ok(uri)
            if matches!(uri.scheme_str(), Some("http" | "https")) && uri.authority().is_some() =>
        {
            url.to_owned()
        }
        _ => String::new(),
    }
}

#[derive(Debug, Eq, PartialEq)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    attrs: Vec<(String, String)>,
}

impl Tag {
    fn parse(source: &str) -> Option<Self> {
        let source = source.trim();
        let (closing, source) = match source.strip_prefix('/') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, source),
        };
        let (self_closing, source) = match source.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, source),
        };

        let name_end = source
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(source.len());
        let name = source[..name_end].to_ascii_lowercase();
        if !ALLOWED_TAGS.contains(&name.as_str()) {
            return None;
        }

        let attrs = if closing {
            Vec::new()
        } else {
            parse_attributes(&name, &source[name_end..])
        };

        Some(Self {
            name,
            closing,
            self_closing,
            attrs,
        })
    }

    fn render(&self, out: &mut String) {
        out.push('<');
        if self.closing {
            out.push('/');
        }
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            push_attribute_value(out, value);
            out.push('"');
        }
        if self.self_closing && !self.closing {
            out.push_str(" /");
        }
        out.push('>');
    }
}

fn parse_attributes(tag: &str, source: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = source.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut name = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '=') {
            name.push(c);
        }
        if name.is_empty() {
            // stray '=' or end of input
            if chars.next().is_none() {
                break;
            }
            continue;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut value = String::new();
        if chars.next_if_eq(&'=').is_some() {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if let Some(quote) = chars.next_if(|c| *c == '"' || *c == '\'') {
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            } else {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    value.push(c);
                }
            }
        }

        let name = name.to_ascii_lowercase();
        if is_allowed_attribute(tag, &name, &value) {
            attrs.push((name, value));
        }
    }

    attrs
}

fn is_allowed_attribute(tag: &str, name: &str, value: &str) -> bool {
    match (tag, name) {
        (_, "title") | ("a", "target" | "rel") => true,
        ("a", "href") => has_safe_scheme(value),
        _ => false,
    }
}

fn has_safe_scheme(url: &str) -> bool {
    // browsers decode character references in attributes, then ignore whitespace
    // and control characters inside the scheme
    let compact: String = decode_char_refs(url)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    match compact.find(|c| matches!(c, ':' | '/' | '?' | '#')) {
        Some(i) if compact[i..].starts_with(':') => {
            let scheme = compact[..i].to_ascii_lowercase();
            ALLOWED_SCHEMES.contains(&scheme.as_str())
        }
        // an undecoded reference could still hide a scheme
        Some(i) => !compact[..i].contains('&'),
        None => !compact.contains('&'),
    }
}

/// Decodes numeric character references and the named ones that can shape a URL.
///
/// Unknown references are left untouched.
fn decode_char_refs(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match decode_char_ref(after) {
            Some((c, len)) => {
                out.push(c);
                rest = &after[len..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Reads the reference at the start of `s` (just after `&`), returning the
/// character and the number of bytes consumed.
fn decode_char_ref(s: &str) -> Option<(char, usize)> {
    if let Some(num) = s.strip_prefix('#') {
        let (digits, radix, skip) = match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => (hex, 16, 2),
            None => (num, 10, 1),
        };
        let len = digits
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(digits.len());
        if len == 0 {
            return None;
        }
        let c = u32::from_str_radix(&digits[..len], radix)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        let semicolon = usize::from(digits[len..].starts_with(';'));
        return Some((c, skip + len + semicolon));
    }

    let len = s.find(';')?;
    let c = match &s[..len] {
        "colon" => ':',
        "Tab" => '\t',
        "NewLine" => '\n',
        "sol" => '/',
        "quest" => '?',
        "num" => '#',
        "amp" => '&',
        _ => return None,
    };
    Some((c, len + 1))
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn push_attribute_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::sanitize::{sanitize_html, sanitize_redirect_url};

    #[test]
    fn test_plain_text_is_untouched() {
        let message = "Access denied. Your IP address has been blocked from viewing this page.";
        assert_eq!(sanitize_html(message), message);
        assert_eq!(sanitize_html(""), "");
    }

    #[test]
    fn test_allowed_tags_are_kept() {
        assert_eq!(
            sanitize_html("<strong>Blocked</strong> <EM>now</EM><br/>"),
            "<strong>Blocked</strong> <em>now</em><br />"
        );
        assert_eq!(
            sanitize_html("<p class=\"x\" title='Why'>Go</p>"),
            "<p title=\"Why\">Go</p>"
        );
    }

    #[test]
    fn test_disallowed_tags_are_stripped() {
        assert_eq!(
            sanitize_html("<strong>Blocked</strong><script>alert(1)</script>"),
            "<strong>Blocked</strong>alert(1)"
        );
        assert_eq!(
            sanitize_html("<img src=x onerror=alert(1)>hi<iframe src=\"//evil\"></iframe>"),
            "hi"
        );
        assert_eq!(sanitize_html("a<!-- hidden -->b<!-- open"), "ab");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            sanitize_html("<a href=\"https://example.com\" title='t' onclick=\"x()\">x</a>"),
            "<a href=\"https://example.com\" title=\"t\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\"javascript:alert(1)\">x</a>"),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\" JaVa\tScRiPt:alert(1)\">x</a>"),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=/contact target=_blank>x</a>"),
            "<a href=\"/contact\" target=\"_blank\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\"mailto:admin@example.com\">mail</a>"),
            "<a href=\"mailto:admin@example.com\">mail</a>"
        );
    }

    #[test]
    fn test_links_with_encoded_schemes() {
        for href in [
            "javascript&colon;alert(1)",
            "javascript&#58;alert(1)",
            "javascript&#x3A;alert(1)",
            "javascript&#X3a alert(1)",
            "javascript&#0000058;alert(1)",
            "java&#115;cript:alert(1)",
            "java&Tab;script&colon;alert(1)",
            "javascript&unknown;alert(1)",
        ] {
            let out = sanitize_html(&format!("<a href=\"{href}\">x</a>"));
            assert_eq!(out, "<a>x</a>", "{href}");
        }

        // references after the path starts are harmless
        assert_eq!(
            sanitize_html("<a href=\"/search?q=a&amp;b=c\">x</a>"),
            "<a href=\"/search?q=a&amp;b=c\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\"https&#58;//example.com\">x</a>"),
            "<a href=\"https&#58;//example.com\">x</a>"
        );
    }

    #[test]
    fn test_stray_brackets() {
        assert_eq!(sanitize_html("1 < 2 and 3 > 2"), "1 &lt; 2 and 3 &gt; 2");
        assert_eq!(
            sanitize_html("<span title='a\"b'>x</span>"),
            "<span title=\"a&quot;b\">x</span>"
        );
    }

    #[test]
    fn test_redirect_urls() {
        assert_eq!(
            sanitize_redirect_url(" https://example.com/blocked "),
            "https://example.com/blocked"
        );
        assert_eq!(
            sanitize_redirect_url("http://example.com"),
            "http://example.com"
        );
        assert_eq!(sanitize_redirect_url(""), "");
        assert_eq!(sanitize_redirect_url("/blocked"), "");
        assert_eq!(sanitize_redirect_url("javascript:alert(1)"), "");
        assert_eq!(sanitize_redirect_url("ftp://example.com/file"), "");
        assert_eq!(sanitize_redirect_url("https://exa mple.com"), "");
    }
}
