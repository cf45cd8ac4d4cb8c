//! Input sanitization for submitted field values.
//!
//! Everything here coerces; nothing rejects. Plain text loses tags, line
//! breaks and percent-encoded octets, rich text keeps a fixed HTML subset, and
//! dates accept the common written forms.

use std::borrow::Cow;

use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*?>.*?</script>|<style[^>]*?>.*?</style>")
        .expect("valid script/style pattern")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*(?:>|$)").expect("valid tag pattern"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n\t ]+").expect("valid whitespace pattern"));
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid space pattern"));
static OCTET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)%[a-f0-9]{2}").expect("valid octet pattern"));
static EMAIL_LOCAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~.-]+$").expect("valid email local pattern")
});
static DOMAIN_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z0-9-]+$").expect("valid domain label pattern"));
static RELATIVE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([+-]?\d+)\s*(day|week|month|year)s?$").expect("valid relative date pattern")
});

/// Canonical stored date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What unparseable dates coerce to.
pub fn epoch() -> NaiveDate {
    DateTime::UNIX_EPOCH.date_naive()
}

/// HTML-escape `&`, `<`, `>` and both quote characters.
pub fn esc_html(input: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(input)
}

/// Remove every tag, dropping `<script>`/`<style>` bodies entirely.
pub fn strip_all_tags(input: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(input, "");
    TAG.replace_all(&without_scripts, "").trim().to_string()
}

/// Escape any `<` that does not open a complete tag, so stripping tags cannot
/// swallow text such as `a < b`.
fn escape_lone_less_than(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let after = &tail[1..];
        match after.find(['<', '>']) {
            Some(i) if after.as_bytes()[i] == b'>' => {
                out.push_str(&tail[..i + 2]);
                rest = &tail[i + 2..];
            }
            Some(i) => {
                out.push_str(&esc_html(&tail[..i + 1]));
                rest = &tail[i + 1..];
            }
            None => {
                out.push_str(&esc_html(tail));
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Sanitize a single-line text value.
pub fn sanitize_text_field(input: &str) -> String {
    let mut filtered = input.to_string();

    if filtered.contains('<') {
        filtered = escape_lone_less_than(&filtered);
        filtered = strip_all_tags(&filtered);
        filtered = filtered.replace("<\n", "&lt;\n");
    }

    filtered = WHITESPACE_RUN
        .replace_all(&filtered, " ")
        .trim()
        .to_string();

    let mut found = false;
    while let Some(octet) = OCTET.find(&filtered).map(|m| m.as_str().to_string()) {
        filtered = filtered.replace(&octet, "");
        found = true;
    }
    if found {
        filtered = SPACE_RUN.replace_all(&filtered, " ").trim().to_string();
    }

    filtered
}

/// Whether `input` is a plausible email address.
pub fn is_email(input: &str) -> bool {
    if input.len() < 6 {
        return false;
    }
    // an '@' is required, and not as the first character
    let Some(at) = input.get(1..).and_then(|s| s.find('@')).map(|i| i + 1) else {
        return false;
    };
    let (local, domain) = (&input[..at], &input[at + 1..]);

    if !EMAIL_LOCAL.is_match(local) {
        return false;
    }
    if domain.contains("..") {
        return false;
    }
    let edge_chars: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B', '.'];
    if domain.trim_matches(edge_chars) != domain {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let label_edges: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B', '-'];
    labels
        .iter()
        .all(|label| label.trim_matches(label_edges) == *label && DOMAIN_LABEL.is_match(label))
}

/// Remove one level of backslash escaping.
pub fn stripslashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Leading integer of `input`, ignoring anything after the digits.
fn leading_int(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

/// A submitted user id: the leading integer when positive, else `0`.
pub fn positive_id(input: &str) -> u64 {
    u64::try_from(leading_int(input)).unwrap_or(0)
}

/// Decode `%xx` escapes and `+`. Invalid UTF-8 is replaced, never rejected.
pub fn url_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    let bytes = urlencoding::decode_binary(plus_decoded.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Allowed elements and their allowed attributes.
pub type AllowList = &'static [(&'static str, &'static [&'static str])];

/// The HTML subset kept in rich text fields.
pub const POST_ALLOWED: AllowList = &[
    ("a", &["href", "title", "target", "rel"]),
    ("abbr", &["title"]),
    ("b", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("code", &[]),
    ("del", &["datetime"]),
    ("em", &[]),
    ("h1", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("h5", &[]),
    ("h6", &[]),
    ("hr", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("li", &[]),
    ("ol", &["start"]),
    ("p", &[]),
    ("pre", &[]),
    ("q", &["cite"]),
    ("s", &[]),
    ("span", &["title"]),
    ("strike", &[]),
    ("strong", &[]),
    ("sub", &[]),
    ("sup", &[]),
    ("table", &[]),
    ("tbody", &[]),
    ("td", &["colspan", "rowspan"]),
    ("th", &["colspan", "rowspan", "scope"]),
    ("thead", &[]),
    ("tr", &[]),
    ("u", &[]),
    ("ul", &[]),
];

/// Links only, for display-only information blocks.
pub const LINKS_ONLY: AllowList = &[("a", &["href"])];

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];
const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite"];
const ALLOWED_PROTOCOLS: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "gopher", "nntp", "feed", "telnet",
    "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

/// Relative URLs pass; absolute ones need a listed protocol.
fn allowed_url(url: &str) -> bool {
    let trimmed = url.trim();
    match trimmed.find(':') {
        Some(colon) if !trimmed[..colon].contains(['/', '?', '#']) => {
            let scheme = trimmed[..colon].to_ascii_lowercase();
            ALLOWED_PROTOCOLS.contains(&scheme.as_str())
        }
        _ => true,
    }
}

/// Rebuild `input` keeping only elements and attributes in `allowed`.
/// Disallowed elements are unwrapped, their text kept.
pub fn kses(input: &str, allowed: AllowList) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    write_children(fragment.root_element(), allowed, &mut out);
    out
}

/// Rich text sanitization for textarea fields.
pub fn kses_post(input: &str) -> String {
    kses(input, POST_ALLOWED)
}

fn write_children(element: ElementRef<'_>, allowed: AllowList, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                out.push_str(&html_escape::encode_text(text));
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    write_element(child_element, allowed, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, allowed: AllowList, out: &mut String) {
    let name = element.value().name();
    let Some((_, attributes)) = allowed.iter().find(|(tag, _)| *tag == name) else {
        write_children(element, allowed, out);
        return;
    };

    out.push('<');
    out.push_str(name);
    for (attr, value) in element.value().attrs() {
        if !attributes.contains(&attr) {
            continue;
        }
        if URL_ATTRIBUTES.contains(&attr) && !allowed_url(value) {
            continue;
        }
        out.push_str(&format!(
            " {attr}=\"{}\"",
            html_escape::encode_double_quoted_attribute(value)
        ));
    }

    if VOID_ELEMENTS.contains(&name) {
        out.push_str(" />");
        return;
    }
    out.push('>');
    write_children(element, allowed, out);
    out.push_str(&format!("</{name}>"));
}

/// Parse a written date relative to `today`.
///
/// Accepts ISO dates and datetimes, RFC 3339, `m/d/Y`, `d-m-Y`, `d.m.Y`,
/// written month names, `today`/`tomorrow`/`yesterday` and offsets such as
/// `+30 days`.
pub fn parse_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "today" | "now" => return Some(today),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        _ => {}
    }

    if let Some(caps) = RELATIVE_DATE.captures(trimmed) {
        let amount: i64 = caps[1].parse().ok()?;
        return offset_date(today, amount, &caps[2].to_ascii_lowercase());
    }

    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%B %d, %Y", "%B %d %Y",
        "%d %B %Y", "%b %d, %Y", "%b %d %Y", "%d %b %Y",
    ];
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
    {
        return Some(date);
    }

    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    if let Some(datetime) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Some(datetime.date());
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

fn offset_date(today: NaiveDate, amount: i64, unit: &str) -> Option<NaiveDate> {
    let magnitude = amount.unsigned_abs();
    let forward = amount >= 0;
    match unit {
        "day" | "week" => {
            let days = Days::new(if unit == "week" { magnitude * 7 } else { magnitude });
            if forward {
                today.checked_add_days(days)
            } else {
                today.checked_sub_days(days)
            }
        }
        "month" | "year" => {
            let months = if unit == "year" { magnitude * 12 } else { magnitude };
            let months = Months::new(u32::try_from(months).ok()?);
            if forward {
                today.checked_add_months(months)
            } else {
                today.checked_sub_months(months)
            }
        }
        _ => None,
    }
}
