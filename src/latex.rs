//! LaTeX-aware text primitives for the translation pipeline: protected-span
//! placeholders and line classification.
//!
//! Math spans (`$...$`, `$$...$$`) and `\cite{...}` commands are swapped for
//! unique tokens before a block is sent to the translator and substituted
//! back afterwards, so the external service never sees markup it could mangle.

use regex::Regex;
use std::sync::LazyLock;

static RE_DISPLAY_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$.*?\$\$").expect("display math regex"));
static RE_INLINE_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:[^$\\]|\\.)*\$").expect("inline math regex"));
static RE_CITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\cite\{[^}]*\}").expect("cite regex"));

static RE_BEGIN_ENV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\begin\{(\w+)\}").expect("begin env regex"));
static RE_END_ENV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\end\{(\w+)\}").expect("end env regex"));
static RE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\\(?:chapter|section|subsection|subsubsection|paragraph|title|author))\{(.*)\}")
        .expect("heading regex")
});
static RE_CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*\\caption)\{(.*)\}(.*)$").expect("caption regex"));
static RE_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\\item)(.*)$").expect("item regex"));

/// Ordered token -> original-text table for one translation unit.
pub type PlaceholderTable = Vec<(String, String)>;

/// Replace each protected span with a unique placeholder token.
///
/// Display math is handled before inline math so `$$...$$` is never consumed
/// as two empty inline spans. The counter is shared across span kinds, so
/// tokens are unique within the returned table.
pub fn placeholderize(text: &str) -> (String, PlaceholderTable) {
    let mut table = PlaceholderTable::new();
    let mut i = 0usize;

    let mut out = replace_spans(text, &RE_DISPLAY_MATH, "MATHD", &mut i, &mut table);
    out = replace_spans(&out, &RE_INLINE_MATH, "MATH", &mut i, &mut table);
    out = replace_spans(&out, &RE_CITE, "CITE", &mut i, &mut table);

    (out, table)
}

fn replace_spans(
    text: &str,
    re: &Regex,
    kind: &str,
    counter: &mut usize,
    table: &mut PlaceholderTable,
) -> String {
    re.replace_all(text, |caps: &regex::Captures<'_>| {
        let token = format!("__{}_{}__", kind, *counter);
        *counter += 1;
        table.push((token.clone(), caps[0].to_string()));
        token
    })
    .into_owned()
}

/// Substitute the original text back in for each placeholder token.
///
/// Tokens are replaced literally wherever the translator left them, so a
/// translation that reorders the surrounding words still restores every
/// protected span byte-exactly.
pub fn restore_placeholders(text: &str, table: &PlaceholderTable) -> String {
    let mut out = text.to_string();
    for (token, original) in table {
        out = out.replace(token, original);
    }
    out
}

/// How one input line participates in translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `\begin{name}` at the start of the (trimmed) line.
    BeginEnv(String),
    /// `\end{name}` at the start of the (trimmed) line.
    EndEnv(String),
    /// A sectioning command whose brace content is translatable.
    Heading { command: String, inner: String },
    /// A `\caption{...}` line; `pre` ends with `\caption`, `post` trails `}`.
    Caption {
        pre: String,
        inner: String,
        post: String,
    },
    /// `\item` with trailing translatable text (empty `rest` stays verbatim).
    Item { rest: String },
    /// Comment, blank, or other command line: flush the paragraph and copy.
    Passthrough,
    /// Plain prose, accumulated into the current paragraph.
    Prose,
}

pub fn classify_line(line: &str) -> LineKind {
    let stripped = line.trim();

    if let Some(caps) = RE_BEGIN_ENV.captures(stripped) {
        return LineKind::BeginEnv(caps[1].to_string());
    }
    if let Some(caps) = RE_END_ENV.captures(stripped) {
        return LineKind::EndEnv(caps[1].to_string());
    }
    if let Some(caps) = RE_HEADING.captures(stripped) {
        return LineKind::Heading {
            command: caps[1].to_string(),
            inner: caps[2].to_string(),
        };
    }
    if let Some(caps) = RE_CAPTION.captures(line) {
        return LineKind::Caption {
            pre: caps[1].to_string(),
            inner: caps[2].to_string(),
            post: caps[3].to_string(),
        };
    }
    if !stripped.starts_with('%') {
        if let Some(caps) = RE_ITEM.captures(line) {
            return LineKind::Item {
                rest: caps[2].to_string(),
            };
        }
    }
    if stripped.is_empty() || stripped.starts_with('%') || stripped.starts_with('\\') {
        return LineKind::Passthrough;
    }

    LineKind::Prose
}

/// Classify a caption line on its own, for lines inside caption-bearing
/// environments where the full classifier is not consulted.
pub fn match_caption(line: &str) -> Option<(String, String, String)> {
    RE_CAPTION.captures(line).map(|caps| {
        (
            caps[1].to_string(),
            caps[2].to_string(),
            caps[3].to_string(),
        )
    })
}

/// Rewrite the first-to-last brace span of a heading line with new content,
/// keeping the command and surrounding indentation untouched.
pub fn replace_brace_span(line: &str, replacement: &str) -> String {
    match (line.find('{'), line.rfind('}')) {
        (Some(open), Some(close)) if close > open => {
            format!("{}{{{}}}{}", &line[..open], replacement, &line[close + 1..])
        }
        _ => line.to_string(),
    }
}
