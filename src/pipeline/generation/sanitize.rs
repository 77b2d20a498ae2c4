//! Normalizes model-written section text into the canonical markup subset.
//!
//! Only a known set of malformed patterns is handled: fenced code, leaked
//! meta-commentary, Markdown inline code, and `<code>` tags without the
//! highlighting class. Anything else passes through untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::GenerationError;

struct SanitizeRules {
    paired_fence: Regex,
    stray_fence: Regex,
    meta_line: Regex,
    markup_tag: Regex,
    inline_code: Regex,
    code_open: Regex,
    class_attr: Regex,
}

impl SanitizeRules {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            // Optional language tag only when it sits alone on the fence line.
            paired_fence: Regex::new(r"(?s)```(?:[\w+#.-]*[ \t]*\r?\n)?(.*?)```")?,
            stray_fence: Regex::new(r"(?m)```(?:[\w+#.-]*[ \t]*(?:\r?\n|$))?")?,
            meta_line: Regex::new(
                r"(?i)\b(thinking|thought process|reasoning|strategy|checklist|analysis|steps|self-evaluation|confidence score|my plan)\b",
            )?,
            markup_tag: Regex::new(r"</?[a-zA-Z][a-zA-Z0-9]*(?:\s[^>]*)?/?>")?,
            inline_code: Regex::new(r"`+([^`\n]+)`+")?,
            code_open: Regex::new(r"<code(\s[^>]*)?>")?,
            class_attr: Regex::new(r#"(?:^|\s+)class\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>"']+)"#)?,
        })
    }
}

static RULES: LazyLock<Result<SanitizeRules, regex::Error>> = LazyLock::new(SanitizeRules::compile);

/// Highlighting tag for a language name: lowercased, whitespace runs as `-`,
/// with the usual spellings for C++ / C# / F#.
pub fn canonical_language_tag(language: &str) -> String {
    let lowered = language.trim().to_lowercase();
    match lowered.as_str() {
        "c++" | "cpp" => "cpp".to_string(),
        "c#" | "csharp" => "csharp".to_string(),
        "f#" | "fsharp" => "fsharp".to_string(),
        _ => lowered.split_whitespace().collect::<Vec<_>>().join("-"),
    }
}

/// Sanitize section content. Never fails: on an internal error the input is
/// returned unchanged.
pub fn sanitize_content(raw: &str, code_language: &str) -> String {
    or_original(raw, try_sanitize_content(raw, code_language))
}

fn or_original(raw: &str, result: Result<String, GenerationError>) -> String {
    match result {
        Ok(clean) => clean,
        Err(e) => {
            tracing::warn!(error = %e, "Content sanitization failed, keeping raw text");
            raw.to_string()
        }
    }
}

pub fn try_sanitize_content(raw: &str, code_language: &str) -> Result<String, GenerationError> {
    let rules = RULES
        .as_ref()
        .map_err(|e| GenerationError::Sanitization(e.to_string()))?;
    let tag = canonical_language_tag(code_language);

    let text = rules.paired_fence.replace_all(raw, "$1");
    let text = rules.stray_fence.replace_all(&text, "");
    let text = drop_meta_commentary(rules, &text);
    let text = rules.inline_code.replace_all(&text, "<strong>$1</strong>");
    let text = rules.code_open.replace_all(&text, |caps: &Captures| {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let others = rules.class_attr.replace_all(attrs, "");
        let others = others.trim();
        if others.is_empty() {
            format!(r#"<code class="language-{tag}">"#)
        } else {
            format!(r#"<code class="language-{tag}" {others}>"#)
        }
    });

    Ok(text.into_owned())
}

/// Drop reasoning the model leaked into its answer.
///
/// A line mentioning a meta keyword opens a skip region and is always dropped;
/// the first other line carrying markup closes the region and is kept.
fn drop_meta_commentary(rules: &SanitizeRules, text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut skipping = false;

    for line in text.split('\n') {
        if rules.meta_line.is_match(line) {
            tracing::debug!(line = %line.trim(), "Dropping meta-commentary");
            skipping = true;
            continue;
        }
        if skipping && rules.markup_tag.is_match(line) {
            skipping = false;
        }
        if !skipping {
            kept.push(line);
        }
    }

    kept.join("\n")
}
