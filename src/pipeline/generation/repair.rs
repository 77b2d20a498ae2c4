// Best-effort textual repair of a JSON object emitted by a model.
// The output is not guaranteed to parse; callers treat a parse failure as an
// ordinary outcome and fall back.

use std::sync::LazyLock;

use regex::Regex;

const FENCE: &str = "```";

static KEY_AT_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"("[^"]+")\s*:\s*$"#).expect("valid regex"));
static KEY_BEFORE_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"("[^"]+")\s*:\s*,"#).expect("valid regex"));
static KEY_BEFORE_BRACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"("[^"]+")\s*:\s*\}"#).expect("valid regex"));
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

/// Repair a possibly fenced, truncated or padded JSON object.
///
/// Passes, in order: fence stripping, leading prose removal, unterminated
/// string closing, delimiter balancing, truncation after the root object,
/// valueless-key patching, and trailing comma removal.
pub fn repair_json_structure(raw: &str) -> String {
    let mut text = strip_code_fence(raw.trim()).to_string();
    text = skip_leading_prose(&text).to_string();
    text = close_unterminated_string(&text);
    text = balance_delimiters(&text);
    text = truncate_after_root_object(&text).to_string();
    text = patch_valueless_keys(&text);
    TRAILING_COMMA_RE.replace_all(&text, "$1").into_owned()
}

/// Keep only the interior of a fenced block (```json ... ```).
fn strip_code_fence(text: &str) -> &str {
    if !text.starts_with(FENCE) {
        return text;
    }
    let Some(newline) = text.find('\n') else {
        return text;
    };
    let start = newline + 1;
    match text.rfind(FENCE) {
        Some(end) if end > start => text[start..end].trim(),
        // Opening fence only: the closing fence was lost to truncation.
        _ => text[start..].trim(),
    }
}

/// Drop any commentary the model wrote before the object.
///
/// The object starts at the first `{` followed by a key or by `}`; braces in
/// prose such as `{plan}` are skipped. Without such a brace the first `{` wins.
fn skip_leading_prose(text: &str) -> &str {
    let opens_object = |i: usize| {
        matches!(text[i + 1..].trim_start().chars().next(), Some('"') | Some('}'))
    };
    let start = text
        .match_indices('{')
        .map(|(i, _)| i)
        .find(|&i| opens_object(i))
        .or_else(|| text.find('{'));
    match start {
        Some(start) => &text[start..],
        None => text,
    }
}

/// Scan the text honouring backslash escapes inside string literals.
/// Returns `(inside_string, pending_escape)` at end of text.
fn string_state_at_end(text: &str) -> (bool, bool) {
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }
    }
    (in_string, escaped)
}

fn close_unterminated_string(text: &str) -> String {
    let mut out = text.to_string();
    let (in_string, pending_escape) = string_state_at_end(text);
    if in_string {
        // A dangling escape would swallow the closing quote.
        if pending_escape {
            out.pop();
        }
        out.push('"');
    }
    out
}

fn closer_for(open: char) -> char {
    if open == '{' {
        '}'
    } else {
        ']'
    }
}

/// Make every brace and bracket outside string literals pair up.
///
/// Missing closers are appended in nesting order. A closer that jumps over an
/// unclosed inner opener gets the inner closer inserted first; a closer with
/// no matching opener at all is dropped.
fn balance_delimiters(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' | '[' => {
                stack.push(c);
                out.push(c);
            }
            '}' | ']' => {
                let opener = if c == '}' { '{' } else { '[' };
                if let Some(depth) = stack.iter().rposition(|&o| o == opener) {
                    while stack.len() > depth + 1 {
                        if let Some(inner) = stack.pop() {
                            out.push(closer_for(inner));
                        }
                    }
                    stack.pop();
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    while let Some(open) = stack.pop() {
        out.push(closer_for(open));
    }
    out
}

/// `"key":` with no value before end-of-text, a comma or a closing brace
/// becomes `"key":""`.
fn patch_valueless_keys(text: &str) -> String {
    let text = KEY_AT_END_RE.replace_all(text, r#"$1:"""#);
    let text = KEY_BEFORE_COMMA_RE.replace_all(&text, r#"$1:"","#);
    KEY_BEFORE_BRACE_RE
        .replace_all(&text, r#"$1:""}"#)
        .into_owned()
}

/// Cut everything after the brace that closes the leading object.
/// Expects balanced delimiters; text not starting with `{` is returned as is.
fn truncate_after_root_object(text: &str) -> &str {
    if !text.starts_with('{') {
        return text;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &text[..=i];
                }
            }
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    /// Count delimiters outside string literals.
    fn structural_counts(text: &str) -> (usize, usize, usize, usize) {
        let (mut ob, mut cb, mut os, mut cs) = (0, 0, 0, 0);
        let mut in_string = false;
        let mut escaped = false;
        for c in text.chars() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => ob += 1,
                '}' => cb += 1,
                '[' => os += 1,
                ']' => cs += 1,
                _ => {}
            }
        }
        (ob, cb, os, cs)
    }

    fn parse(text: &str) -> Value {
        serde_json::from_str(&repair_json_structure(text)).unwrap()
    }

    #[test]
    fn valid_json_unchanged() {
        let input = r#"{"introduction":"I","sections":[],"conclusion":"C"}"#;
        assert_eq!(repair_json_structure(input), input);
    }

    #[test]
    fn appends_missing_final_brace() {
        let input = r#"{"introduction":"I","sections":[{"title":"S","subsections":[{"title":"T","description":"D"}]}],"conclusion":"C""#;
        let repaired = repair_json_structure(input);
        assert_eq!(repaired, format!("{input}}}"));
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["sections"][0]["subsections"][0]["description"], "D");
        assert_eq!(value["conclusion"], "C");
    }

    #[test]
    fn closes_nested_delimiters_in_order() {
        let value = parse(r#"{"sections":[{"title":"S","subsections":[{"title":"T""#);
        assert_eq!(value["sections"][0]["subsections"][0]["title"], "T");
    }

    #[test]
    fn unbalanced_inputs_come_out_balanced() {
        let inputs = [
            r#"{"a":[1,2"#,
            r#"{"a":{"b":{"c":[{"d":1"#,
            r#"[[{"#,
            r#"{"a":1}}]"#,
            r#"{"a":[1}"#,
            r#"{"a":"text with { and [ inside"#,
        ];
        for input in inputs {
            let repaired = repair_json_structure(input);
            let (ob, cb, os, cs) = structural_counts(&repaired);
            assert_eq!(ob, cb, "braces unbalanced for {input:?} -> {repaired:?}");
            assert_eq!(os, cs, "brackets unbalanced for {input:?} -> {repaired:?}");
        }
    }

    #[test]
    fn key_at_end_maps_to_empty_string() {
        let value = parse(r#"{"introduction":"I","conclusion":"#);
        assert_eq!(value["introduction"], "I");
        assert_eq!(value["conclusion"], "");
    }

    #[test]
    fn key_at_end_with_whitespace() {
        let value = parse("{\"title\": \"x\", \"description\":   ");
        assert_eq!(value["description"], "");
    }

    #[test]
    fn key_before_comma_maps_to_empty_string() {
        let value = parse(r#"{"a": , "b": "x"}"#);
        assert_eq!(value["a"], "");
        assert_eq!(value["b"], "x");
    }

    #[test]
    fn key_before_brace_maps_to_empty_string() {
        let value = parse(r#"{"a": "x", "b": }"#);
        assert_eq!(value["b"], "");
    }

    #[test]
    fn nested_key_truncation() {
        let value = parse(r#"{"sections":[{"title":"S","subsections":[{"title":"T","description":"#);
        assert_eq!(value["sections"][0]["subsections"][0]["description"], "");
    }

    #[test]
    fn removes_trailing_commas() {
        let value = parse(r#"{"a": [1, 2, ], "b": {"c": 1,},}"#);
        assert_eq!(value["a"], serde_json::json!([1, 2]));
        assert_eq!(value["b"]["c"], 1);
    }

    #[test]
    fn dangling_comma_after_truncation() {
        let value = parse(r#"{"introduction":"I","#);
        assert_eq!(value["introduction"], "I");
    }

    #[test]
    fn strips_json_fence() {
        let value = parse("```json\n{\"a\": 1}\n```");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn strips_fence_without_closing() {
        let value = parse("```json\n{\"a\": 1");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn drops_trailing_commentary() {
        let value = parse("{\"a\": 1}\n\nI hope this plan helps! Let me know.");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn braces_in_trailing_commentary_are_dropped() {
        let value = parse(
            "{\"introduction\":\"I\",\"sections\":[],\"conclusion\":\"C\"}\nLet me know if you want {more} detail.",
        );
        assert_eq!(value["introduction"], "I");
        assert_eq!(value["conclusion"], "C");
    }

    #[test]
    fn braces_in_leading_commentary_are_skipped() {
        let value = parse(
            "Here is the {plan}:\n{\"introduction\":\"I\",\"sections\":[],\"conclusion\":\"C\"}",
        );
        assert_eq!(value["introduction"], "I");
        assert_eq!(value["sections"], serde_json::json!([]));
        assert_eq!(value["conclusion"], "C");
    }

    #[test]
    fn empty_object_after_braced_prose() {
        let value = parse("Result {x}: {}");
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn drops_leading_commentary() {
        let value = parse("Here is the plan you asked for:\n{\"a\": 1}");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn closes_truncated_string_value() {
        let value = parse(r#"{"introduction":"Rust makes systems progr"#);
        assert_eq!(value["introduction"], "Rust makes systems progr");
    }

    #[test]
    fn escaped_quotes_do_not_confuse_scanner() {
        let value = parse(r#"{"a":"say \"hi\" {now}","b":[1"#);
        assert_eq!(value["a"], "say \"hi\" {now}");
        assert_eq!(value["b"], serde_json::json!([1]));
    }

    #[test]
    fn inserts_inner_closer_before_outer() {
        let value = parse(r#"{"a":[1,2}"#);
        assert_eq!(value["a"], serde_json::json!([1, 2]));
    }

    #[test]
    fn hopeless_input_still_returns_text() {
        let repaired = repair_json_structure("no structure here at all");
        assert!(serde_json::from_str::<Value>(&repaired).is_err());
    }
}
