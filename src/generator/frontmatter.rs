use std::collections::HashMap;

use log::debug;

/// Flat `key: value` pairs from a frontmatter block.
pub(crate) type FrontmatterMap = HashMap<String, String>;

/// Splits a document into its frontmatter and the text after the closing `---`.
///
/// A missing or unterminated block is not an error: the map comes back empty and
/// the text is returned untouched, so callers can fall back to defaults.
pub(crate) fn parse(raw: &str) -> (FrontmatterMap, &str) {
    let mut fields = FrontmatterMap::new();

    let Some(rest) = raw.strip_prefix("---\n").or_else(|| raw.strip_prefix("---\r\n")) else {
        return (fields, raw);
    };

    let Some((header_end, body_start)) = find_closing_delimiter(rest) else {
        debug!("frontmatter opened but never closed; treating as absent");
        return (fields, raw);
    };

    for line in rest[..header_end].lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        fields.insert(key.trim().to_string(), unquote(value.trim()).to_string());
    }

    (fields, &rest[body_start..])
}

// (start of the delimiter line, start of the line after it)
fn find_closing_delimiter(text: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim_end_matches(['\n', '\r']) == "---" {
            return Some((offset, end));
        }
        offset = end;
    }
    None
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fields_and_body() {
        let raw = "---\ntitle: Hello World\ndate: 2024-01-15\n---\nSome body text.";
        let (fields, body) = parse(raw);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["title"], "Hello World");
        assert_eq!(fields["date"], "2024-01-15");
        assert_eq!(body, "Some body text.");
    }

    #[test]
    fn text_without_frontmatter_is_untouched() {
        let inputs = [
            "# Just Markdown\n\nNo frontmatter here.",
            "",
            "--- \ntitle: x\n---\n",
            " ---\na: b\n---\n",
        ];
        for raw in inputs {
            let (fields, body) = parse(raw);
            assert!(fields.is_empty());
            assert_eq!(body, raw);
        }
    }

    #[test]
    fn unclosed_block_is_treated_as_absent() {
        let raw = "---\ntitle: Test\n# No closing\n";
        let (fields, body) = parse(raw);

        assert!(fields.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn body_is_returned_verbatim() {
        let (_, body) = parse("---\ntitle: x\n---\n\n  indented\n\n");
        assert_eq!(body, "\n  indented\n\n");
    }

    #[test]
    fn closing_delimiter_must_stand_alone() {
        let (fields, body) = parse("---\ntitle: a --- b\n----\nkey: v\n---\nbody");
        assert_eq!(fields["title"], "a --- b");
        assert_eq!(fields["key"], "v");
        assert!(!fields.contains_key("----"));
        assert_eq!(body, "body");
    }

    #[test]
    fn empty_block_and_trailing_delimiter() {
        let (fields, body) = parse("---\n---\nbody");
        assert!(fields.is_empty());
        assert_eq!(body, "body");

        let (fields, body) = parse("---\ntitle: x\n---");
        assert_eq!(fields["title"], "x");
        assert_eq!(body, "");
    }

    #[test]
    fn skips_malformed_lines() {
        let raw = "---\n\njust some words\ntitle: Ok\n   \n: orphan\n---\n";
        let (fields, _) = parse(raw);

        assert_eq!(fields["title"], "Ok");
        assert_eq!(fields[""], "orphan");
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn splits_on_first_colon_only() {
        let raw = "---\ntitle: Rust: the good parts\nurl: https://example.com\n---\n";
        let (fields, _) = parse(raw);
        assert_eq!(fields["title"], "Rust: the good parts");
        assert_eq!(fields["url"], "https://example.com");
    }

    #[test]
    fn strips_one_pair_of_matching_quotes() {
        let raw = "---\na: \"double\"\nb: 'single'\nc: \"mismatched'\nd: ''nested''\ne: \"\n---\n";
        let (fields, _) = parse(raw);

        assert_eq!(fields["a"], "double");
        assert_eq!(fields["b"], "single");
        assert_eq!(fields["c"], "\"mismatched'");
        assert_eq!(fields["d"], "'nested'");
        assert_eq!(fields["e"], "\"");
    }

    #[test]
    fn last_duplicate_wins() {
        let (fields, _) = parse("---\ntitle: first\ntitle: second\n---\n");
        assert_eq!(fields["title"], "second");
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let (fields, body) = parse("---\r\ntitle: Windows\r\ndate: 2023-02-01\r\n---\r\nBody\r\n");
        assert_eq!(fields["title"], "Windows");
        assert_eq!(fields["date"], "2023-02-01");
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn rendered_pairs_parse_back() {
        let pairs = [("title", "A post"), ("date", "2022-12-31"), ("thumbnail", "img/a.png")];
        let mut raw = String::from("---\n");
        for (key, value) in pairs {
            raw.push_str(&format!("{key}: {value}\n"));
        }
        raw.push_str("---\n");

        let (fields, _) = parse(&raw);
        for (key, value) in pairs {
            assert_eq!(fields[key], value);
        }
    }
}
