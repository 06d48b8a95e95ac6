use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

pub(super) const ELLIPSIS: &str = "...";

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

cached_regex!(html_tag, r"<[^>]+>");
cached_regex!(bold, r"\*\*([^*]+)\*\*");
cached_regex!(italic, r"\*([^*]+)\*");
cached_regex!(heading, r"(?m)^[ \t]*#{1,6}[ \t]+");
cached_regex!(link, r"\[([^\]]+)\]\([^)]+\)");
cached_regex!(paragraph_break, r"\n[ \t]*\n");

/// `my-first-post` -> `My First Post`
pub(super) fn title_from_stem(stem: &str) -> String {
    stem.replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub(super) fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Builds the stable identifier `<slug>-<year>` used for artifact names and
/// index merging.
pub(super) fn make_id(title: &str, date: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let slug = cleaned.split_whitespace().collect::<Vec<_>>().join("-");

    format!("{slug}-{}", year_of(date))
}

// a date without any hyphen is used whole
fn year_of(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => format!("{:04}", parsed.year()),
        Err(_) => date.split('-').next().unwrap_or_default().to_string(),
    }
}

/// Plain-text preview of a markdown body: markup removed, first paragraph only,
/// cut on a word boundary when longer than `max_length` characters.
pub(super) fn make_excerpt(body: &str, max_length: usize) -> String {
    let text = body.replace("\r\n", "\n");
    let text = html_tag().replace_all(&text, "");
    let text = bold().replace_all(&text, "$1");
    let text = italic().replace_all(&text, "$1");
    let text = heading().replace_all(&text, "");
    let text = link().replace_all(&text, "$1");

    let first_paragraph = paragraph_break()
        .split(&text)
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or_default();

    truncate_at_word(first_paragraph, max_length)
}

fn truncate_at_word(text: &str, max_length: usize) -> String {
    let Some((cut, next)) = text.char_indices().nth(max_length) else {
        return text.to_string();
    };

    let head = &text[..cut];
    let kept = if next.is_whitespace() {
        head
    } else {
        // a single word longer than the limit is cut hard
        match head.rfind(char::is_whitespace) {
            Some(pos) => &head[..pos],
            None => head,
        }
    };

    format!("{}{ELLIPSIS}", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_stem_title_cases_words() {
        assert_eq!(title_from_stem("my-first-post"), "My First Post");
        assert_eq!(title_from_stem("RUST-in-2024"), "Rust In 2024");
        assert_eq!(title_from_stem("single"), "Single");
        assert_eq!(title_from_stem("don't-panic"), "Don't Panic");
    }

    #[test]
    fn today_is_iso_formatted() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert!(NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn make_id_slugifies_title_and_appends_year() {
        assert_eq!(make_id("Hello World", "2024-01-15"), "hello-world-2024");
        assert_eq!(make_id("  What's   New, Rust?! ", "2023-12-01"), "whats-new-rust-2023");
        assert_eq!(make_id("Café au lait", "2021-06-30"), "caf-au-lait-2021");
        assert_eq!(make_id("tabs\tand\nnewlines", "2020-02-02"), "tabs-and-newlines-2020");
    }

    #[test]
    fn make_id_is_deterministic() {
        let a = make_id("Same Title", "2024-05-05");
        let b = make_id("Same Title", "2024-11-30");
        assert_eq!(a, b);
        assert_ne!(a, make_id("Other Title", "2024-05-05"));
    }

    #[test]
    fn make_id_year_fallbacks() {
        // not a calendar date, but still split on the first hyphen
        assert_eq!(make_id("Post", "2024-13-45"), "post-2024");
        assert_eq!(make_id("Post", "2019-03"), "post-2019");
        assert_eq!(make_id("Post", "2024-01-15T08:00"), "post-2024");
        // no hyphen at all: the whole string becomes the year
        assert_eq!(make_id("Post", "March 2020"), "post-March 2020");
        assert_eq!(make_id("Post", ""), "post-");
    }

    #[test]
    fn excerpt_strips_markup() {
        let paragraph = concat!(
            "Some **bold** and *italic* text ",
            "with a [link](https://x.dev) and <b>html</b>."
        );

        let body = format!("## Intro\n\n{paragraph}\n\nSecond paragraph.");
        assert_eq!(make_excerpt(&body, 200), "Intro");

        let body = format!("{paragraph}\n\nSecond paragraph.");
        assert_eq!(
            make_excerpt(&body, 200),
            "Some bold and italic text with a link and html."
        );
    }

    #[test]
    fn excerpt_skips_leading_blank_lines() {
        assert_eq!(make_excerpt("\n\n  \nFirst.\r\n\r\nSecond.", 200), "First.");
        assert_eq!(make_excerpt("", 200), "");
    }

    #[test]
    fn excerpt_keeps_short_paragraph_intact() {
        let body = "exactly ten";
        assert_eq!(make_excerpt(body, body.chars().count()), body);
    }

    #[test]
    fn excerpt_truncates_on_word_boundary() {
        let body = "The quick brown fox jumps over the lazy dog";
        assert_eq!(make_excerpt(body, 12), "The quick...");
        // limit falls right before a space: the whole word fits
        assert_eq!(make_excerpt(body, 9), "The quick...");
        assert_eq!(make_excerpt(body, 10), "The quick...");
    }

    #[test]
    fn excerpt_length_is_bounded() {
        let words = ["alpha", "beta", "gamma", "δέλτα", "epsilon", "zeta"];
        let body: Vec<&str> = words.iter().cycle().take(120).copied().collect();
        let body = body.join(" ");

        for max in [7, 50, 199, 200, 201] {
            let excerpt = make_excerpt(&body, max);
            let kept = excerpt.strip_suffix(ELLIPSIS).unwrap();
            assert!(kept.chars().count() <= max);
            assert!(excerpt.chars().count() <= max + ELLIPSIS.chars().count());
            if !kept.is_empty() {
                let last_word = kept.rsplit(' ').next().unwrap();
                assert!(words.contains(&last_word), "cut mid-word: {last_word:?}");
            }
        }
    }

    #[test]
    fn excerpt_hard_cuts_a_single_long_word() {
        assert_eq!(make_excerpt("abcdefghij", 4), "abcd...");
    }
}
