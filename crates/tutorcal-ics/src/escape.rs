//! RFC 5545 text escaping and line folding.

/// Maximum length of one content line, in octets, excluding the line break.
pub const MAX_LINE_OCTETS: usize = 75;

/// Escapes a TEXT property value.
///
/// Backslash, semicolon, comma and newline are escaped; carriage returns are
/// dropped so `\r\n` line breaks collapse to a single `\n`.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_text`].
///
/// Accepts `\N` as a newline, as RFC 5545 allows either case.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Folds a content line so no physical line exceeds [`MAX_LINE_OCTETS`].
///
/// Continuation lines start with a single space, which counts towards the
/// limit. Multi-byte characters are never split.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 3 * (line.len() / MAX_LINE_OCTETS + 1));
    let mut used = 0;
    for c in line.chars() {
        let width = c.len_utf8();
        if used + width > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            used = 1;
        }
        out.push(c);
        used += width;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use icalendar::parser::unfold;

    mod escaping {
        use super::*;

        #[test]
        fn escapes_special_characters() {
            assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
        }

        #[test]
        fn strips_carriage_returns() {
            assert_eq!(escape_text("line one\r\nline two\r"), "line one\\nline two");
        }

        #[test]
        fn leaves_plain_text_alone() {
            assert_eq!(escape_text("Algebra: chapter 3 (review)"), "Algebra: chapter 3 (review)");
        }

        #[test]
        fn unescape_reverses_escape() {
            let original = "Essay, draft; part \\2\nwith notes";
            assert_eq!(unescape_text(&escape_text(original)), original);
        }

        #[test]
        fn unescape_accepts_uppercase_newline() {
            assert_eq!(unescape_text("a\\Nb"), "a\nb");
        }

        #[test]
        fn unescape_keeps_trailing_backslash() {
            assert_eq!(unescape_text("oops\\"), "oops\\");
        }
    }

    mod folding {
        use super::*;

        #[test]
        fn short_lines_are_untouched() {
            let line = "SUMMARY:Algebra";
            assert_eq!(fold_line(line), line);
        }

        #[test]
        fn exactly_max_is_untouched() {
            let line = "X".repeat(MAX_LINE_OCTETS);
            assert_eq!(fold_line(&line), line);
        }

        #[test]
        fn long_lines_fold_within_limit() {
            let line = format!("DESCRIPTION:{}", "a".repeat(200));
            let folded = fold_line(&line);

            for physical in folded.split("\r\n") {
                assert!(physical.len() <= MAX_LINE_OCTETS, "{physical:?}");
            }
            assert!(folded.split("\r\n").skip(1).all(|l| l.starts_with(' ')));
            assert_eq!(unfold(&folded), line);
        }

        #[test]
        fn never_splits_multibyte_characters() {
            let line = format!("SUMMARY:{}", "é".repeat(60));
            let folded = fold_line(&line);

            for physical in folded.split("\r\n") {
                assert!(physical.len() <= MAX_LINE_OCTETS);
            }
            assert_eq!(unfold(&folded), line);
        }
    }
}
