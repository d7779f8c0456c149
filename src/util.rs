/// Escape substituted for every line break embedded in a status line.
const LINE_BREAK_ESCAPE: &str = "\\n";

/// Collapse transcript text into a single line safe for status-line
/// embedding: trailing line endings are dropped, every remaining CRLF,
/// lone CR, or lone LF becomes a literal `\n`.
pub fn sanitize_line(text: &str) -> String {
    let text = text.trim_end_matches('\n').trim_end_matches('\r');
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(LINE_BREAK_ESCAPE);
            }
            '\n' => out.push_str(LINE_BREAK_ESCAPE),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::sanitize_line;

    #[test]
    fn replaces_line_breaks() {
        assert_eq!(sanitize_line("a\nb"), "a\\nb");
        assert_eq!(sanitize_line("a\rb"), "a\\nb");
        assert_eq!(sanitize_line("a\r\nb"), "a\\nb");
        assert_eq!(sanitize_line("a"), "a");
    }

    #[test]
    fn strips_trailing_line_endings() {
        assert_eq!(sanitize_line("220 ready\r\n"), "220 ready");
        assert_eq!(sanitize_line("220-hello\r\n220 ready\r\n"), "220-hello\\n220 ready");
        assert_eq!(sanitize_line("x\n\n"), "x");
        assert_eq!(sanitize_line(""), "");
    }

    #[test]
    fn output_has_no_raw_breaks() {
        for input in ["\r\n\r\n", "a\rb\nc\r\nd", "\rmid\n", "plain"] {
            let out = sanitize_line(input);
            assert!(!out.contains('\r'), "raw CR in {out:?}");
            assert!(!out.contains('\n'), "raw LF in {out:?}");
        }
    }

    #[test]
    fn idempotent() {
        for input in ["a\r\nb\rc\nd", "220 ready\r\n", "", "already\\nescaped"] {
            let once = sanitize_line(input);
            assert_eq!(sanitize_line(&once), once);
        }
    }
}
