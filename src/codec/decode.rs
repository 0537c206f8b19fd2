use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Unquoted,
    Quoted,
}

/// Parse CSV text into rows of raw string fields.
///
/// Quoted fields may carry commas, doubled quotes and line breaks. Rows end on
/// `\r\n`, a lone `\r` or a lone `\n` outside quotes. No type inference happens
/// here; every field comes back as text.
pub fn decode(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut state = ScanState::Unquoted;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            ScanState::Quoted => match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => state = ScanState::Unquoted,
                _ => field.push(c),
            },
            ScanState::Unquoted => match c {
                '"' => state = ScanState::Quoted,
                ',' => row.push(mem::take(&mut field)),
                '\r' | '\n' => {
                    if c == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    row.push(mem::take(&mut field));
                    rows.push(mem::take(&mut row));
                }
                _ => field.push(c),
            },
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(v: &[&[&str]]) -> Vec<Vec<String>> {
        v.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn multi_line_quoted_field() {
        let parsed = decode("h1,h2\r\n\"line1\nline2\",x\r\n");
        assert_eq!(parsed, rows(&[&["h1", "h2"], &["line1\nline2", "x"]]));
    }

    #[test]
    fn doubled_quotes_and_commas() {
        let parsed = decode("a\r\n\"a,b\"\"c\"");
        assert_eq!(parsed, rows(&[&["a"], &["a,b\"c"]]));
    }

    #[test]
    fn all_line_endings_end_rows() {
        let parsed = decode("a,b\nc,d\re,f\r\ng,h");
        assert_eq!(
            parsed,
            rows(&[&["a", "b"], &["c", "d"], &["e", "f"], &["g", "h"]])
        );
    }

    #[test]
    fn trailing_empty_field_is_kept() {
        assert_eq!(decode("a,"), rows(&[&["a", ""]]));
        assert_eq!(decode("a,\"\""), rows(&[&["a", ""]]));
    }

    #[test]
    fn quote_inside_unquoted_field_toggles_quoting() {
        assert_eq!(decode("ab\"c,d\"e,f"), rows(&[&["abc,de", "f"]]));
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(decode("").is_empty());
        assert!(decode("\"\"").is_empty());
    }

    #[test]
    fn blank_line_is_a_single_empty_field() {
        assert_eq!(decode("a\r\n\r\nb"), rows(&[&["a"], &[""], &["b"]]));
    }
}
