//! Line-based `key=value` codec used by the ranking backing files
//!
//! Format rules:
//! - Blank lines and lines whose first non-blank character is `#` or `!` are
//!   comments.
//! - Key and value are split at the first unescaped `=` or `:`. Whitespace
//!   around the separator is ignored.
//! - A backslash escapes the next character. `\n`, `\r` and `\t` decode to the
//!   matching control character; any other escaped character decodes to itself.
//! - When a key appears twice the last value wins, but the key keeps the
//!   position of its first appearance.

use crate::ScoreRecord;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("line {line}: expected '=' or ':' between key and value")]
    MissingSeparator { line: usize },

    #[error("line {line}: backslash at end of line")]
    DanglingEscape { line: usize },

    #[error("line {line}: invalid score {value:?} for {key:?}")]
    InvalidScore {
        line: usize,
        key: String,
        value: String,
    },
}

impl DecodeError {
    /// 1-based line number the error was found on
    pub fn line(&self) -> usize {
        match self {
            DecodeError::MissingSeparator { line }
            | DecodeError::DanglingEscape { line }
            | DecodeError::InvalidScore { line, .. } => *line,
        }
    }
}

/// A decoded `key=value` pair and the line it was last set on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Unescaped key, possibly empty
    pub key: String,
    /// Unescaped value with leading whitespace removed
    pub value: String,
    /// 1-based line of the last occurrence of `key`
    pub line: usize,
}

/// Escapes a key so that it decodes back to itself.
///
/// Separators, backslashes, whitespace and control characters are escaped
/// everywhere; `#` and `!` only at the start, where they would begin a comment.
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, c) in key.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_whitespace() => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut leading = true;
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // The decoder skips whitespace right after the separator
            c if leading && c.is_whitespace() => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
        leading = leading && c.is_whitespace();
    }
    out
}

fn unescape_char(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    }
}

fn unescape(raw: &str, line: usize) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            let escaped = chars.next().ok_or(DecodeError::DanglingEscape { line })?;
            out.push(unescape_char(escaped));
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Encodes one `key=value` line without a trailing newline
pub fn encode_line(key: &str, value: &str) -> String {
    format!("{}={}", escape_key(key), escape_value(value))
}

/// Decodes a single line; `Ok(None)` for blank and comment lines
pub fn decode_line(raw: &str, line: usize) -> Result<Option<(String, String)>, DecodeError> {
    let trimmed = raw.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
        return Ok(None);
    }

    let mut chars = trimmed.chars();
    let mut key = String::new();
    // Unescaped whitespace is only part of the key if more key text follows it
    let mut pending_space = String::new();
    let mut separated = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or(DecodeError::DanglingEscape { line })?;
                key.push_str(&pending_space);
                pending_space.clear();
                key.push(unescape_char(escaped));
            }
            '=' | ':' => {
                separated = true;
                break;
            }
            c if c.is_whitespace() => pending_space.push(c),
            c => {
                key.push_str(&pending_space);
                pending_space.clear();
                key.push(c);
            }
        }
    }

    // An empty key is valid as long as the separator is there
    if !separated {
        return Err(DecodeError::MissingSeparator { line });
    }

    let value = unescape(chars.as_str().trim_start(), line)?;
    Ok(Some((key, value)))
}

/// Decodes every property in `input`.
///
/// Properties come back in order of first appearance. A repeated key keeps
/// that position but takes the value and line of its last occurrence.
pub fn decode_properties(input: &str) -> Result<Vec<Property>, DecodeError> {
    let mut properties: Vec<Property> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let Some((key, value)) = decode_line(raw, line)? else {
            continue;
        };

        match positions.get(&key) {
            Some(&pos) => {
                properties[pos].value = value;
                properties[pos].line = line;
            }
            None => {
                positions.insert(key.clone(), properties.len());
                properties.push(Property { key, value, line });
            }
        }
    }

    Ok(properties)
}

/// Encodes records as `username=score` lines below a `# header` comment
pub fn encode_records<'a, I>(header: &str, records: I) -> String
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    let mut out = format!("# {}\n", header.replace(['\n', '\r'], " "));
    for record in records {
        out.push_str(&encode_line(&record.username, &record.score.to_string()));
        out.push('\n');
    }
    out
}

/// Decodes `username=score` lines in file order
pub fn decode_records(input: &str) -> Result<Vec<ScoreRecord>, DecodeError> {
    decode_properties(input)?
        .into_iter()
        .map(|property| match property.value.trim().parse::<u64>() {
            Ok(score) => Ok(ScoreRecord::new(property.key, score)),
            Err(_) => Err(DecodeError::InvalidScore {
                line: property.line,
                key: property.key,
                value: property.value,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line() {
        assert_eq!(encode_line("alice", "50"), "alice=50");
        assert_eq!(
            decode_line("alice=50", 1).unwrap(),
            Some(("alice".to_string(), "50".to_string()))
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        assert_eq!(decode_line("", 1).unwrap(), None);
        assert_eq!(decode_line("   ", 1).unwrap(), None);
        assert_eq!(decode_line("# header", 1).unwrap(), None);
        assert_eq!(decode_line("  ! also a comment", 1).unwrap(), None);
    }

    #[test]
    fn test_colon_separator_and_spacing() {
        assert_eq!(
            decode_line("  bob : 30", 1).unwrap(),
            Some(("bob".to_string(), "30".to_string()))
        );
        assert_eq!(
            decode_line("carol =10", 1).unwrap(),
            Some(("carol".to_string(), "10".to_string()))
        );
    }

    #[test]
    fn test_escaped_separators_in_key() {
        let key = "a=b:c\\d";
        let line = encode_line(key, "7");
        assert_eq!(line, "a\\=b\\:c\\\\d=7");

        let (decoded, value) = decode_line(&line, 1).unwrap().unwrap();
        assert_eq!(decoded, key);
        assert_eq!(value, "7");
    }

    #[test]
    fn test_escaped_whitespace_and_comment_markers() {
        for key in ["#hash", "!bang", " padded ", "tab\there", "new\nline"] {
            let line = encode_line(key, "1");
            let (decoded, _) = decode_line(&line, 1)
                .unwrap()
                .unwrap_or_else(|| panic!("line for {:?} decoded as comment", key));
            assert_eq!(decoded, key);
        }

        // A '#' that is not the first character needs no escape
        assert_eq!(escape_key("a#b"), "a#b");
    }

    #[test]
    fn test_value_with_leading_space_survives() {
        let line = encode_line("k", "  v");
        let (_, value) = decode_line(&line, 1).unwrap().unwrap();
        assert_eq!(value, "  v");
    }

    #[test]
    fn test_decode_errors_carry_line_numbers() {
        let err = decode_properties("a=1\nno separator here\n").unwrap_err();
        assert_eq!(err, DecodeError::MissingSeparator { line: 2 });
        assert_eq!(err.line(), 2);

        let err = decode_properties("key\\").unwrap_err();
        assert_eq!(err, DecodeError::DanglingEscape { line: 1 });
    }

    #[test]
    fn test_empty_key_round_trip() {
        let line = encode_line("", "10");
        assert_eq!(line, "=10");
        assert_eq!(
            decode_line(&line, 1).unwrap(),
            Some((String::new(), "10".to_string()))
        );
        assert_eq!(
            decode_line("  : 4", 1).unwrap(),
            Some((String::new(), "4".to_string()))
        );

        let records = vec![ScoreRecord::new("", 10), ScoreRecord::new("alice", 5)];
        let text = encode_records("ranking scores", &records);
        assert_eq!(decode_records(&text).unwrap(), records);
    }

    #[test]
    fn test_duplicate_keys_last_wins_first_position() {
        let properties = decode_properties("a=1\nb=2\na=3\n").unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].key, "a");
        assert_eq!(properties[0].value, "3");
        assert_eq!(properties[0].line, 3);
        assert_eq!(properties[1].key, "b");
    }

    #[test]
    fn test_crlf_input() {
        let records = decode_records("# header\r\nalice=50\r\nbob=30\r\n").unwrap();
        assert_eq!(
            records,
            vec![ScoreRecord::new("alice", 50), ScoreRecord::new("bob", 30)]
        );
    }

    #[test]
    fn test_encode_records_layout() {
        let records = vec![ScoreRecord::new("alice", 50), ScoreRecord::new("x=y", 3)];
        let text = encode_records("ranking scores", &records);
        assert_eq!(text, "# ranking scores\nalice=50\nx\\=y=3\n");
        assert_eq!(decode_records(&text).unwrap(), records);
    }

    #[test]
    fn test_invalid_score() {
        let err = decode_records("alice=50\nbob=lots\n").unwrap_err();
        match err {
            DecodeError::InvalidScore { line, key, value } => {
                assert_eq!(line, 2);
                assert_eq!(key, "bob");
                assert_eq!(value, "lots");
            }
            other => panic!("Unexpected error: {:?}", other),
        }

        assert!(decode_records("neg=-5").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(decode_records("").unwrap().is_empty());
        assert!(decode_records("# only a header\n").unwrap().is_empty());
    }
}
