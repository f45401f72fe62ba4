//! Query-text extraction from generated prose.
//!
//! Generation responses follow a `REASONING: ... SQL: ...` format, but
//! models drift: the marker may be missing, lowercase, or followed by more
//! prose. The parser walks the response line by line with an explicit
//! state, then falls back to the first `SELECT` when no marker is found.

/// Markers that end a captured query block.
const STOP_MARKERS: [&str; 3] = ["REASONING:", "EXPLANATION:", "NOTE:"];

const SQL_MARKER: &str = "SQL:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Looking for the `SQL:` marker.
    Scanning,
    /// Collecting payload lines until a stop marker.
    Capturing,
}

/// Extract the query text from a generation response.
///
/// Returns `None` when nothing usable could be found; callers decide
/// whether that means falling back to a pattern template.
pub fn extract_sql(content: &str) -> Option<String> {
    if content.trim().is_empty() {
        return None;
    }

    let mut state = ParserState::Scanning;
    let mut captured: Vec<String> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        match state {
            ParserState::Scanning => {
                if starts_with_ignore_case(trimmed, SQL_MARKER) {
                    state = ParserState::Capturing;
                    let after_marker = trimmed[SQL_MARKER.len()..].trim();
                    if !after_marker.is_empty() {
                        captured.push(after_marker.to_string());
                    }
                }
            }
            ParserState::Capturing => {
                if !trimmed.is_empty() && is_stop_marker(trimmed) {
                    break;
                }
                // Blank lines inside the payload are kept; multi-statement
                // queries rely on them.
                captured.push(line.to_string());
            }
        }
    }

    if !captured.is_empty() {
        return non_empty(strip_code_fences(&captured.join("\n")));
    }

    // No marker. Take everything from the first SELECT, cut at the first
    // trailing explanation.
    if let Some(start) = find_ignore_ascii_case(content, "SELECT") {
        let tail = &content[start..];
        let end = STOP_MARKERS
            .iter()
            .filter_map(|marker| find_ignore_ascii_case(tail, marker))
            .min()
            .unwrap_or(tail.len());
        return non_empty(strip_code_fences(&tail[..end]));
    }

    non_empty(strip_code_fences(content))
}

/// Remove surrounding Markdown code fences, if present.
pub fn strip_code_fences(text: &str) -> String {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest
            .strip_prefix("sql")
            .or_else(|| rest.strip_prefix("SQL"))
            .unwrap_or(rest);
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest.trim_end();
    }
    body.trim().to_string()
}

fn is_stop_marker(trimmed_line: &str) -> bool {
    STOP_MARKERS
        .iter()
        .any(|marker| starts_with_ignore_case(trimmed_line, marker))
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// Markers are ASCII, so matched offsets always fall on char boundaries.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_inline_payload() {
        let content = "REASONING: contagem simples.\nSQL: SELECT COUNT(*) FROM t";
        assert_eq!(extract_sql(content).as_deref(), Some("SELECT COUNT(*) FROM t"));
    }

    #[test]
    fn captures_multiline_payload_until_stop_marker() {
        let content = "SQL:\nSELECT tipo, COUNT(*) AS total\nFROM t\nGROUP BY tipo\nNOTE: agregação por tipo";
        assert_eq!(
            extract_sql(content).as_deref(),
            Some("SELECT tipo, COUNT(*) AS total\nFROM t\nGROUP BY tipo")
        );
    }

    #[test]
    fn marker_is_case_insensitive() {
        let content = "sql: select 1";
        assert_eq!(extract_sql(content).as_deref(), Some("select 1"));
    }

    #[test]
    fn blank_lines_inside_payload_survive() {
        let content = "SQL:\nSELECT a\n\nFROM t";
        assert_eq!(extract_sql(content).as_deref(), Some("SELECT a\n\nFROM t"));
    }

    #[test]
    fn marker_mid_line_falls_back_to_select() {
        let content = "A consulta é SQL válida: SELECT 1 NOTE: pronto";
        assert_eq!(extract_sql(content).as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn select_fallback_cuts_at_explanation() {
        let content = "Claro! SELECT nome FROM bairros LIMIT 3\nEXPLANATION: três bairros";
        assert_eq!(
            extract_sql(content).as_deref(),
            Some("SELECT nome FROM bairros LIMIT 3")
        );
    }

    #[test]
    fn fenced_payload_is_unwrapped() {
        let content = "SQL:\n```sql\nSELECT 1\n```";
        assert_eq!(extract_sql(content).as_deref(), Some("SELECT 1"));

        let bare = "```sql\nSELECT 2\n```";
        assert_eq!(extract_sql(bare).as_deref(), Some("SELECT 2"));
    }

    #[test]
    fn plain_content_is_returned_trimmed() {
        assert_eq!(extract_sql("  WITH x AS (VALUES 1) TABLE x  ").as_deref(), Some("WITH x AS (VALUES 1) TABLE x"));
    }

    #[test]
    fn empty_content_yields_none() {
        assert_eq!(extract_sql(""), None);
        assert_eq!(extract_sql("   \n  "), None);
    }

    #[test]
    fn marker_with_no_payload_falls_back_to_whole_content() {
        // Nothing was captured and there is no SELECT; the raw prose comes
        // back and the validity check downstream rejects it.
        let content = "REASONING: nada a fazer.\nSQL:";
        assert_eq!(extract_sql(content).as_deref(), Some(content));
    }

    #[test]
    fn accented_prose_does_not_break_scanning() {
        let content = "RACIOCÍNIO: iluminação é o tipo.\nSQL: SELECT COUNT(*) FROM chamados WHERE tipo LIKE '%iluminação%'";
        assert_eq!(
            extract_sql(content).as_deref(),
            Some("SELECT COUNT(*) FROM chamados WHERE tipo LIKE '%iluminação%'")
        );
    }
}
