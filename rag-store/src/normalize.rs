//! Text normalization applied to chunks before they are embedded.
//!
//! PDF text extraction tends to produce ragged whitespace: trailing blanks,
//! runs of spaces from justified layout and stacks of empty lines.

/// Normalizes extracted page text with minimal layout disruption.
///
/// - Collapses runs of spaces/tabs inside a line into a single space.
/// - Trims each line.
/// - Collapses multiple blank lines into a single one.
/// - Stops once `max_chars` characters have been written.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max_chars));
    let mut written = 0usize;
    let mut blank_run = 0usize;

    for raw in s.lines() {
        let line = raw.split_whitespace().collect::<Vec<_>>().join(" ");

        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }

        let len = line.chars().count() + 1;
        if written + len > max_chars {
            break;
        }
        out.push_str(&line);
        out.push('\n');
        written += len;
    }

    out.trim_end().to_string()
}
