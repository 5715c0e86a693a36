//! Front matter envelope: the `---` delimited block inside a receipt document.

/// The delimiter line surrounding the markup block.
pub const DELIMITER: &str = "---";

/// A located envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Text strictly between the two delimiter lines.
    pub markup: &'a str,
    /// Everything before the opening delimiter line.
    pub preamble: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
}

/// Extract the markup between the first two `---` lines.
///
/// Returns `None` when the document has no well-formed delimiter pair;
/// callers treat that as "no structured content".
pub fn extract_envelope(document: &str) -> Option<&str> {
    locate(document).map(|envelope| envelope.markup)
}

/// Locate the envelope along with the text around it.
pub fn locate(document: &str) -> Option<Envelope<'_>> {
    let mut delimiters = delimiter_lines(document);
    let (open_start, open_end) = delimiters.next()?;
    let (close_start, close_end) = delimiters.next()?;

    // The newline ending the last markup line belongs to the closing delimiter.
    let markup = &document[open_end..close_start];
    let markup = markup
        .strip_suffix('\n')
        .map(|m| m.strip_suffix('\r').unwrap_or(m))
        .unwrap_or(markup);

    Some(Envelope {
        markup,
        preamble: &document[..open_start],
        body: &document[close_end..],
    })
}

/// Wrap a markup block in delimiters, followed by an optional body.
pub fn wrap_envelope(markup: &str, body: &str) -> String {
    let mut document = String::with_capacity(markup.len() + body.len() + 16);
    document.push_str(DELIMITER);
    document.push('\n');
    if !markup.is_empty() {
        document.push_str(markup);
        document.push('\n');
    }
    document.push_str(DELIMITER);
    document.push('\n');
    document.push_str(body);
    document
}

/// Byte ranges of delimiter lines: `(line start, offset after the line break)`.
fn delimiter_lines(document: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut offset = 0;
    document.split_inclusive('\n').filter_map(move |line| {
        let start = offset;
        offset += line.len();
        let content = line.strip_suffix('\n').unwrap_or(line);
        let content = content.strip_suffix('\r').unwrap_or(content);
        (content == DELIMITER).then_some((start, offset))
    })
}
