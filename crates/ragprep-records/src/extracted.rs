use std::borrow::Cow;

/// Characters of extracted text kept in a tagged excerpt.
pub const EXCERPT_CHARS: usize = 500;

const DOCUMENT_TAG: &str = "DOCUMENT TEXT EXTRACTED: ";
const TABULAR_TAG: &str = "TABULAR DATA NARRATIVE: Summary of sheet: ";

/// Prefix extracted text with a tag naming its kind and cut it to an excerpt.
///
/// `.docx`/`.pptx` text becomes a document excerpt and `.xlsx`/`.csv` text a
/// sheet summary; both keep the first [`EXCERPT_CHARS`] characters followed by
/// `...`. Other extensions pass through borrowed. The extension is matched
/// case-insensitively, with or without its leading dot.
#[must_use]
pub fn tag_extracted<'a>(text: &'a str, extension: &str) -> Cow<'a, str> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    let tag = match ext.as_str() {
        "docx" | "pptx" => DOCUMENT_TAG,
        "xlsx" | "csv" => TABULAR_TAG,
        _ => return Cow::Borrowed(text),
    };
    Cow::Owned(format!("{tag}{}...", excerpt(text, EXCERPT_CHARS)))
}

fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
