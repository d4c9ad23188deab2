//! Text normalization for the classification pipeline.
//!
//! Pure functions that clean raw subject/body text into a canonical
//! lowercase form for tokenization and keyword matching. Normalization never
//! fails: malformed input degrades to a best-effort ASCII-safe substitution
//! so one bad email cannot abort a batch.

/// Clean a raw text fragment for n-gram tokenization.
///
/// Lowercases, collapses whitespace runs to single spaces, strips control
/// bytes, and maps common typographic characters to ASCII equivalents.
/// Remaining non-ASCII characters become spaces. Punctuation is preserved
/// for the tokenizer to handle.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for ch in text.chars() {
        match map_char(ch) {
            ' ' => {
                if !last_space {
                    out.push(' ');
                    last_space = true;
                }
            }
            c => {
                out.push(c.to_ascii_lowercase());
                last_space = false;
            }
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Subject terms count this many times in the composed document.
const SUBJECT_REPEAT: usize = 3;

/// Normalize subject and body into the single document the vectorizer
/// consumes. The subject is repeated so its terms outweigh body terms,
/// the same emphasis the rule labeler puts on subject keyword hits.
pub fn normalize_email(subject: &str, body: &str) -> String {
    let subject = normalize(subject);
    let body = normalize(body);
    if subject.is_empty() {
        return body;
    }
    let mut document =
        String::with_capacity((subject.len() + 1) * SUBJECT_REPEAT + body.len());
    for _ in 0..SUBJECT_REPEAT {
        if !document.is_empty() {
            document.push(' ');
        }
        document.push_str(&subject);
    }
    if !body.is_empty() {
        document.push(' ');
        document.push_str(&body);
    }
    document
}

/// Normalize raw bytes, decoding lossily first. Invalid UTF-8 sequences
/// become replacement characters, which the cleaning pass turns into spaces.
pub fn normalize_lossy(bytes: &[u8]) -> String {
    normalize(&String::from_utf8_lossy(bytes))
}

fn map_char(ch: char) -> char {
    if ch.is_whitespace() || ch.is_control() {
        return ' ';
    }
    if ch.is_ascii() {
        return ch;
    }
    match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => '-',
        _ => ' ',
    }
}
