//! Content type detection.
//!
//! Paths with a known extension get their type from the extension table.
//! Everything else, notably directory-style keys such as `/blog/`, is
//! sniffed from the leading bytes.

use mime_guess::mime;

/// Number of leading bytes inspected by [`sniff`].
const SNIFF_LEN: usize = 512;

const HTML: &str = "text/html; charset=utf-8";
const XML: &str = "text/xml; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";
const BINARY: &str = "application/octet-stream";

/// Tags that mark a document as HTML when they open it.
const HTML_SIGNATURES: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Exact magic prefixes.
const MAGIC: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"\x1f\x8b\x08", "application/x-gzip"),
    (b"\xfe\xff", "text/plain; charset=utf-16be"),
    (b"\xff\xfe", "text/plain; charset=utf-16le"),
    (b"\xef\xbb\xbf", TEXT),
];

/// Content type for the asset at `path` with decompressed bytes `raw`.
pub fn content_type(path: &str, raw: &[u8]) -> String {
    let guessed = extension(path).and_then(|ext| mime_guess::from_ext(ext).first());
    match guessed {
        Some(m) if m.type_() == mime::TEXT => format!("{m}; charset=utf-8"),
        Some(m) => m.to_string(),
        None => sniff(raw).to_string(),
    }
}

/// Extension of the last path segment, if it has a non-empty stem.
fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Guess a content type from the first bytes of `data`.
pub fn sniff(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(data.len());
    let trimmed = &data[start..];

    if HTML_SIGNATURES.iter().any(|sig| is_html_tag(trimmed, sig)) {
        return HTML;
    }
    if trimmed.starts_with(b"<?xml") {
        return XML;
    }

    if let Some((_, ty)) = MAGIC.iter().find(|(magic, _)| data.starts_with(magic)) {
        return *ty;
    }
    if data.len() >= 14 && data.starts_with(b"RIFF") && &data[8..14] == b"WEBPVP" {
        return "image/webp";
    }

    if data.iter().any(|&b| is_binary(b)) {
        BINARY
    } else {
        TEXT
    }
}

/// Case-insensitive `sig` followed by a space or `>`.
fn is_html_tag(data: &[u8], sig: &[u8]) -> bool {
    data.len() > sig.len()
        && data[..sig.len()].eq_ignore_ascii_case(sig)
        && matches!(data[sig.len()], b' ' | b'>')
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_table() {
        assert_eq!(content_type("/style.css", b""), "text/css; charset=utf-8");
        assert_eq!(content_type("/atom.xml", b""), "text/xml; charset=utf-8");
        assert_eq!(content_type("/favicon.png", b"not a png"), "image/png");
        assert_eq!(content_type("/blog/pipeline.svg", b"<svg/>"), "image/svg+xml");
    }

    #[test]
    fn test_directory_paths_are_sniffed() {
        assert_eq!(content_type("/", b"<!DOCTYPE html>\n<html>"), HTML);
        assert_eq!(content_type("/blog/", b"  <html lang=\"en\">"), HTML);
        assert_eq!(content_type("/blog/hello", b"<p>hi</p>"), HTML);
        assert_eq!(content_type("/ng/", b"just words"), TEXT);
    }

    #[test]
    fn test_dotfiles_and_unknown_extensions_are_sniffed() {
        assert_eq!(content_type("/.hidden", b"\x89PNG\r\n\x1a\nrest"), "image/png");
        assert_eq!(content_type("/blog/v1.0-notes", b"<!-- c -->"), HTML);
    }

    #[test]
    fn test_sniff_magic() {
        assert_eq!(sniff(b"%PDF-1.7"), "application/pdf");
        assert_eq!(sniff(b"GIF89a...."), "image/gif");
        assert_eq!(sniff(b"\xff\xd8\xff\xe0"), "image/jpeg");
        assert_eq!(sniff(b"\x00\x00\x01\x00\x01"), "image/x-icon");
        assert_eq!(sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(sniff(b"\x1f\x8b\x08\x00"), "application/x-gzip");
        assert_eq!(sniff(b"<?xml version=\"1.0\"?>"), XML);
        assert_eq!(sniff(b"\xef\xbb\xbfhello"), TEXT);
    }

    #[test]
    fn test_sniff_text_vs_binary() {
        assert_eq!(sniff(b""), TEXT);
        assert_eq!(sniff(b"plain text\r\n"), TEXT);
        assert_eq!(sniff(&[1, 2, 3, 250]), BINARY);
        assert_eq!(sniff(b"<htmlx>"), TEXT);
    }
}
