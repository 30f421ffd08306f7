//! Pure parsing of URLs into file-oriented facts, plus name sanitization.
//!
//! No network access happens here; this module only inspects URL strings
//! so the rest of the pipeline can filter by extension and derive on-disk
//! file names.

use url::Url;

/// File-oriented facts derived from a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlInfo {
    /// Last path segment, percent-decoded.
    pub file_name: String,
    /// Extension of `file_name` including the leading dot, or empty.
    pub extension: String,
    /// Host portion of the URL, or empty when absent.
    pub hostname: String,
}

impl UrlInfo {
    /// Parses an absolute URL into its file name, extension, and host.
    ///
    /// Returns `None` when the input is not a parseable absolute URL.
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let hostname = parsed.host_str().unwrap_or("").to_string();

        let raw_name = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("");
        let file_name = urlencoding::decode(raw_name)
            .map_or_else(|_| raw_name.to_string(), |decoded| decoded.into_owned());

        let extension = split_extension(&file_name);

        Some(Self {
            file_name,
            extension,
            hostname,
        })
    }
}

/// Returns the extension of a file name including the leading dot.
///
/// A leading dot alone (dotfiles) is not an extension.
fn split_extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(index) if index > 0 => file_name[index..].to_string(),
        _ => String::new(),
    }
}

/// Replaces characters that are not allowed in file or directory names.
///
/// The characters `<>:"/\|?*'` and control bytes 0-0x19 become `-`; the
/// result is trimmed of surrounding whitespace.
#[must_use]
pub fn sanitize_name(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|ch| match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '\'' => '-',
            c if (c as u32) <= 0x19 => '-',
            c => c,
        })
        .collect();
    cleaned.trim().to_string()
}
