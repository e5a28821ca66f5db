use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing media extension on captions that default to the imported file name
static MEDIA_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(jpe?g|png|tiff?|heic|mov|mp4|mpe?g|m4v)$").expect("valid media extension regex")
});

/// Remove a trailing media extension, so a caption of "IMG_0087.JPG" does not
/// become "IMG_0087.JPG.jpg" on export.
pub fn strip_media_extension(caption: &str) -> String {
    MEDIA_EXTENSION.replace(caption, "").to_string()
}

/// Make a string usable as a single path component.
///
/// `:` becomes `.`, path separators, wildcard and control characters become
/// `_`. Surrounding whitespace and trailing dots are trimmed.
pub fn sanitize_name(name: &str) -> String {
    let mapped: String = name
        .trim()
        .chars()
        .map(|c| match c {
            ':' => '.',
            '/' | '\\' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    mapped.trim_end_matches(|c: char| c == '.' || c.is_whitespace()).to_string()
}

/// Zero-pad a 1-based index to the number of digits in `total`
pub fn padded_index(index: usize, total: usize) -> String {
    let width = total.max(1).to_string().len();
    format!("{:0width$}", index, width = width)
}
