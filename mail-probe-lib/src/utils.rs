//! Utility functions for email validation and list loading.

use crate::error::ProbeError;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email regex is valid");
}

/// Check that an email has the shape `local@domain.tld`.
///
/// The final label must be at least two ASCII letters. No DNS or MX lookup
/// is performed; this only gates what gets sent to the network.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Split list content into records: one per line, trimmed, blanks dropped.
///
/// Duplicates are kept and order is preserved.
pub fn parse_email_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Read an email list file.
///
/// # Errors
///
/// Returns `ProbeError::FileError` if the path does not exist or cannot be read.
pub fn load_email_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ProbeError> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(ProbeError::file_error(
            path.to_string_lossy(),
            "File not found",
        ));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ProbeError::file_error(path.to_string_lossy(), format!("Failed to read list: {}", e))
    })?;

    Ok(parse_email_list(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(is_valid_email("under_score%x-y@sub-domain.io"));

        assert!(!is_valid_email("bad-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@b.c0"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_is_valid_email_is_anchored() {
        assert!(!is_valid_email(" a@b.co"));
        assert!(!is_valid_email("a@b.co trailing"));
        assert!(!is_valid_email("x<a@b.co>"));
    }

    #[test]
    fn test_parse_email_list_drops_blanks_keeps_duplicates() {
        let content = "ok@example.com\n\n  bad-format  \nok@example.com\n   \n";
        assert_eq!(
            parse_email_list(content),
            vec!["ok@example.com", "bad-format", "ok@example.com"]
        );
    }

    #[test]
    fn test_parse_email_list_handles_crlf() {
        assert_eq!(parse_email_list("a@b.co\r\nc@d.io\r\n"), vec!["a@b.co", "c@d.io"]);
    }

    #[test]
    fn test_load_email_list() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "one@example.com").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "two@example.com").unwrap();
        file.flush().unwrap();

        let emails = load_email_list(file.path()).unwrap();
        assert_eq!(emails, vec!["one@example.com", "two@example.com"]);
    }

    #[test]
    fn test_load_email_list_missing_file() {
        let err = load_email_list("/definitely/not/here/emails.txt").unwrap_err();
        assert!(matches!(err, ProbeError::FileError { .. }));
        assert!(err.to_string().contains("File not found"));
    }
}
