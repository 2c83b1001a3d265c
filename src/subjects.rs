//! Subject lists and output filenames.

use std::path::Path;

use crate::error::DndImgError;

/// Splits `content` on `delimiter`, trims each record and drops the blank ones.
pub fn parse_subjects(content: &str, delimiter: &str) -> Vec<String> {
    content
        .split(delimiter)
        .map(str::trim)
        .filter(|subject| !subject.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads and parses a subjects file.
pub fn read_subjects_file(path: &Path, delimiter: &str) -> Result<Vec<String>, DndImgError> {
    let content = std::fs::read_to_string(path).map_err(|source| DndImgError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_subjects(&content, delimiter))
}

/// Filename stem for a subject: lowercase, spaces become dashes.
pub fn slug(subject: &str) -> String {
    subject.to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_dashes() {
        assert_eq!(slug("Ancient Red Dragon"), "ancient-red-dragon");
        assert_eq!(slug("owlbear"), "owlbear");
        assert_eq!(slug("Bag of Holding"), "bag-of-holding");
    }

    #[test]
    fn parse_drops_blank_and_trims() {
        assert_eq!(parse_subjects("a\n\nb \n c\n", "\n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_custom_delimiter() {
        assert_eq!(
            parse_subjects("Owlbear, Beholder ,,Mimic", ","),
            vec!["Owlbear", "Beholder", "Mimic"]
        );
    }

    #[test]
    fn parse_handles_crlf() {
        assert_eq!(parse_subjects("Lich\r\nKraken\r\n", "\n"), vec!["Lich", "Kraken"]);
    }

    #[test]
    fn parse_empty() {
        assert!(parse_subjects(" \n\n", "\n").is_empty());
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_subjects_file(&dir.path().join("nope.txt"), "\n").expect_err("missing");
        assert!(matches!(err, DndImgError::FileRead { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("subjects.txt");
        std::fs::write(&path, "Owlbear\nGelatinous Cube\n").expect("write");
        assert_eq!(
            read_subjects_file(&path, "\n").expect("read"),
            vec!["Owlbear", "Gelatinous Cube"]
        );
    }
}
