use crate::error::MigrationError;

/// Marker line separating the forward statements from the rollback
/// statements. Matched line-exact so the marker cannot fire inside a
/// statement or a longer comment.
pub const ROLLBACK_MARKER: &str = "-- ROLLBACK";

/// The two halves of a migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    pub up: String,
    pub rollback: Option<String>,
}

fn is_marker_line(line: &str) -> bool {
    line.trim_end_matches('\r').trim() == ROLLBACK_MARKER
}

/// Split file content into up/rollback sections.
///
/// Zero marker lines yields a file with no rollback section; exactly one
/// splits the file; more than one is rejected as malformed input instead of
/// silently taking the first occurrence.
pub fn split_sections(filename: &str, content: &str) -> Result<Sections, MigrationError> {
    let marker_count = content.lines().filter(|l| is_marker_line(l)).count();
    if marker_count > 1 {
        return Err(MigrationError::AmbiguousRollback {
            filename: filename.to_string(),
        });
    }

    if marker_count == 0 {
        return Ok(Sections {
            up: content.trim().to_string(),
            rollback: None,
        });
    }

    let mut up_lines = Vec::new();
    let mut rollback_lines = Vec::new();
    let mut past_marker = false;
    for line in content.lines() {
        if !past_marker && is_marker_line(line) {
            past_marker = true;
            continue;
        }
        if past_marker {
            rollback_lines.push(line);
        } else {
            up_lines.push(line);
        }
    }

    Ok(Sections {
        up: up_lines.join("\n").trim().to_string(),
        rollback: Some(rollback_lines.join("\n").trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::{split_sections, Sections};
    use crate::error::MigrationError;

    #[test]
    fn file_without_marker_has_no_rollback() {
        let sections = split_sections("a.sql", "CREATE TABLE t (id INT);\n").unwrap();
        assert_eq!(
            sections,
            Sections {
                up: "CREATE TABLE t (id INT);".to_string(),
                rollback: None,
            }
        );
    }

    #[test]
    fn marker_splits_up_and_rollback() {
        let content = "CREATE TABLE t (id INT);\n\n-- ROLLBACK\nDROP TABLE t;\n";
        let sections = split_sections("a.sql", content).unwrap();
        assert_eq!(sections.up, "CREATE TABLE t (id INT);");
        assert_eq!(sections.rollback.as_deref(), Some("DROP TABLE t;"));
    }

    #[test]
    fn marker_tolerates_surrounding_whitespace() {
        let content = "SELECT 1;\n  -- ROLLBACK \r\nSELECT 2;";
        let sections = split_sections("a.sql", content).unwrap();
        assert_eq!(sections.up, "SELECT 1;");
        assert_eq!(sections.rollback.as_deref(), Some("SELECT 2;"));
    }

    #[test]
    fn marker_must_be_a_whole_line() {
        // A mention inside a longer comment is not a section boundary.
        let content = "-- ROLLBACK is handled below\nSELECT 1;";
        let sections = split_sections("a.sql", content).unwrap();
        assert!(sections.rollback.is_none());
        assert!(sections.up.contains("SELECT 1;"));
    }

    #[test]
    fn duplicate_markers_are_rejected() {
        let content = "SELECT 1;\n-- ROLLBACK\nSELECT 2;\n-- ROLLBACK\nSELECT 3;";
        let err = split_sections("dup.sql", content).unwrap_err();
        match err {
            MigrationError::AmbiguousRollback { filename } => assert_eq!(filename, "dup.sql"),
            other => panic!("expected AmbiguousRollback, got {other:?}"),
        }
    }

    #[test]
    fn empty_rollback_section_is_preserved_as_empty() {
        let content = "SELECT 1;\n-- ROLLBACK\n";
        let sections = split_sections("a.sql", content).unwrap();
        assert_eq!(sections.rollback.as_deref(), Some(""));
    }
}
