//! Embeds a Jira issue key in the notes of a Things to-do and reads it back.
//!
//! The marker is the only link between the two systems; there is no mapping
//! table. A marker is the prefix [`MARKER_PREFIX`] at the start of a line,
//! followed by the key. [`annotate`] puts it on its own line at the end of
//! the notes.

/// Prefix of the annotation line. Distinctive enough not to appear in
/// hand-written notes.
pub const MARKER_PREFIX: &str = "JIRA-ID: ";

/// What a copied marker is rewritten to so it no longer parses.
const DEFUSED_PREFIX: &str = "JIRA-ID ";

/// Result of parsing the notes of a task for an embedded key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLookup {
    /// No marker in the notes.
    Absent,
    /// A marker is present but what follows it is not a single key token.
    Malformed(String),
    Key(String),
}

impl KeyLookup {
    pub fn key(&self) -> Option<&str> {
        match self {
            KeyLookup::Key(k) => Some(k),
            _ => None,
        }
    }
}

/// The marker line for `key`.
pub fn marker(key: &str) -> String {
    format!("{MARKER_PREFIX}{key}")
}

/// Append the marker line for `key` to `notes`.
///
/// Markers already present in `notes` (pasted from another task, say) are
/// defused first so the appended one is the only marker in the result.
pub fn annotate(notes: &str, key: &str) -> String {
    let notes = notes.replace(MARKER_PREFIX, DEFUSED_PREFIX);
    if notes.trim().is_empty() {
        marker(key)
    } else {
        format!("{}\n\n{}", notes.trim_end(), marker(key))
    }
}

/// Byte offsets just past every marker prefix that starts a line.
fn anchored_markers(notes: &str) -> impl Iterator<Item = usize> + '_ {
    notes
        .match_indices(MARKER_PREFIX)
        .filter(|(idx, _)| *idx == 0 || notes[..*idx].ends_with('\n'))
        .map(|(idx, _)| idx + MARKER_PREFIX.len())
}

/// Parse the key that follows the first marker, through end of text.
///
/// Only a marker at the start of a line counts, and only the first one is
/// honored. Text after it is trimmed; if the remainder is empty or spans
/// more than one token the marker is reported as malformed rather than
/// guessed at.
pub fn extract_key(notes: &str) -> KeyLookup {
    let Some(start) = anchored_markers(notes).next() else {
        return KeyLookup::Absent;
    };
    let rest = notes[start..].trim();
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return KeyLookup::Malformed(rest.to_string());
    }
    KeyLookup::Key(rest.to_string())
}

/// Exact match: the parsed key is `key`.
#[cfg(test)]
pub fn matches_exact(notes: &str, key: &str) -> bool {
    extract_key(notes).key() == Some(key)
}

/// Loose match: some line of the notes starts with the marker for `key`.
/// Used for existence checks, so a task whose notes were edited after the
/// marker is still found.
///
/// The character after the key must end a token, so `PROJ-1` is not found
/// inside `PROJ-12`.
pub fn contains_annotation(notes: &str, key: &str) -> bool {
    anchored_markers(notes).any(|start| {
        notes[start..].strip_prefix(key).is_some_and(|after| {
            after.chars().next().map_or(true, |c| !is_key_char(c))
        })
    })
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every combination of a few awkward fragments, including copied markers.
    fn generated_notes() -> Vec<String> {
        const FRAGMENTS: &[&str] = &[
            "",
            "plain",
            "  \n",
            "Jira Issue: https://x/browse/A-1\n\nline\nline",
            "JIRA-ID: OLD-9",
            "pasted from old task\nJIRA-ID: OLD-9",
            "see JIRA-ID: INLINE-3 above",
            "JIRA-ID: ",
            "JIRA-ID: JIRA-ID: X-1\n",
            "修复 🐛\r\n",
        ];
        let mut notes = Vec::new();
        for a in FRAGMENTS {
            for b in FRAGMENTS {
                notes.push(format!("{a}{b}"));
                notes.push(format!("{a}\n{b}"));
            }
        }
        notes
    }

    #[test]
    fn annotate_then_extract_recovers_key() {
        for key in ["PROJ-123", "A-1", "OLD-9"] {
            for notes in generated_notes() {
                let annotated = annotate(&notes, key);
                assert_eq!(
                    extract_key(&annotated),
                    KeyLookup::Key(key.into()),
                    "notes: {notes:?}"
                );
                assert!(contains_annotation(&annotated, key), "notes: {notes:?}");
            }
        }
    }

    #[test]
    fn annotate_defuses_copied_marker() {
        let annotated = annotate("pasted from old task\nJIRA-ID: OLD-9", "PROJ-1");
        assert_eq!(extract_key(&annotated), KeyLookup::Key("PROJ-1".into()));
        assert!(!contains_annotation(&annotated, "OLD-9"));
    }

    #[test]
    fn marker_mid_line_is_ignored() {
        assert_eq!(extract_key("see JIRA-ID: PROJ-4"), KeyLookup::Absent);
        assert!(!contains_annotation("see JIRA-ID: PROJ-4", "PROJ-4"));
        assert_eq!(
            extract_key("see JIRA-ID: PROJ-4\nJIRA-ID: PROJ-5"),
            KeyLookup::Key("PROJ-5".into())
        );
    }

    #[test]
    fn annotate_keeps_existing_text() {
        let annotated = annotate("Fix the build", "PROJ-9");
        assert_eq!(annotated, "Fix the build\n\nJIRA-ID: PROJ-9");
    }

    #[test]
    fn annotate_empty_notes_is_marker_only() {
        assert_eq!(annotate("", "PROJ-9"), "JIRA-ID: PROJ-9");
    }

    #[test]
    fn extract_absent_when_no_marker() {
        assert_eq!(extract_key("buy milk"), KeyLookup::Absent);
        assert_eq!(extract_key(""), KeyLookup::Absent);
    }

    #[test]
    fn extract_trims_whitespace() {
        assert_eq!(
            extract_key("notes\n\nJIRA-ID: PROJ-4  \n"),
            KeyLookup::Key("PROJ-4".into())
        );
    }

    #[test]
    fn extract_empty_key_is_malformed() {
        assert_eq!(extract_key("JIRA-ID: "), KeyLookup::Malformed(String::new()));
    }

    #[test]
    fn extract_trailing_text_is_malformed() {
        assert_eq!(
            extract_key("JIRA-ID: PROJ-4\nsee thread"),
            KeyLookup::Malformed("PROJ-4\nsee thread".into())
        );
    }

    #[test]
    fn extract_honors_first_marker_only() {
        let notes = "JIRA-ID: PROJ-1\n\nJIRA-ID: PROJ-2";
        assert!(matches!(extract_key(notes), KeyLookup::Malformed(_)));
    }

    #[test]
    fn exact_match_requires_equal_key() {
        let notes = annotate("x", "PROJ-12");
        assert!(matches_exact(&notes, "PROJ-12"));
        assert!(!matches_exact(&notes, "PROJ-1"));
    }

    #[test]
    fn containment_survives_trailing_edits() {
        let notes = "JIRA-ID: PROJ-7\nadded later by hand";
        assert!(contains_annotation(notes, "PROJ-7"));
        assert!(!matches_exact(notes, "PROJ-7"));
    }

    #[test]
    fn containment_does_not_match_key_prefix() {
        let notes = annotate("x", "PROJ-12");
        assert!(!contains_annotation(&notes, "PROJ-1"));
        assert!(contains_annotation(&notes, "PROJ-12"));
    }

    #[test]
    fn containment_false_without_marker() {
        assert!(!contains_annotation("PROJ-7 is mentioned here", "PROJ-7"));
    }
}
