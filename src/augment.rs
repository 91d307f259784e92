//! Co-author trailers for the `prepare-commit-msg` hook.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::{Config, Dev};
use crate::error::{Error, Result};

/// Looks up every key of a comma-separated `pear.devs` value in the
/// registry, keeping the recorded order.
///
/// # Errors
/// `Error::NoDev` for the first key the registry does not know.
pub fn resolve_pair(keys_csv: &str, config: &Config) -> Result<Vec<Dev>> {
    keys_csv
        .split(',')
        .map(str::trim)
        .map(|key| {
            config
                .devs
                .get(key)
                .cloned()
                .ok_or_else(|| Error::NoDev(key.to_string()))
        })
        .collect()
}

/// Whether a commit with this message `source` and `revision` gets
/// trailers. Only plain new commits (`""`, `""`) and `-c`/`--amend` style
/// commits (`"commit"`, `""`) qualify; merges, squashes, templates and
/// commits with a revision are left alone.
pub fn should_augment(source: &str, revision: &str) -> bool {
    matches!((source, revision), ("", "") | ("commit", ""))
}

/// One `Co-authored-by: Name <email>` line per dev.
pub fn coauthor_trailers(devs: &[Dev]) -> String {
    devs.iter()
        .map(|dev| format!("Co-authored-by: {} <{}>\n", dev.name, dev.email))
        .collect()
}

/// Rewrites the commit message at `path` as two blank lines, the trailers,
/// then the original content, when [`should_augment`] allows it.
///
/// # Returns
/// `true` if the file was rewritten.
pub fn augment(path: &Path, source: &str, revision: &str, devs: &[Dev]) -> Result<bool> {
    if !should_augment(source, revision) {
        debug!(%source, %revision, "leaving commit message untouched");
        return Ok(false);
    }

    let original = fs::read(path).map_err(|e| Error::io(path, e))?;

    let mut message = Vec::with_capacity(original.len() + 64 * devs.len() + 2);
    message.extend_from_slice(b"\n\n");
    message.extend_from_slice(coauthor_trailers(devs).as_bytes());
    message.extend_from_slice(&original);

    fs::write(path, message).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), coauthors = devs.len(), "added co-author trailers");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry() -> Config {
        let mut config = Config::default();
        config
            .devs
            .insert("deva".to_string(), Dev::new("Full Name A", "a@example.com"));
        config
            .devs
            .insert("devb".to_string(), Dev::new("Person B", "b@example.com"));
        config
    }

    fn message_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("failed to write message");
        file
    }

    #[test]
    fn resolve_pair_keeps_recorded_order() {
        let devs = resolve_pair("devb,deva\n", &registry()).expect("resolve");
        assert_eq!(devs[0].name, "Person B");
        assert_eq!(devs[1].name, "Full Name A");
    }

    #[test]
    fn resolve_pair_unknown_key_is_an_error() {
        let err = resolve_pair("deva,ghost", &registry()).unwrap_err();
        assert!(matches!(&err, Error::NoDev(key) if key == "ghost"));
        assert_eq!(err.to_string(), "No dev found: ghost");
    }

    #[test]
    fn should_augment_decision_table() {
        assert!(should_augment("", ""));
        assert!(should_augment("commit", ""));
        assert!(!should_augment("commit", "abc123"));
        assert!(!should_augment("merge", ""));
        assert!(!should_augment("squash", ""));
        assert!(!should_augment("template", ""));
        assert!(!should_augment("message", ""));
    }

    #[test]
    fn plain_commit_gets_trailers_before_original_content() {
        let file = message_file("# Please enter the commit message\n");
        let devs = resolve_pair("deva,devb", &registry()).expect("resolve");

        let changed = augment(file.path(), "", "", &devs).expect("augment");

        let written = fs::read_to_string(file.path()).expect("read");
        assert!(changed);
        assert_eq!(
            written,
            "\n\nCo-authored-by: Full Name A <a@example.com>\n\
             Co-authored-by: Person B <b@example.com>\n\
             # Please enter the commit message\n"
        );
    }

    #[test]
    fn merge_commit_is_byte_identical() {
        let original = "Merge branch 'feature'\n\n# Conflicts:\r\n";
        let file = message_file(original);
        let devs = resolve_pair("deva,devb", &registry()).expect("resolve");

        let changed = augment(file.path(), "merge", "", &devs).expect("augment");

        assert!(!changed);
        assert_eq!(fs::read(file.path()).expect("read"), original.as_bytes());
    }

    #[test]
    fn missing_message_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = augment(&dir.path().join("COMMIT_EDITMSG"), "", "", &[]);
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
