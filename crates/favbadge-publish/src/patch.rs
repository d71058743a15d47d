use std::path::Path;

use favbadge_core::{FavError, FavResult};

/// Sentinel a document author puts on the line above the badge.
pub const INSERTION_MARKER: &str = "FAVORITE_MUSIC_BADGE_AFTER_THIS_LINE";

/// Replaces the line after the first marker with `badge_line`.
///
/// Only one badge is written per run: markers after the first are kept as
/// ordinary lines. A marker on the last line gets the badge appended. Returns
/// `None` when the document has no marker. Every output line ends in `\n`.
///
/// Works on raw bytes, so documents in other encodings keep their bytes.
pub fn patch_document(content: &[u8], badge_line: &str) -> Option<Vec<u8>> {
    let mut lines: Vec<&[u8]> = Vec::new();
    let mut insert_next = false;
    let mut inserted = false;

    for line in split_lines(content) {
        if insert_next {
            insert_next = false;
            inserted = true;
            lines.push(badge_line.as_bytes());
        } else {
            if !inserted && has_marker(line) {
                insert_next = true;
            }
            lines.push(line);
        }
    }
    if insert_next {
        inserted = true;
        lines.push(badge_line.as_bytes());
    }
    if !inserted {
        return None;
    }

    let mut patched = Vec::with_capacity(content.len() + badge_line.len() + 1);
    for line in lines {
        patched.extend_from_slice(line);
        patched.push(b'\n');
    }
    Some(patched)
}

/// Splits on `\n` and drops a trailing `\r`, like `str::lines`.
fn split_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    body.split(|byte| *byte == b'\n')
        .take(if content.is_empty() { 0 } else { usize::MAX })
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

fn has_marker(line: &[u8]) -> bool {
    line.windows(INSERTION_MARKER.len())
        .any(|window| window == INSERTION_MARKER.as_bytes())
}

/// Patches `path` in place. The file is only written once the patch is complete.
pub async fn patch_file(path: &Path, badge_line: &str) -> FavResult<()> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|err| FavError::Io(format!("failed to read {}: {err}", path.display())))?;
    let patched = patch_document(&content, badge_line)
        .ok_or_else(|| FavError::MarkerNotFound(path.display().to_string()))?;
    tokio::fs::write(path, patched)
        .await
        .map_err(|err| FavError::Io(format!("failed to write {}: {err}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BADGE: &str = "[<img src=\"https://img.example/b\"/>](https://example.com/t)";

    fn patch(doc: &str) -> Option<String> {
        patch_document(doc.as_bytes(), BADGE).map(|bytes| String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn replaces_line_after_marker() {
        let doc = "# Me\n<!-- FAVORITE_MUSIC_BADGE_AFTER_THIS_LINE -->\nold badge\nfooter\n";
        let patched = patch(doc).unwrap();
        assert_eq!(
            patched,
            format!("# Me\n<!-- FAVORITE_MUSIC_BADGE_AFTER_THIS_LINE -->\n{BADGE}\nfooter\n")
        );
        assert_eq!(patched.matches(BADGE).count(), 1);
    }

    #[test]
    fn appends_when_marker_is_last_line() {
        let doc = "intro\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE";
        let patched = patch(doc).unwrap();
        assert_eq!(
            patched,
            format!("intro\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\n{BADGE}\n")
        );
    }

    #[test]
    fn missing_marker_yields_none() {
        assert!(patch("just a readme\n").is_none());
        assert!(patch("").is_none());
    }

    #[test]
    fn only_first_marker_gets_a_badge() {
        let doc = "FAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\na\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\nb\n";
        let patched = patch(doc).unwrap();
        assert_eq!(
            patched,
            format!(
                "FAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\n{BADGE}\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\nb\n"
            )
        );
    }

    #[test]
    fn patching_twice_is_stable() {
        let doc = "FAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\nold\n";
        let once = patch(doc).unwrap();
        let twice = patch(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn crlf_input_is_written_with_lf() {
        let doc = "a\r\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\r\nold\r\n";
        let patched = patch(doc).unwrap();
        assert_eq!(
            patched,
            format!("a\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\n{BADGE}\n")
        );
    }

    #[test]
    fn blank_lines_survive() {
        let doc = "\n\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\n\n\nend\n";
        assert_eq!(
            patch(doc).unwrap(),
            format!("\n\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\n{BADGE}\n\nend\n")
        );
    }

    #[test]
    fn non_utf8_bytes_are_kept() {
        let mut doc = b"caf\xe9 latin-1\n".to_vec();
        doc.extend_from_slice(b"FAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\nold\n\xff\xfe\n");

        let patched = patch_document(&doc, BADGE).unwrap();

        let mut expected = b"caf\xe9 latin-1\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\n".to_vec();
        expected.extend_from_slice(BADGE.as_bytes());
        expected.extend_from_slice(b"\n\xff\xfe\n");
        assert_eq!(patched, expected);
    }

    #[tokio::test]
    async fn patch_file_handles_non_utf8_documents() {
        let dir = std::env::temp_dir().join(format!("favbadge-patch-bytes-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("README.md");
        std::fs::write(&path, b"\xe9\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\n").unwrap();

        patch_file(&path, BADGE).await.unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(b"\xe9\nFAVORITE_MUSIC_BADGE_AFTER_THIS_LINE\n"));
        assert!(written.ends_with(format!("{BADGE}\n").as_bytes()));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn patch_file_leaves_unmarked_file_untouched() {
        let dir = std::env::temp_dir().join(format!("favbadge-patch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("README.md");
        let original = "no marker here\r\n  trailing  ";
        std::fs::write(&path, original).unwrap();

        let result = patch_file(&path, BADGE).await;

        assert!(matches!(result, Err(FavError::MarkerNotFound(_))));
        assert_eq!(std::fs::read(&path).unwrap(), original.as_bytes());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
