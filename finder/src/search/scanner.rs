//! Size-adaptive content scanning.
//!
//! Small files are read whole; large files are streamed in fixed-size chunks
//! against a bounded trailing buffer, so memory stays constant no matter how
//! large the file is. Streaming stops at the first match.

use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::trace;

use super::matcher::PatternMatcher;
use crate::errors::{is_permission_error, SearchError, SearchResult};

/// Files below this size are read whole.
pub const SMALL_FILE_THRESHOLD: u64 = 100 * 1024; // 100 KiB
/// Read granularity for the streaming path.
const CHUNK_SIZE: usize = 64 * 1024; // 64 KiB
/// Ceiling on the accumulated streaming buffer.
const MAX_BUFFER_SIZE: usize = 2 * 1024 * 1024; // 2 MiB
/// Characters retained when the buffer is truncated. Matches whose span
/// exceeds this window across chunk boundaries are missed; that bound is what
/// keeps memory constant on arbitrarily large files.
const TAIL_WINDOW_CHARS: usize = 5_000;

/// Tests whether the contents of `path` match `matcher`.
///
/// Permission-denied conditions while stating, opening, or reading degrade to
/// `Ok(false)`; any other I/O failure is returned as an error for the caller
/// to report without aborting the overall search.
pub fn scan_file(path: &Path, matcher: &PatternMatcher) -> SearchResult<bool> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() < SMALL_FILE_THRESHOLD => scan_whole(path, matcher),
        Ok(_) => scan_streaming(path, matcher),
        Err(e) if is_permission_error(&e) => Ok(false),
        // Stat failed for another reason; let the streaming path classify it.
        Err(_) => scan_streaming(path, matcher),
    }
}

fn scan_whole(path: &Path, matcher: &PatternMatcher) -> SearchResult<bool> {
    trace!("whole-file scan: {}", path.display());
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if is_permission_error(&e) => return Ok(false),
        Err(e) => return Err(SearchError::file_read(path, e)),
    };
    Ok(matcher.is_match(&String::from_utf8_lossy(&bytes)))
}

fn scan_streaming(path: &Path, matcher: &PatternMatcher) -> SearchResult<bool> {
    trace!("streaming scan: {}", path.display());
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if is_permission_error(&e) => return Ok(false),
        Err(e) => return Err(SearchError::file_read(path, e)),
    };

    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut buffer: Vec<u8> = Vec::with_capacity(CHUNK_SIZE);
    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => return Ok(false),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_permission_error(&e) => return Ok(false),
            Err(e) => return Err(SearchError::file_read(path, e)),
        };
        buffer.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buffer);
        if matcher.is_match(&text) {
            return Ok(true);
        }
        if buffer.len() > MAX_BUFFER_SIZE {
            let kept = trailing_window(&text);
            buffer = kept;
        }
    }
}

/// Keeps the last `TAIL_WINDOW_CHARS` characters of the accumulated text, or
/// half of it if it is shorter than twice the window.
fn trailing_window(text: &str) -> Vec<u8> {
    let total = text.chars().count();
    let keep = TAIL_WINDOW_CHARS.min(total / 2);
    let skip = total - keep;
    let offset = text
        .char_indices()
        .nth(skip)
        .map_or(text.len(), |(i, _)| i);
    text[offset..].as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_small_file() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "small.txt", b"hello world");
        let matcher = PatternMatcher::compile("hello", false).unwrap();
        assert!(scan_file(&path, &matcher).unwrap());

        let matcher = PatternMatcher::compile("goodbye", false).unwrap();
        assert!(!scan_file(&path, &matcher).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does_not_exist.txt");
        let matcher = PatternMatcher::compile("x", false).unwrap();
        assert!(scan_file(&path, &matcher).is_err());
    }

    #[test]
    fn test_boundary_size_matches_on_both_paths() {
        // Exactly 100 KiB: the match result must not depend on which code
        // path handles the bytes.
        let dir = tempdir().unwrap();
        let mut contents = vec![b'x'; SMALL_FILE_THRESHOLD as usize - 6];
        contents.extend_from_slice(b"needle");
        assert_eq!(contents.len() as u64, SMALL_FILE_THRESHOLD);
        let path = write_file(&dir, "boundary.txt", &contents);

        let matcher = PatternMatcher::compile("needle", false).unwrap();
        assert!(scan_whole(&path, &matcher).unwrap());
        assert!(scan_streaming(&path, &matcher).unwrap());

        let matcher = PatternMatcher::compile("absent", false).unwrap();
        assert!(!scan_whole(&path, &matcher).unwrap());
        assert!(!scan_streaming(&path, &matcher).unwrap());
    }

    #[test]
    fn test_streaming_finds_match_in_first_chunk() {
        let dir = tempdir().unwrap();
        let mut contents = b"needle".to_vec();
        contents.resize(300 * 1024, b'x');
        let path = write_file(&dir, "large.txt", &contents);

        let matcher = PatternMatcher::compile("needle", false).unwrap();
        assert!(scan_file(&path, &matcher).unwrap());
    }

    #[test]
    fn test_streaming_finds_match_past_truncation() {
        // Pattern sits at the tail of a file larger than the buffer ceiling;
        // the trailing window must still carry it.
        let dir = tempdir().unwrap();
        let mut contents = vec![b'x'; 3 * 1024 * 1024];
        contents.extend_from_slice(b"needle at the end");
        let path = write_file(&dir, "huge.txt", &contents);

        let matcher = PatternMatcher::compile("needle at the end", false).unwrap();
        assert!(scan_file(&path, &matcher).unwrap());

        let matcher = PatternMatcher::compile("nowhere", false).unwrap();
        assert!(!scan_file(&path, &matcher).unwrap());
    }

    #[test]
    fn test_streaming_match_spanning_chunks() {
        // Needle straddles the first 64 KiB chunk boundary.
        let dir = tempdir().unwrap();
        let mut contents = vec![b'x'; CHUNK_SIZE - 3];
        contents.extend_from_slice(b"straddle");
        contents.resize(256 * 1024, b'y');
        let path = write_file(&dir, "spanning.txt", &contents);

        let matcher = PatternMatcher::compile("straddle", false).unwrap();
        assert!(scan_file(&path, &matcher).unwrap());
    }

    #[test]
    fn test_trailing_window_keeps_tail() {
        let text: String = std::iter::repeat('a').take(20_000).collect::<String>() + "tail";
        let kept = trailing_window(&text);
        let kept = String::from_utf8(kept).unwrap();
        assert_eq!(kept.len(), TAIL_WINDOW_CHARS);
        assert!(kept.ends_with("tail"));
    }

    #[test]
    fn test_trailing_window_short_text_keeps_half() {
        let kept = trailing_window("abcdef");
        assert_eq!(kept, b"def");
    }

    #[test]
    fn test_non_utf8_content_does_not_error() {
        let dir = tempdir().unwrap();
        let mut contents = vec![0xff, 0xfe, 0xfd];
        contents.extend_from_slice(b"needle");
        let path = write_file(&dir, "binaryish.bin", &contents);

        let matcher = PatternMatcher::compile("needle", false).unwrap();
        assert!(scan_file(&path, &matcher).unwrap());
    }
}
