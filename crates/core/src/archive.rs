//! ZIP archive decoding filtered to playable video entries.
//!
//! A decoder is one-shot: entries are pulled in archive order, and that
//! order defines the insertion order of the videos the archive contributes.
//! Directory entries and entries without a recognized video extension are
//! skipped. Re-decoding requires a fresh [`ArchiveDecoder::open`] call.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::CoreError;

/// Video file extensions recognized inside archives (lowercase).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mkv", "avi", "mov"];

/// Returns `true` if the extension is a recognized video extension
/// (case-insensitive).
pub fn is_video_extension(extension: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

/// Returns `true` if the path carries a recognized video extension.
pub fn is_video_path(path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) => is_video_extension(ext),
        None => false,
    }
}

/// A video entry materialized from an archive.
#[derive(Debug, Clone)]
pub struct ExtractedVideo {
    /// Entry basename (path components inside the archive are stripped).
    pub file_name: String,
    /// Uncompressed content.
    pub payload: Vec<u8>,
}

/// One-shot pull decoder over an in-memory ZIP archive.
#[derive(Debug)]
pub struct ArchiveDecoder {
    zip: ZipArchive<Cursor<Vec<u8>>>,
    next_index: usize,
}

impl ArchiveDecoder {
    /// Open an archive from raw bytes.
    ///
    /// Fails with [`CoreError::CorruptArchive`] when the central directory
    /// cannot be parsed.
    pub fn open(bytes: Vec<u8>) -> Result<Self, CoreError> {
        let zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| CoreError::CorruptArchive(e.to_string()))?;
        Ok(Self { zip, next_index: 0 })
    }

    /// Total number of entries in the archive (including skipped ones).
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// Pull the next qualifying video entry, or `None` when the archive is
    /// exhausted.
    ///
    /// An entry whose uncompressed size exceeds `max_entry_bytes` fails with
    /// [`CoreError::EntryTooLarge`]; the caller aborts this archive and is
    /// expected to advise extracting and uploading files individually.
    pub fn next_video(&mut self, max_entry_bytes: u64) -> Result<Option<ExtractedVideo>, CoreError> {
        while self.next_index < self.zip.len() {
            let index = self.next_index;
            self.next_index += 1;

            let mut entry = self
                .zip
                .by_index(index)
                .map_err(|e| CoreError::CorruptArchive(e.to_string()))?;

            if entry.is_dir() {
                continue;
            }
            let path = entry.name().to_string();
            if !is_video_path(&path) {
                tracing::debug!(entry = %path, "skipping non-video archive entry");
                continue;
            }
            if entry.size() > max_entry_bytes {
                return Err(CoreError::EntryTooLarge {
                    name: path,
                    size: entry.size(),
                });
            }

            let mut payload = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut payload)?;

            return Ok(Some(ExtractedVideo {
                file_name: basename(&path),
                payload,
            }));
        }
        Ok(None)
    }

    /// Drain the decoder, collecting every qualifying video entry in
    /// archive order.
    pub fn extract_all(mut self, max_entry_bytes: u64) -> Result<Vec<ExtractedVideo>, CoreError> {
        let mut videos = Vec::new();
        while let Some(video) = self.next_video(max_entry_bytes)? {
            videos.push(video);
        }
        Ok(videos)
    }
}

/// Strip directory components from an archive entry path.
fn basename(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extension_filter() {
        for ext in VIDEO_EXTENSIONS {
            assert!(is_video_extension(ext), "ext: {ext}");
        }
        assert!(is_video_extension("MP4"));
        assert!(is_video_extension("MkV"));
        assert!(!is_video_extension("txt"));
        assert!(!is_video_extension(""));
    }

    #[test]
    fn test_video_path_detection() {
        assert!(is_video_path("extras/lesson1.mp4"));
        assert!(is_video_path("CLIP.MOV"));
        assert!(!is_video_path("readme.txt"));
        assert!(!is_video_path("no_extension"));
    }

    #[test]
    fn test_skips_directories_and_non_video_entries() {
        let bytes = build_zip(&[
            ("lesson1.mp4", b"video-bytes".as_slice()),
            ("readme.txt", b"hello".as_slice()),
            ("extras/", b"".as_slice()),
        ]);

        let decoder = ArchiveDecoder::open(bytes).unwrap();
        assert_eq!(decoder.len(), 3, "all entries counted, qualifying or not");
        assert!(!decoder.is_empty());
        let videos = decoder.extract_all(u64::MAX).unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].file_name, "lesson1.mp4");
        assert_eq!(videos[0].payload, b"video-bytes");
    }

    #[test]
    fn test_archive_order_is_preserved_and_paths_stripped() {
        let bytes = build_zip(&[
            ("02/second.webm", b"b".as_slice()),
            ("01/first.mp4", b"a".as_slice()),
        ]);

        let videos = ArchiveDecoder::open(bytes).unwrap().extract_all(u64::MAX).unwrap();
        let names: Vec<_> = videos.iter().map(|v| v.file_name.as_str()).collect();
        assert_eq!(names, vec!["second.webm", "first.mp4"]);
    }

    #[test]
    fn test_corrupt_archive() {
        let result = ArchiveDecoder::open(b"definitely not a zip".to_vec());
        assert_matches!(result, Err(CoreError::CorruptArchive(_)));
    }

    #[test]
    fn test_entry_over_budget() {
        let bytes = build_zip(&[("big.mp4", [0u8; 1024].as_slice())]);
        let mut decoder = ArchiveDecoder::open(bytes).unwrap();
        let result = decoder.next_video(512);
        assert_matches!(result, Err(CoreError::EntryTooLarge { size: 1024, .. }));
    }

    #[test]
    fn test_one_shot_pull() {
        let bytes = build_zip(&[
            ("a.mp4", b"a".as_slice()),
            ("b.mp4", b"b".as_slice()),
        ]);
        let mut decoder = ArchiveDecoder::open(bytes).unwrap();

        assert_eq!(decoder.next_video(u64::MAX).unwrap().unwrap().file_name, "a.mp4");
        assert_eq!(decoder.next_video(u64::MAX).unwrap().unwrap().file_name, "b.mp4");
        assert!(decoder.next_video(u64::MAX).unwrap().is_none());
        // Exhausted for good.
        assert!(decoder.next_video(u64::MAX).unwrap().is_none());
    }
}
