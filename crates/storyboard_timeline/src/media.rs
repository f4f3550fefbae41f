// SPDX-License-Identifier: MIT OR Apache-2.0
//! Classification of files dropped onto scene blocks.

use serde::{Deserialize, Serialize};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm"];

/// Kind of media a scene can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    /// Still image
    Image,
    /// Video clip
    Video,
}

/// File handed over by an OS drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedFile {
    /// File name including extension
    pub name: String,
    /// Reported MIME type, may be empty
    pub mime_type: String,
}

impl DroppedFile {
    /// Create a dropped file descriptor
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

/// Classify a file by MIME type, then by extension
pub fn classify(file: &DroppedFile) -> Option<MediaKind> {
    let mime = file.mime_type.to_ascii_lowercase();
    if mime.starts_with("image/") {
        return Some(MediaKind::Image);
    }
    if mime.starts_with("video/") {
        return Some(MediaKind::Video);
    }

    let ext = file.extension()?;
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Only the first file of a drop counts
pub fn first_media(files: &[DroppedFile]) -> Option<(&DroppedFile, MediaKind)> {
    let file = files.first()?;
    classify(file).map(|kind| (file, kind))
}

/// A scene shows the drop indicator while files hover and no scene drag runs
pub fn shows_drop_indicator(dragging_files: bool, scene_drag_active: bool) -> bool {
    dragging_files && !scene_drag_active
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_mime() {
        assert_eq!(classify(&DroppedFile::new("clip", "video/mp4")), Some(MediaKind::Video));
        assert_eq!(classify(&DroppedFile::new("still.bin", "image/png")), Some(MediaKind::Image));
    }

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify(&DroppedFile::new("Shot.JPEG", "")), Some(MediaKind::Image));
        assert_eq!(classify(&DroppedFile::new("take.final.MoV", "")), Some(MediaKind::Video));
        assert_eq!(classify(&DroppedFile::new("notes.txt", "text/plain")), None);
        assert_eq!(classify(&DroppedFile::new("README", "")), None);
    }

    #[test]
    fn test_only_first_file_counts() {
        let files = vec![
            DroppedFile::new("notes.txt", "text/plain"),
            DroppedFile::new("frame.png", "image/png"),
        ];
        assert_eq!(first_media(&files), None);
        assert_eq!(first_media(&files[1..]).map(|(_, k)| k), Some(MediaKind::Image));
        assert_eq!(first_media(&[]), None);
    }

    #[test]
    fn test_drop_indicator() {
        assert!(shows_drop_indicator(true, false));
        assert!(!shows_drop_indicator(true, true));
        assert!(!shows_drop_indicator(false, false));
    }
}
