//! Formatting helpers for rendering pending files and the bucket listing.

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human readable size with at most two decimals, e.g. `1.5 KB`. Anything past GB stays in GB.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut threshold: u64 = 1024;
    while unit < SIZE_UNITS.len() - 1 && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');

    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Lower-cased extension after the last dot, or `unknown`.
pub fn file_type(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => "unknown".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Image,
    Pdf,
    Word,
    Excel,
    PowerPoint,
    Archive,
    Audio,
    Video,
    Code,
    Other,
}

/// Checked in order; the first category with a keyword contained in the type wins.
const CATEGORY_KEYWORDS: &[(FileCategory, &[&str])] = &[
    (
        FileCategory::Image,
        &["image", "jpg", "jpeg", "png", "gif", "bmp", "svg"],
    ),
    (FileCategory::Pdf, &["pdf"]),
    (FileCategory::Word, &["word", "doc", "docx"]),
    (FileCategory::Excel, &["excel", "xls", "xlsx"]),
    (FileCategory::PowerPoint, &["powerpoint", "ppt", "pptx"]),
    (FileCategory::Archive, &["zip", "rar", "7z", "tar"]),
    (
        FileCategory::Audio,
        &["audio", "mp3", "wav", "ogg", "flac"],
    ),
    (FileCategory::Video, &["video", "mp4", "avi", "mov", "mkv"]),
    (
        FileCategory::Code,
        &[
            "text",
            "javascript",
            "js",
            "css",
            "html",
            "xml",
            "json",
            "php",
            "py",
            "java",
            "cpp",
            "c",
        ],
    ),
];

impl FileCategory {
    /// Classifies a MIME type or extension by substring match.
    pub fn classify(declared: &str) -> Self {
        let declared = declared.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| declared.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(FileCategory::Other)
    }

    /// Font Awesome class of the category.
    pub fn icon(self) -> &'static str {
        match self {
            FileCategory::Image => "fa-file-image",
            FileCategory::Pdf => "fa-file-pdf",
            FileCategory::Word => "fa-file-word",
            FileCategory::Excel => "fa-file-excel",
            FileCategory::PowerPoint => "fa-file-powerpoint",
            FileCategory::Archive => "fa-file-archive",
            FileCategory::Audio => "fa-file-audio",
            FileCategory::Video => "fa-file-video",
            FileCategory::Code => "fa-file-code",
            FileCategory::Other => "fa-file",
        }
    }
}

pub fn file_icon(declared: &str) -> &'static str {
    FileCategory::classify(declared).icon()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024 + 1024 * 1024 * 512), "5.5 GB");
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_format_size_rounds_to_two_decimals() {
        // 1234 / 1024 = 1.205...
        assert_eq!(format_size(1234), "1.21 KB");
    }

    #[test]
    fn test_file_type() {
        assert_eq!(file_type("archive.tar.gz"), "gz");
        assert_eq!(file_type("README"), "unknown");
        assert_eq!(file_type("a."), "unknown");
        assert_eq!(file_type(""), "unknown");
        assert_eq!(file_type("Photo.JPG"), "jpg");
    }

    #[test]
    fn test_file_icon() {
        assert_eq!(file_icon("image/png"), "fa-file-image");
        assert_eq!(file_icon("application/pdf"), "fa-file-pdf");
        assert_eq!(file_icon(""), "fa-file");
        assert_eq!(file_icon("DOCX"), "fa-file-word");
        assert_eq!(file_icon("application/zip"), "fa-file-archive");
        assert_eq!(file_icon("audio/mpeg"), "fa-file-audio");
        assert_eq!(file_icon("video/mp4"), "fa-file-video");
        assert_eq!(file_icon("text/plain"), "fa-file-code");
        assert_eq!(file_icon("unknown"), "fa-file");
    }

    #[test]
    fn test_file_icon_priority_is_first_match() {
        // "svg" is an image keyword and wins over the later "xml" code keyword
        assert_eq!(file_icon("image/svg+xml"), "fa-file-image");
    }
}
