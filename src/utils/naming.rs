use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Prefix of every key created by a local upload.
pub const UPLOAD_PREFIX: &str = "uploads/";

/// `uploads/<millis>_<name>`. The millisecond prefix keeps same-named uploads distinct and sorted.
pub fn upload_key(original_name: &str, uploaded_at_millis: i64) -> String {
    format!("{}{}_{}", UPLOAD_PREFIX, uploaded_at_millis, original_name)
}

/// Last path segment of a key, used as the download file name.
pub fn display_name(key: &str) -> &str {
    key.rsplit('/').find(|s| !s.is_empty()).unwrap_or(key)
}

/// `attachment` disposition with an ASCII fallback name and an RFC 5987 encoded name.
pub fn attachment_disposition(key: &str) -> String {
    let filename = display_name(key);

    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .take(64)
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };

    let encoded_filename = utf8_percent_encode(filename, NON_ALPHANUMERIC).to_string();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback_filename, encoded_filename
    )
}
