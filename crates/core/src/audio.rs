//! Audio upload validation and object-storage key generation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum accepted audio upload size (50 MiB).
pub const MAX_AUDIO_BYTES: usize = 50 * 1024 * 1024;

/// Accepted audio MIME types.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/wave",
    "audio/ogg",
    "audio/aac",
    "audio/mp4",
    "audio/x-m4a",
    "audio/webm",
    "audio/flac",
];

/// Key prefix under which audio objects are stored.
pub const STORAGE_PREFIX: &str = "audio";

/// Maximum length of the sanitized file-name part of a storage key.
const MAX_KEY_NAME_LENGTH: usize = 100;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex is valid"));

/// Essence of a `Content-Type` value: parameters dropped, lowercased.
pub fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Validate an upload's MIME type and size, returning the normalized type.
pub fn validate_upload(mime_type: &str, size_bytes: usize) -> Result<String, CoreError> {
    let mime = normalize_mime(mime_type);
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported audio type '{mime_type}'. Allowed: {ALLOWED_MIME_TYPES:?}"
        )));
    }
    if size_bytes == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if size_bytes > MAX_AUDIO_BYTES {
        return Err(CoreError::Validation(format!(
            "File is {size_bytes} bytes; the maximum is {MAX_AUDIO_BYTES} bytes"
        )));
    }
    Ok(mime)
}

/// Reduce a client-supplied file name to a storage-safe form.
///
/// Path components are dropped, runs of unsafe characters become `_`, and an
/// empty result falls back to `audio`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches(|c| c == '_' || c == '.');
    if cleaned.is_empty() {
        return "audio".to_string();
    }
    cleaned.chars().take(MAX_KEY_NAME_LENGTH).collect()
}

/// Build the object-storage key for an upload received at `now`.
///
/// Format: `audio/<unix-millis>-<nonce>-<sanitized-name>`. The caller supplies
/// a random `nonce` so that repeated uploads of one file never share a key.
pub fn storage_key(now: Timestamp, nonce: &str, file_name: &str) -> String {
    format!(
        "{STORAGE_PREFIX}/{}-{nonce}-{}",
        now.timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_known_types() {
        assert!(validate_upload("audio/mpeg", 1024).is_ok());
        assert!(validate_upload("Audio/OGG; codecs=opus", 1024).is_ok());
    }

    #[test]
    fn validated_type_is_normalized() {
        assert_eq!(
            validate_upload("Audio/OGG; codecs=opus", 1024).unwrap(),
            "audio/ogg"
        );
        assert_eq!(normalize_mime(" audio/MPEG "), "audio/mpeg");
    }

    #[test]
    fn rejects_non_audio() {
        assert!(validate_upload("video/mp4", 1024).is_err());
        assert!(validate_upload("application/octet-stream", 1024).is_err());
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(validate_upload("audio/mpeg", 0).is_err());
        assert!(validate_upload("audio/mpeg", MAX_AUDIO_BYTES).is_ok());
        assert!(validate_upload("audio/mpeg", MAX_AUDIO_BYTES + 1).is_err());
    }

    #[test]
    fn sanitize_strips_paths_and_symbols() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\music\\rain sounds.mp3"), "rain_sounds.mp3");
        assert_eq!(sanitize_file_name("méditation #1.ogg"), "m_ditation_1.ogg");
        assert_eq!(sanitize_file_name("???"), "audio");
    }

    #[test]
    fn storage_key_is_timestamped() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            storage_key(now, "3f2a9c", "Deep Sleep.mp3"),
            format!("audio/{}-3f2a9c-Deep_Sleep.mp3", now.timestamp_millis())
        );
    }

    #[test]
    fn same_file_in_same_millisecond_gets_distinct_keys() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_ne!(
            storage_key(now, "aaaa", "rain.mp3"),
            storage_key(now, "bbbb", "rain.mp3")
        );
    }
}
