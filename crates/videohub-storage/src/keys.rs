//! Storage key generation.
//!
//! Key format: `{bucketType}/{userId}/{timestampMs}-{token}.{extension}`.
//! The millisecond timestamp plus an 11 character base-36 token keeps keys
//! unique in practice; collisions are not checked.

use crate::traits::{StorageError, StorageResult};
use rand::Rng;
use videohub_core::constants::STORAGE_KEY_TOKEN_LEN;
use videohub_core::BucketType;

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_EXTENSION_LEN: usize = 10;

/// Generate a storage key for an upload owned by `user_id`.
pub fn generate_storage_key(
    bucket_type: BucketType,
    user_id: &str,
    file_name: &str,
    content_type: &str,
) -> StorageResult<String> {
    if user_id.is_empty() || user_id.contains('/') || user_id.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "user id cannot be used as a key segment: {:?}",
            user_id
        )));
    }

    let timestamp = chrono::Utc::now().timestamp_millis();
    Ok(format!(
        "{}/{}/{}-{}.{}",
        bucket_type.as_str(),
        user_id,
        timestamp,
        random_token(STORAGE_KEY_TOKEN_LEN),
        file_extension(file_name, content_type)
    ))
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Lowercased extension of `file_name`, or one derived from the MIME type
/// when the name has no usable extension.
pub fn file_extension(file_name: &str, content_type: &str) -> String {
    let from_name = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        });

    from_name.unwrap_or_else(|| extension_for_content_type(content_type).to_string())
}

fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "video/x-msvideo" => "avi",
        "video/x-matroska" => "mkv",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key =
            generate_storage_key(BucketType::Videos, "test-user-id", "test-video.mp4", "video/mp4")
                .unwrap();
        let rest = key.strip_prefix("videos/test-user-id/").unwrap();
        let (stem, ext) = rest.rsplit_once('.').unwrap();
        assert_eq!(ext, "mp4");

        let (timestamp, token) = stem.split_once('-').unwrap();
        assert!(timestamp.parse::<i64>().unwrap() > 0);
        assert_eq!(token.len(), 11);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_keys_differ_between_calls() {
        let a = generate_storage_key(BucketType::Images, "u", "a.png", "image/png").unwrap();
        let b = generate_storage_key(BucketType::Images, "u", "a.png", "image/png").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        assert_eq!(file_extension("Clip.MOV", "video/quicktime"), "mov");
        assert_eq!(file_extension("no-extension", "video/quicktime"), "mov");
        assert_eq!(file_extension("trailing.", "image/jpeg"), "jpg");
        assert_eq!(file_extension("weird.m p4", "video/mp4"), "mp4");
        assert_eq!(file_extension("mystery", "application/octet-stream"), "bin");
    }

    #[test]
    fn test_rejects_path_like_user_ids() {
        assert!(generate_storage_key(BucketType::Videos, "../x", "a.mp4", "video/mp4").is_err());
        assert!(generate_storage_key(BucketType::Videos, "a/b", "a.mp4", "video/mp4").is_err());
        assert!(generate_storage_key(BucketType::Videos, "", "a.mp4", "video/mp4").is_err());
    }
}
