/// Extension used when a file name carries none.
const FALLBACK_EXTENSION: &str = "jpg";

/// Lower-cased, alphanumeric extension of `file_name`.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Key of an uploaded image: `{owner}/{timestamp}-{order}.{ext}`.
///
/// `owner` is the submission or camp id the image belongs to.
pub fn object_key(owner: &str, timestamp_millis: i64, order: usize, file_name: &str) -> String {
    format!(
        "{}/{}-{}.{}",
        owner,
        timestamp_millis,
        order,
        file_extension(file_name)
    )
}

/// MIME type for an image extension.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        assert_eq!(
            object_key("sub-1", 1_720_000_000_000, 0, "Court.JPG"),
            "sub-1/1720000000000-0.jpg"
        );
        assert_eq!(object_key("sub-1", 5, 3, "photo"), "sub-1/5-3.jpg");
        assert_eq!(object_key("sub-1", 5, 3, "evil.p/hp"), "sub-1/5-3.jpg");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("exe"), "application/octet-stream");
    }
}
