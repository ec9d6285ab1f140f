use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use object_storage::{ObjectStore, content_type_for, file_extension, object_key};

use crate::{ImageUpload, MarketplaceError};

/// Largest accepted photo, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// A photo ready for upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Original file name
    pub file_name: String,
    /// MIME type sent to the bucket
    pub content_type: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

/// Decodes one base64 photo, accepting plain payloads and `data:` URLs.
pub fn decode_image(upload: &ImageUpload) -> Result<DecodedImage, MarketplaceError> {
    let (data_url_type, payload) = match upload.data.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                MarketplaceError::validation(format!("{} is not a valid data URL", upload.file_name))
            })?;
            let mime = header.strip_suffix(";base64").unwrap_or(header);
            (Some(mime.to_string()), payload)
        }
        None => (None, upload.data.as_str()),
    };

    let content_type = upload
        .content_type
        .clone()
        .or(data_url_type)
        .filter(|mime| !mime.is_empty())
        .unwrap_or_else(|| content_type_for(&file_extension(&upload.file_name)).to_string());

    if !content_type.starts_with("image/") {
        return Err(MarketplaceError::validation(format!(
            "{} is not an image",
            upload.file_name
        )));
    }

    let bytes = BASE64.decode(payload.trim()).map_err(|_| {
        MarketplaceError::validation(format!("{} could not be decoded", upload.file_name))
    })?;

    if bytes.is_empty() {
        return Err(MarketplaceError::validation(format!(
            "{} is empty",
            upload.file_name
        )));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MarketplaceError::validation(format!(
            "{} is larger than 10MB",
            upload.file_name
        )));
    }

    Ok(DecodedImage {
        file_name: upload.file_name.clone(),
        content_type,
        bytes,
    })
}

/// Decodes every photo, failing on the first bad one.
pub fn decode_images(uploads: &[ImageUpload]) -> Result<Vec<DecodedImage>, MarketplaceError> {
    uploads.iter().map(decode_image).collect()
}

/// Puts photos in `order`, e.g. the output of [`crate::validation::image_upload_order`].
pub fn arrange_images(images: Vec<DecodedImage>, order: &[usize]) -> Vec<DecodedImage> {
    let mut slots: Vec<Option<DecodedImage>> = images.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&index| slots.get_mut(index).and_then(Option::take))
        .collect()
}

/// A photo stored in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Object key
    pub key: String,
    /// Public URL
    pub url: String,
    /// Display position
    pub order: i32,
}

/// Uploads `images` one at a time under `prefix`, numbering them from `first_order`.
///
/// If any upload fails the ones already stored are removed before the error is returned.
pub async fn upload_images(
    store: &dyn ObjectStore,
    prefix: &str,
    first_order: usize,
    images: Vec<DecodedImage>,
) -> Result<Vec<UploadedImage>, MarketplaceError> {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let mut uploaded = Vec::with_capacity(images.len());

    for (offset, image) in images.into_iter().enumerate() {
        let order = first_order + offset;
        let key = object_key(prefix, timestamp, order, &image.file_name);

        match store.upload(&key, image.bytes, &image.content_type).await {
            Ok(url) => uploaded.push(UploadedImage {
                key,
                url,
                order: order as i32,
            }),
            Err(e) => {
                tracing::error!("Upload of {} failed: {}", key, e);
                remove_uploads(store, &uploaded).await;
                return Err(e.into());
            }
        }
    }

    Ok(uploaded)
}

/// Best-effort removal of objects whose rows were never committed.
pub async fn remove_uploads(store: &dyn ObjectStore, uploaded: &[UploadedImage]) {
    for image in uploaded {
        if let Err(e) = store.delete(&image.key).await {
            tracing::warn!("Failed to remove orphaned upload {}: {}", image.key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_storage::MemoryObjectStore;

    fn upload(file_name: &str, content_type: Option<&str>, data: &str) -> ImageUpload {
        ImageUpload {
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_string),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_decode_plain_payload() {
        let image = decode_image(&upload("court.png", None, "aGVsbG8=")).unwrap();
        assert_eq!(image.bytes, b"hello");
        assert_eq!(image.content_type, "image/png");
    }

    #[test]
    fn test_decode_data_url() {
        let image =
            decode_image(&upload("photo", None, "data:image/webp;base64,aGVsbG8=")).unwrap();
        assert_eq!(image.content_type, "image/webp");
        assert_eq!(image.bytes, b"hello");
    }

    #[test]
    fn test_rejects_non_images_and_garbage() {
        assert!(decode_image(&upload("notes.txt", Some("text/plain"), "aGVsbG8=")).is_err());
        assert!(decode_image(&upload("court.jpg", None, "%%%")).is_err());
        assert!(decode_image(&upload("court.jpg", None, "")).is_err());
    }

    fn decoded(name: &str) -> DecodedImage {
        DecodedImage {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_arrange_images() {
        let arranged = arrange_images(
            vec![decoded("a.jpg"), decoded("b.jpg"), decoded("c.jpg")],
            &[2, 0, 1],
        );
        let names: Vec<_> = arranged.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["c.jpg", "a.jpg", "b.jpg"]);
    }

    #[tokio::test]
    async fn test_upload_images_numbers_from_first_order() {
        let store = MemoryObjectStore::new("https://cdn.example.com");
        let uploaded = upload_images(&store, "camp-1", 3, vec![decoded("a.png"), decoded("b.jpg")])
            .await
            .unwrap();

        assert_eq!(uploaded.len(), 2);
        assert_eq!(uploaded[0].order, 3);
        assert!(uploaded[0].key.starts_with("camp-1/"));
        assert!(uploaded[0].key.ends_with("-3.png"));
        assert!(uploaded[1].url.starts_with("https://cdn.example.com/camp-1/"));
        assert_eq!(store.keys().len(), 2);

        remove_uploads(&store, &uploaded).await;
        assert!(store.keys().is_empty());
    }
}
