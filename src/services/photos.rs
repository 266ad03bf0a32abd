use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Content-addressed file name: identical uploads map to the same file.
pub fn photo_file_name(bytes: &[u8], original_name: Option<&str>) -> AppResult<String> {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "jpg".to_string());
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported photo type '.{extension}'."
        )));
    }

    let digest = Sha256::digest(bytes);
    let hex = digest
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    Ok(format!("{hex}.{extension}"))
}

/// An accepted upload whose destination is known but which is not yet on disk.
#[derive(Debug, Clone)]
pub struct StagedPhoto {
    pub path: PathBuf,
    bytes: Vec<u8>,
}

impl StagedPhoto {
    pub fn stored_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Validates an upload and resolves its destination without touching disk.
pub fn stage_photo(
    upload_dir: &str,
    bytes: &[u8],
    original_name: Option<&str>,
) -> AppResult<StagedPhoto> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded photo is empty.".to_string()));
    }
    let file_name = photo_file_name(bytes, original_name)?;
    Ok(StagedPhoto {
        path: PathBuf::from(upload_dir).join(file_name),
        bytes: bytes.to_vec(),
    })
}

/// Writes staged photos and returns the paths this call created. Files that
/// already exist hold the same content and are left alone. On failure the
/// files written so far are removed again.
pub async fn store_photos(photos: &[StagedPhoto]) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for photo in photos {
        if let Err(error) = write_photo(photo, &mut written).await {
            discard_photos(&written).await;
            return Err(error);
        }
    }
    Ok(written)
}

async fn write_photo(photo: &StagedPhoto, written: &mut Vec<PathBuf>) -> AppResult<()> {
    if tokio::fs::try_exists(&photo.path).await.unwrap_or(false) || written.contains(&photo.path) {
        return Ok(());
    }
    if let Some(directory) = photo.path.parent() {
        tokio::fs::create_dir_all(directory).await.map_err(|error| {
            AppError::dependency("Could not prepare upload directory.", error.to_string())
        })?;
    }
    tokio::fs::write(&photo.path, &photo.bytes)
        .await
        .map_err(|error| AppError::dependency("Could not store uploaded photo.", error.to_string()))?;
    tracing::debug!(path = %photo.path.display(), size = photo.bytes.len(), "Stored occupant photo");
    written.push(photo.path.clone());
    Ok(())
}

/// Removes photos written for a booking that was not saved.
pub async fn discard_photos(paths: &[PathBuf]) {
    for path in paths {
        if let Err(error) = tokio::fs::remove_file(path).await {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %error, "Could not remove unsaved photo");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{discard_photos, photo_file_name, stage_photo, store_photos};

    #[test]
    fn names_are_content_addressed() {
        let first = photo_file_name(b"abc", Some("guest.PNG")).unwrap();
        let second = photo_file_name(b"abc", Some("other.png")).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.png"
        );
        assert!(photo_file_name(b"abc", None).unwrap().ends_with(".jpg"));
    }

    #[test]
    fn rejects_unexpected_extensions() {
        assert!(photo_file_name(b"abc", Some("payload.exe")).is_err());
    }

    fn temp_upload_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("frontdesk-photos-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn staging_validates_without_writing() {
        let dir = temp_upload_dir();
        let dir_str = dir.to_string_lossy().into_owned();
        let staged = stage_photo(&dir_str, b"photo-bytes", Some("id.jpg")).unwrap();
        assert!(staged.path.starts_with(&dir));
        assert!(!dir.exists());
        assert!(stage_photo(&dir_str, b"", Some("id.jpg")).is_err());
        assert!(stage_photo(&dir_str, b"photo-bytes", Some("id.exe")).is_err());
    }

    #[tokio::test]
    async fn stores_and_discards_only_new_files() {
        let dir = temp_upload_dir();
        let dir_str = dir.to_string_lossy().into_owned();
        let kept = stage_photo(&dir_str, b"already-saved", Some("a.png")).unwrap();
        store_photos(std::slice::from_ref(&kept)).await.unwrap();

        let fresh = stage_photo(&dir_str, b"photo-bytes", Some("id.jpg")).unwrap();
        let written = store_photos(&[kept.clone(), fresh.clone(), fresh.clone()])
            .await
            .unwrap();
        assert_eq!(written, vec![fresh.path.clone()]);
        assert_eq!(tokio::fs::read(&fresh.path).await.unwrap(), b"photo-bytes");

        discard_photos(&written).await;
        assert!(!fresh.path.exists());
        assert!(kept.path.exists());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
