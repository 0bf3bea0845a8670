// src/services/upload.rs
use std::path::PathBuf;

use uuid::Uuid;

use crate::{
    core::{config::Config, error::AppError},
    dtos::upload::{UploadKind, UploadResponse},
};

/// 允许的图片类型及落盘扩展名。忽略 `; charset=...` 之类的参数。
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// 按文件头魔数识别图片格式，返回落盘扩展名
pub fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("jpg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("png"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        _ => None,
    }
}

/// 校验并保存图片到 `{upload_dir}/{kind}/{uuid}.{ext}`，返回对外访问地址。
pub async fn save_image(
    config: &Config,
    kind: UploadKind,
    content_type: &str,
    bytes: &[u8],
) -> Result<UploadResponse, AppError> {
    let declared = image_extension(content_type)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported image type: {}", content_type)))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    // 以文件内容为准，声明类型与实际内容不符直接拒绝
    let ext = sniff_image(bytes)
        .filter(|sniffed| *sniffed == declared)
        .ok_or_else(|| {
            tracing::warn!("⚠️ Upload rejected: declared {} but content does not match", content_type);
            AppError::BadRequest("File content is not a valid image of the declared type".to_string())
        })?;
    if bytes.len() > config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Image exceeds the {} KB limit",
            config.max_upload_bytes / 1024
        )));
    }

    let dir = PathBuf::from(&config.upload_dir).join(kind.as_ref());
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Create upload dir failed: {}", e)))?;

    let file_name = format!("{}.{}", Uuid::new_v4().simple(), ext);
    tokio::fs::write(dir.join(&file_name), bytes)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Write upload failed: {}", e)))?;

    let url = format!(
        "{}/{}/{}",
        config.public_base_url.trim_end_matches('/'),
        kind,
        file_name
    );
    tracing::info!("🖼️ Stored {} image: {} ({} bytes)", kind, url, bytes.len());

    Ok(UploadResponse {
        url,
        size: bytes.len(),
        content_type: content_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_images_are_accepted() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("application/pdf"), None);
        assert_eq!(image_extension("image/svg+xml"), None);
        assert_eq!(image_extension("image/PNG; charset=binary"), Some("png"));
    }

    #[test]
    fn magic_bytes_decide_the_format() {
        assert_eq!(sniff_image(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), Some("jpg"));
        assert_eq!(sniff_image(b"\x89PNG\r\n\x1a\n rest"), Some("png"));
        assert_eq!(sniff_image(b"GIF89a...."), Some("gif"));
        assert_eq!(sniff_image(b"RIFF\x10\0\0\0WEBPVP8 "), Some("webp"));
        assert_eq!(sniff_image(b"<svg xmlns=...>"), None);
        assert_eq!(sniff_image(b"\xFF\xD8"), None);
    }

    fn config(dir: &std::path::Path) -> Config {
        Config {
            database_url: String::new().into(),
            redis_url: String::new().into(),
            jwt_secret: String::new().into(),
            server_port: 3000,
            server_host: "127.0.0.1".into(),
            rust_log: "info".into(),
            jwt_expiration: 3600,
            refresh_token_expiration: 3600,
            default_page_size: 10,
            max_page_size: 100,
            upload_dir: dir.to_string_lossy().into_owned(),
            max_upload_bytes: 1024,
            public_base_url: "/uploads".into(),
            cookie_secure: false,
            run_migrations: false,
        }
    }

    #[tokio::test]
    async fn disguised_file_is_rejected() {
        let dir = std::env::temp_dir().join(format!("cms-upload-{}", Uuid::new_v4().simple()));
        let config = config(&dir);

        let err = save_image(&config, UploadKind::Avatar, "image/png", b"<html>not an image</html>")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn real_png_is_stored_under_its_kind() {
        let dir = std::env::temp_dir().join(format!("cms-upload-{}", Uuid::new_v4().simple()));
        let config = config(&dir);
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

        let uploaded = save_image(&config, UploadKind::Event, "image/png; name=x", png).await.unwrap();

        assert!(uploaded.url.starts_with("/uploads/event/"));
        assert!(uploaded.url.ends_with(".png"));
        assert_eq!(uploaded.size, png.len());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
