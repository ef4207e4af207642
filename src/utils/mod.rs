pub mod logging;

/// Detects an image mime type from the file's magic bytes.
///
/// Browsers occasionally send a blank or generic content type for file
/// fields, so the bytes are the authority and the multipart content type
/// is only a fallback.
pub fn detect_image_mime(data: &[u8], declared: Option<&str>) -> Option<String> {
    if let Some(mime) = sniff_image_mime(data) {
        return Some(mime.to_string());
    }
    declared
        .filter(|ct| ct.starts_with("image/"))
        .map(|ct| ct.to_string())
}

fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(detect_image_mime(&data, None).as_deref(), Some("image/png"));
    }

    #[test]
    fn test_detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(
            detect_image_mime(&data, None).as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn test_detect_webp() {
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.extend_from_slice(b"WEBP");
        assert_eq!(
            detect_image_mime(&data, None).as_deref(),
            Some("image/webp")
        );
    }

    #[test]
    fn test_magic_bytes_win_over_declared_type() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1];
        assert_eq!(
            detect_image_mime(&data, Some("image/png")).as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn test_falls_back_to_declared_image_type() {
        let data = b"not an image";
        assert_eq!(
            detect_image_mime(data, Some("image/bmp")).as_deref(),
            Some("image/bmp")
        );
    }

    #[test]
    fn test_rejects_non_image() {
        let data = b"plain text";
        assert_eq!(detect_image_mime(data, Some("text/plain")), None);
        assert_eq!(detect_image_mime(data, None), None);
    }
}
