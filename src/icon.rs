use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui::IconData;

/// Window icon from an image file, or `None` when it cannot be loaded.
pub fn load_icon(path: &Path) -> Option<Arc<IconData>> {
    match decode_icon(path) {
        Ok(icon) => Some(Arc::new(icon)),
        Err(error) => {
            tracing::warn!(path = %path.display(), "window icon unavailable: {error:#}");
            None
        }
    }
}

fn decode_icon(path: &Path) -> Result<IconData> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode_icon_bytes(&bytes)
}

fn decode_icon_bytes(bytes: &[u8]) -> Result<IconData> {
    let image = image::load_from_memory(bytes)
        .context("icon is not a supported image")?
        .into_rgba8();
    let (width, height) = image.dimensions();
    Ok(IconData {
        rgba: image.into_raw(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    #[test]
    fn missing_file_means_no_icon() {
        assert!(load_icon(Path::new("does/not/exist.png")).is_none());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(decode_icon_bytes(b"not an image").is_err());
    }

    #[test]
    fn png_decodes_to_rgba() {
        let image = RgbaImage::from_pixel(2, 3, Rgba([10, 20, 30, 255]));
        let mut encoded = Cursor::new(Vec::new());
        image
            .write_to(&mut encoded, ImageFormat::Png)
            .expect("encode png");

        let icon = decode_icon_bytes(encoded.get_ref()).expect("decode png");
        assert_eq!((icon.width, icon.height), (2, 3));
        assert_eq!(icon.rgba.len(), 2 * 3 * 4);
        assert_eq!(&icon.rgba[..4], &[10, 20, 30, 255]);
    }
}
