use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fs;

/// Decoded RGBA pixels ready to hand to the tray toolkit.
///
/// Decoding happens where commands are parsed, which may be off the main
/// thread; the toolkit icon types are only constructed on the thread that
/// owns the tray.
#[derive(Debug, Clone, PartialEq)]
pub struct IconData {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl IconData {
    /// Convert into the tray icon type.
    pub fn into_tray_icon(self) -> Result<tray_icon::Icon> {
        tray_icon::Icon::from_rgba(self.rgba, self.width, self.height)
            .context("Icon data rejected by the tray toolkit")
    }

    /// Convert into the menu item icon type.
    pub fn into_menu_icon(self) -> Result<tray_icon::menu::Icon> {
        tray_icon::menu::Icon::from_rgba(self.rgba, self.width, self.height)
            .context("Icon data rejected by the menu toolkit")
    }
}

/// Prefix marking an inline base64 icon source.
const BASE64_PREFIX: &str = "b64:";

/// Read raw icon bytes from an icon source: either an inline
/// `b64:BASE64` payload or a file path.
pub fn read_icon_bytes(source: &str) -> Result<Vec<u8>> {
    if let Some(payload) = source.strip_prefix(BASE64_PREFIX) {
        STANDARD
            .decode(payload)
            .context("Invalid base64 icon payload")
    } else {
        fs::read(source).with_context(|| format!("Failed to read icon file: {}", source))
    }
}

/// Decode encoded image bytes (ICO, PNG, anything the decoder autodetects)
/// into RGBA pixels.
pub fn decode_rgba(bytes: &[u8]) -> Result<IconData> {
    let image = image::load_from_memory(bytes).context("Unsupported icon image data")?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(IconData {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

/// Resolve an icon source into decoded pixels.
pub fn from_source(source: &str) -> Result<IconData> {
    decode_rgba(&read_icon_bytes(source)?)
}

/// Built-in icon shown until an `icon` command arrives: a plain blue disc.
pub fn default_icon() -> IconData {
    let size = 32u32;
    let mut rgba = vec![0u8; (size * size * 4) as usize];

    let center = size as i32 / 2;
    let radius = size as i32 / 2 - 3;

    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let dx = x - center;
            let dy = y - center;

            let idx = ((y * size as i32 + x) * 4) as usize;
            if dx * dx + dy * dy < radius * radius {
                rgba[idx] = 66; // R
                rgba[idx + 1] = 135; // G
                rgba[idx + 2] = 245; // B
                rgba[idx + 3] = 255; // A
            }
        }
    }

    IconData {
        rgba,
        width: size,
        height: size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// A valid PNG payload produced with the same codec used for decoding.
    fn sample_png() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_read_base64_source() {
        assert_eq!(read_icon_bytes("b64:SGVsbG8=").unwrap(), b"Hello");
    }

    #[test]
    fn test_read_invalid_base64_source() {
        assert!(read_icon_bytes("b64:not base64!").is_err());
    }

    #[test]
    fn test_read_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"icon bytes").unwrap();

        let path = file.path().to_str().unwrap();
        assert_eq!(read_icon_bytes(path).unwrap(), b"icon bytes");
    }

    #[test]
    fn test_read_missing_file_source() {
        assert!(read_icon_bytes("/no/such/icon.ico").is_err());
    }

    #[test]
    fn test_decode_png_bytes() {
        let icon = decode_rgba(&sample_png()).unwrap();
        assert_eq!((icon.width, icon.height), (2, 3));
        assert_eq!(icon.rgba.len(), 2 * 3 * 4);
        assert_eq!(&icon.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_bytes() {
        assert!(decode_rgba(b"definitely not an image").is_err());
    }

    #[test]
    fn test_default_icon_dimensions() {
        let icon = default_icon();
        assert_eq!((icon.width, icon.height), (32, 32));
        assert_eq!(icon.rgba.len(), 32 * 32 * 4);
        // Center is opaque, corners are transparent.
        let center = ((16 * 32 + 16) * 4) as usize;
        assert_eq!(icon.rgba[center + 3], 255);
        assert_eq!(icon.rgba[3], 0);
    }
}
