use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use eyre::{Context as _, Result};
use image::{DynamicImage, ImageFormat};
use mongodb::bson::oid::ObjectId;

const SUBDIR: &str = "signatures";

/// Stores submitted signature images as PNG files under the data directory.
/// Callers treat every failure here as cosmetic: the registration record is
/// created either way.
#[derive(Clone)]
pub struct Signatures {
    data_dir: PathBuf,
}

impl Signatures {
    pub(crate) fn new(data_dir: PathBuf) -> Self {
        Signatures { data_dir }
    }

    /// Decodes a base64 payload (optionally a `data:` URL), normalizes it to
    /// PNG keeping transparency, and returns the stored relative path.
    pub fn store(&self, payload: &str) -> Result<String> {
        let png = decode_signature(payload)?;
        let dir = self.data_dir.join(SUBDIR);
        fs::create_dir_all(&dir).context("Failed to create signatures directory")?;
        let name = format!("{}.png", ObjectId::new().to_hex());
        fs::write(dir.join(&name), png).context("Failed to write signature file")?;
        Ok(format!("{SUBDIR}/{name}"))
    }

    /// Absolute path for a stored relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.data_dir.join(relative)
    }
}

fn decode_signature(payload: &str) -> Result<Vec<u8>> {
    let raw = payload
        .rsplit_once("base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(payload);
    let bytes = STANDARD
        .decode(raw.trim())
        .context("Signature is not valid base64")?;
    let decoded =
        image::load_from_memory(&bytes).context("Signature is not a decodable image")?;

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(decoded.into_rgba8())
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("Failed to re-encode signature as PNG")?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;

    use super::*;

    fn sample_png() -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, image::Rgba([0, 0, 0, 255])))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn rejects_garbage_base64() {
        assert!(decode_signature("???not-base64???").is_err());
    }

    #[test]
    fn rejects_base64_that_is_not_an_image() {
        assert!(decode_signature(&STANDARD.encode(b"plain text")).is_err());
    }

    #[test]
    fn accepts_a_plain_base64_image() {
        let png = decode_signature(&STANDARD.encode(sample_png())).unwrap();
        assert!(image::load_from_memory(&png).is_ok());
    }

    #[test]
    fn strips_a_data_url_prefix() {
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(sample_png()));
        let png = decode_signature(&payload).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 2));
    }
}
