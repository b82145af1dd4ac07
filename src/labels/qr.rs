//! QR rasterization.
//!
//! The composer embeds the raw grayscale raster directly; callers that want
//! a standalone image use [`QrRaster::to_png_data_url`].

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

use crate::errors::LabelError;

/// Pixels per QR module.
const MODULE_SCALE: u32 = 8;

/// Quiet-zone width in modules.
const QUIET_ZONE: u32 = 4;

/// A rendered QR code: square, 8-bit grayscale, white background.
#[derive(Debug, Clone)]
pub struct QrRaster {
    image: GrayImage,
}

impl QrRaster {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Row-major luma bytes, one per pixel.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn to_png(&self) -> Result<Vec<u8>, LabelError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn to_png_data_url(&self) -> Result<String, LabelError> {
        let png = self.to_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(png)
        ))
    }
}

/// Encode `data` as a QR code with medium error correction.
pub fn encode_qr(data: &str) -> Result<QrRaster, LabelError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| LabelError::QrEncode(e.to_string()))?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let side = (module_count + 2 * QUIET_ZONE) * MODULE_SCALE;

    let mut image = GrayImage::from_pixel(side, side, Luma([255u8]));
    for (i, color) in modules.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let x = (i as u32 % module_count + QUIET_ZONE) * MODULE_SCALE;
        let y = (i as u32 / module_count + QUIET_ZONE) * MODULE_SCALE;
        for dy in 0..MODULE_SCALE {
            for dx in 0..MODULE_SCALE {
                image.put_pixel(x + dx, y + dy, Luma([0u8]));
            }
        }
    }

    Ok(QrRaster { image })
}

/// Encode `data` and return it as a base64 PNG data URL.
pub fn qr_data_url(data: &str) -> Result<String, LabelError> {
    encode_qr(data)?.to_png_data_url()
}
