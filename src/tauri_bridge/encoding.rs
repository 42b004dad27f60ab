//! Frame encoding for transfer to the webview

use image::{codecs::jpeg::JpegEncoder, ImageBuffer, ImageEncoder, Rgba};

use crate::error::{CardError, Result};

/// Compress an RGBA frame to JPEG (alpha is dropped)
pub fn encode_jpeg(rgba: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>> {
    let img: ImageBuffer<Rgba<u8>, &[u8]> = ImageBuffer::from_raw(width, height, rgba)
        .ok_or_else(|| {
            CardError::Encode(format!(
                "frame is {} bytes, expected {} for {width}x{height}",
                rgba.len(),
                width as usize * height as usize * 4
            ))
        })?;

    let rgb: Vec<u8> = img.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect();

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, quality).write_image(
        &rgb,
        width,
        height,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(jpeg_data)
}
