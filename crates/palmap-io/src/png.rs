//! PNG support with the embedded `PMAP` text chunk
//!
//! Rasters are always written as 8-bit RGBA. Any PNG color type is read
//! and expanded to RGBA. Text chunks are collected from the chunks that
//! precede the image data, which is where [`write_png`] puts them.

use crate::{IoError, IoResult};
use palmap_core::{Color, Raster};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Keyword of the text chunk carrying PMAP text.
pub const PMAP_KEYWORD: &str = "PMAP";

/// Read a PNG image and the text of its `PMAP` chunk, if any.
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<(Raster, Option<String>)> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let pmap = find_text(reader.info(), PMAP_KEYWORD);
    let width = reader.info().width;
    let height = reader.info().height;
    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNG output depth: {:?}",
            bit_depth
        )));
    }
    let samples = match color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "indexed PNG was not expanded".to_string(),
            ));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height as usize {
        let row = &data[y * bytes_per_row..];
        for x in 0..width as usize {
            let px = &row[x * samples..x * samples + samples];
            pixels.push(match samples {
                1 => Color::rgb(px[0], px[0], px[0]),
                2 => Color::new(px[0], px[0], px[0], px[1]),
                3 => Color::rgb(px[0], px[1], px[2]),
                _ => Color::new(px[0], px[1], px[2], px[3]),
            });
        }
    }

    let raster = Raster::from_pixels(width, height, pixels)?;
    Ok((raster, pmap))
}

/// Write a raster as an RGBA PNG, optionally with a `PMAP` text chunk.
pub fn write_png<W: Write>(raster: &Raster, pmap: Option<&str>, writer: W) -> IoResult<()> {
    if raster.is_empty() {
        return Err(IoError::InvalidData(format!(
            "cannot encode {}x{} raster as PNG",
            raster.width(),
            raster.height()
        )));
    }

    let mut encoder = Encoder::new(writer, raster.width(), raster.height());
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    if let Some(text) = pmap {
        encoder
            .add_text_chunk(PMAP_KEYWORD.to_string(), text.to_string())
            .map_err(|e| IoError::EncodeError(format!("PNG text chunk error: {}", e)))?;
    }

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;
    writer
        .write_image_data(&raster.to_rgba_bytes())
        .map_err(|e| IoError::EncodeError(format!("PNG data error: {}", e)))?;
    writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {}", e)))?;
    Ok(())
}

/// Text of the first chunk with `keyword`, across tEXt, zTXt and iTXt.
fn find_text(info: &png::Info<'_>, keyword: &str) -> Option<String> {
    if let Some(chunk) = info
        .uncompressed_latin1_text
        .iter()
        .find(|c| c.keyword == keyword)
    {
        return Some(chunk.text.clone());
    }
    if let Some(chunk) = info
        .compressed_latin1_text
        .iter()
        .find(|c| c.keyword == keyword)
    {
        return chunk.get_text().ok();
    }
    info.utf8_text
        .iter()
        .find(|c| c.keyword == keyword)
        .and_then(|c| c.get_text().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> Raster {
        Raster::from_pixels(
            2,
            2,
            vec![
                Color::rgb(255, 0, 0),
                Color::new(0, 255, 0, 128),
                Color::rgb(255, 0, 0),
                Color::TRANSPARENT,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_png_round_trip_with_text() {
        let raster = sample();
        let mut buf = Vec::new();
        write_png(&raster, Some("1\n#FF0000 2 0;0 0;1"), &mut buf).unwrap();

        let (decoded, pmap) = read_png(Cursor::new(buf)).unwrap();
        assert_eq!(decoded, raster);
        assert_eq!(pmap.as_deref(), Some("1\n#FF0000 2 0;0 0;1"));
    }

    #[test]
    fn test_png_without_text() {
        let mut buf = Vec::new();
        write_png(&sample(), None, &mut buf).unwrap();
        let (_, pmap) = read_png(Cursor::new(buf)).unwrap();
        assert!(pmap.is_none());
    }

    #[test]
    fn test_empty_raster_rejected() {
        let empty = Raster::new(0, 0, Color::TRANSPARENT);
        assert!(matches!(
            write_png(&empty, None, Vec::new()),
            Err(IoError::InvalidData(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            read_png(Cursor::new(b"not a png".to_vec())),
            Err(IoError::DecodeError(_))
        ));
    }
}
