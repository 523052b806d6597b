//! Writing extracted images to disk.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgb};

use crate::error::{Error, Result};
use crate::model::{ImageColor, ImagePayload, PageImage};

/// Directory that receives `page{P}_img{S}.{ext}` files.
#[derive(Debug)]
pub struct ImageStore {
    dir: PathBuf,
    saved: usize,
}

impl ImageStore {
    /// Use `dir` for images, creating it (and its parents) if absent.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::debug!("Image directory ready: {}", dir.display());
        Ok(Self { dir, saved: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of images written so far.
    pub fn saved_count(&self) -> usize {
        self.saved
    }

    /// Write an image and return its file name.
    pub fn save(&mut self, image: &PageImage) -> Result<String> {
        let filename = image.suggested_filename();
        let path = self.dir.join(&filename);

        match &image.payload {
            ImagePayload::Jpeg { data } => fs::write(&path, data)?,
            ImagePayload::Raw { .. } => encode_png(image)?
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|e| Error::ImageExtract(format!("{}: {}", filename, e)))?,
        }

        self.saved += 1;
        log::info!("Saved image {}", path.display());
        Ok(filename)
    }

    /// Markdown path for a saved file: `prefix + filename` when a prefix is
    /// set, otherwise the directory joined with the file name using `/`.
    pub fn reference(&self, filename: &str, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) => format!("{}{}", prefix, filename),
            None => {
                let dir = self.dir.to_string_lossy().replace('\\', "/");
                let dir = dir.trim_end_matches('/');
                if dir.is_empty() {
                    filename.to_string()
                } else {
                    format!("{}/{}", dir, filename)
                }
            }
        }
    }
}

/// Convert raw samples into an 8-bit gray or RGB image.
pub fn encode_png(image: &PageImage) -> Result<DynamicImage> {
    let ImagePayload::Raw {
        color,
        bits_per_component,
        data,
    } = &image.payload
    else {
        return Err(Error::ImageExtract("not a raw image".to_string()));
    };

    let samples = unpack_samples(
        data,
        image.width as usize,
        image.height as usize,
        color.components(),
        *bits_per_component,
    )?;

    let too_small = || Error::ImageExtract("pixel buffer does not match dimensions".to_string());
    let decoded = match color {
        ImageColor::Gray => DynamicImage::ImageLuma8(
            ImageBuffer::<Luma<u8>, _>::from_raw(image.width, image.height, samples)
                .ok_or_else(too_small)?,
        ),
        ImageColor::Rgb => DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, _>::from_raw(image.width, image.height, samples)
                .ok_or_else(too_small)?,
        ),
        ImageColor::Cmyk => DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, _>::from_raw(image.width, image.height, cmyk_to_rgb(&samples))
                .ok_or_else(too_small)?,
        ),
    };
    Ok(decoded)
}

/// Expand packed samples to one byte per component.
///
/// Rows of sub-byte samples are padded to a whole byte. 16-bit samples keep
/// their high byte.
fn unpack_samples(
    data: &[u8],
    width: usize,
    height: usize,
    components: usize,
    bits: u8,
) -> Result<Vec<u8>> {
    if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
        return Err(Error::ImageExtract(format!(
            "unsupported bits per component: {}",
            bits
        )));
    }

    let per_row = width * components;
    let row_bytes = (per_row * bits as usize).div_ceil(8);
    let needed = row_bytes * height;
    if data.len() < needed {
        return Err(Error::ImageExtract(format!(
            "image data too short: {} bytes, expected {}",
            data.len(),
            needed
        )));
    }

    let data = &data[..needed];
    let samples = match bits {
        8 => data.to_vec(),
        16 => data.chunks_exact(2).map(|pair| pair[0]).collect(),
        _ => {
            let max = (1u16 << bits) - 1;
            let mut out = Vec::with_capacity(per_row * height);
            for row in data.chunks_exact(row_bytes) {
                for i in 0..per_row {
                    let bit = i * bits as usize;
                    let shift = 8 - bits as usize - bit % 8;
                    let value = (row[bit / 8] >> shift) as u16 & max;
                    out.push((value * 255 / max) as u8);
                }
            }
            out
        }
    };
    Ok(samples)
}

fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(samples.len() / 4 * 3);
    for px in samples.chunks_exact(4) {
        let k = 255 - px[3] as u16;
        for &c in &px[..3] {
            rgb.push(((255 - c as u16) * k / 255) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn raw(color: ImageColor, bits: u8, w: u32, h: u32, data: Vec<u8>) -> PageImage {
        PageImage {
            page: 1,
            sequence: 1,
            width: w,
            height: h,
            payload: ImagePayload::Raw {
                color,
                bits_per_component: bits,
                data,
            },
        }
    }

    #[test]
    fn test_unpack_one_bit_rows_are_byte_aligned() {
        // 3 pixels per row: 101 padded to a byte, then 010
        let data = vec![0b1010_0000, 0b0100_0000];
        let samples = unpack_samples(&data, 3, 2, 1, 1).unwrap();
        assert_eq!(samples, vec![255, 0, 255, 0, 255, 0]);
    }

    #[test]
    fn test_unpack_sixteen_bit_keeps_high_byte() {
        let samples = unpack_samples(&[0x12, 0x34, 0xAB, 0xCD], 2, 1, 1, 16).unwrap();
        assert_eq!(samples, vec![0x12, 0xAB]);
    }

    #[test]
    fn test_unpack_rejects_short_data() {
        let err = unpack_samples(&[0; 5], 2, 1, 3, 8).unwrap_err();
        assert!(matches!(err, Error::ImageExtract(_)));
    }

    #[test]
    fn test_cmyk_to_rgb() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), vec![255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), vec![0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 0, 0]), vec![0, 255, 255]);
    }

    #[test]
    fn test_save_png_and_jpeg() {
        let dir = tempdir().unwrap();
        let mut store = ImageStore::create(dir.path().join("images")).unwrap();

        let png = raw(ImageColor::Rgb, 8, 2, 1, vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(store.save(&png).unwrap(), "page1_img1.png");
        let reopened = image::open(dir.path().join("images/page1_img1.png")).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (2, 1));

        let jpeg = PageImage::jpeg(2, 1, 1, 1, vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(store.save(&jpeg).unwrap(), "page2_img1.jpg");
        let bytes = fs::read(dir.path().join("images/page2_img1.jpg")).unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(store.saved_count(), 2);
    }

    #[test]
    fn test_save_rejects_bad_raw_image() {
        let dir = tempdir().unwrap();
        let mut store = ImageStore::create(dir.path()).unwrap();
        let broken = raw(ImageColor::Gray, 8, 10, 10, vec![0; 3]);
        assert!(store.save(&broken).is_err());
        assert_eq!(store.saved_count(), 0);
    }

    #[test]
    fn test_reference() {
        let dir = tempdir().unwrap();
        let store = ImageStore::create(dir.path().join("imgs")).unwrap();
        assert_eq!(
            store.reference("page1_img1.png", Some("assets/")),
            "assets/page1_img1.png"
        );
        let joined = store.reference("page1_img1.png", None);
        assert!(joined.ends_with("/imgs/page1_img1.png"));
        assert!(!joined.contains('\\'));
    }
}
