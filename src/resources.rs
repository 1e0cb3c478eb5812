//! Collaborators the renderer calls out to for things that are not layout:
//! fetching and decoding pictures, and converting formulas to OMML.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;

use crate::error::Error;
use crate::model::ImageFormat;
use crate::units::{EMU_PER_PX, Length};

/// SVG size when the document declares neither width/height nor a viewBox.
const DEFAULT_SVG_SIZE: (u32, u32) = (300, 150);

/// Picture bytes ready to embed, with their natural size in CSS pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
}

pub trait ImageLoader {
    /// Resolve an `src` (data URI, path or URL) into embeddable bytes.
    fn load(&self, src: &str) -> Result<LoadedImage, Error>;

    /// Sniff and, if needed, re-encode raw bytes.
    fn decode(&self, bytes: Vec<u8>) -> Result<LoadedImage, Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathKind {
    Latex,
    MathMl,
}

pub trait MathConverter {
    /// Convert a formula to an `m:oMath` element.
    fn convert(&self, source: &str, kind: MathKind) -> Result<String, Error>;
}

/// Loads `data:` URIs and local files. Remote URLs need a host-supplied
/// loader.
#[derive(Clone, Debug, Default)]
pub struct DefaultImageLoader {
    base_dir: Option<PathBuf>,
}

impl DefaultImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir` instead of the working directory.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve_path(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageLoader for DefaultImageLoader {
    fn load(&self, src: &str) -> Result<LoadedImage, Error> {
        let src = src.trim();
        if src.is_empty() {
            return Err(Error::Image("empty image source".into()));
        }
        if src.starts_with("data:") {
            let (_, data) = parse_data_uri(src)
                .ok_or_else(|| Error::Image("malformed data URI".into()))?;
            return self.decode(data);
        }
        let lower = src.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Err(Error::Image(format!(
                "remote image {src} needs a network-capable image loader"
            )));
        }
        let path = match src.strip_prefix("file://") {
            Some(rest) => PathBuf::from(percent_decode(rest).map_or_else(
                || rest.to_string(),
                |b| String::from_utf8_lossy(&b).into_owned(),
            )),
            None => self.resolve_path(src),
        };
        let data = std::fs::read(&path)
            .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?;
        self.decode(data)
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<LoadedImage, Error> {
        if looks_like_svg(&bytes) {
            let (width_px, height_px) = svg_size(&bytes)?;
            return Ok(LoadedImage {
                data: bytes,
                format: ImageFormat::Svg,
                width_px,
                height_px,
            });
        }
        let guessed = image::guess_format(&bytes)
            .map_err(|e| Error::Image(format!("unrecognised image data: {e}")))?;
        let decoded = image::load_from_memory_with_format(&bytes, guessed)
            .map_err(|e| Error::Image(format!("could not decode image: {e}")))?;
        let (width_px, height_px) = (decoded.width(), decoded.height());
        let format = match guessed {
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::Gif => ImageFormat::Gif,
            other => {
                log::debug!("Re-encoding {:?} image as PNG", other);
                let mut png = Vec::new();
                decoded
                    .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                    .map_err(|e| Error::Image(format!("could not re-encode image: {e}")))?;
                return Ok(LoadedImage {
                    data: png,
                    format: ImageFormat::Png,
                    width_px,
                    height_px,
                });
            }
        };
        Ok(LoadedImage {
            data: bytes,
            format,
            width_px,
            height_px,
        })
    }
}

/// Split a `data:` URI into its MIME type and decoded payload.
pub fn parse_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header
        .split(';')
        .next()
        .filter(|v| !v.is_empty())
        .unwrap_or("text/plain")
        .to_ascii_lowercase();
    let data = if header.to_ascii_lowercase().ends_with(";base64") {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .ok()?
    } else {
        percent_decode(payload)?
    };
    Some((mime, data))
}

fn percent_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}

fn hex_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with('<') && text.contains("<svg")
}

/// Natural size of an SVG document in CSS pixels.
pub fn svg_size(bytes: &[u8]) -> Result<(u32, u32), Error> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::Image(format!("svg is not valid UTF-8: {e}")))?;
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options)
        .map_err(|e| Error::Image(format!("malformed svg: {e}")))?;
    let root = doc.root_element();

    let dimension = |name: &str| -> Option<f64> {
        let length = Length::parse_attribute(root.attribute(name)?)?;
        length.to_emu().map(|emu| emu as f64 / EMU_PER_PX as f64)
    };
    let view_box = root.attribute("viewBox").and_then(|vb| {
        let nums: Vec<f64> = vb
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        match nums.as_slice() {
            [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((*w, *h)),
            _ => None,
        }
    });

    let (width, height) = match (dimension("width"), dimension("height"), view_box) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some((vw, vh))) => (w, w * vh / vw),
        (None, Some(h), Some((vw, vh))) => (h * vw / vh, h),
        (None, None, Some((vw, vh))) => (vw, vh),
        (Some(w), None, None) => (w, DEFAULT_SVG_SIZE.1 as f64),
        (None, Some(h), None) => (DEFAULT_SVG_SIZE.0 as f64, h),
        (None, None, None) => (DEFAULT_SVG_SIZE.0 as f64, DEFAULT_SVG_SIZE.1 as f64),
    };
    Ok((
        width.round().max(1.0) as u32,
        height.round().max(1.0) as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([255, 0, 0]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn decodes_base64_data_uri() {
        let png = tiny_png(4, 2);
        let uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );
        let loaded = DefaultImageLoader::new().load(&uri).unwrap();
        assert_eq!(loaded.format, ImageFormat::Png);
        assert_eq!((loaded.width_px, loaded.height_px), (4, 2));
    }

    #[test]
    fn percent_encoded_svg_data_uri() {
        let uri = "data:image/svg+xml,%3Csvg%20xmlns='http://www.w3.org/2000/svg'%20width='40'%20height='20'/%3E";
        let loaded = DefaultImageLoader::new().load(uri).unwrap();
        assert_eq!(loaded.format, ImageFormat::Svg);
        assert_eq!((loaded.width_px, loaded.height_px), (40, 20));
    }

    #[test]
    fn bmp_is_reencoded_as_png() {
        let img = image::RgbImage::from_pixel(3, 3, image::Rgb([0, 0, 255]));
        let mut bmp = Vec::new();
        img.write_to(&mut Cursor::new(&mut bmp), image::ImageFormat::Bmp)
            .unwrap();
        let loaded = DefaultImageLoader::new().decode(bmp).unwrap();
        assert_eq!(loaded.format, ImageFormat::Png);
        assert_eq!(image::guess_format(&loaded.data).unwrap(), image::ImageFormat::Png);
    }

    #[test]
    fn svg_size_from_view_box() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 120 60" width="240"/>"#;
        assert_eq!(svg_size(svg).unwrap(), (240, 120));
    }

    #[test]
    fn remote_and_broken_sources_are_non_fatal_errors() {
        let loader = DefaultImageLoader::new();
        let err = loader.load("https://example.com/a.png").unwrap_err();
        assert!(!err.is_fatal());
        let err = loader.load("data:image/png;base64,@@@").unwrap_err();
        assert!(!err.is_fatal());
    }
}
