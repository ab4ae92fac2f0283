//! Registration and storage of external resources: fonts, images and
//! ICC-based color spaces.
//!
//! Registration hands out small `Copy` handles that are only meaningful to
//! the issuing [`Document`](crate::Document). Registering the same file
//! twice for the same purpose returns the original handle.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PdfError, Result};
use crate::text::FontMetrics;

/// Handle to a font registered with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(u32);

/// Handle to an image registered with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(u32);

/// Handle to an ICC color profile registered with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IccProfileId(u32);

macro_rules! handle_impls {
    ($($ty:ident),*) => {
        $(impl $ty {
            pub(crate) fn new(index: u32) -> Self {
                Self(index)
            }

            pub(crate) fn index(&self) -> u32 {
                self.0
            }
        })*
    };
}

handle_impls!(FontId, ImageId, IccProfileId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ResourceKind {
    Font,
    Image,
    IccProfile,
}

pub(crate) struct FontResource {
    pub base_name: String,
    pub metrics: FontMetrics,
}

/// Color channel layout of a decoded raster image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RasterChannels {
    Gray,
    Rgb,
}

pub(crate) enum ImageData {
    /// Unmodified JPEG file contents, emitted with DCTDecode.
    Jpeg { data: Vec<u8>, components: u8 },
    /// Decoded pixels, 8 bits per component, emitted with FlateDecode.
    Raster {
        pixels: Vec<u8>,
        channels: RasterChannels,
        alpha: Option<Vec<u8>>,
    },
}

pub(crate) struct ImageResource {
    pub width: u32,
    pub height: u32,
    pub data: ImageData,
}

pub(crate) struct IccProfile {
    pub data: Vec<u8>,
    pub channels: u8,
}

/// Validation snapshot handed to a drawing context when it is opened.
///
/// Contexts check handles against the snapshot, so resources must be
/// registered before the page context that uses them is created.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResourceSummary {
    pub font_count: u32,
    pub image_count: u32,
    pub icc_channels: Vec<u8>,
}

impl ResourceSummary {
    pub fn check_font(&self, font: FontId) -> Result<()> {
        if font.index() >= self.font_count {
            return Err(PdfError::InvalidResource(format!(
                "font {} is not registered with this document",
                font.index()
            )));
        }
        Ok(())
    }

    pub fn check_image(&self, image: ImageId) -> Result<()> {
        if image.index() >= self.image_count {
            return Err(PdfError::InvalidResource(format!(
                "image {} is not registered with this document",
                image.index()
            )));
        }
        Ok(())
    }

    pub fn check_profile(&self, profile: IccProfileId) -> Result<()> {
        if profile.index() as usize >= self.icc_channels.len() {
            return Err(PdfError::InvalidResource(format!(
                "ICC profile {} is not registered with this document",
                profile.index()
            )));
        }
        Ok(())
    }

    pub fn check_icc_color(&self, profile: IccProfileId, components: &[f64]) -> Result<()> {
        let Some(&channels) = self.icc_channels.get(profile.index() as usize) else {
            return Err(PdfError::InvalidResource(format!(
                "ICC profile {} is not registered with this document",
                profile.index()
            )));
        };
        if components.len() != channels as usize {
            return Err(PdfError::InvalidColor(format!(
                "ICC color has {} components, profile has {} channels",
                components.len(),
                channels
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct ResourceStore {
    fonts: Vec<FontResource>,
    images: Vec<ImageResource>,
    icc_profiles: Vec<IccProfile>,
    by_path: HashMap<(PathBuf, ResourceKind), u32>,
}

impl ResourceStore {
    pub fn load_font(&mut self, path: &Path) -> Result<FontId> {
        if let Some(&index) = self.lookup(path, ResourceKind::Font) {
            return Ok(FontId::new(index));
        }
        let data = read_resource(path)?;
        let metrics = FontMetrics::from_bytes(&data)?;
        let base_name = base_name_for(path);
        debug!(path = %path.display(), name = %base_name, "registered font");

        let index = self.fonts.len() as u32;
        self.fonts.push(FontResource { base_name, metrics });
        self.remember(path, ResourceKind::Font, index);
        Ok(FontId::new(index))
    }

    pub fn load_image(&mut self, path: &Path) -> Result<ImageId> {
        if let Some(&index) = self.lookup(path, ResourceKind::Image) {
            return Ok(ImageId::new(index));
        }
        let data = read_resource(path)?;
        let decoded = image::load_from_memory(&data)
            .map_err(|e| PdfError::Resource(format!("cannot decode image: {e}")))?;
        let resource = raster_from(decoded);
        debug!(
            path = %path.display(),
            width = resource.width,
            height = resource.height,
            "registered image"
        );

        let index = self.images.len() as u32;
        self.images.push(resource);
        self.remember(path, ResourceKind::Image, index);
        Ok(ImageId::new(index))
    }

    pub fn embed_jpg(&mut self, path: &Path) -> Result<ImageId> {
        if let Some(&index) = self.lookup(path, ResourceKind::Image) {
            return Ok(ImageId::new(index));
        }
        let data = read_resource(path)?;
        let (width, height, components) = parse_jpeg_header(&data)?;
        debug!(path = %path.display(), width, height, "embedded JPEG");

        let index = self.images.len() as u32;
        self.images.push(ImageResource {
            width,
            height,
            data: ImageData::Jpeg { data, components },
        });
        self.remember(path, ResourceKind::Image, index);
        Ok(ImageId::new(index))
    }

    pub fn load_icc_profile(&mut self, path: &Path) -> Result<IccProfileId> {
        if let Some(&index) = self.lookup(path, ResourceKind::IccProfile) {
            return Ok(IccProfileId::new(index));
        }
        let data = read_resource(path)?;
        let channels = parse_icc_channel_count(&data)?;
        debug!(path = %path.display(), channels, "registered ICC profile");

        let index = self.icc_profiles.len() as u32;
        self.icc_profiles.push(IccProfile { data, channels });
        self.remember(path, ResourceKind::IccProfile, index);
        Ok(IccProfileId::new(index))
    }

    pub fn font(&self, font: FontId) -> Result<&FontResource> {
        self.fonts.get(font.index() as usize).ok_or_else(|| {
            PdfError::InvalidResource(format!(
                "font {} is not registered with this document",
                font.index()
            ))
        })
    }

    pub fn fonts(&self) -> &[FontResource] {
        &self.fonts
    }

    pub fn images(&self) -> &[ImageResource] {
        &self.images
    }

    pub fn icc_profiles(&self) -> &[IccProfile] {
        &self.icc_profiles
    }

    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary {
            font_count: self.fonts.len() as u32,
            image_count: self.images.len() as u32,
            icc_channels: self.icc_profiles.iter().map(|p| p.channels).collect(),
        }
    }

    fn lookup(&self, path: &Path, kind: ResourceKind) -> Option<&u32> {
        self.by_path.get(&(dedup_key(path), kind))
    }

    fn remember(&mut self, path: &Path, kind: ResourceKind, index: u32) {
        self.by_path.insert((dedup_key(path), kind), index);
    }
}

fn dedup_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn read_resource(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| PdfError::Resource(format!("cannot read {}: {e}", path.display())))
}

fn base_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "Unnamed".to_string()
    } else {
        cleaned
    }
}

fn raster_from(decoded: image::DynamicImage) -> ImageResource {
    use image::ColorType;

    let width = decoded.width();
    let height = decoded.height();
    let color = decoded.color();
    let has_alpha = color.has_alpha();
    let is_gray = matches!(
        color,
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
    );

    let (pixels, channels, alpha) = if is_gray {
        let alpha = has_alpha.then(|| {
            decoded
                .to_luma_alpha8()
                .into_raw()
                .chunks_exact(2)
                .map(|px| px[1])
                .collect()
        });
        (decoded.to_luma8().into_raw(), RasterChannels::Gray, alpha)
    } else {
        let alpha = has_alpha.then(|| {
            decoded
                .to_rgba8()
                .into_raw()
                .chunks_exact(4)
                .map(|px| px[3])
                .collect()
        });
        (decoded.to_rgb8().into_raw(), RasterChannels::Rgb, alpha)
    };

    ImageResource {
        width,
        height,
        data: ImageData::Raster {
            pixels,
            channels,
            alpha,
        },
    }
}

/// Parse a JPEG header for dimensions and component count.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, u8)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(PdfError::Resource("not a valid JPEG file".to_string()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return Err(PdfError::Resource("invalid JPEG marker".to_string()));
        }
        let marker = data[pos + 1];
        pos += 2;

        // Padding bytes
        if marker == 0xFF {
            pos -= 1;
            continue;
        }

        // SOF markers carry the frame header (C4/C8/CC are not SOF)
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            if pos + 8 > data.len() {
                return Err(PdfError::Resource("truncated JPEG file".to_string()));
            }
            let height = u32::from(data[pos + 3]) << 8 | u32::from(data[pos + 4]);
            let width = u32::from(data[pos + 5]) << 8 | u32::from(data[pos + 6]);
            let components = data[pos + 7];
            if width == 0 || height == 0 {
                return Err(PdfError::Resource("JPEG has zero dimensions".to_string()));
            }
            if !matches!(components, 1 | 3 | 4) {
                return Err(PdfError::Resource(format!(
                    "unsupported JPEG component count: {components}"
                )));
            }
            return Ok((width, height, components));
        } else if marker == 0xD9 {
            break;
        } else if (0xD0..=0xD7).contains(&marker) {
            continue;
        } else {
            if pos + 1 >= data.len() {
                return Err(PdfError::Resource("truncated JPEG file".to_string()));
            }
            let length = (usize::from(data[pos]) << 8) | usize::from(data[pos + 1]);
            pos += length;
        }
    }

    Err(PdfError::Resource(
        "could not find JPEG frame header".to_string(),
    ))
}

/// Read the channel count from an ICC profile header.
///
/// Only the 128-byte header is interpreted; the profile body stays opaque
/// and is embedded verbatim.
fn parse_icc_channel_count(data: &[u8]) -> Result<u8> {
    if data.len() < 132 || &data[36..40] != b"acsp" {
        return Err(PdfError::Resource("not a valid ICC profile".to_string()));
    }
    match &data[16..20] {
        b"GRAY" => Ok(1),
        b"RGB " => Ok(3),
        b"Lab " => Ok(3),
        b"XYZ " => Ok(3),
        b"CMYK" => Ok(4),
        other => Err(PdfError::Resource(format!(
            "unsupported ICC color space: {:?}",
            String::from_utf8_lossy(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn fake_icc(space: &[u8; 4]) -> Vec<u8> {
        let mut data = vec![0u8; 140];
        data[16..20].copy_from_slice(space);
        data[36..40].copy_from_slice(b"acsp");
        data
    }

    /// Smallest JPEG prefix the header parser accepts: SOI followed by a
    /// baseline SOF0 segment.
    fn fake_jpeg(width: u16, height: u16, components: u8) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x0B, 0x08];
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.push(components);
        data
    }

    #[test]
    fn test_parse_jpeg_header() {
        let (w, h, n) = parse_jpeg_header(&fake_jpeg(320, 240, 3)).unwrap();
        assert_eq!((w, h, n), (320, 240, 3));
    }

    #[test]
    fn test_parse_jpeg_header_rejects_non_jpeg() {
        let err = parse_jpeg_header(b"\x89PNG\r\n").unwrap_err();
        assert!(matches!(err, PdfError::Resource(_)));
    }

    #[test]
    fn test_parse_jpeg_header_rejects_bad_component_count() {
        let err = parse_jpeg_header(&fake_jpeg(10, 10, 2)).unwrap_err();
        assert!(matches!(err, PdfError::Resource(_)));
    }

    #[test]
    fn test_parse_icc_channel_count() {
        assert_eq!(parse_icc_channel_count(&fake_icc(b"GRAY")).unwrap(), 1);
        assert_eq!(parse_icc_channel_count(&fake_icc(b"RGB ")).unwrap(), 3);
        assert_eq!(parse_icc_channel_count(&fake_icc(b"CMYK")).unwrap(), 4);
    }

    #[test]
    fn test_parse_icc_rejects_garbage() {
        let err = parse_icc_channel_count(b"short").unwrap_err();
        assert!(matches!(err, PdfError::Resource(_)));
    }

    #[test]
    fn test_load_font_missing_file() {
        let mut store = ResourceStore::default();
        let err = store
            .load_font(Path::new("/nonexistent/font.ttf"))
            .unwrap_err();
        assert!(matches!(err, PdfError::Resource(_)));
    }

    #[test]
    fn test_embed_jpg_dedups_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.jpg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&fake_jpeg(8, 8, 1)).unwrap();
        drop(file);

        let mut store = ResourceStore::default();
        let first = store.embed_jpg(&path).unwrap();
        let second = store.embed_jpg(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.images().len(), 1);
    }

    #[test]
    fn test_summary_checks() {
        let summary = ResourceSummary {
            font_count: 1,
            image_count: 0,
            icc_channels: vec![3],
        };

        assert!(summary.check_font(FontId::new(0)).is_ok());
        assert!(matches!(
            summary.check_font(FontId::new(1)),
            Err(PdfError::InvalidResource(_))
        ));
        assert!(matches!(
            summary.check_image(ImageId::new(0)),
            Err(PdfError::InvalidResource(_))
        ));
        assert!(summary.check_profile(IccProfileId::new(0)).is_ok());
        assert!(matches!(
            summary.check_profile(IccProfileId::new(1)),
            Err(PdfError::InvalidResource(_))
        ));
        assert!(summary
            .check_icc_color(IccProfileId::new(0), &[0.1, 0.2, 0.8])
            .is_ok());
        assert!(matches!(
            summary.check_icc_color(IccProfileId::new(0), &[0.1, 0.2]),
            Err(PdfError::InvalidColor(_))
        ));
        assert!(matches!(
            summary.check_icc_color(IccProfileId::new(1), &[0.1]),
            Err(PdfError::InvalidResource(_))
        ));
    }

    #[test]
    fn test_base_name_for() {
        assert_eq!(
            base_name_for(Path::new("/fonts/NotoSans-Regular.ttf")),
            "NotoSans-Regular"
        );
        assert_eq!(base_name_for(Path::new("???")), "Unnamed");
    }
}
