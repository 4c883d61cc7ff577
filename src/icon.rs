// src/icon.rs
use crate::config::{BACKGROUND, FONT_SCALE_DIVISOR, FOREGROUND, INK_THRESHOLD};
use crate::font::rasterize_label;
use crate::utils::{centering_offset, composite_mask};
use image::{ImageBuffer, ImageOutputFormat, Rgb, RgbImage};
use log::debug;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("icon size must be positive")]
    InvalidSize,
    #[error("failed to encode {size}x{size} icon as PNG")]
    Encode {
        size: u32,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One square icon to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSpec<'a> {
    pub size: u32,
    pub label: &'a str,
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
}

impl<'a> IconSpec<'a> {
    pub fn new(size: u32, label: &'a str) -> Self {
        IconSpec {
            size,
            label,
            background: BACKGROUND,
            foreground: FOREGROUND,
        }
    }

    pub fn font_pixel_size(&self) -> u32 {
        self.size / FONT_SCALE_DIVISOR
    }
}

pub fn icon_file_name(size: u32) -> String {
    format!("icon{}.png", size)
}

/// Flat background with the label centred on its ink box.
pub fn render_icon(spec: &IconSpec) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::from_pixel(spec.size, spec.size, spec.background);

    let rendered = rasterize_label(spec.label, spec.font_pixel_size());
    let (text_height, text_width) = rendered.mask.dim();
    let x = centering_offset(spec.size, text_width);
    let y = centering_offset(spec.size, text_height);
    debug!(
        "{}px icon: {}x{} label from {} at ({}, {})",
        spec.size, text_width, text_height, rendered.source, x, y
    );

    composite_mask(&mut img, &rendered.mask, x, y, spec.foreground, INK_THRESHOLD);
    img
}

/// Writes `img` as `icon{size}.png` in `dir`, replacing any previous file.
///
/// The PNG goes to a temporary sibling first and is renamed into place, so a
/// failed write leaves nothing behind under either name.
pub fn save_icon(img: &RgbImage, dir: &Path) -> Result<PathBuf, IconError> {
    let size = img.width();
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|source| IconError::Encode { size, source })?;

    let path = dir.join(icon_file_name(size));
    let tmp = dir.join(format!("{}.tmp", icon_file_name(size)));

    let written = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &path));
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp);
        return Err(IconError::Write { path, source });
    }
    Ok(path)
}

/// Renders and saves one icon into `dir`.
pub fn create_icon(spec: &IconSpec, dir: &Path) -> Result<PathBuf, IconError> {
    if spec.size == 0 {
        return Err(IconError::InvalidSize);
    }
    let img = render_icon(spec);
    save_icon(&img, dir)
}
