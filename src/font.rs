// src/font.rs
use crate::config::{FONT_DIRS, INK_THRESHOLD, PREFERRED_FONTS};
use crate::utils::trim_to_ink;
use embedded_graphics::mono_font::{ascii, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use freetype::bitmap::PixelMode;
use freetype::face::LoadFlag;
use freetype::Library;
use log::{debug, warn};
use ndarray::Array2;
use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to load font {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: freetype::Error,
    },
    #[error("{} renders no ink for {label:?} at {pixel_size}px", .path.display())]
    NoInk {
        path: PathBuf,
        label: String,
        pixel_size: u32,
    },
    #[error("unsupported glyph pixel mode {0:?}")]
    PixelMode(PixelMode),
    #[error(transparent)]
    Freetype(#[from] freetype::Error),
}

/// Which font actually drew a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    Scalable { path: PathBuf, pixel_size: u32 },
    Builtin { name: &'static str },
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::Scalable { path, pixel_size } => {
                write!(f, "{} at {}px", path.display(), pixel_size)
            }
            FontSource::Builtin { name } => write!(f, "built-in {}", name),
        }
    }
}

/// A label rasterised to a coverage mask trimmed to its ink.
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub mask: Array2<u8>,
    pub source: FontSource,
}

/// Built-in bitmap fonts ordered by glyph height.
const BUILTIN_FONTS: &[(&str, &MonoFont<'static>)] = &[
    ("4x6", &ascii::FONT_4X6),
    ("5x7", &ascii::FONT_5X7),
    ("5x8", &ascii::FONT_5X8),
    ("6x9", &ascii::FONT_6X9),
    ("6x10", &ascii::FONT_6X10),
    ("6x12", &ascii::FONT_6X12),
    ("7x13", &ascii::FONT_7X13),
    ("7x14", &ascii::FONT_7X14),
    ("9x15", &ascii::FONT_9X15),
    ("9x18", &ascii::FONT_9X18),
    ("10x20", &ascii::FONT_10X20),
];

/// Rasterises `label` with the best font available at `pixel_size`.
///
/// Scalable candidates are tried in preference order; if none loads or none
/// leaves any ink at this size, the built-in bitmap font is used instead.
/// Never fails.
pub fn rasterize_label(label: &str, pixel_size: u32) -> RenderedLabel {
    match Library::init() {
        Ok(library) => {
            for path in candidate_paths() {
                match rasterize_scalable(&library, &path, label, pixel_size) {
                    Ok(mask) => {
                        return RenderedLabel {
                            mask,
                            source: FontSource::Scalable { path, pixel_size },
                        }
                    }
                    Err(e) => debug!("skipping font candidate: {}", e),
                }
            }
        }
        Err(e) => warn!("freetype unavailable: {}", e),
    }

    let (name, font) = builtin_font_for(pixel_size);
    debug!(
        "no scalable font usable at {}px, falling back to built-in {}",
        pixel_size, name
    );
    RenderedLabel {
        mask: rasterize_builtin(font, label),
        source: FontSource::Builtin { name },
    }
}

/// Preferred font files that exist on this machine, working directory first.
pub fn candidate_paths() -> Vec<PathBuf> {
    PREFERRED_FONTS
        .iter()
        .flat_map(|name| {
            std::iter::once(PathBuf::from(name))
                .chain(FONT_DIRS.iter().map(move |dir| Path::new(dir).join(name)))
        })
        .filter(|path| path.is_file())
        .collect()
}

struct PlacedGlyph {
    x: i32,
    y: i32,
    width: usize,
    rows: usize,
    coverage: Vec<u8>,
}

/// Renders `label` through FreeType with the pen on a baseline at y = 0.
pub fn rasterize_scalable(
    library: &Library,
    path: &Path,
    label: &str,
    pixel_size: u32,
) -> Result<Array2<u8>, FontError> {
    let no_ink = || FontError::NoInk {
        path: path.to_path_buf(),
        label: label.to_string(),
        pixel_size,
    };
    if pixel_size == 0 {
        return Err(no_ink());
    }

    let face = library.new_face(path, 0).map_err(|source| FontError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    face.set_pixel_sizes(0, pixel_size)?;

    let mut placed = Vec::new();
    let mut pen_x = 0i32;
    for c in label.chars() {
        face.load_char(c as usize, LoadFlag::RENDER)?;
        let glyph = face.glyph();
        let bitmap = glyph.bitmap();

        let width = bitmap.width().max(0) as usize;
        let rows = bitmap.rows().max(0) as usize;
        let pitch = bitmap.pitch().unsigned_abs() as usize;
        let buffer = bitmap.buffer();
        let at = |i: usize| buffer.get(i).copied().unwrap_or(0);

        let coverage: Vec<u8> = match bitmap.pixel_mode()? {
            PixelMode::Gray => (0..rows)
                .flat_map(|r| (0..width).map(move |c| r * pitch + c))
                .map(at)
                .collect(),
            PixelMode::Mono => (0..rows)
                .flat_map(|r| (0..width).map(move |c| (r, c)))
                .map(|(r, c)| {
                    let bit = (at(r * pitch + c / 8) >> (7 - (c % 8))) & 1;
                    if bit == 1 {
                        u8::MAX
                    } else {
                        0
                    }
                })
                .collect(),
            other => return Err(FontError::PixelMode(other)),
        };

        if width > 0 && rows > 0 {
            placed.push(PlacedGlyph {
                x: pen_x + glyph.bitmap_left(),
                y: -glyph.bitmap_top(),
                width,
                rows,
                coverage,
            });
        }
        pen_x += (glyph.advance().x >> 6) as i32;
    }

    let (Some(min_x), Some(min_y)) = (
        placed.iter().map(|g| g.x).min(),
        placed.iter().map(|g| g.y).min(),
    ) else {
        return Err(no_ink());
    };
    let max_x = placed.iter().map(|g| g.x + g.width as i32).max().unwrap_or(min_x);
    let max_y = placed.iter().map(|g| g.y + g.rows as i32).max().unwrap_or(min_y);

    let mut mask = Array2::<u8>::zeros(((max_y - min_y) as usize, (max_x - min_x) as usize));
    for g in &placed {
        let left = (g.x - min_x) as usize;
        let top = (g.y - min_y) as usize;
        for r in 0..g.rows {
            for c in 0..g.width {
                let cell = &mut mask[[top + r, left + c]];
                *cell = (*cell).max(g.coverage[r * g.width + c]);
            }
        }
    }

    let mask = trim_to_ink(&mask, INK_THRESHOLD);
    if mask.is_empty() {
        return Err(no_ink());
    }
    Ok(mask)
}

/// Largest built-in font whose glyph height fits `pixel_size`, else the smallest.
pub fn builtin_font_for(pixel_size: u32) -> (&'static str, &'static MonoFont<'static>) {
    BUILTIN_FONTS
        .iter()
        .rev()
        .find(|(_, font)| font.character_size.height <= pixel_size)
        .copied()
        .unwrap_or(BUILTIN_FONTS[0])
}

struct MaskCanvas {
    mask: Array2<u8>,
}

impl OriginDimensions for MaskCanvas {
    fn size(&self) -> Size {
        let (rows, cols) = self.mask.dim();
        Size::new(cols as u32, rows as u32)
    }
}

impl DrawTarget for MaskCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color.is_off() || point.x < 0 || point.y < 0 {
                continue;
            }
            if let Some(cell) = self.mask.get_mut((point.y as usize, point.x as usize)) {
                *cell = u8::MAX;
            }
        }
        Ok(())
    }
}

/// Renders `label` with a built-in bitmap font. Always succeeds.
pub fn rasterize_builtin(font: &MonoFont<'static>, label: &str) -> Array2<u8> {
    let count = label.chars().count() as u32;
    let cell = font.character_size;
    let width = match count {
        0 => 0,
        n => cell.width * n + font.character_spacing * (n - 1),
    };

    let mut canvas = MaskCanvas {
        mask: Array2::zeros((cell.height as usize, width as usize)),
    };
    let style = MonoTextStyle::new(font, BinaryColor::On);
    if let Err(never) = Text::with_baseline(label, Point::zero(), style, Baseline::Top).draw(&mut canvas)
    {
        match never {}
    }

    trim_to_ink(&canvas.mask, INK_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ink_bounds;

    #[test]
    fn test_builtin_font_for() {
        assert_eq!(builtin_font_for(4).0, "4x6");
        assert_eq!(builtin_font_for(6).0, "4x6");
        assert_eq!(builtin_font_for(8).0, "5x8");
        assert_eq!(builtin_font_for(12).0, "6x12");
        assert_eq!(builtin_font_for(32).0, "10x20");
        for size in [0, 4, 8, 12, 32] {
            let (_, font) = builtin_font_for(size);
            assert!(font.character_size.height <= size.max(6));
        }
    }

    #[test]
    fn test_rasterize_builtin() {
        let (_, font) = builtin_font_for(12);
        let mask = rasterize_builtin(font, "POA");
        let (rows, cols) = mask.dim();

        // Trimmed to ink and within the three character cells
        assert!(rows > 0 && cols > 0);
        assert!(rows as u32 <= font.character_size.height);
        assert!(cols as u32 <= font.character_size.width * 3 + font.character_spacing * 2);
        assert_eq!(
            ink_bounds(&mask, INK_THRESHOLD).map(|b| (b.height(), b.width())),
            Some((rows, cols))
        );
        assert!(mask.iter().all(|&v| v == 0 || v == u8::MAX));
    }

    #[test]
    fn test_rasterize_builtin_blank_label() {
        let (_, font) = builtin_font_for(12);
        assert!(rasterize_builtin(font, "").is_empty());
        assert!(rasterize_builtin(font, "   ").is_empty());
    }

    #[test]
    fn test_rasterize_label_always_has_ink() {
        for pixel_size in [4, 8, 12, 32] {
            let rendered = rasterize_label("POA", pixel_size);
            println!("{}px -> {}", pixel_size, rendered.source);
            assert!(!rendered.mask.is_empty());
        }
    }

    #[test]
    fn test_missing_font_is_an_error_not_a_panic() {
        let library = Library::init().unwrap();
        let result = rasterize_scalable(
            &library,
            Path::new("definitely-not-a-font.ttf"),
            "POA",
            12,
        );
        assert!(matches!(result, Err(FontError::Load { .. })));
    }

    #[test]
    fn test_rasterize_scalable_when_installed() {
        let Some(path) = candidate_paths().into_iter().next() else {
            println!("no scalable font installed, skipping");
            return;
        };
        let library = Library::init().unwrap();
        let mask = rasterize_scalable(&library, &path, "POA", 32).unwrap();
        let (rows, cols) = mask.dim();
        assert!(rows > 0 && rows <= 32 * 2);
        assert!(cols > rows, "three glyphs should be wider than tall");
    }
}
