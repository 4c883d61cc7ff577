// src/config.rs
use image::Rgb;

/// Edge lengths of the icons a browser extension manifest asks for.
pub const SIZES: [u32; 4] = [16, 32, 48, 128];

pub const LABEL: &str = "POA";

/// Primary indigo
pub const BACKGROUND: Rgb<u8> = Rgb([99, 102, 241]);
pub const FOREGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Font pixel size is the icon edge divided by this.
pub const FONT_SCALE_DIVISOR: u32 = 4;

/// Coverage above this counts as ink.
pub const INK_THRESHOLD: u8 = 128;

/// Scalable fonts to try, most preferred first.
pub const PREFERRED_FONTS: &[&str] = &[
    "arial.ttf",
    "Arial.ttf",
    "LiberationSans-Regular.ttf",
    "DejaVuSans.ttf",
];

/// Directories searched for `PREFERRED_FONTS`, after the working directory.
pub const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/msttcorefonts",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/TTF",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];
