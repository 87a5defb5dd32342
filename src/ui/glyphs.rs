//! 16×16 monochrome glyphs shown next to each channel on the menu screen.
//!
//! Row-major, MSB-first, two bytes per row (the same packing the SSD1306
//! Adafruit tooling exports), so they feed straight into
//! [`ImageRaw<BinaryColor>`](embedded_graphics::image::ImageRaw).

pub const GLYPH_SIZE: u32 = 16;
pub const GLYPH_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Light,
    Brightness,
    Fan,
    Plug,
    Wifi,
    Ambient,
}

impl Glyph {
    pub const fn bitmap(self) -> &'static [u8; GLYPH_BYTES] {
        match self {
            Self::Light => &LIGHT,
            Self::Brightness => &BRIGHTNESS,
            Self::Fan => &FAN,
            Self::Plug => &PLUG,
            Self::Wifi => &WIFI,
            Self::Ambient => &AMBIENT,
        }
    }
}

const LIGHT: [u8; GLYPH_BYTES] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x04, 0x80, 0x08, 0x40, 0x10, 0x20, 0x10, 0x20,
    0x10, 0x20, 0x08, 0x40, 0x07, 0x80, 0x04, 0x80, 0x04, 0x80, 0x07, 0x80, 0x00, 0x00, 0x00, 0x00,
];

const BRIGHTNESS: [u8; GLYPH_BYTES] = [
    0xff, 0xff, 0x80, 0x01, 0xbf, 0xfd, 0x80, 0x01, 0x80, 0x01, 0x8f, 0xf1, 0x80, 0x01, 0x80, 0x01,
    0x83, 0xc1, 0x80, 0x01, 0x80, 0x01, 0x81, 0x81, 0x80, 0x01, 0x80, 0x01, 0x80, 0x01, 0xff, 0xff,
];

const FAN: [u8; GLYPH_BYTES] = [
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x03, 0x80, 0x04, 0x40, 0x7d, 0x7c,
    0x04, 0x40, 0x03, 0x80, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const PLUG: [u8; GLYPH_BYTES] = [
    0x00, 0x00, 0x7f, 0xfe, 0x40, 0x02, 0x41, 0x82, 0x41, 0x82, 0x40, 0x02, 0x40, 0x02, 0x48, 0x12,
    0x40, 0x02, 0x40, 0x02, 0x48, 0x12, 0x40, 0x02, 0x40, 0x02, 0x40, 0x02, 0x7f, 0xfe, 0x00, 0x00,
];

const WIFI: [u8; GLYPH_BYTES] = [
    0x00, 0x00, 0x07, 0xe0, 0x08, 0x10, 0x09, 0x90, 0x12, 0x48, 0x12, 0x48, 0x24, 0x24, 0x25, 0xa4,
    0x00, 0x00, 0x41, 0x5d, 0x41, 0x51, 0x2a, 0x59, 0x3e, 0x51, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const AMBIENT: [u8; GLYPH_BYTES] = [
    0xff, 0xff, 0x9f, 0xf9, 0xa0, 0x05, 0xc0, 0x03, 0x81, 0x01, 0x83, 0x81, 0x93, 0x91, 0x9b, 0xb1,
    0x9f, 0xf1, 0x9f, 0xf1, 0x87, 0xc1, 0x8d, 0x61, 0x81, 0x01, 0x80, 0x01, 0x80, 0x01, 0xff, 0xff,
];
