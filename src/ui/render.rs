//! embedded-graphics renderer for 128x64 monochrome panels.
//!
//! Frames are drawn into a [`FrameBuffer`] laid out the way SSD1306-class
//! controllers expect it (eight horizontal pages, one byte per column per
//! page, LSB at the top), then handed to a [`Panel`] in one piece.

use core::convert::Infallible;

use embedded_graphics::{
    Drawable, Pixel,
    image::{Image, ImageRaw},
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Point, Primitive, Size},
    primitives::{Line, PrimitiveStyle},
    text::{Baseline, Text},
};
use log::warn;

use super::glyphs::{GLYPH_SIZE, Glyph};
use super::{CONNECTING_NETWORK, Frame, MenuRow};
use crate::app::ports::DisplayPort;
use crate::codec::encode_int;
use crate::error::Error;

pub const WIDTH: u32 = 128;
pub const HEIGHT: u32 = 64;
const PAGES: usize = (HEIGHT / 8) as usize;
pub const BUFFER_BYTES: usize = WIDTH as usize * PAGES;

// ── Frame buffer ─────────────────────────────────────────────────

pub struct FrameBuffer {
    bytes: [u8; BUFFER_BYTES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self { bytes: [0; BUFFER_BYTES] }
    }
}

impl FrameBuffer {
    pub fn clear_all(&mut self) {
        self.bytes.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        let idx = x as usize + (y as usize / 8) * WIDTH as usize;
        self.bytes[idx] & (1 << (y % 8)) != 0
    }

    /// One 128-byte page (rows `8 * n .. 8 * n + 8`).
    pub fn page(&self, n: usize) -> &[u8] {
        let start = n.min(PAGES - 1) * WIDTH as usize;
        &self.bytes[start..start + WIDTH as usize]
    }

    pub fn as_bytes(&self) -> &[u8; BUFFER_BYTES] {
        &self.bytes
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x >= WIDTH || y >= HEIGHT {
                continue;
            }
            let idx = x as usize + (y as usize / 8) * WIDTH as usize;
            let bit = 1 << (y % 8);
            match color {
                BinaryColor::On => self.bytes[idx] |= bit,
                BinaryColor::Off => self.bytes[idx] &= !bit,
            }
        }
        Ok(())
    }
}

// ── Drawing ──────────────────────────────────────────────────────

fn text<D>(target: &mut D, s: &str, x: i32, y: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    Text::with_baseline(s, Point::new(x, y), style, Baseline::Top).draw(target)?;
    Ok(())
}

fn line<D>(target: &mut D, from: (i32, i32), to: (i32, i32)) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Line::new(Point::new(from.0, from.1), Point::new(to.0, to.1))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(target)
}

fn glyph<D>(target: &mut D, g: Glyph, x: i32, y: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let raw = ImageRaw::<BinaryColor>::new(g.bitmap(), GLYPH_SIZE);
    Image::new(&raw, Point::new(x, y)).draw(target)
}

fn menu_row<D>(target: &mut D, row: &MenuRow, y: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    text(target, row.label, 24, y + 4)?;
    text(target, &encode_int(row.value), 100, y + 4)?;
    if let Some(g) = row.glyph {
        glyph(target, g, 5, y)?;
    }
    Ok(())
}

/// Draw one frame on an already cleared target.
pub fn draw_frame<D>(target: &mut D, frame: &Frame<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    match frame {
        Frame::Menu { rows, status } => {
            for (row, y) in rows.iter().zip([0, 16, 32]) {
                menu_row(target, row, y)?;
            }
            // Box around the selected row.
            line(target, (5, 16), (122, 16))?;
            line(target, (122, 16), (122, 31))?;
            line(target, (5, 31), (122, 31))?;
            line(target, (5, 16), (5, 31))?;
            text(target, status.text(), 2, 51)?;
        }
        Frame::Edit { label, value } => {
            let mut s = heapless::String::<48>::new();
            let _ = core::fmt::Write::write_fmt(&mut s, format_args!("{}:{}", label, value));
            text(target, &s, 5, 32)?;
            line(target, (5, 16), (122, 16))?;
        }
        Frame::Media { top, bottom } => {
            text(target, top, 0, 0)?;
            text(target, bottom, 5, 32)?;
        }
        Frame::Linking { message } => {
            // The network notice sits under the glyph, the broker one above it.
            let (x, y) = if *message == CONNECTING_NETWORK { (5, 32) } else { (0, 0) };
            text(target, message, x, y)?;
            glyph(target, Glyph::Wifi, 58, 14)?;
        }
    }
    Ok(())
}

// ── Display adapter ──────────────────────────────────────────────

/// Pushes a finished frame buffer to the physical controller.
pub trait Panel {
    fn flush(&mut self, buffer: &FrameBuffer) -> Result<(), Error>;
}

/// [`DisplayPort`] that renders frames with embedded-graphics.
pub struct GraphicsDisplay<P: Panel> {
    panel: P,
    buffer: FrameBuffer,
}

impl<P: Panel> GraphicsDisplay<P> {
    pub fn new(panel: P) -> Self {
        Self { panel, buffer: FrameBuffer::default() }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

impl<P: Panel> DisplayPort for GraphicsDisplay<P> {
    fn render(&mut self, frame: &Frame<'_>) {
        self.buffer.clear_all();
        // Drawing into the frame buffer is infallible.
        let _ = draw_frame(&mut self.buffer, frame);
        if let Err(e) = self.panel.flush(&self.buffer) {
            warn!("Display: flush failed: {}", e);
        }
    }
}
