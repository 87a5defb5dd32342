//! SSD1306 128x64 OLED over I2C.
//!
//! Implements [`Panel`] for any `embedded-hal` I2C bus, so the ESP-IDF
//! `I2cDriver` and host test doubles drive the same code. The controller is
//! run in page addressing mode and every flush rewrites all eight pages.

use embedded_hal::i2c::I2c;
use log::info;

use crate::error::Error;
use crate::ui::render::{FrameBuffer, Panel, WIDTH};

/// Control byte: the rest of the transfer is commands.
const CTRL_COMMAND: u8 = 0x00;
/// Control byte: the rest of the transfer is GDDRAM data.
const CTRL_DATA: u8 = 0x40;

const INIT_SEQUENCE: [u8; 25] = [
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x02, // page addressing
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH
    0xA4, // follow RAM
    0xA6, // normal (not inverted)
    0xAF, // display on
];

pub struct Ssd1306Panel<I: I2c> {
    i2c: I,
    addr: u8,
}

impl<I: I2c> Ssd1306Panel<I> {
    /// Run the power-up sequence and blank the screen.
    pub fn new(i2c: I, addr: u8) -> Result<Self, Error> {
        let mut panel = Self { i2c, addr };
        panel.commands(&INIT_SEQUENCE).map_err(|_| Error::Init("SSD1306"))?;
        panel.flush(&FrameBuffer::default())?;
        info!("Display: SSD1306 ready at 0x{:02X}", addr);
        Ok(panel)
    }

    fn commands(&mut self, cmds: &[u8]) -> Result<(), Error> {
        let mut buf = [0u8; INIT_SEQUENCE.len() + 1];
        buf[0] = CTRL_COMMAND;
        buf[1..=cmds.len()].copy_from_slice(cmds);
        self.i2c
            .write(self.addr, &buf[..=cmds.len()])
            .map_err(|_| Error::Bus("I2C command"))
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> Panel for Ssd1306Panel<I> {
    fn flush(&mut self, buffer: &FrameBuffer) -> Result<(), Error> {
        let mut data = [0u8; WIDTH as usize + 1];
        data[0] = CTRL_DATA;
        for page in 0..8u8 {
            // Page start, column 0.
            self.commands(&[0xB0 | page, 0x00, 0x10])?;
            data[1..].copy_from_slice(buffer.page(usize::from(page)));
            self.i2c
                .write(self.addr, &data)
                .map_err(|_| Error::Bus("I2C data"))?;
        }
        Ok(())
    }
}
