/// Presents a rasterized frame as coloured terminal characters
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use stackfx_core::{Rasterizer, Rgb};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Ramp character for a lit colour. Covered pixels never map to blank.
pub fn shade_char(color: Rgb) -> char {
    let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
    let index = 1 + (color.luma().clamp(0.0, 1.0) * steps).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// ASCII presenter for the engine's frame target
#[derive(Debug, Default)]
pub struct AsciiRenderer {
    colored: bool,
}

impl AsciiRenderer {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Queue the whole frame, one terminal row per raster row
    pub fn draw<W: Write>(&self, frame: &Rasterizer, writer: &mut W) -> std::io::Result<()> {
        let mut last_color = None;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                match frame.fragment(x, y) {
                    Some(color) => {
                        if self.colored {
                            let [r, g, b] = color.to_bytes();
                            let fg = Color::Rgb { r, g, b };
                            if last_color != Some(fg) {
                                writer.queue(SetForegroundColor(fg))?;
                                last_color = Some(fg);
                            }
                        }
                        writer.queue(Print(shade_char(color)))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}
