// src/gui/icon.rs
//! Renders the current frequency into a tray pixmap.

use ksni::Icon;

pub const ICON_SIZE: usize = 32;

const GLYPH_HEIGHT: usize = 7;
const LINE_GAP: usize = 2;
const FOREGROUND: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

struct Glyph {
    width: usize,
    rows: [u8; GLYPH_HEIGHT],
}

const fn glyph(width: usize, rows: [u8; GLYPH_HEIGHT]) -> Glyph {
    Glyph { width, rows }
}

// Rows are right-aligned bit patterns, most significant bit leftmost.
fn glyph_for(c: char) -> Glyph {
    match c {
        '0' => glyph(5, [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
        '1' => glyph(5, [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        '2' => glyph(5, [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => glyph(5, [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
        '4' => glyph(5, [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        '5' => glyph(5, [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
        '6' => glyph(5, [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
        '7' => glyph(5, [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
        '8' => glyph(5, [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
        '9' => glyph(5, [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
        '.' => glyph(2, [0, 0, 0, 0, 0, 0b11, 0b11]),
        'G' => glyph(5, [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
        'H' => glyph(5, [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'z' => glyph(5, [0, 0, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111]),
        _ => glyph(3, [0; GLYPH_HEIGHT]),
    }
}

/// `2400000` kHz -> `"2.4"`.
pub fn ghz_label(khz: u64) -> String {
    format!("{:.1}", khz as f64 / 1_000_000.0)
}

fn text_width(text: &str, scale: usize) -> usize {
    let glyphs: usize = text.chars().map(|c| glyph_for(c).width).sum();
    let spacing = text.chars().count().saturating_sub(1);
    (glyphs + spacing) * scale
}

struct Canvas {
    size: usize,
    data: Vec<u8>,
}

impl Canvas {
    fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0; size * size * 4],
        }
    }

    fn fill(&mut self, x: usize, y: usize, scale: usize) {
        for dy in 0..scale {
            for dx in 0..scale {
                let (px, py) = (x + dx, y + dy);
                if px < self.size && py < self.size {
                    let offset = (py * self.size + px) * 4;
                    self.data[offset..offset + 4].copy_from_slice(&FOREGROUND);
                }
            }
        }
    }

    fn draw_line(&mut self, text: &str, scale: usize, top: usize) {
        let width = text_width(text, scale);
        let mut x = self.size.saturating_sub(width) / 2;
        for c in text.chars() {
            let g = glyph_for(c);
            for (row, bits) in g.rows.iter().enumerate() {
                for col in 0..g.width {
                    if (bits >> (g.width - 1 - col)) & 1 == 1 {
                        self.fill(x + col * scale, top + row * scale, scale);
                    }
                }
            }
            x += (g.width + 1) * scale;
        }
    }
}

/// Two centered lines: the frequency, scaled as large as fits, then `GHz`.
pub fn render_frequency(khz: u64) -> Icon {
    let label = ghz_label(khz);
    let unit_height = GLYPH_HEIGHT;
    let scale = (1..=3)
        .rev()
        .find(|&s| {
            text_width(&label, s) <= ICON_SIZE
                && GLYPH_HEIGHT * s + LINE_GAP + unit_height <= ICON_SIZE
        })
        .unwrap_or(1);

    let total = GLYPH_HEIGHT * scale + LINE_GAP + unit_height;
    let top = ICON_SIZE.saturating_sub(total) / 2;

    let mut canvas = Canvas::new(ICON_SIZE);
    canvas.draw_line(&label, scale, top);
    canvas.draw_line("GHz", 1, top + GLYPH_HEIGHT * scale + LINE_GAP);

    Icon {
        width: ICON_SIZE as i32,
        height: ICON_SIZE as i32,
        data: canvas.data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_pixels(icon: &Icon) -> usize {
        icon.data.chunks(4).filter(|px| px[0] != 0).count()
    }

    #[test]
    fn test_ghz_label() {
        assert_eq!(ghz_label(2_400_000), "2.4");
        assert_eq!(ghz_label(800_000), "0.8");
        assert_eq!(ghz_label(3_449_999), "3.4");
        assert_eq!(ghz_label(0), "0.0");
    }

    #[test]
    fn test_icon_dimensions() {
        let icon = render_frequency(2_400_000);
        assert_eq!(icon.width, ICON_SIZE as i32);
        assert_eq!(icon.height, ICON_SIZE as i32);
        assert_eq!(icon.data.len(), ICON_SIZE * ICON_SIZE * 4);
        assert!(lit_pixels(&icon) > 0);
    }

    #[test]
    fn test_icon_changes_with_frequency() {
        assert_ne!(render_frequency(2_400_000).data, render_frequency(1_200_000).data);
        assert_eq!(render_frequency(2_400_000).data, render_frequency(2_400_000).data);
    }

    #[test]
    fn test_wide_labels_still_fit() {
        assert!(text_width("2.4", 2) <= ICON_SIZE);
        assert!(text_width(&ghz_label(12_300_000), 1) <= ICON_SIZE);
        assert!(lit_pixels(&render_frequency(12_300_000)) > 0);
    }
}
