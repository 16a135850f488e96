//! SGR color rendering for the raw log
//!
//! Device firmware often colors its boot and debug output. The log keeps
//! those escapes and this module turns the SGR ones (`ESC [ ... m`) into
//! egui text formats. Any other escape sequence is dropped from display.

use egui::{text::LayoutJob, Color32, FontId, TextFormat};

use crate::classifier::{ansi_pieces, AnsiPiece};

/// Text attributes in effect after a run of SGR escapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SgrStyle {
    /// Foreground color, `None` for the terminal default
    pub fg: Option<Color32>,
    pub bold: bool,
}

/// Standard then bright colors, xterm defaults
const PALETTE: [Color32; 16] = [
    Color32::from_rgb(0, 0, 0),
    Color32::from_rgb(205, 0, 0),
    Color32::from_rgb(0, 205, 0),
    Color32::from_rgb(205, 205, 0),
    Color32::from_rgb(0, 0, 238),
    Color32::from_rgb(205, 0, 205),
    Color32::from_rgb(0, 205, 205),
    Color32::from_rgb(229, 229, 229),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(255, 0, 0),
    Color32::from_rgb(0, 255, 0),
    Color32::from_rgb(255, 255, 0),
    Color32::from_rgb(92, 92, 255),
    Color32::from_rgb(255, 0, 255),
    Color32::from_rgb(0, 255, 255),
    Color32::from_rgb(255, 255, 255),
];

/// Color `n` of the 256-color palette
fn palette_256(n: u8) -> Color32 {
    match n {
        0..=15 => PALETTE[n as usize],
        16..=231 => {
            const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
            let n = n - 16;
            Color32::from_rgb(
                LEVELS[(n / 36) as usize],
                LEVELS[(n / 6 % 6) as usize],
                LEVELS[(n % 6) as usize],
            )
        }
        _ => {
            let gray = 8 + (n - 232) * 10;
            Color32::from_rgb(gray, gray, gray)
        }
    }
}

/// Parameters of an SGR escape, or `None` if the escape is something else
fn sgr_params(escape: &str) -> Option<Vec<u16>> {
    let body = escape
        .strip_prefix("\x1b[")
        .or_else(|| escape.strip_prefix('\u{9b}'))?
        .strip_suffix('m')?;

    // An empty parameter means 0; anything non-numeric disqualifies the escape
    body.split(';')
        .map(|p| if p.is_empty() { Some(0) } else { p.parse().ok() })
        .collect()
}

impl SgrStyle {
    /// Apply one SGR parameter list
    fn apply(&mut self, params: &[u16]) {
        let mut params = params.iter().copied();
        while let Some(p) = params.next() {
            match p {
                0 => *self = SgrStyle::default(),
                1 => self.bold = true,
                22 => self.bold = false,
                30..=37 => self.fg = Some(PALETTE[(p - 30) as usize]),
                90..=97 => self.fg = Some(PALETTE[(p - 90 + 8) as usize]),
                39 => self.fg = None,
                38 => match params.next() {
                    Some(5) => {
                        if let Some(n) = params.next().and_then(|n| u8::try_from(n).ok()) {
                            self.fg = Some(palette_256(n));
                        }
                    }
                    Some(2) => {
                        let mut channel = || params.next().and_then(|c| u8::try_from(c).ok());
                        if let (Some(r), Some(g), Some(b)) = (channel(), channel(), channel()) {
                            self.fg = Some(Color32::from_rgb(r, g, b));
                        }
                    }
                    _ => {}
                },
                // Background, underline, blink and the rest are not shown
                _ => {}
            }
        }
    }
}

/// Split a line into styled text runs, dropping the escapes themselves
pub fn sgr_spans(line: &str) -> Vec<(SgrStyle, &str)> {
    let mut style = SgrStyle::default();
    let mut spans = Vec::new();

    for piece in ansi_pieces(line) {
        match piece {
            AnsiPiece::Text(text) => spans.push((style, text)),
            AnsiPiece::Escape(escape) => {
                if let Some(params) = sgr_params(escape) {
                    style.apply(&params);
                }
            }
        }
    }
    spans
}

/// Lay out a line with its SGR colors
///
/// Unstyled text uses `default_color`; bold text without an explicit color
/// uses `strong_color`, since the log font has no bold face.
pub fn layout_job(
    line: &str,
    font_id: FontId,
    default_color: Color32,
    strong_color: Color32,
) -> LayoutJob {
    let mut job = LayoutJob::default();
    for (style, text) in sgr_spans(line) {
        let color = match style.fg {
            Some(color) => color,
            None if style.bold => strong_color,
            None => default_color,
        };
        job.append(
            text,
            0.0,
            TextFormat {
                font_id: font_id.clone(),
                color,
                ..Default::default()
            },
        );
    }
    job
}
