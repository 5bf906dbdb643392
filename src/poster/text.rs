//! Text box layout in Helvetica-Bold.

/// Base font used for text elements.
pub const FONT_NAME: &str = "Helvetica-Bold";

/// Ascender of Helvetica-Bold, in text space units per point of font size.
pub const ASCENT: f32 = 0.718;
/// Baseline to baseline distance per point of font size.
pub const LEADING: f32 = 1.2;

// Advance widths for 0x20..=0x7E, in 1/1000 text space units.
const WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];
const DEFAULT_WIDTH: u16 = 556;

fn char_width(c: char) -> f32 {
    let units = match c as u32 {
        code @ 0x20..=0x7E => WIDTHS[(code - 0x20) as usize],
        _ => DEFAULT_WIDTH,
    };
    units as f32 / 1000.0
}

/// Rendered width of `text` at `fontsize`, in points.
pub fn text_width(text: &str, fontsize: f32) -> f32 {
    text.chars().map(char_width).sum::<f32>() * fontsize
}

/// Bytes for a WinAnsi-encoded literal string; characters outside Latin-1 become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Breaks a word wider than `max_width` into pieces that fit.
fn split_long_word(word: &str, max_width: f32, fontsize: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if current.chars().count() > 1 && text_width(&current, fontsize) > max_width {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Word-wraps `content` to `max_width`, honouring explicit newlines.
pub fn wrap(content: &str, max_width: f32, fontsize: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() { word.to_string() } else { format!("{line} {word}") };
            if text_width(&candidate, fontsize) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if text_width(word, fontsize) <= max_width {
                line = word.to_string();
            } else {
                let mut pieces = split_long_word(word, max_width, fontsize);
                line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(line);
    }
    lines
}

/// Height a block of `lines` occupies, from the top of the first line to the last baseline's descent.
pub fn block_height(lines: usize, fontsize: f32) -> f32 {
    if lines == 0 {
        return 0.0;
    }
    (lines - 1) as f32 * LEADING * fontsize + fontsize
}
