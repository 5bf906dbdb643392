use qrcode::{types::QrError, Color, EcLevel, QrCode};

use super::drawers::Neighbors;
use super::ComposeError;

/// Side of a finder pattern in modules.
pub const FINDER_SIZE: usize = 7;

/// Dark/light module grid of an encoded payload, always at error-correction level H.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    pub fn encode(payload: &str) -> Result<Self, ComposeError> {
        if payload.is_empty() {
            return Err(ComposeError::Encoding("payload is empty".into()));
        }
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H).map_err(
            |e| match e {
                QrError::DataTooLong => ComposeError::Encoding(format!(
                    "payload of {} bytes exceeds the capacity of a level H symbol",
                    payload.len()
                )),
                other => ComposeError::Encoding(other.to_string()),
            },
        )?;
        let modules = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
        Ok(Self { width: code.width(), modules })
    }

    /// Width and height in modules, quiet zone excluded.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Out-of-range coordinates read as light.
    pub fn is_dark(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.width {
            return false;
        }
        self.modules[y as usize * self.width + x as usize]
    }

    pub fn neighbors(&self, x: usize, y: usize) -> Neighbors {
        let (x, y) = (x as isize, y as isize);
        Neighbors {
            north: self.is_dark(x, y - 1),
            east: self.is_dark(x + 1, y),
            south: self.is_dark(x, y + 1),
            west: self.is_dark(x - 1, y),
        }
    }

    /// Whether the module belongs to one of the three finder patterns.
    pub fn is_eye(&self, x: usize, y: usize) -> bool {
        let far = self.width - FINDER_SIZE;
        (x < FINDER_SIZE && y < FINDER_SIZE)
            || (x >= far && y < FINDER_SIZE)
            || (x < FINDER_SIZE && y >= far)
    }
}
