//! Board geometry and validation.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// One inch in meters.
pub const INCH: f64 = 0.0254;

/// Dictionary used when none is configured explicitly.
pub const DEFAULT_DICTIONARY: &str = "DICT_5X5_250";

/// Errors raised while building or loading a board configuration.
///
/// All of these are fatal to startup: the caller must fix the configuration
/// and restart.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("marker_len ({marker_len}) must be smaller than square_len ({square_len})")]
    MarkerNotSmaller { square_len: f64, marker_len: f64 },
    #[error("board needs at least 2x2 squares, got {squares_x}x{squares_y}")]
    InvalidSize { squares_x: u32, squares_y: u32 },
    #[error("square_len and marker_len must be finite and > 0")]
    InvalidLength,
    #[error("board dictionary is not set")]
    DictionaryUnset,
    #[error("unknown marker dictionary `{0}`")]
    UnknownDictionary(String),
    #[error("board needs {needed} markers, dictionary `{name}` has {available}")]
    NotEnoughMarkers {
        name: String,
        needed: usize,
        available: usize,
    },
    #[error("detector rejected the board: {0}")]
    Detector(String),
    #[error(transparent)]
    Load(#[from] JsonIoError),
}

/// I/O failures for the JSON helpers in this crate.
#[derive(thiserror::Error, Debug)]
pub enum JsonIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Static ChArUco board geometry.
///
/// `squares_x`/`squares_y` are **square counts** (not inner corner counts).
/// Lengths are in meters. A `BoardConfig` only exists in a validated state:
/// [`BoardConfig::new`], [`BoardConfig::load_json`] and deserialization all
/// check the geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardFields")]
pub struct BoardConfig {
    squares_x: u32,
    squares_y: u32,
    square_len: f64,
    marker_len: f64,
    dictionary: String,
}

/// Unchecked on-disk form of [`BoardConfig`].
#[derive(Deserialize)]
struct BoardFields {
    squares_x: u32,
    squares_y: u32,
    square_len: f64,
    marker_len: f64,
    dictionary: String,
}

impl TryFrom<BoardFields> for BoardConfig {
    type Error = ConfigError;

    fn try_from(raw: BoardFields) -> Result<Self, Self::Error> {
        Self::new(
            raw.squares_x,
            raw.squares_y,
            raw.square_len,
            raw.marker_len,
            raw.dictionary,
        )
    }
}

impl Default for BoardConfig {
    /// 8x6 board with 1.25in squares and 1in markers.
    fn default() -> Self {
        Self {
            squares_x: 8,
            squares_y: 6,
            square_len: 1.25 * INCH,
            marker_len: INCH,
            dictionary: DEFAULT_DICTIONARY.to_string(),
        }
    }
}

impl BoardConfig {
    /// Validate and create a board configuration.
    pub fn new(
        squares_x: u32,
        squares_y: u32,
        square_len: f64,
        marker_len: f64,
        dictionary: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let cfg = Self {
            squares_x,
            squares_y,
            square_len,
            marker_len,
            dictionary: dictionary.into(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.squares_x < 2 || self.squares_y < 2 {
            return Err(ConfigError::InvalidSize {
                squares_x: self.squares_x,
                squares_y: self.squares_y,
            });
        }
        if !self.square_len.is_finite()
            || !self.marker_len.is_finite()
            || self.square_len <= 0.0
            || self.marker_len <= 0.0
        {
            return Err(ConfigError::InvalidLength);
        }
        if self.square_len <= self.marker_len {
            return Err(ConfigError::MarkerNotSmaller {
                square_len: self.square_len,
                marker_len: self.marker_len,
            });
        }
        if self.dictionary.trim().is_empty() {
            return Err(ConfigError::DictionaryUnset);
        }
        Ok(())
    }

    /// Load a JSON board config from disk and validate it.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(JsonIoError::from)?;
        let fields: BoardFields = serde_json::from_str(&raw).map_err(JsonIoError::from)?;
        Self::try_from(fields)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), JsonIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    #[inline]
    pub fn squares_x(&self) -> u32 {
        self.squares_x
    }

    #[inline]
    pub fn squares_y(&self) -> u32 {
        self.squares_y
    }

    /// Square side in meters.
    #[inline]
    pub fn square_len(&self) -> f64 {
        self.square_len
    }

    /// Marker side in meters, always below [`Self::square_len`].
    #[inline]
    pub fn marker_len(&self) -> f64 {
        self.marker_len
    }

    /// Marker dictionary name, e.g. `DICT_5X5_250`.
    #[inline]
    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }

    /// Marker side relative to the square side, in `(0, 1)`.
    #[inline]
    pub fn marker_size_rel(&self) -> f64 {
        self.marker_len / self.square_len
    }

    /// Inner corner columns.
    #[inline]
    pub fn inner_cols(&self) -> u32 {
        self.squares_x - 1
    }

    /// Inner corner rows.
    #[inline]
    pub fn inner_rows(&self) -> u32 {
        self.squares_y - 1
    }

    /// Number of ChArUco (inner) corners.
    #[inline]
    pub fn corner_count(&self) -> u32 {
        self.inner_cols() * self.inner_rows()
    }

    /// Number of markers (one per white square, top-left square black).
    pub fn marker_count(&self) -> usize {
        let total = (self.squares_x * self.squares_y) as usize;
        total / 2
    }

    /// Board-plane position (meters) of a ChArUco corner id.
    ///
    /// Ids are row-major over the inner corners; the origin is the top-left
    /// board corner, so corner 0 sits at `(square_len, square_len)`.
    pub fn corner_position(&self, id: u32) -> Option<Point2<f64>> {
        if id >= self.corner_count() {
            return None;
        }
        let cols = self.inner_cols();
        let i = (id % cols) as f64 + 1.0;
        let j = (id / cols) as f64 + 1.0;
        Some(Point2::new(i * self.square_len, j * self.square_len))
    }

    /// Square cells `[sx, sy]` carrying markers, indexed by marker id.
    pub fn marker_cells(&self) -> Vec<[u32; 2]> {
        let mut out = Vec::with_capacity(self.marker_count());
        for sy in 0..self.squares_y {
            for sx in 0..self.squares_x {
                // Top-left square is black => white squares have (sx + sy) odd.
                if (sx + sy) & 1 == 1 {
                    out.push([sx, sy]);
                }
            }
        }
        out
    }
}
