//! Printable ChArUco board images.

use crate::detector::board_dictionary;
use calib_targets::aruco::Dictionary;
use camcal_core::{BoardConfig, ConfigError};
use image::{GrayImage, Luma};

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// Pixels per square used when a requested size is `0`.
pub const DEFAULT_PX_PER_SQUARE: u32 = 100;

/// Renders boards in the OpenCV ChArUco layout: top-left square black,
/// markers on white squares numbered row-major, one border bit.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoardRenderer;

impl BoardRenderer {
    /// Render `board` on a `px` x `py` canvas; `0` picks
    /// `squares * DEFAULT_PX_PER_SQUARE` along that axis.
    ///
    /// The board is scaled uniformly to fit and centred on a white canvas.
    pub fn generate_image(
        &self,
        board: &BoardConfig,
        px: u32,
        py: u32,
    ) -> Result<GrayImage, ConfigError> {
        let dictionary = board_dictionary(board)?;
        let width = if px == 0 {
            board.squares_x() * DEFAULT_PX_PER_SQUARE
        } else {
            px
        };
        let height = if py == 0 {
            board.squares_y() * DEFAULT_PX_PER_SQUARE
        } else {
            py
        };
        log::debug!(
            "rendering {}x{} board ({}) at {width}x{height}",
            board.squares_x(),
            board.squares_y(),
            board.dictionary()
        );
        Ok(render(board, &dictionary, width, height))
    }
}

fn render(board: &BoardConfig, dictionary: &Dictionary, width: u32, height: u32) -> GrayImage {
    let cols = board.squares_x() as f64;
    let rows = board.squares_y() as f64;
    let scale = (width as f64 / cols).min(height as f64 / rows);
    let ox = 0.5 * (width as f64 - scale * cols);
    let oy = 0.5 * (height as f64 - scale * rows);

    let bits = dictionary.marker_size;
    let cells = bits + 2;
    let rel = board.marker_size_rel();
    let margin = 0.5 * (1.0 - rel);

    // Marker id per square, row-major over white squares.
    let mut marker_at = vec![None; (board.squares_x() * board.squares_y()) as usize];
    for (id, [sx, sy]) in board.marker_cells().into_iter().enumerate() {
        marker_at[(sy * board.squares_x() + sx) as usize] = Some(id);
    }

    GrayImage::from_fn(width, height, |x, y| {
        let u = (x as f64 + 0.5 - ox) / scale;
        let v = (y as f64 + 0.5 - oy) / scale;
        if u < 0.0 || v < 0.0 || u >= cols || v >= rows {
            return WHITE;
        }
        let sx = u.floor() as u32;
        let sy = v.floor() as u32;
        if (sx + sy) % 2 == 0 {
            return BLACK;
        }
        let Some(id) = marker_at[(sy * board.squares_x() + sx) as usize] else {
            return WHITE;
        };

        let fu = (u - sx as f64 - margin) / rel;
        let fv = (v - sy as f64 - margin) / rel;
        if !(0.0..1.0).contains(&fu) || !(0.0..1.0).contains(&fv) {
            return WHITE;
        }
        let cx = ((fu * cells as f64) as usize).min(cells - 1);
        let cy = ((fv * cells as f64) as usize).min(cells - 1);
        if cx == 0 || cy == 0 || cx + 1 == cells || cy + 1 == cells {
            return BLACK;
        }
        let idx = (cy - 1) * bits + (cx - 1);
        if (dictionary.codes[id] >> idx) & 1 == 1 {
            BLACK
        } else {
            WHITE
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calib_targets::aruco::builtins;

    fn board() -> BoardConfig {
        BoardConfig::new(5, 4, 0.04, 0.03, "DICT_4X4_50").expect("board")
    }

    #[test]
    fn zero_size_uses_default_scale() {
        let img = BoardRenderer.generate_image(&board(), 0, 0).expect("image");
        assert_eq!(img.dimensions(), (500, 400));
        let img = BoardRenderer.generate_image(&board(), 0, 250).expect("image");
        assert_eq!(img.dimensions(), (500, 250));
    }

    #[test]
    fn unknown_dictionary_is_rejected() {
        let b = BoardConfig::new(5, 4, 0.04, 0.03, "DICT_9X9_1").expect("board");
        assert!(matches!(
            BoardRenderer.generate_image(&b, 0, 0),
            Err(ConfigError::UnknownDictionary(_))
        ));
    }

    #[test]
    fn square_colors_follow_opencv_layout() {
        let img = BoardRenderer.generate_image(&board(), 500, 400).expect("image");
        // Centre of square (0,0) is black, white-square margins are white.
        assert_eq!(*img.get_pixel(50, 50), BLACK);
        assert_eq!(*img.get_pixel(102, 50), WHITE);
        assert_eq!(*img.get_pixel(2, 150), WHITE);
        assert_eq!(*img.get_pixel(150, 150), BLACK);
        // Outer marker border ring.
        assert_eq!(*img.get_pixel(115, 50), BLACK);
    }

    #[test]
    fn board_is_centred_on_wide_canvas() {
        let img = BoardRenderer.generate_image(&board(), 700, 400).expect("image");
        assert_eq!(*img.get_pixel(50, 50), WHITE);
        assert_eq!(*img.get_pixel(650, 50), WHITE);
        assert_eq!(*img.get_pixel(150, 50), BLACK);
    }

    #[test]
    fn marker_bits_match_dictionary() {
        let b = board();
        let dict = builtins::builtin_dictionary("DICT_4X4_50").expect("dict");
        let img = BoardRenderer.generate_image(&b, 500, 400).expect("image");

        // Marker 0 sits in square (1, 0): x in [100, 200), y in [0, 100).
        let bits = dict.marker_size;
        let cells = (bits + 2) as f64;
        let side = 100.0 * b.marker_size_rel();
        let x0 = 100.0 + 0.5 * (100.0 - side);
        let y0 = 0.5 * (100.0 - side);
        let cell = side / cells;

        let mut code = 0u64;
        for by in 0..bits {
            for bx in 0..bits {
                let x = (x0 + (bx as f64 + 1.5) * cell) as u32;
                let y = (y0 + (by as f64 + 1.5) * cell) as u32;
                if *img.get_pixel(x, y) == BLACK {
                    code |= 1 << (by * bits + bx);
                }
            }
        }
        assert_eq!(code, dict.codes[0]);
    }
}
