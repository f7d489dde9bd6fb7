use crate::render::{draw_detection, Overlay};
use calib_targets::aruco::{builtins, Dictionary};
use calib_targets::charuco::{
    CharucoBoardSpec, CharucoDetectionResult, CharucoDetector, CharucoParams, MarkerLayout,
};
use calib_targets::core::{estimate_homography_rect_to_img, Homography};
use calib_targets::detect::{self, ChessConfig};
use camcal_core::{
    BoardConfig, BoardDetector, ConfigError, DetectedCorner, DetectedMarker, Detection, Frame,
};
use image::imageops;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Look up a built-in marker dictionary and check it covers every marker of
/// `board`.
pub fn board_dictionary(board: &BoardConfig) -> Result<Dictionary, ConfigError> {
    let dictionary = builtins::builtin_dictionary(board.dictionary().trim())
        .ok_or_else(|| ConfigError::UnknownDictionary(board.dictionary().to_string()))?;
    let needed = board.marker_count();
    if dictionary.codes.len() < needed {
        return Err(ConfigError::NotEnoughMarkers {
            name: board.dictionary().to_string(),
            needed,
            available: dictionary.codes.len(),
        });
    }
    Ok(dictionary)
}

/// [`BoardDetector`] backed by the `calib-targets` ChArUco pipeline
/// (ChESS corners, grid, marker decoding, board alignment).
pub struct CharucoBoardDetector {
    board: BoardConfig,
    detector: CharucoDetector,
    chess: ChessConfig,
    overlay: Overlay,
}

impl CharucoBoardDetector {
    pub fn new(board: &BoardConfig) -> Result<Self, ConfigError> {
        let dictionary = board_dictionary(board)?;
        let spec = CharucoBoardSpec {
            rows: board.squares_y(),
            cols: board.squares_x(),
            cell_size: board.square_len() as f32,
            marker_size_rel: board.marker_size_rel() as f32,
            dictionary,
            marker_layout: MarkerLayout::OpenCvCharuco,
        };
        Self::with_params(board, CharucoParams::for_board(&spec))
    }

    /// Build with explicit detector parameters, for tuning to a camera.
    pub fn with_params(board: &BoardConfig, params: CharucoParams) -> Result<Self, ConfigError> {
        log::debug!(
            "charuco detector: {}x{} squares, dictionary {}, marker_size_rel {:.3}",
            board.squares_x(),
            board.squares_y(),
            board.dictionary(),
            params.board.marker_size_rel
        );
        let detector =
            CharucoDetector::new(params).map_err(|e| ConfigError::Detector(e.to_string()))?;
        Ok(Self {
            board: board.clone(),
            detector,
            chess: detect::default_chess_config(),
            overlay: Overlay::default(),
        })
    }

    pub fn board(&self) -> &BoardConfig {
        &self.board
    }

    pub fn chess_config_mut(&mut self) -> &mut ChessConfig {
        &mut self.chess
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = overlay;
        self
    }

    fn convert(&self, result: &CharucoDetectionResult) -> Detection {
        let corners: Vec<DetectedCorner> = result
            .detection
            .corners
            .iter()
            .filter_map(|c| {
                let id = c.id?;
                (id < self.board.corner_count()).then_some(DetectedCorner {
                    id,
                    position: c.position,
                })
            })
            .collect();

        let homography = board_to_image(&self.board, &corners);
        let cells = self.board.marker_cells();
        let markers = result
            .markers
            .iter()
            .filter(|m| (m.id as usize) < cells.len())
            .map(|m| DetectedMarker {
                id: m.id,
                outline: homography
                    .as_ref()
                    .map(|h| marker_outline(&self.board, cells[m.id as usize], h)),
            })
            .collect();

        Detection { corners, markers }
    }
}

/// Fit the board-plane to image homography on identified corners.
pub fn board_to_image(
    board: &BoardConfig,
    corners: &[DetectedCorner],
) -> Option<Homography<f64>> {
    let (plane, img): (Vec<_>, Vec<_>) = corners
        .iter()
        .filter_map(|c| Some((board.corner_position(c.id)?, c.position.cast::<f64>())))
        .unzip();
    estimate_homography_rect_to_img(&plane, &img)
}

/// Image outline (TL, TR, BR, BL) of the marker in square `[sx, sy]`.
pub fn marker_outline(
    board: &BoardConfig,
    cell: [u32; 2],
    h: &Homography<f64>,
) -> [Point2<f32>; 4] {
    let s = board.square_len();
    let m = 0.5 * (board.square_len() - board.marker_len());
    let x0 = cell[0] as f64 * s + m;
    let y0 = cell[1] as f64 * s + m;
    let x1 = x0 + board.marker_len();
    let y1 = y0 + board.marker_len();
    [(x0, y0), (x1, y0), (x1, y1), (x0, y1)].map(|(x, y)| h.apply(Point2::new(x, y)).cast())
}

impl BoardDetector for CharucoBoardDetector {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    fn detect(&self, frame: &Frame) -> Detection {
        let gray = imageops::grayscale(frame);
        let chess_corners = detect::detect_corners(&gray, &self.chess);
        match self.detector.detect(&detect::gray_view(&gray), &chess_corners) {
            Ok(result) => {
                let detection = self.convert(&result);
                log::trace!(
                    "charuco: {} corners, {} markers",
                    detection.corner_count(),
                    detection.marker_count()
                );
                detection
            }
            Err(err) => {
                log::trace!("charuco detection failed: {err}");
                Detection::empty()
            }
        }
    }

    fn render(&self, frame: &Frame, detection: &Detection) -> Frame {
        draw_detection(frame, detection, &self.overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    fn small_board() -> BoardConfig {
        BoardConfig::new(5, 4, 0.04, 0.03, "DICT_4X4_50").expect("board")
    }

    #[test]
    fn unknown_dictionary_is_rejected() {
        let board = BoardConfig::new(5, 4, 0.04, 0.03, "DICT_NOPE").expect("board");
        let err = CharucoBoardDetector::new(&board).err().expect("unknown");
        assert!(matches!(err, ConfigError::UnknownDictionary(name) if name == "DICT_NOPE"));
    }

    #[test]
    fn dictionary_must_cover_all_markers() {
        let board = BoardConfig::new(12, 10, 0.04, 0.03, "DICT_4X4_50").expect("board");
        let err = board_dictionary(&board).err().expect("too many markers");
        match err {
            ConfigError::NotEnoughMarkers {
                needed, available, ..
            } => {
                assert_eq!(needed, 60);
                assert_eq!(available, 50);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn blank_frame_detects_nothing() {
        let det = CharucoBoardDetector::new(&small_board()).expect("detector");
        let frame = Frame::from_pixel(320, 240, image::Rgb([128, 128, 128]));
        assert!(det.detect(&frame).is_empty());
    }

    #[test]
    fn outline_follows_the_board_homography() {
        let board = small_board();
        // 1000 px per meter, shifted by (50, 20).
        let h = Homography::<f64>::new(Matrix3::new(
            1000.0, 0.0, 50.0, 0.0, 1000.0, 20.0, 0.0, 0.0, 1.0,
        ));
        let corners: Vec<_> = (0..board.corner_count())
            .map(|id| {
                let p = h.apply(board.corner_position(id).expect("id"));
                DetectedCorner {
                    id,
                    position: p.cast(),
                }
            })
            .collect();

        let fitted = board_to_image(&board, &corners).expect("fit");
        let outline = marker_outline(&board, [1, 0], &fitted);
        // Square (1,0) spans x in [40, 80] mm; the 30 mm marker is centred.
        assert_relative_eq!(outline[0].x, 50.0 + 45.0, epsilon = 1e-2);
        assert_relative_eq!(outline[0].y, 20.0 + 5.0, epsilon = 1e-2);
        assert_relative_eq!(outline[2].x, 50.0 + 75.0, epsilon = 1e-2);
        assert_relative_eq!(outline[2].y, 20.0 + 35.0, epsilon = 1e-2);
    }

    #[test]
    fn too_few_corners_leave_no_homography() {
        let board = small_board();
        let corners: Vec<_> = (0..3)
            .map(|id| DetectedCorner {
                id,
                position: Point2::new(id as f32, 0.0),
            })
            .collect();
        assert!(board_to_image(&board, &corners).is_none());
    }
}
