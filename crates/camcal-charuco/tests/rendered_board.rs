use camcal_charuco::{BoardRenderer, CharucoBoardDetector};
use camcal_core::{
    BoardConfig, BoardDetector, CalibrationResult, CalibrationSample, CalibrationSession,
    Calibrator, Frame, Resolution, SolveError, TextReporter,
};
use image::{imageops, Rgb};

fn board_with(dictionary: &str) -> BoardConfig {
    BoardConfig::new(8, 6, 0.03175, 0.0254, dictionary).expect("board")
}

fn board() -> BoardConfig {
    board_with("DICT_4X4_50")
}

/// Rendered board pasted with a white margin into an RGB frame.
fn board_frame(board: &BoardConfig) -> Frame {
    let gray = BoardRenderer.generate_image(board, 640, 480).expect("render");
    let rgb = image::DynamicImage::ImageLuma8(gray).to_rgb8();
    let mut frame = Frame::from_pixel(800, 600, Rgb([255, 255, 255]));
    imageops::replace(&mut frame, &rgb, 80, 60);
    frame
}

#[test]
fn detections_on_a_rendered_board_are_consistent() {
    let board = board();
    let detector = CharucoBoardDetector::new(&board).expect("detector");
    let frame = board_frame(&board);

    let detection = detector.detect(&frame);
    assert_eq!(detection.corners.len(), board.corner_count() as usize);
    assert!(detection.marker_count() >= 4, "{} markers", detection.marker_count());

    let mut ids: Vec<u32> = detection.corners.iter().map(|c| c.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), detection.corners.len(), "corner ids are unique");
    assert!(ids.iter().all(|&id| id < board.corner_count()));
    assert!(detection
        .markers
        .iter()
        .all(|m| (m.id as usize) < board.marker_count()));
    for c in &detection.corners {
        assert!(c.position.x >= 0.0 && c.position.x < 800.0);
        assert!(c.position.y >= 0.0 && c.position.y < 600.0);
    }

    let annotated = detector.render(&frame, &detection);
    assert_eq!(annotated.dimensions(), frame.dimensions());
}

#[test]
fn every_inner_corner_is_found_with_either_dictionary() {
    for name in ["DICT_4X4_50", "DICT_5X5_250"] {
        let board = board_with(name);
        let detector = CharucoBoardDetector::new(&board).expect("detector");
        let detection = detector.detect(&board_frame(&board));

        assert_eq!(detection.corners.len(), 35, "{name}");
        assert!(detection.marker_count() >= 4, "{name}: {} markers", detection.marker_count());
        assert!(
            detection.markers.iter().all(|m| m.outline.is_some()),
            "{name}: markers without outline"
        );
    }
}

/// Result derived from the number of captured corners.
struct CountingCalibrator;

impl Calibrator for CountingCalibrator {
    fn solve(
        &self,
        samples: &[CalibrationSample],
        resolution: Resolution,
    ) -> Result<CalibrationResult, SolveError> {
        let corners: usize = samples.iter().map(CalibrationSample::len).sum();
        Ok(CalibrationResult::new(
            corners as f64,
            corners as f64,
            resolution.width as f64 / 2.0,
            resolution.height as f64 / 2.0,
            [0.0; 5],
            0.0,
        ))
    }
}

#[test]
fn session_captures_a_sample_from_a_rendered_board() {
    let board = board();
    let detector = CharucoBoardDetector::new(&board).expect("detector");
    let frame = board_frame(&board);
    let mut session = CalibrationSession::new(CountingCalibrator, TextReporter::new(Vec::new()));

    session.process_frame(&detector, &frame).expect("idle frame");
    assert_eq!(session.sample_count(), 0);

    session.request_capture();
    session.process_frame(&detector, &frame).expect("armed frame");
    assert_eq!(session.sample_count(), 1);
    assert_eq!(session.dataset().samples()[0].len(), 35);
    assert_eq!(session.resolution(), Some(Resolution::new(800, 600)));

    let (_, _, reporter) = session.into_parts();
    let text = String::from_utf8(reporter.into_inner()).expect("utf8");
    assert_eq!(text.trim(), "capture: 1, (800,600)");
}

#[test]
fn generated_board_round_trips_through_png() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("ChArUco_img.png");

    let img = BoardRenderer.generate_image(&board(), 0, 0).expect("render");
    img.save(&path).expect("save");
    let back = image::open(&path).expect("open").to_luma8();
    assert_eq!(back, img);
}
