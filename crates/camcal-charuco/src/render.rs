//! Detection overlay drawn onto preview frames.

use camcal_core::{Detection, Frame};
use image::Rgb;
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut, draw_line_segment_mut};

#[derive(Clone, Copy, Debug)]
pub struct Overlay {
    pub corner_color: Rgb<u8>,
    pub marker_color: Rgb<u8>,
    /// Circle radius around each corner, in pixels. `0` draws only the cross.
    pub corner_radius: i32,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            corner_color: Rgb([0, 0, 255]),
            marker_color: Rgb([255, 0, 0]),
            corner_radius: 4,
        }
    }
}

/// Copy `frame` and draw marker outlines, then identified corners on top.
pub fn draw_detection(frame: &Frame, detection: &Detection, overlay: &Overlay) -> Frame {
    let mut out = frame.clone();

    for marker in &detection.markers {
        let Some(quad) = marker.outline else {
            continue;
        };
        for k in 0..4 {
            let a = quad[k];
            let b = quad[(k + 1) % 4];
            draw_line_segment_mut(&mut out, (a.x, a.y), (b.x, b.y), overlay.marker_color);
        }
    }

    for corner in &detection.corners {
        let x = corner.position.x.round() as i32;
        let y = corner.position.y.round() as i32;
        draw_cross_mut(&mut out, overlay.corner_color, x, y);
        if overlay.corner_radius > 0 {
            draw_hollow_circle_mut(&mut out, (x, y), overlay.corner_radius, overlay.corner_color);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use camcal_core::{DetectedCorner, DetectedMarker};
    use nalgebra::Point2;

    fn gray(w: u32, h: u32) -> Frame {
        Frame::from_pixel(w, h, Rgb([200, 200, 200]))
    }

    #[test]
    fn empty_detection_is_a_plain_copy() {
        let frame = gray(32, 24);
        let out = draw_detection(&frame, &Detection::empty(), &Overlay::default());
        assert_eq!(out, frame);
    }

    #[test]
    fn corners_and_outlines_use_their_colors() {
        let frame = gray(64, 64);
        let detection = Detection {
            corners: vec![DetectedCorner {
                id: 0,
                position: Point2::new(10.0, 10.0),
            }],
            markers: vec![
                DetectedMarker {
                    id: 0,
                    outline: Some([
                        Point2::new(30.0, 30.0),
                        Point2::new(50.0, 30.0),
                        Point2::new(50.0, 50.0),
                        Point2::new(30.0, 50.0),
                    ]),
                },
                DetectedMarker {
                    id: 1,
                    outline: None,
                },
            ],
        };
        let overlay = Overlay::default();
        let out = draw_detection(&frame, &detection, &overlay);

        assert_eq!(*out.get_pixel(10, 10), overlay.corner_color);
        assert_eq!(*out.get_pixel(40, 30), overlay.marker_color);
        assert_eq!(*out.get_pixel(30, 40), overlay.marker_color);
        assert_eq!(*out.get_pixel(40, 40), Rgb([200, 200, 200]));
        assert_eq!(*frame.get_pixel(10, 10), Rgb([200, 200, 200]));
    }

    #[test]
    fn off_frame_corners_are_clipped() {
        let frame = gray(16, 16);
        let detection = Detection {
            corners: vec![DetectedCorner {
                id: 3,
                position: Point2::new(-40.0, 500.0),
            }],
            markers: Vec::new(),
        };
        let out = draw_detection(&frame, &detection, &Overlay::default());
        assert_eq!(out.dimensions(), (16, 16));
    }
}
