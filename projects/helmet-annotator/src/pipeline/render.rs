use crate::pipeline::types::Detection;
use anyhow::Result;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc::{
    get_text_size, put_text, rectangle, FILLED, FONT_HERSHEY_SIMPLEX, LINE_8,
};
use opencv::prelude::*;

const BOX_THICKNESS: i32 = 2;
const FONT_SCALE: f64 = 0.5;
const FONT_THICKNESS: i32 = 1;
const LABEL_PADDING: i32 = 3;

// BGR
const PALETTE: [(f64, f64, f64); 8] = [
    (0.0, 255.0, 0.0),   // Green
    (0.0, 0.0, 255.0),   // Red
    (255.0, 128.0, 0.0), // Blue
    (0.0, 165.0, 255.0), // Orange
    (255.0, 0.0, 255.0), // Magenta
    (255.0, 255.0, 0.0), // Cyan
    (0.0, 255.0, 255.0), // Yellow
    (128.0, 0.0, 128.0), // Purple
];

pub fn class_color(class_id: usize) -> Scalar {
    let (b, g, r) = PALETTE[class_id % PALETTE.len()];
    Scalar::new(b, g, r, 0.0)
}

/// Clips a detection box to the frame. Returns `None` if nothing is left.
pub fn clamp_to_frame(detection: &Detection, frame_width: i32, frame_height: i32) -> Option<Rect> {
    let x0 = (detection.bbox.x.floor() as i32).clamp(0, frame_width);
    let y0 = (detection.bbox.y.floor() as i32).clamp(0, frame_height);
    let x1 = ((detection.bbox.x + detection.bbox.w).ceil() as i32).clamp(0, frame_width);
    let y1 = ((detection.bbox.y + detection.bbox.h).ceil() as i32).clamp(0, frame_height);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
}

/// Burns boxes and labels into `frame`.
pub fn draw_detections(frame: &mut Mat, detections: &[Detection]) -> Result<()> {
    let size = frame.size()?;

    for d in detections {
        let rect = match clamp_to_frame(d, size.width, size.height) {
            Some(rect) => rect,
            None => continue,
        };
        let color = class_color(d.class_id);

        rectangle(frame, rect, color, BOX_THICKNESS, LINE_8, 0)?;

        let label = d.label();
        let mut baseline = 0;
        let text_size = get_text_size(
            &label,
            FONT_HERSHEY_SIMPLEX,
            FONT_SCALE,
            FONT_THICKNESS,
            &mut baseline,
        )?;

        // Label sits above the box, or inside it when the box touches the top edge
        let label_height = text_size.height + baseline + LABEL_PADDING * 2;
        let label_top = if rect.y >= label_height {
            rect.y - label_height
        } else {
            rect.y
        };
        let background = Rect::new(
            rect.x,
            label_top,
            text_size.width + LABEL_PADDING * 2,
            label_height,
        );
        rectangle(frame, background, color, FILLED, LINE_8, 0)?;

        put_text(
            frame,
            &label,
            Point::new(
                rect.x + LABEL_PADDING,
                label_top + LABEL_PADDING + text_size.height,
            ),
            FONT_HERSHEY_SIMPLEX,
            FONT_SCALE,
            Scalar::new(255.0, 255.0, 255.0, 0.0),
            FONT_THICKNESS,
            LINE_8,
            false,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::BBox;
    use opencv::core::{Vec3b, CV_8UC3};

    fn detection(x: f32, y: f32, w: f32, h: f32, class_id: usize) -> Detection {
        Detection {
            bbox: BBox { x, y, w, h },
            confidence: 0.87,
            class_id,
            class_name: Some("helmet".to_string()),
        }
    }

    #[test]
    fn test_label_format() {
        let mut d = detection(0.0, 0.0, 10.0, 10.0, 0);
        assert_eq!(d.label(), "helmet 0.87");

        d.class_name = None;
        d.class_id = 3;
        assert_eq!(d.label(), "class 3 0.87");
    }

    #[test]
    fn test_clamp_to_frame() {
        // Fully inside
        let rect = clamp_to_frame(&detection(10.0, 20.0, 30.0, 40.0, 0), 640, 480).unwrap();
        assert_eq!(rect, Rect::new(10, 20, 30, 40));

        // Overhanging the bottom-right corner
        let rect = clamp_to_frame(&detection(600.0, 450.0, 100.0, 100.0, 0), 640, 480).unwrap();
        assert_eq!(rect, Rect::new(600, 450, 40, 30));

        // Negative origin
        let rect = clamp_to_frame(&detection(-5.0, -5.0, 15.0, 15.0, 0), 640, 480).unwrap();
        assert_eq!(rect, Rect::new(0, 0, 10, 10));

        // Entirely outside
        assert!(clamp_to_frame(&detection(700.0, 10.0, 20.0, 20.0, 0), 640, 480).is_none());
    }

    #[test]
    fn test_draw_detections_marks_pixels() {
        let mut frame =
            Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(0.0)).unwrap();

        draw_detections(&mut frame, &[detection(100.0, 100.0, 50.0, 50.0, 0)]).unwrap();

        // Box edge is drawn in the class colour (green for class 0)
        let edge = *frame.at_2d::<Vec3b>(125, 100).unwrap();
        assert_eq!(edge[1], 255);

        // Box interior is untouched
        let inside = *frame.at_2d::<Vec3b>(125, 125).unwrap();
        assert_eq!(inside, Vec3b::from([0, 0, 0]));

        // Size and type are preserved
        assert_eq!(frame.rows(), 480);
        assert_eq!(frame.cols(), 640);
        assert_eq!(frame.typ(), CV_8UC3);
    }

    #[test]
    fn test_draw_nothing_leaves_frame_unchanged() {
        let mut frame =
            Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(7.0)).unwrap();
        draw_detections(&mut frame, &[]).unwrap();

        let px = *frame.at_2d::<Vec3b>(10, 10).unwrap();
        assert_eq!(px, Vec3b::from([7, 7, 7]));
    }

    #[test]
    fn test_class_colors_cycle() {
        assert_eq!(class_color(0), class_color(PALETTE.len()));
        assert_ne!(class_color(0), class_color(1));
    }
}
