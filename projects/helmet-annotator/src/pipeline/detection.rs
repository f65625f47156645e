use crate::pipeline::render::draw_detections;
use crate::pipeline::types::{BBox, Detection};
use crate::pipeline::FrameAnnotator;
use anyhow::{anyhow, Result};
use image::{DynamicImage, ImageBuffer, Rgb};
use opencv::core::Mat;
use opencv::prelude::*;
use usls::models::RTDETR;
use usls::{Config, Image};

/// A wrapper around the USLS RT-DETR model that handles BGR-to-RGB conversion
/// and corrects for aspect-ratio padding bugs in the underlying model library.
pub struct ObjectDetector {
    model: RTDETR,
    min_confidence: f32,
}

impl ObjectDetector {
    /// Load the model from a local weights file.
    pub fn new(model_path: &str, class_names: &[String], min_confidence: f32) -> Result<Self> {
        let names: Vec<&str> = class_names.iter().map(String::as_str).collect();
        let config = Config::default()
            .with_model_file(model_path)
            .with_class_names(&names);

        #[cfg(target_os = "macos")]
        let config = config.with_model_device(usls::Device::CoreMl);

        let config = config.commit()?;
        let model = RTDETR::new(config)?;
        Ok(Self {
            model,
            min_confidence,
        })
    }

    /// Run detection on a single OpenCV Mat.
    pub fn detect(&mut self, image: &Mat) -> Result<Vec<Detection>> {
        let dynamic_image = mat_to_dynamic_image(image)?;

        // Correction calculations (USLS RT-DETR bug workaround)
        let size = image.size()?;
        let img_w = size.width as f32;
        let img_h = size.height as f32;

        let (x_correction, y_correction) = if img_w > img_h {
            (img_w / img_h, 1.0)
        } else if img_h > img_w {
            (1.0, img_h / img_w)
        } else {
            (1.0, 1.0)
        };

        let results = self.model.forward(&[Image::from(dynamic_image)])?;
        let hbbs = results
            .into_iter()
            .next()
            .map(|y| y.hbbs)
            .unwrap_or_default();

        let min_confidence = self.min_confidence;
        let detections = hbbs
            .into_iter()
            .filter_map(|hbb| {
                let confidence = hbb.confidence().unwrap_or(0.0);
                if confidence < min_confidence {
                    return None;
                }
                Some(Detection {
                    bbox: BBox {
                        x: hbb.xmin() * x_correction,
                        y: hbb.ymin() * y_correction,
                        w: hbb.width() * x_correction,
                        h: hbb.height() * y_correction,
                    },
                    confidence,
                    class_id: hbb.id().unwrap_or(0),
                    class_name: hbb.name().map(|n| n.to_string()),
                })
            })
            .collect();

        Ok(detections)
    }
}

impl FrameAnnotator for ObjectDetector {
    fn annotate(&mut self, frame: &Mat) -> Result<Mat> {
        let detections = self.detect(frame)?;
        let mut rendered = frame.try_clone()?;
        draw_detections(&mut rendered, &detections)?;
        Ok(rendered)
    }
}

/// Convert an OpenCV Mat (BGR) to an image::DynamicImage (RGB)
fn mat_to_dynamic_image(mat: &Mat) -> Result<DynamicImage> {
    let mut rgb_mat = Mat::default();
    opencv::imgproc::cvt_color_def(mat, &mut rgb_mat, opencv::imgproc::COLOR_BGR2RGB)?;

    let size = rgb_mat.size()?;
    let width = size.width as u32;
    let height = size.height as u32;

    if !rgb_mat.is_continuous() {
        return Err(anyhow!("Mat is not continuous"));
    }

    let data_bytes = rgb_mat.data_bytes()?;
    let buffer = data_bytes.to_vec();

    let img_buffer = ImageBuffer::<Rgb<u8>, _>::from_vec(width, height, buffer)
        .ok_or_else(|| anyhow!("Failed to create ImageBuffer from Mat data"))?;

    Ok(DynamicImage::ImageRgb8(img_buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};

    #[test]
    fn test_mat_to_dynamic_image_swaps_channels() {
        // Pure blue in BGR
        let mat = Mat::new_rows_cols_with_default(
            4,
            6,
            CV_8UC3,
            Scalar::new(255.0, 0.0, 0.0, 0.0),
        )
        .unwrap();
        assert_eq!(*mat.at_2d::<Vec3b>(0, 0).unwrap(), Vec3b::from([255, 0, 0]));

        let image = mat_to_dynamic_image(&mat).unwrap();
        assert_eq!(image.width(), 6);
        assert_eq!(image.height(), 4);

        let rgb = image.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 255]);
    }
}
