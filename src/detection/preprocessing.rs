use crate::config::Config;
use crate::error::{Error, Result};
use image::{imageops::FilterType, RgbImage};
use ndarray::{Array, Array4};

/// Resizes `rgb_image` to the model input and lays it out as a normalised
/// NCHW tensor.
///
/// The frame is stretched to the input size with no letterbox padding, so
/// the aspect ratio is not kept. Boxes are mapped back with a separate scale
/// per axis (see [`decode_predictions`](super::decode_predictions)).
pub fn preprocess_image(rgb_image: &RgbImage, config: &Config) -> Result<Array4<f32>> {
    let width = config.input_width();
    let height = config.input_height();
    let resized = image::imageops::resize(rgb_image, width, height, FilterType::CatmullRom);

    let raw = resized.as_raw();
    let mut input_data = Vec::with_capacity((width * height * 3) as usize);

    for c in 0..3 {
        for i in 0..height {
            for j in 0..width {
                let index = (i * width + j) * 3;
                let pixel_value = raw[index as usize + c] as f32;
                input_data.push((pixel_value - config.input_mean) / config.input_std);
            }
        }
    }

    let shape = [
        config.input_shape[0] as usize,
        config.input_shape[1] as usize,
        height as usize,
        width as usize,
    ];

    Array::from_shape_vec(shape, input_data)
        .map_err(|err| Error::Model(format!("input tensor shape mismatch: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_preprocess_layout_and_scale() {
        let config = Config {
            input_shape: [1, 3, 4, 4],
            ..Config::default()
        };
        let image = RgbImage::from_pixel(8, 8, Rgb([255, 0, 51]));

        let tensor = preprocess_image(&image, &config).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 4, 4]);
        assert!((tensor[[0, 0, 2, 2]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 1, 2, 2]].abs() < 1e-6);
        assert!((tensor[[0, 2, 2, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_wide_frame_is_stretched_not_padded() {
        let config = Config {
            input_shape: [1, 3, 4, 4],
            ..Config::default()
        };
        let image = RgbImage::from_pixel(16, 9, Rgb([255, 255, 255]));

        let tensor = preprocess_image(&image, &config).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 4, 4]);
        // no grey padding rows at the top or bottom
        assert!(tensor.iter().all(|value| (value - 1.0).abs() < 1e-3));
    }
}
