/// One pixel with components in 0.0..=255.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RGBColorFormat {
    red: f32,
    green: f32,
    blue: f32,
}

/// Level-shifted YCbCr: every component is centered on zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YCbCrColorFormat {
    pub luma: f32,
    pub chroma_blue: f32,
    pub chroma_red: f32,
}

impl RGBColorFormat {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        RGBColorFormat {
            red: red as f32,
            green: green as f32,
            blue: blue as f32,
        }
    }

    /// Reads the first three samples of an interleaved pixel; further
    /// channels such as alpha are ignored.
    pub fn from_samples(samples: &[u8]) -> Self {
        Self::new(samples[0], samples[1], samples[2])
    }

    pub fn level_shifted_luma(&self) -> f32 {
        0.299_f32 * self.red + 0.587_f32 * self.green + 0.114_f32 * self.blue - 128_f32
    }
}

impl From<&RGBColorFormat> for YCbCrColorFormat {
    fn from(value: &RGBColorFormat) -> Self {
        let red = value.red;
        let green = value.green;
        let blue = value.blue;

        let chroma_blue = red * -0.1687_f32 + green * -0.3312_f32 + blue * 0.5_f32;
        let chroma_red = red * 0.5_f32 + green * -0.4186_f32 + blue * -0.0813_f32;
        YCbCrColorFormat {
            luma: value.level_shifted_luma(),
            chroma_blue,
            chroma_red,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{RGBColorFormat, YCbCrColorFormat};

    #[test]
    fn convert_rgb_to_ycbcr() {
        let rgb = RGBColorFormat::new(64, 191, 85);
        let result = YCbCrColorFormat::from(&rgb);
        assert!(
            result.luma >= 12.85_f32 && result.luma < 13.05_f32,
            "luma is wrong, was {}",
            result.luma
        );
        assert!(
            result.chroma_blue >= -31.9 && result.chroma_blue < -31.5,
            "chroma blue is wrong, was {}",
            result.chroma_blue
        );
        assert!(
            result.chroma_red >= -55.1 && result.chroma_red < -54.6,
            "chroma red is wrong, was {}",
            result.chroma_red
        );
    }

    #[test]
    fn convert_rgb_white_to_ycbcr() {
        let result = YCbCrColorFormat::from(&RGBColorFormat::new(255, 255, 255));
        assert!(
            (result.luma - 127.0).abs() < 1e-3,
            "luma is wrong, was {}",
            result.luma
        );
        assert!(result.chroma_blue.abs() <= 0.5, "chroma blue is wrong");
        assert!(result.chroma_red.abs() <= 0.5, "chroma red is wrong");
    }

    #[test]
    fn convert_rgb_black_to_ycbcr() {
        let result = YCbCrColorFormat::from(&RGBColorFormat::new(0, 0, 0));
        assert_eq!(result.luma, -128_f32, "luma is wrong");
        assert_eq!(result.chroma_blue, 0_f32, "chroma blue is wrong");
        assert_eq!(result.chroma_red, 0_f32, "chroma red is wrong");
    }

    #[test]
    fn alpha_is_ignored() {
        let with_alpha = RGBColorFormat::from_samples(&[10, 20, 30, 255]);
        assert_eq!(with_alpha, RGBColorFormat::new(10, 20, 30));
    }
}
