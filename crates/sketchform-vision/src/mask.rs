use image::{GrayImage, Luma};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Binary foreground mask: every pixel is either 255 or 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    /// Binarize any grayscale image: non-zero pixels become foreground.
    pub fn from_gray(image: GrayImage) -> Self {
        let mut image = image;
        for p in image.pixels_mut() {
            p.0[0] = if p.0[0] != 0 { FOREGROUND } else { BACKGROUND };
        }
        Self { image }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let image = GrayImage::from_fn(width, height, |x, y| {
            Luma([if f(x, y) { FOREGROUND } else { BACKGROUND }])
        });
        Self { image }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] == FOREGROUND
    }

    pub fn foreground_count(&self) -> usize {
        self.image.as_raw().iter().filter(|&&v| v == FOREGROUND).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}
