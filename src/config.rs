/// Settings for rendering a single character to an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Target height of the font's em box, in pixels
    pub pixel_height: f32,

    /// Render a signed distance field with this spread instead of plain coverage
    pub sdf_spread: Option<u32>,

    /// Foreground color, the background is black
    pub color: [u8; 3],
}

impl RenderConfig {
    pub const DEFAULT_PIXEL_HEIGHT: f32 = 32.0;

    pub fn with_pixel_height(mut self, pixel_height: f32) -> Self {
        self.pixel_height = pixel_height;
        self
    }

    pub fn with_sdf(mut self, spread: u32) -> Self {
        self.sdf_spread = Some(spread);
        self
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixel_height: Self::DEFAULT_PIXEL_HEIGHT,
            sdf_spread: None,
            color: [255, 255, 255],
        }
    }
}
