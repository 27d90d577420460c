pub mod color;
pub mod error;
pub mod region;
pub mod render;
pub mod util;
pub mod walk;

pub use color::Color;
pub use error::{Error, Result};
pub use region::{Corner, Direction, Region};
pub use walk::{closest_neighbor, find_path, OutOfBounds, Walk, WalkState, Walker};

use image::{GenericImageView, Pixel};

/// Read-only access to a two dimensional grid of colors
pub trait PixelGrid {
    /// The (width, height) of the grid
    fn extent(&self) -> (i64, i64);

    /// Color at a coordinate known to lie inside the grid
    fn color_in_bounds(&self, x: u32, y: u32) -> Color;

    /// Return the color at the given coordinate. Reads outside of the grid yield black.
    fn color_at(&self, x: i64, y: i64) -> Color {
        let (width, height) = self.extent();

        if x < 0 || y < 0 || x >= width || y >= height {
            return Color::BLACK;
        }

        self.color_in_bounds(x as u32, y as u32)
    }

    /// Mean color of all pixels covered by the region, `None` if the region covers nothing.
    ///
    /// The part of the region outside the grid reads as black, only the inside is visited.
    fn mean_color(&self, region: &Region) -> Option<Color> {
        let (width, height) = self.extent();
        let inside = region.clip(width, height);

        Color::mean_padded(
            inside
                .into_iter()
                .flat_map(|r| r.points())
                .map(|(x, y)| self.color_in_bounds(x as u32, y as u32)),
            region.area(),
        )
    }
}

/// Any 8-bit image can be walked, whatever its pixel layout
impl<I> PixelGrid for I
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    fn extent(&self) -> (i64, i64) {
        let (width, height) = self.dimensions();
        (width as i64, height as i64)
    }

    fn color_in_bounds(&self, x: u32, y: u32) -> Color {
        Color::from(self.get_pixel(x, y).to_rgb())
    }
}
