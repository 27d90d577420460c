use image::{GenericImageView, Pixel, RgbaImage};

use crate::Region;

/// Copy every pixel covered by `path` from `source` onto a fresh, fully transparent canvas of the
/// same size. Parts of a region outside the source are ignored.
pub fn render_path<I>(source: &I, path: &[Region]) -> RgbaImage
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let (width, height) = source.dimensions();
    let mut canvas = RgbaImage::new(width, height);

    for region in path {
        let Some(clipped) = region.clip(width as i64, height as i64) else {
            continue;
        };

        for (x, y) in clipped.points() {
            let (x, y) = (x as u32, y as u32);
            canvas.put_pixel(x, y, source.get_pixel(x, y).to_rgba());
        }
    }

    canvas
}
