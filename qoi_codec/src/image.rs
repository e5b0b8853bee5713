use crate::error::Error;
use crate::meta::{Channels, ImageMeta};
use crate::pixel::Pixel;

/// A decoded image: its metadata plus `width * height` RGBA pixels in
/// row-major order.
///
/// The pixel count always matches the dimensions, and both dimensions are
/// non-zero; every constructor checks this.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
  meta: ImageMeta,
  pixels: Vec<Pixel>,
}

impl Image {
  /// Creates an image from row-major `pixels`.
  pub fn new(meta: ImageMeta, pixels: Vec<Pixel>) -> Result<Self, Error> {
    if meta.width == 0 || meta.height == 0 {
      return Err(Error::InvalidParameter(format!(
        "image dimensions {}x{} must both be non-zero",
        meta.width, meta.height
      )));
    }

    if pixels.len() != meta.num_pixels() {
      return Err(Error::InvalidParameter(format!(
        "{}x{} image needs {} pixels, found {}",
        meta.width,
        meta.height,
        meta.num_pixels(),
        pixels.len()
      )));
    }

    Ok(Self { meta, pixels })
  }

  /// Creates an image from interleaved RGB or RGBA bytes, as selected by
  /// `meta.channels`. Pixels of RGB data get an alpha of 255.
  pub fn from_raw(meta: ImageMeta, raw: &[u8]) -> Result<Self, Error> {
    let bpp = meta.channels.bytes_per_pixel();

    if raw.len() != meta.num_pixels().saturating_mul(bpp) {
      return Err(Error::InvalidParameter(format!(
        "{}x{} image with {} channels needs {} bytes, found {}",
        meta.width,
        meta.height,
        bpp,
        meta.num_pixels().saturating_mul(bpp),
        raw.len()
      )));
    }

    let pixels = raw
      .chunks_exact(bpp)
      .map(|chunk| Pixel {
        r: chunk[0],
        g: chunk[1],
        b: chunk[2],
        a: chunk.get(3).copied().unwrap_or(255),
      })
      .collect();

    Image::new(meta, pixels)
  }

  /// Creates an image from rows of packed `0xAARRGGBB` pixels, the layout
  /// image loaders commonly hand out. `rows` must hold `meta.height` rows of
  /// `meta.width` pixels each.
  pub fn from_argb_rows(meta: ImageMeta, rows: &[Vec<u32>]) -> Result<Self, Error> {
    if rows.len() != meta.height as usize {
      return Err(Error::InvalidParameter(format!(
        "expected {} rows, found {}",
        meta.height,
        rows.len()
      )));
    }

    if let Some((y, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != meta.width as usize) {
      return Err(Error::InvalidParameter(format!(
        "row {} holds {} pixels, expected {}",
        y,
        row.len(),
        meta.width
      )));
    }

    let pixels = rows.iter().flatten().map(|&argb| Pixel::from_argb(argb)).collect();

    Image::new(meta, pixels)
  }

  pub fn meta(&self) -> &ImageMeta {
    &self.meta
  }

  pub fn width(&self) -> u32 {
    self.meta.width
  }

  pub fn height(&self) -> u32 {
    self.meta.height
  }

  /// All pixels, row after row.
  pub fn pixels(&self) -> &[Pixel] {
    &self.pixels
  }

  /// The pixels of row `y`, or `None` past the last row.
  pub fn row(&self, y: u32) -> Option<&[Pixel]> {
    self.rows().nth(y as usize)
  }

  pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
    self.pixels.chunks_exact(self.meta.width as usize)
  }

  /// Interleaved RGB or RGBA bytes, as selected by the image's channel count.
  /// RGB output drops the alpha channel.
  pub fn to_raw(&self) -> Vec<u8> {
    let mut raw = Vec::with_capacity(self.pixels.len() * self.meta.channels.bytes_per_pixel());

    for pixel in &self.pixels {
      match self.meta.channels {
        Channels::Rgb => raw.extend_from_slice(&[pixel.r, pixel.g, pixel.b]),
        Channels::Rgba => raw.extend_from_slice(&[pixel.r, pixel.g, pixel.b, pixel.a]),
      }
    }

    raw
  }

  /// Rows of packed `0xAARRGGBB` pixels, the inverse of
  /// [`Image::from_argb_rows`].
  pub fn to_argb_rows(&self) -> Vec<Vec<u32>> {
    self
      .rows()
      .map(|row| row.iter().map(|pixel| pixel.to_argb()).collect())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::meta::Colorspace;

  fn meta(width: u32, height: u32, channels: Channels) -> ImageMeta {
    ImageMeta { width, height, channels, colorspace: Colorspace::Srgb }
  }

  #[test]
  fn test_new_rejects_mismatched_pixel_count() {
    let pixels = vec![Pixel::default(); 5];

    assert!(matches!(Image::new(meta(2, 3, Channels::Rgba), pixels), Err(Error::InvalidParameter(_))));
  }

  #[test]
  fn test_new_rejects_zero_dimensions() {
    assert!(matches!(Image::new(meta(0, 3, Channels::Rgba), vec![]), Err(Error::InvalidParameter(_))));
  }

  #[test]
  fn test_from_raw_rgb_sets_opaque_alpha() {
    let image = Image::from_raw(meta(2, 1, Channels::Rgb), &[1, 2, 3, 4, 5, 6])
      .expect("Failed to build image");

    assert_eq!(
      image.pixels(),
      &[Pixel { r: 1, g: 2, b: 3, a: 255 }, Pixel { r: 4, g: 5, b: 6, a: 255 }]
    );
    assert_eq!(image.to_raw(), vec![1, 2, 3, 4, 5, 6]);
  }

  #[test]
  fn test_from_raw_rejects_short_buffer() {
    assert!(matches!(
      Image::from_raw(meta(2, 2, Channels::Rgba), &[0; 15]),
      Err(Error::InvalidParameter(_))
    ));
  }

  #[test]
  fn test_argb_rows() {
    let rows = vec![vec![0xff_01_02_03, 0x00_04_05_06], vec![0x80_07_08_09, 0x7f_0a_0b_0c]];
    let image = Image::from_argb_rows(meta(2, 2, Channels::Rgba), &rows).expect("Failed to build image");

    assert_eq!(image.row(1), Some(&[Pixel { r: 7, g: 8, b: 9, a: 0x80 }, Pixel { r: 10, g: 11, b: 12, a: 0x7f }][..]));
    assert_eq!(image.row(2), None);
    assert_eq!(image.to_argb_rows(), rows);
  }

  #[test]
  fn test_argb_rows_must_be_rectangular() {
    let rows = vec![vec![0; 2], vec![0; 3]];

    assert!(matches!(
      Image::from_argb_rows(meta(2, 2, Channels::Rgba), &rows),
      Err(Error::InvalidParameter(_))
    ));
  }
}
