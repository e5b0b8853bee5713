use std::ops::RangeInclusive;

const DIFF_RANGE: RangeInclusive<i8> = -2..=1;
const LUMA_G_RANGE: RangeInclusive<i8> = -32..=31;
const LUMA_RB_RANGE: RangeInclusive<i16> = -8..=7;

/// A single RGBA pixel. Pixels of 3 channel images carry an alpha of 255.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Pixel {
  /// Red channel value.
  pub r: u8,
  /// Green channel value.
  pub g: u8,
  /// Blue channel value.
  pub b: u8,
  /// Alpha channel value.
  pub a: u8,
}

/// The pixel every encode and decode starts out with as the "previous" pixel.
impl Default for Pixel {
  fn default() -> Self {
    Self { r: 0, g: 0, b: 0, a: 255 }
  }
}

impl From<[u8; 4]> for Pixel {
  fn from([r, g, b, a]: [u8; 4]) -> Self {
    Self { r, g, b, a }
  }
}

impl From<Pixel> for [u8; 4] {
  fn from(pixel: Pixel) -> Self {
    [pixel.r, pixel.g, pixel.b, pixel.a]
  }
}

// An op's decoded, still biased, difference fields.
pub enum PixelDiff {
  // A `QOI_OP_DIFF` diff, each channel biased by +2.
  Small(u8, u8, u8),
  // A `QOI_OP_LUMA` diff. The green difference is biased by +32, the
  // red-green and blue-green differences by +8.
  Luma(u8, u8, u8),
}

// The signed per-channel difference between a pixel and the one before it,
// with 8 bit wraparound.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Delta {
  pub r: i8,
  pub g: i8,
  pub b: i8,
  pub same_alpha: bool,
}

impl Delta {
  // The red, green and blue deltas when they all fit a `QOI_OP_DIFF`.
  pub fn small(&self) -> Option<(i8, i8, i8)> {
    let fits = [self.r, self.g, self.b].iter().all(|d| DIFF_RANGE.contains(d));

    (self.same_alpha && fits).then_some((self.r, self.g, self.b))
  }

  // The green, red-green and blue-green deltas when they fit a
  // `QOI_OP_LUMA`.
  pub fn luma(&self) -> Option<(i8, i8, i8)> {
    if !self.same_alpha || !LUMA_G_RANGE.contains(&self.g) {
      return None;
    }

    let diff_rg = self.r as i16 - self.g as i16;
    let diff_bg = self.b as i16 - self.g as i16;

    if LUMA_RB_RANGE.contains(&diff_rg) && LUMA_RB_RANGE.contains(&diff_bg) {
      return Some((self.g, diff_rg as i8, diff_bg as i8));
    }

    None
  }
}

impl Pixel {
  /// Creates a pixel from a packed `0xAARRGGBB` value.
  pub fn from_argb(argb: u32) -> Self {
    let [a, r, g, b] = argb.to_be_bytes();
    Self { r, g, b, a }
  }

  /// Packs the pixel into a `0xAARRGGBB` value.
  pub fn to_argb(self) -> u32 {
    u32::from_be_bytes([self.a, self.r, self.g, self.b])
  }

  // Computes the wrapping per-channel difference `self - prev`.
  pub(crate) fn delta(&self, prev: &Pixel) -> Delta {
    Delta {
      r: self.r.wrapping_sub(prev.r) as i8,
      g: self.g.wrapping_sub(prev.g) as i8,
      b: self.b.wrapping_sub(prev.b) as i8,
      same_alpha: self.a == prev.a,
    }
  }

  // Recreates a `Pixel` from the provided `diff` and `diff_pixel`.
  pub(crate) fn from_diff(diff: PixelDiff, diff_pixel: &Pixel) -> Self {
    match diff {
      PixelDiff::Small(diff_r, diff_g, diff_b) => Self {
        r: diff_pixel.r.wrapping_add(diff_r).wrapping_sub(2),
        g: diff_pixel.g.wrapping_add(diff_g).wrapping_sub(2),
        b: diff_pixel.b.wrapping_add(diff_b).wrapping_sub(2),
        a: diff_pixel.a,
      },
      PixelDiff::Luma(luma_g, luma_rg, luma_bg) => {
        let diff_g = luma_g.wrapping_sub(32);
        let diff_r = luma_rg.wrapping_sub(8).wrapping_add(diff_g);
        let diff_b = luma_bg.wrapping_sub(8).wrapping_add(diff_g);

        Self {
          r: diff_pixel.r.wrapping_add(diff_r),
          g: diff_pixel.g.wrapping_add(diff_g),
          b: diff_pixel.b.wrapping_add(diff_b),
          a: diff_pixel.a,
        }
      }
    }
  }

  // QOI color hash function, not implemented via the `Hash` trait to keep
  // things simple. Reduce modulo 64 for a cache slot.
  pub fn qoi_hash(&self) -> usize {
    let r = self.r as usize;
    let g = self.g as usize;
    let b = self.b as usize;
    let a = self.a as usize;

    r * 3 + g * 5 + b * 7 + a * 11
  }
}
