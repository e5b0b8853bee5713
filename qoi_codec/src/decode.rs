use log::{debug, trace};

use crate::bytes;
use crate::error::Error;
use crate::image::Image;
use crate::limits::Limits;
use crate::meta::{decode_header, QOI_BYTES_END, QOI_BYTES_MAGIC, QOI_HEADER_LEN};
use crate::op::Op;
use crate::pixel::{Pixel, PixelDiff};
use crate::state::State;

/// Decodes the bytes of a QOI file into an [`Image`].
///
/// The whole file must be present: decoding checks the magic, the end marker
/// and that the stream holds exactly `width * height` pixels, and fails
/// without a partial result otherwise.
pub fn decode_image(file: &[u8]) -> Result<Image, Error> {
  decode_image_with_limits(file, &Limits::default())
}

/// Like [`decode_image`], rejecting images whose header exceeds `limits`
/// before any pixel buffer is allocated.
pub fn decode_image_with_limits(file: &[u8], limits: &Limits) -> Result<Image, Error> {
  if !file.starts_with(QOI_BYTES_MAGIC) {
    return Err(Error::MalformedHeader("file does not start with the QOI magic".to_string()));
  }

  let (header, body, end) = bytes::partition(file, QOI_HEADER_LEN, QOI_BYTES_END.len())
    .ok_or_else(|| {
      Error::TruncatedOrOversizedStream(format!(
        "file of {} bytes is too short to hold a header and end marker",
        file.len()
      ))
    })?;

  if end != QOI_BYTES_END {
    return Err(Error::TruncatedOrOversizedStream(format!(
      "file ends with {:?} instead of the end marker",
      end
    )));
  }

  let meta = decode_header(header)?;
  limits.check(meta.width, meta.height)?;

  debug!(
    "Decoding {}x{} image, {:?} channels, {:?} colorspace",
    meta.width, meta.height, meta.channels, meta.colorspace
  );
  trace!("Body is {} bytes", body.len());

  let pixels = decode_pixels(body, meta.num_pixels())?;

  Image::new(meta, pixels)
}

// Decodes the op stream between the header and the end marker, which must
// produce exactly `num_pixels` pixels.
pub(crate) fn decode_pixels(body: &[u8], num_pixels: usize) -> Result<Vec<Pixel>, Error> {
  let mut state = State::new();
  // Every op takes at least one byte, so a body can't describe more pixels
  // than 62 per byte. Don't trust the header beyond that when allocating.
  let mut pixels = Vec::with_capacity(num_pixels.min(body.len().saturating_mul(62)));
  let mut cursor = 0;

  while cursor < body.len() {
    let op = Op::read_from(body, cursor)?;
    cursor += op.byte_len();

    let (pixel, count) = decode_op(&state, op);

    if count > num_pixels - pixels.len() {
      return Err(Error::TruncatedOrOversizedStream(format!(
        "{:?} op at offset {} overruns the image's {} pixels",
        op.kind(),
        cursor - op.byte_len(),
        num_pixels
      )));
    }

    pixels.resize(pixels.len() + count, pixel);

    state.cache_insert(pixel);
    state.prev_pixel = pixel;
  }

  if pixels.len() != num_pixels {
    return Err(Error::TruncatedOrOversizedStream(format!(
      "stream holds {} pixels, expected {}",
      pixels.len(),
      num_pixels
    )));
  }

  Ok(pixels)
}

// Resolves a single op against the decoding `state`, returning the produced
// pixel and how many times it repeats.
fn decode_op(state: &State, op: Op) -> (Pixel, usize) {
  match op {
    Op::Diff(diff_r, diff_g, diff_b) => {
      (Pixel::from_diff(PixelDiff::Small(diff_r, diff_g, diff_b), &state.prev_pixel), 1)
    }
    Op::Index(index) => {
      (state.cache_get(index), 1)
    }
    Op::Luma(luma_g, luma_rg, luma_bg) => {
      (Pixel::from_diff(PixelDiff::Luma(luma_g, luma_rg, luma_bg), &state.prev_pixel), 1)
    }
    Op::Rgb(r, g, b) => {
      (Pixel { r, g, b, a: state.prev_pixel.a }, 1)
    }
    Op::Rgba(r, g, b, a) => {
      (Pixel { r, g, b, a }, 1)
    }
    Op::Run(count) => {
      (state.prev_pixel, count as usize)
    }
  }
}
