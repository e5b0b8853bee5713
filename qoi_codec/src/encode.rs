use log::{debug, trace};

use crate::error::Error;
use crate::image::Image;
use crate::meta::{encode_header, ImageMeta, QOI_BYTES_END, QOI_HEADER_LEN, QOI_MAX_RUN};
use crate::op::{Op, ENCODE_PRIORITY};
use crate::pixel::Pixel;
use crate::state::State;

/// Encodes an image into the bytes of a QOI file: the header, the encoded
/// pixel stream and the end marker.
pub fn encode_image(image: &Image) -> Result<Vec<u8>, Error> {
  let meta = image.meta();
  let header = encode_header(meta)?;

  debug!(
    "Encoding {}x{} image, {:?} channels, {:?} colorspace",
    meta.width, meta.height, meta.channels, meta.colorspace
  );

  let body = encode_pixels(image.pixels())?;

  let mut file = Vec::with_capacity(QOI_HEADER_LEN + body.len() + QOI_BYTES_END.len());
  file.extend_from_slice(&header);
  file.extend_from_slice(&body);
  file.extend_from_slice(&QOI_BYTES_END);

  trace!(
    "Encoded {} pixels into {} bytes ({} byte body)",
    image.pixels().len(),
    file.len(),
    body.len()
  );

  Ok(file)
}

/// Encodes interleaved RGB or RGBA pixel data, laid out as described by
/// `meta`, into the bytes of a QOI file.
pub fn encode_raw(raw: &[u8], meta: &ImageMeta) -> Result<Vec<u8>, Error> {
  encode_image(&Image::from_raw(*meta, raw)?)
}

// Encodes a run of pixels into the op stream that sits between the header and
// the end marker.
pub(crate) fn encode_pixels(pixels: &[Pixel]) -> Result<Vec<u8>, Error> {
  let mut state = State::new();
  let mut body = Vec::with_capacity(pixels.len());

  for &pixel in pixels {
    encode_pixel(&mut state, pixel, &mut body)?;
  }

  // The last run ends with the stream, whatever its length.
  flush_run(&mut state, &mut body)?;

  Ok(body)
}

// Attempts to encode and write the provided pixel using the QOI OP encoding
// scheme and provided `state`.
pub(crate) fn encode_pixel(state: &mut State, pixel: Pixel, out: &mut Vec<u8>) -> Result<(), Error> {
  if pixel == state.prev_pixel {
    state.run_count += 1;

    if state.run_count == QOI_MAX_RUN {
      flush_run(state, out)?;
    }

    return Ok(());
  }

  flush_run(state, out)?;

  select_op(state, &pixel)?.write_to(out);

  state.cache_insert(pixel);
  state.prev_pixel = pixel;

  Ok(())
}

// Writes the pending run, if there is one, and resets the run counter.
fn flush_run(state: &mut State, out: &mut Vec<u8>) -> Result<(), Error> {
  if state.run_count > 0 {
    Op::run(state.run_count)?.write_to(out);
    state.run_count = 0;
  }

  Ok(())
}

// Picks the first op in priority order able to represent `pixel`.
fn select_op(state: &State, pixel: &Pixel) -> Result<Op, Error> {
  let delta = pixel.delta(&state.prev_pixel);

  for kind in ENCODE_PRIORITY {
    if let Some(op) = kind.try_encode(state, pixel, &delta)? {
      return Ok(op);
    }
  }

  Err(Error::EncodingPrecondition(format!("no op can represent {:?}", pixel)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::meta::{Channels, Colorspace};

  fn encode_one(state: &mut State, pixel: Pixel) -> Vec<u8> {
    let mut dest = Vec::new();
    encode_pixel(state, pixel, &mut dest).expect("Failed to encode pixel");
    dest
  }

  #[test]
  fn test_encoding_rgb_op() {
    let mut state = State::new();
    let pixel = Pixel { r: 101, g: 102, b: 103, a: 255 };

    assert_eq!(
      encode_one(&mut state, pixel),
      vec![
        // Op::Rgb(101, 102, 103)
        0xfe, 101, 102, 103,
      ]
    );
    assert_eq!(state.prev_pixel, pixel);
    assert_eq!(state.cache_match(&pixel), Some(State::cache_index(&pixel)));
  }

  #[test]
  fn test_encoding_rgba_op() {
    let mut state = State::new();
    let pixel = Pixel { r: 101, g: 102, b: 103, a: 104 };

    assert_eq!(
      encode_one(&mut state, Pixel { r: 1, g: 2, b: 3, a: 4 }),
      vec![
        // Op::Rgba(1, 2, 3, 4)
        0xff, 1, 2, 3, 4,
      ]
    );

    assert_eq!(encode_one(&mut state, pixel), vec![0xff, 101, 102, 103, 104]);
  }

  #[test]
  fn test_encoding_run_op() {
    let mut dest = Vec::new();
    let mut state = State::new();
    let mut pixel = Pixel { r: 101, g: 102, b: 103, a: 104 };

    state.prev_pixel = pixel;
    encode_pixel(&mut state, pixel, &mut dest).expect("Failed to encode pixel");
    assert_eq!(dest.len(), 0);

    pixel.a = 0;
    encode_pixel(&mut state, pixel, &mut dest).expect("Failed to encode pixel");
    assert_eq!(dest[0], 0xc0);
  }

  #[test]
  fn test_encoding_trailing_run_op() {
    let pixel = Pixel { r: 101, g: 102, b: 103, a: 255 };
    let body = encode_pixels(&[pixel, pixel, pixel]).expect("Failed to encode pixels");

    // Op::Rgb(101, 102, 103), then Op::Run(2) flushed by the end of the stream.
    assert_eq!(body, vec![0xfe, 101, 102, 103, 0xc0 | 1]);
  }

  #[test]
  fn test_encoding_start_pixel_run() {
    let body = encode_pixels(&[Pixel::default(), Pixel::default()]).expect("Failed to encode pixels");

    assert_eq!(body, vec![0xc0 | 1]); // Op::Run(2)
  }

  #[test]
  fn test_encoding_max_run_ops() {
    let mut dest = Vec::new();
    let mut state = State::new();
    let pixel = Pixel { r: 101, g: 102, b: 103, a: 104 };

    state.prev_pixel = pixel;
    state.run_count = 61;
    encode_pixel(&mut state, pixel, &mut dest).expect("Failed to encode pixel");
    assert_eq!(dest, vec![0xc0 | 61]); // Op::Run(62)
    assert_eq!(state.run_count, 0);

    encode_pixel(&mut state, pixel, &mut dest).expect("Failed to encode pixel");
    assert_eq!(dest.len(), 1);
  }

  #[test]
  fn test_run_of_62_then_new_pixel_is_one_run_op() {
    let mut pixels = vec![Pixel::default(); 62];
    pixels.push(Pixel { r: 1, g: 1, b: 1, a: 255 });

    let body = encode_pixels(&pixels).expect("Failed to encode pixels");

    // Op::Run(62), then Op::Diff(3, 3, 3).
    assert_eq!(body, vec![0xc0 | 61, 0x7f]);
  }

  #[test]
  fn test_run_of_63_splits_into_two_run_ops() {
    let body = encode_pixels(&vec![Pixel::default(); 63]).expect("Failed to encode pixels");

    assert_eq!(body, vec![0xc0 | 61, 0xc0]); // Op::Run(62), Op::Run(1)
  }

  #[test]
  fn test_run_of_exactly_62_at_end_of_stream() {
    let body = encode_pixels(&vec![Pixel::default(); 62]).expect("Failed to encode pixels");

    assert_eq!(body, vec![0xc0 | 61]);
  }

  #[test]
  fn test_encoding_index_op() {
    let mut state = State::new();
    let pixel = Pixel { r: 101, g: 102, b: 103, a: 104 };

    state.cache_insert(pixel);
    assert_eq!(encode_one(&mut state, pixel), vec![54]); // Op::Index(pixel.qoi_hash() % 64 = 54)
  }

  #[test]
  fn test_index_beats_diff() {
    let mut state = State::new();
    let pixel_a = Pixel { r: 100, g: 100, b: 100, a: 255 };
    let pixel_b = Pixel { r: 101, g: 101, b: 101, a: 255 };

    encode_one(&mut state, pixel_b);
    encode_one(&mut state, pixel_a);

    // `pixel_b` is both cached and a small diff away from `pixel_a`.
    assert_eq!(encode_one(&mut state, pixel_b), vec![State::cache_index(&pixel_b)]);
  }

  #[test]
  fn test_encoding_diff_op() {
    let mut state = State::new();
    let pixel_a = Pixel { r: 100, g: 100, b: 100, a: 255 };
    let pixel_b = Pixel { r: 101, g: 101, b: 101, a: 255 };
    let pixel_c = Pixel { r: 99, g: 99, b: 99, a: 255 };

    state.prev_pixel = pixel_a;
    // (101 - 100) + 2 = 3 = Op::Diff(3, 3, 3)
    assert_eq!(encode_one(&mut state, pixel_b), vec![0x40 | 3 << 4 | 3 << 2 | 3]);

    // (99 - 101) + 2 = 0 = Op::Diff(0, 0, 0)
    assert_eq!(encode_one(&mut state, pixel_c), vec![0x40]);
  }

  #[test]
  fn test_encoding_diff_op_across_wraparound() {
    let mut state = State::new();

    state.prev_pixel = Pixel { r: 255, g: 0, b: 1, a: 255 };
    // +1, -1, -1 wrapped = Op::Diff(3, 1, 1)
    assert_eq!(
      encode_one(&mut state, Pixel { r: 0, g: 255, b: 0, a: 255 }),
      vec![0x40 | 3 << 4 | 1 << 2 | 1]
    );
  }

  #[test]
  fn test_encoding_luma_op() {
    let mut state = State::new();
    let pixel_a = Pixel { r: 100, g: 100, b: 100, a: 255 };
    let pixel_b = Pixel { r: 100, g: 108, b: 100, a: 255 };
    let pixel_c = Pixel { r: 99, g: 100, b: 99, a: 255 };

    state.prev_pixel = pixel_a;
    assert_eq!(encode_one(&mut state, pixel_b), vec![0x80 | 40, 0]); // Op::Luma(40, 0, 0)

    assert_eq!(encode_one(&mut state, pixel_c), vec![0x80 | 24, 15 << 4 | 15]); // Op::Luma(24, 15, 15)
  }

  #[test]
  fn test_deltas_past_luma_range_fall_back_to_rgb() {
    let mut state = State::new();

    state.prev_pixel = Pixel { r: 100, g: 100, b: 100, a: 255 };
    // Green delta of 32 is one past the luma range.
    assert_eq!(
      encode_one(&mut state, Pixel { r: 132, g: 132, b: 132, a: 255 }),
      vec![0xfe, 132, 132, 132]
    );

    // Green fits, red-green cross delta of 8 doesn't.
    assert_eq!(
      encode_one(&mut state, Pixel { r: 142, g: 134, b: 134, a: 255 }),
      vec![0xfe, 142, 134, 134]
    );
  }

  #[test]
  fn test_alpha_change_forces_rgba() {
    let mut state = State::new();

    state.prev_pixel = Pixel { r: 100, g: 100, b: 100, a: 255 };
    assert_eq!(
      encode_one(&mut state, Pixel { r: 100, g: 100, b: 101, a: 254 }),
      vec![0xff, 100, 100, 101, 254]
    );
  }

  #[test]
  fn test_encoding_single_pixel_image() {
    let meta = ImageMeta { width: 1, height: 1, channels: Channels::Rgba, colorspace: Colorspace::Srgb };
    let image = Image::new(meta, vec![Pixel { r: 10, g: 20, b: 30, a: 255 }]).expect("Failed to build image");
    let file = encode_image(&image).expect("Failed to encode image");

    let mut expected = vec![b'q', b'o', b'i', b'f', 0, 0, 0, 1, 0, 0, 0, 1, 4, 0];
    expected.extend_from_slice(&[0xfe, 10, 20, 30]);
    expected.extend_from_slice(&QOI_BYTES_END);

    assert_eq!(file, expected);
  }

  #[test]
  fn test_encoding_raw_with_bad_length() {
    let meta = ImageMeta { width: 999, height: 1, channels: Channels::Rgba, colorspace: Colorspace::Srgb };

    assert!(matches!(encode_raw(&[101, 102, 103], &meta), Err(Error::InvalidParameter(_))));
  }
}
