use crate::bytes;
use crate::error::Error;
use crate::meta::QOI_MAX_RUN;
use crate::pixel::{Delta, Pixel};
use crate::state::{State, QOI_CACHE_LEN};

// An enumeration of each possible QOI encoding "chunk", or Op. Field values
// are stored exactly as they appear on the wire, biases included, except for
// `Run` which holds the real run length.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
  // `QOI_OP_DIFF`, contains the red, green, and blue color difference from the
  // previous pixel with a bias of +2.
  //
  // | 7 6   5  4  3  2  1  0 |
  // |------------------------|
  // | 0 1 |  dr |  dg |  db  |
  //
  Diff(u8, u8, u8),

  // `QOI_OP_INDEX`, index into the state's pixel cache.
  //
  // | 7 6   5  4  3  2  1  0 |
  // |------------------------|
  // | 0 0 |      index       |
  //
  Index(u8),

  // `QOI_OP_LUMA`, contains the red, green, and blue luma difference from the
  // previous pixel. The green difference has a bias of +32, the red-green, and
  // blue-green difference has a bias of +8.
  //
  // | 7 6   5  4  3  2  1  0 | 7  6  5  4   3  2  1  0 |
  // |------------------------|-------------------------|
  // | 1 0 |       dg         |   dr - dg  |   db - dg  |
  //
  Luma(u8, u8, u8),

  // `QOI_OP_RGB`, contains the red, green, and blue values of a pixel.
  //
  // | 7  6  5  4  3  2  1  0 | 7..0 | 7..0 | 7..0 |
  // |------------------------|------|------|------|
  // | 1  1  1  1  1  1  1  0 |   r  |   g  |   b  |
  //
  Rgb(u8, u8, u8),

  // `QOI_OP_RGBA`, contains the red, green, blue, and alpha values of a pixel.
  //
  // | 7  6  5  4  3  2  1  0 | 7..0 | 7..0 | 7..0 | 7..0 |
  // |------------------------|------|------|------|------|
  // | 1  1  1  1  1  1  1  1 |   r  |   g  |   b  |   a  |
  //
  Rgba(u8, u8, u8, u8),

  // `QOI_OP_RUN`, contains the length of the run, stored with a bias of -1.
  //
  // | 7 6   5  4  3  2  1  0 |
  // |------------------------|
  // | 1 1 |      run         |
  Run(u8),
}

// The opcode of an `Op` without its payload.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OpKind {
  Diff,
  Index,
  Luma,
  Rgb,
  Rgba,
  Run,
}

// Order in which the encoder tries each op for a pixel that doesn't continue a
// run. The first op able to represent the pixel is emitted.
pub const ENCODE_PRIORITY: [OpKind; 5] = [
  OpKind::Index,
  OpKind::Diff,
  OpKind::Luma,
  OpKind::Rgb,
  OpKind::Rgba,
];

impl OpKind {
  // Builds this kind of op for `pixel` when it can represent it given the
  // encoder's `state` and the pixel's `delta` from the previous pixel.
  pub fn try_encode(self, state: &State, pixel: &Pixel, delta: &Delta) -> Result<Option<Op>, Error> {
    match self {
      OpKind::Index => state.cache_match(pixel).map(Op::index).transpose(),
      OpKind::Diff => delta.small().map(|(r, g, b)| Op::diff(r, g, b)).transpose(),
      OpKind::Luma => delta.luma().map(|(g, rg, bg)| Op::luma(g, rg, bg)).transpose(),
      OpKind::Rgb => Ok(delta.same_alpha.then_some(Op::Rgb(pixel.r, pixel.g, pixel.b))),
      OpKind::Rgba => Ok(Some(Op::Rgba(pixel.r, pixel.g, pixel.b, pixel.a))),
      OpKind::Run => Ok(None),
    }
  }
}

impl Op {
  const MASK_DIFF: u8 = 0x03;
  const MASK_LUMA_1: u8 = 0x3f;
  const MASK_LUMA_2: u8 = 0x0f;
  const MASK_PAYLOAD: u8 = 0x3f;
  const MASK_TAG: u8 = 0xc0;

  const TAG_DIFF: u8 = 0x40;
  const TAG_INDEX: u8 = 0x00;
  const TAG_LUMA: u8 = 0x80;
  const TAG_RGB: u8 = 0xfe;
  const TAG_RGBA: u8 = 0xff;
  const TAG_RUN: u8 = 0xc0;

  // Builds a `QOI_OP_DIFF` from signed channel deltas, each in [-2, 1].
  pub fn diff(diff_r: i8, diff_g: i8, diff_b: i8) -> Result<Op, Error> {
    let bias = |d: i8| -> Result<u8, Error> {
      if !(-2..=1).contains(&d) {
        return Err(Error::EncodingPrecondition(format!("diff delta {} outside [-2, 1]", d)));
      }

      Ok((d + 2) as u8)
    };

    Ok(Op::Diff(bias(diff_r)?, bias(diff_g)?, bias(diff_b)?))
  }

  // Builds a `QOI_OP_LUMA` from the green delta in [-32, 31] and the
  // red-green and blue-green deltas, each in [-8, 7].
  pub fn luma(diff_g: i8, diff_rg: i8, diff_bg: i8) -> Result<Op, Error> {
    if !(-32..=31).contains(&diff_g) {
      return Err(Error::EncodingPrecondition(format!(
        "luma green delta {} outside [-32, 31]",
        diff_g
      )));
    }

    if !(-8..=7).contains(&diff_rg) || !(-8..=7).contains(&diff_bg) {
      return Err(Error::EncodingPrecondition(format!(
        "luma cross deltas ({}, {}) outside [-8, 7]",
        diff_rg, diff_bg
      )));
    }

    Ok(Op::Luma((diff_g + 32) as u8, (diff_rg + 8) as u8, (diff_bg + 8) as u8))
  }

  // Builds a `QOI_OP_INDEX` for a cache slot in [0, 63].
  pub fn index(index: u8) -> Result<Op, Error> {
    if index as usize >= QOI_CACHE_LEN {
      return Err(Error::EncodingPrecondition(format!("cache index {} outside [0, 63]", index)));
    }

    Ok(Op::Index(index))
  }

  // Builds a `QOI_OP_RUN` for a run length in [1, 62].
  pub fn run(run_count: u8) -> Result<Op, Error> {
    if !(1..=QOI_MAX_RUN).contains(&run_count) {
      return Err(Error::EncodingPrecondition(format!(
        "run length {} outside [1, {}]",
        run_count, QOI_MAX_RUN
      )));
    }

    Ok(Op::Run(run_count))
  }

  pub fn kind(&self) -> OpKind {
    match self {
      Op::Diff(..) => OpKind::Diff,
      Op::Index(..) => OpKind::Index,
      Op::Luma(..) => OpKind::Luma,
      Op::Rgb(..) => OpKind::Rgb,
      Op::Rgba(..) => OpKind::Rgba,
      Op::Run(..) => OpKind::Run,
    }
  }

  // Number of bytes the op occupies in the stream.
  pub fn byte_len(&self) -> usize {
    match self {
      Op::Diff(..) | Op::Index(..) | Op::Run(..) => 1,
      Op::Luma(..) => 2,
      Op::Rgb(..) => 4,
      Op::Rgba(..) => 5,
    }
  }

  // Encodes the `Op` and appends its bytes to `out`.
  pub fn write_to(self, out: &mut Vec<u8>) {
    match self {
      Op::Diff(diff_r, diff_g, diff_b) => {
        out.push(Op::TAG_DIFF | (diff_r << 4) | (diff_g << 2) | diff_b);
      }
      Op::Index(index) => {
        out.push(Op::TAG_INDEX | index);
      }
      Op::Luma(luma_g, luma_rg, luma_bg) => {
        out.extend_from_slice(&[Op::TAG_LUMA | luma_g, (luma_rg << 4) | luma_bg]);
      }
      Op::Rgb(r, g, b) => {
        out.extend_from_slice(&[Op::TAG_RGB, r, g, b]);
      }
      Op::Rgba(r, g, b, a) => {
        out.extend_from_slice(&[Op::TAG_RGBA, r, g, b, a]);
      }
      Op::Run(run_count) => {
        out.push(Op::TAG_RUN | (run_count - 1));
      }
    }
  }

  // Attempts to decode the `Op` starting at `offset` in `body`.
  pub fn read_from(body: &[u8], offset: usize) -> Result<Self, Error> {
    let truncated = |len: usize| {
      Error::TruncatedOrOversizedStream(format!(
        "chunk at offset {} needs {} bytes, only {} remain",
        offset,
        len,
        body.len().saturating_sub(offset)
      ))
    };

    let byte = *body.get(offset).ok_or_else(|| truncated(1))?;

    if byte == Op::TAG_RGB {
      let chunk = bytes::extract(body, offset, 4).ok_or_else(|| truncated(4))?;
      return Ok(Op::Rgb(chunk[1], chunk[2], chunk[3]));
    }

    if byte == Op::TAG_RGBA {
      let chunk = bytes::extract(body, offset, 5).ok_or_else(|| truncated(5))?;
      return Ok(Op::Rgba(chunk[1], chunk[2], chunk[3], chunk[4]));
    }

    let op = match byte & Op::MASK_TAG {
      Op::TAG_INDEX => Op::Index(byte & Op::MASK_PAYLOAD),
      Op::TAG_DIFF => Op::Diff(
        byte >> 4 & Op::MASK_DIFF,
        byte >> 2 & Op::MASK_DIFF,
        byte & Op::MASK_DIFF,
      ),
      Op::TAG_LUMA => {
        let chunk = bytes::extract(body, offset, 2).ok_or_else(|| truncated(2))?;

        Op::Luma(
          byte & Op::MASK_LUMA_1,
          chunk[1] >> 4 & Op::MASK_LUMA_2,
          chunk[1] & Op::MASK_LUMA_2,
        )
      }
      // Op::TAG_RUN, the last 2 bit pattern. Payloads 62 and 63 are taken by
      // the 8 bit RGB and RGBA tags above, capping runs at 62.
      _ => Op::Run((byte & Op::MASK_PAYLOAD) + 1),
    };

    Ok(op)
  }
}
