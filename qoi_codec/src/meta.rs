use crate::bytes;
use crate::error::Error;

pub const QOI_BYTES_END: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];
pub const QOI_BYTES_MAGIC: &[u8; 4] = b"qoif";
pub const QOI_MAX_RUN: u8 = 62;
pub const QOI_HEADER_LEN: usize = 14;

/// Metadata describing an Image, as stored in a QOI header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageMeta {
  /// The number of color channels the image's pixels contain, see
  /// [Channels]. Color channels are assumed to not be pre-multiplied with the
  /// alpha channel ("un-premultiplied alpha").
  pub channels: Channels,
  /// The image's colorspace, see [Colorspace].
  pub colorspace: Colorspace,
  /// The image's height.
  pub height: u32,
  /// The image's width.
  pub width: u32,
}

impl ImageMeta {
  /// Returns the total number of pixels that make up the image.
  pub fn num_pixels(&self) -> usize {
    (self.width as usize).saturating_mul(self.height as usize)
  }
}

/// The number of channels an image's pixel data carries. Purely informative
/// to the codec: every pixel is encoded as RGBA either way.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Channels {
  Rgb = 3,
  Rgba = 4,
}

impl Channels {
  /// Number of bytes a single pixel occupies in raw interleaved pixel data.
  pub fn bytes_per_pixel(self) -> usize {
    self as usize
  }
}

/// `3` maps to `Channels::Rgb` and `4` maps to `Channels::Rgba`. All other
/// `u8` values are invalid.
impl TryFrom<u8> for Channels {
  type Error = Error;

  fn try_from(byte: u8) -> Result<Self, Self::Error> {
    match byte {
      3 => Ok(Channels::Rgb),
      4 => Ok(Channels::Rgba),
      _ => Err(Error::InvalidParameter(format!(
        "invalid channel count {}, expected 3 for RGB or 4 for RGBA",
        byte
      ))),
    }
  }
}

/// How an image's color channels are to be interpreted. The codec stores the
/// tag but never transforms pixels according to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Colorspace {
  /// sRGB color channels with a linear alpha channel.
  Srgb = 0,
  /// All channels linear.
  Linear = 1,
}

/// `0` maps to `Colorspace::Srgb`, and `1` maps to `Colorspace::Linear`. All
/// other `u8` values are invalid.
impl TryFrom<u8> for Colorspace {
  type Error = Error;

  fn try_from(byte: u8) -> Result<Self, Self::Error> {
    match byte {
      0 => Ok(Colorspace::Srgb),
      1 => Ok(Colorspace::Linear),
      _ => Err(Error::InvalidParameter(format!(
        "invalid colorspace {}, expected 0 for sRGB or 1 for linear",
        byte
      ))),
    }
  }
}

/// Encodes `meta` into the 14 byte QOI header: magic, big-endian width,
/// big-endian height, channel count and colorspace.
pub fn encode_header(meta: &ImageMeta) -> Result<[u8; QOI_HEADER_LEN], Error> {
  if meta.width == 0 || meta.height == 0 {
    return Err(Error::InvalidParameter(format!(
      "image dimensions {}x{} must both be non-zero",
      meta.width, meta.height
    )));
  }

  let mut header = [0; QOI_HEADER_LEN];
  header[..4].copy_from_slice(QOI_BYTES_MAGIC);
  header[4..8].copy_from_slice(&meta.width.to_be_bytes());
  header[8..12].copy_from_slice(&meta.height.to_be_bytes());
  header[12] = meta.channels as u8;
  header[13] = meta.colorspace as u8;

  Ok(header)
}

/// Decodes a 14 byte QOI header into the image's `ImageMeta`.
pub fn decode_header(header: &[u8]) -> Result<ImageMeta, Error> {
  if header.len() != QOI_HEADER_LEN {
    return Err(Error::MalformedHeader(format!(
      "expected {} header bytes, found {}",
      QOI_HEADER_LEN,
      header.len()
    )));
  }

  if &header[..4] != QOI_BYTES_MAGIC {
    return Err(Error::MalformedHeader(format!(
      "invalid magic {:?}, expected {:?}",
      &header[..4],
      QOI_BYTES_MAGIC
    )));
  }

  let width = bytes::read_u32_be(header, 4);
  let height = bytes::read_u32_be(header, 8);

  let (width, height) = match (width, height) {
    (Some(width), Some(height)) if width > 0 && height > 0 => (width, height),
    _ => {
      return Err(Error::MalformedHeader(format!(
        "invalid image dimensions {:?}x{:?}",
        width, height
      )));
    }
  };

  let channels = Channels::try_from(header[12])
    .map_err(|_| Error::MalformedHeader(format!("invalid channel count {}", header[12])))?;
  let colorspace = Colorspace::try_from(header[13])
    .map_err(|_| Error::MalformedHeader(format!("invalid colorspace {}", header[13])))?;

  Ok(ImageMeta { channels, colorspace, height, width })
}
