use crate::error::Error;

/// Resource limits applied while decoding, checked against the header before
/// any pixel buffer is allocated.
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Limits {
  pub max_width: Option<u64>,
  pub max_height: Option<u64>,
  /// Maximum pixel count (width * height).
  pub max_pixels: Option<u64>,
}

impl Limits {
  /// Check dimensions against limits. Returns Ok(()) or LimitExceeded error.
  pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), Error> {
    if let Some(max_w) = self.max_width {
      if u64::from(width) > max_w {
        return Err(Error::LimitExceeded(format!("width {width} exceeds limit {max_w}")));
      }
    }

    if let Some(max_h) = self.max_height {
      if u64::from(height) > max_h {
        return Err(Error::LimitExceeded(format!("height {height} exceeds limit {max_h}")));
      }
    }

    if let Some(max_px) = self.max_pixels {
      let pixels = u64::from(width) * u64::from(height);

      if pixels > max_px {
        return Err(Error::LimitExceeded(format!("pixel count {pixels} exceeds limit {max_px}")));
      }
    }

    Ok(())
  }
}
