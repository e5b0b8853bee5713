use thiserror::Error as ThisError;

/// An enumeration of all error values this crate may produce.
///
/// None of these are recoverable by the codec itself: the call that detected
/// the condition is aborted and no partial image or partial stream is
/// returned.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
  /// The image handed to the encoder has a zero dimension, an unsupported
  /// channel count or colorspace, or a pixel buffer whose size doesn't match
  /// its dimensions.
  #[error("invalid image parameter: {0}")]
  InvalidParameter(String),

  /// Failed to decode a QOI image with a missing or malformed header, such as
  /// a bad magic value or an out of range channel count or colorspace.
  #[error("malformed QOI header: {0}")]
  MalformedHeader(String),

  /// The encoded stream ended in the middle of a chunk, lacks its end marker,
  /// or decodes to a pixel count different from the header's dimensions.
  #[error("truncated or oversized QOI stream: {0}")]
  TruncatedOrOversizedStream(String),

  /// An op was constructed from a value outside of its encodable range. This
  /// points at a bug in op selection rather than at bad input.
  #[error("encoding precondition violated: {0}")]
  EncodingPrecondition(String),

  /// The image's dimensions exceed the configured [`Limits`](crate::Limits).
  #[error("limit exceeded: {0}")]
  LimitExceeded(String),
}
