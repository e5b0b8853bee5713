//! This crate implements a lossless encoder and decoder for the
//! [QOI image format](https://qoiformat.org).
//!
//! The two primary exports are the `encode_image` and `decode_image`
//! functions. Both work on whole in-memory buffers: `encode_image` turns an
//! [`Image`] into the complete bytes of a QOI file, and `decode_image` turns
//! those bytes back into an identical `Image`.
//!
//! To keep this crate simple, it does not decode other image formats or touch
//! the filesystem. To encode an image, it will first need to be decoded using
//! another method. Its pixels can then be handed over as interleaved RGB/RGBA
//! bytes ([`Image::from_raw`]) or as rows of packed ARGB values
//! ([`Image::from_argb_rows`]).
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never
//! installs a logger of its own.
//!
//! # In-memory encode example
//!
//! ```rust
//! use qoi_codec::{encode_image, Channels, Colorspace, Image, ImageMeta};
//!
//! // A 1x1 representation of an image's pixel data made up of an opaque black pixel.
//! let image_source = vec![0, 0, 0, 255];
//!
//! // Metadata describing the image to be encoded.
//! let image_meta = ImageMeta {
//!   width: 1,
//!   height: 1,
//!   channels: Channels::Rgba,
//!   colorspace: Colorspace::Srgb,
//! };
//!
//! let image = Image::from_raw(image_meta, &image_source).expect("Pixel data matches the metadata");
//!
//! match encode_image(&image) {
//!   Ok(image_destination) => {
//!     // Header, a single run op and the end marker.
//!     assert_eq!(image_destination.len(), 14 + 1 + 8);
//!   }
//!   Err(e) => {
//!     // See `error.rs` for all possible errors.
//!     panic!("{}", e);
//!   }
//! }
//! ```
//!
//! # Decode example
//!
//! ```rust
//! use qoi_codec::{decode_image_with_limits, encode_raw, Channels, Colorspace, ImageMeta, Limits};
//!
//! let meta = ImageMeta { width: 2, height: 1, channels: Channels::Rgb, colorspace: Colorspace::Linear };
//! let encoded = encode_raw(&[10, 20, 30, 11, 21, 31], &meta).expect("Failed to encode image");
//!
//! // Refuse anything bigger than a 4K frame before allocating for it.
//! let limits = Limits { max_pixels: Some(3840 * 2160), ..Limits::default() };
//!
//! match decode_image_with_limits(&encoded, &limits) {
//!   Ok(image) => {
//!     assert_eq!(image.meta(), &meta);
//!     assert_eq!(image.to_raw(), vec![10, 20, 30, 11, 21, 31]);
//!   }
//!   Err(e) => {
//!     panic!("{}", e);
//!   }
//! }
//! ```
//!

pub use crate::decode::{decode_image, decode_image_with_limits};
pub use crate::encode::{encode_image, encode_raw};
pub use crate::error::Error;
pub use crate::image::Image;
pub use crate::limits::Limits;
pub use crate::meta::{decode_header, encode_header, Channels, Colorspace, ImageMeta};
pub use crate::pixel::Pixel;

mod bytes;
mod decode;
mod encode;
mod error;
mod image;
mod limits;
mod meta;
mod op;
mod pixel;
mod state;
