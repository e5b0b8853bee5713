//! A [WebAssembly](https://developer.mozilla.org/en-US/docs/WebAssembly)
//! wrapper of the `qoi_codec` crate. This makes it possible to use the codec
//! on any host system that supports WebAssembly such as a web browser or on
//! systems that have implemented [WASI](https://wasi.dev/).
//!
//! Rich data types can't be passed through the WASM FFI boundary, so the host
//! copies image data in and out of the instance's memory by hand. Every buffer
//! handed out by the instance, or allocated through `qoi_malloc`, must be
//! released exactly once with `qoi_dealloc` and the same size.
//!
//! Errors are reported as numeric codes:
//!
//! | Code | Error                        |
//! |------|------------------------------|
//! | 1    | `InvalidParameter`           |
//! | 2    | `MalformedHeader`            |
//! | 3    | `TruncatedOrOversizedStream` |
//! | 4    | `EncodingPrecondition`       |
//! | 5    | `LimitExceeded`              |
//!
//! # JavaScript WebAssembly decode example
//!
//! ```js
//! let wasm = await WebAssembly.instantiateStreaming(fetch('./path-to-wasm.wasm'), {
//!   // "Extern" functions that must be imported into the WASM instance.
//!   env: {
//!     // Called once a QOI file has been decoded into interleaved RGB or RGBA
//!     // bytes, depending on `channels`.
//!     on_decode_complete: (pointer, width, height, channels, colorspace) => {
//!       let size = width * height * channels;
//!       let decodedImage = wasm.instance.exports.memory.buffer.slice(pointer, pointer + size);
//!
//!       wasm.instance.exports.qoi_dealloc(pointer, size);
//!     },
//!
//!     on_decode_error: (code) => {
//!       console.error(code);
//!     },
//!
//!     // Ignore these for this example.
//!     on_encode_complete: () => {},
//!     on_encode_error: () => {},
//!   },
//! });
//!
//! // An imaginary QOI file.
//! let encodedImage = new Uint8Array(..);
//!
//! // Copy the file into the WASM instance's memory.
//! let size = encodedImage.byteLength;
//! let pointer = wasm.instance.exports.qoi_malloc(size);
//! new Uint8Array(wasm.instance.exports.memory.buffer, pointer, size).set(encodedImage);
//!
//! wasm.instance.exports.qoi_image_decode(pointer, size);
//!
//! // The input buffer is still owned by the host.
//! wasm.instance.exports.qoi_dealloc(pointer, size);
//! ```
//!
//! # JavaScript WebAssembly encode example
//!
//! ```js
//! let wasm = await WebAssembly.instantiateStreaming(fetch('./path-to-wasm.wasm'), {
//!   env: {
//!     // Called with the complete bytes of the QOI file.
//!     on_encode_complete: (pointer, size) => {
//!       let encodedImage = wasm.instance.exports.memory.buffer.slice(pointer, pointer + size);
//!
//!       wasm.instance.exports.qoi_dealloc(pointer, size);
//!     },
//!
//!     on_encode_error: (code) => {
//!       console.error(code);
//!     },
//!
//!     // Ignore these for this example.
//!     on_decode_complete: () => {},
//!     on_decode_error: () => {},
//!   },
//! });
//!
//! // Imaginary interleaved RGBA pixel data, e.g. from a canvas' `ImageData`.
//! let decodedImage = new Uint8Array(..);
//!
//! let size = decodedImage.byteLength;
//! let pointer = wasm.instance.exports.qoi_malloc(size);
//! new Uint8Array(wasm.instance.exports.memory.buffer, pointer, size).set(decodedImage);
//!
//! let imageWidth = 100;
//! let imageHeight = 100;
//! let channels = 4; // Or 3 for RGB.
//! let colorspace = 0; // Or 1 for linear.
//! wasm.instance.exports.qoi_image_encode(
//!   imageWidth,
//!   imageHeight,
//!   channels,
//!   colorspace,
//!   pointer,
//!   size,
//! );
//!
//! wasm.instance.exports.qoi_dealloc(pointer, size);
//! ```
//!

use std::{mem, slice};

use qoi_codec::{decode_image, encode_raw, Channels, Colorspace, Error, ImageMeta};

// Maps a codec error into an integer that can be trivially passed through the
// WASM FFI boundary.
struct ErrorCode {
  code: u8,
}

impl From<Error> for ErrorCode {
  fn from(error: Error) -> Self {
    let code = match error {
      Error::InvalidParameter(_) => 1,
      Error::MalformedHeader(_) => 2,
      Error::TruncatedOrOversizedStream(_) => 3,
      Error::EncodingPrecondition(_) => 4,
      Error::LimitExceeded(_) => 5,
    };

    ErrorCode { code }
  }
}

// External functions that are expected to be imported into the WASM instance
// from the host.
extern "C" {
  fn on_decode_complete(buf_ptr: *mut u8, width: u32, height: u32, channels: u8, colorspace: u8);
  fn on_decode_error(err_code: u8);
  fn on_encode_complete(buf_ptr: *mut u8, size: usize);
  fn on_encode_error(err_code: u8);
}

// Hands ownership of `buf` over to the host. The allocation's capacity is
// trimmed to its length so `qoi_dealloc` can rebuild it from the size alone.
fn into_host(buf: Vec<u8>) -> (*mut u8, usize) {
  let mut buf = buf.into_boxed_slice();
  let size = buf.len();
  let ptr = buf.as_mut_ptr();

  mem::forget(buf);

  (ptr, size)
}

/// Allocates a chunk of linear memory of the given `size`, intended to contain
/// byte (u8) values.
#[no_mangle]
pub extern "C" fn qoi_malloc(size: usize) -> *mut u8 {
  into_host(vec![0; size]).0
}

/// Deallocates the memory starting at `ptr` up to `size`.
///
/// # Safety
///
/// This function should only be called once for each buffer returned by
/// `qoi_malloc` or passed to one of the completion callbacks, using that
/// buffer's `size`, otherwise the WASM instance's memory will be corrupted.
#[no_mangle]
pub unsafe extern "C" fn qoi_dealloc(ptr: *mut u8, size: usize) {
  drop(Vec::from_raw_parts(ptr, size, size));
}

/// Encodes `buf_size` bytes of interleaved RGB or RGBA pixel data at `buf_ptr`
/// as a QOI file.
///
/// Calls `on_encode_complete` with a pointer to the file's bytes and their
/// size, or `on_encode_error` with an error code.
///
/// # Safety
///
/// `buf_ptr` and `buf_size` must describe memory allocated with `qoi_malloc`.
/// The buffer is only borrowed and must still be released by the host.
#[no_mangle]
pub unsafe extern "C" fn qoi_image_encode(
  width: u32,
  height: u32,
  channels: u8,
  colorspace: u8,
  buf_ptr: *const u8,
  buf_size: usize,
) {
  let source = slice::from_raw_parts(buf_ptr, buf_size);

  let encoded = Channels::try_from(channels).and_then(|channels| {
    let colorspace = Colorspace::try_from(colorspace)?;

    encode_raw(source, &ImageMeta { channels, colorspace, height, width })
  });

  match encoded {
    Ok(dest) => {
      let (ptr, size) = into_host(dest);
      on_encode_complete(ptr, size);
    }
    Err(e) => {
      on_encode_error(ErrorCode::from(e).code);
    }
  }
}

/// Decodes the QOI file of `buf_size` bytes at `buf_ptr` into interleaved
/// pixel data, RGB or RGBA to match the file's channel count.
///
/// Calls `on_decode_complete` with a pointer to the pixel data and the image's
/// metadata. The size of the pixel data is width * height * channels.
///
/// Calls `on_decode_error` with an error code if an error occurs.
///
/// # Safety
///
/// `buf_ptr` and `buf_size` must describe memory allocated with `qoi_malloc`.
/// The buffer is only borrowed and must still be released by the host.
#[no_mangle]
pub unsafe extern "C" fn qoi_image_decode(buf_ptr: *const u8, buf_size: usize) {
  let source = slice::from_raw_parts(buf_ptr, buf_size);

  match decode_image(source) {
    Ok(image) => {
      let ImageMeta { channels, colorspace, height, width } = *image.meta();
      let (ptr, _) = into_host(image.to_raw());

      on_decode_complete(ptr, width, height, channels as u8, colorspace as u8);
    }
    Err(e) => {
      on_decode_error(ErrorCode::from(e).code);
    }
  }
}
