// Fixed-width big-endian integer helpers and bounds-checked slicing shared by
// the header codec and the file orchestrator. Every function returns `None`
// instead of panicking when a range falls outside the given slice, leaving the
// caller to pick the error that fits its context.

// Returns the `len` bytes of `bytes` starting at `start`.
pub fn extract(bytes: &[u8], start: usize, len: usize) -> Option<&[u8]> {
  bytes.get(start..start.checked_add(len)?)
}

// Reads a big-endian `u32` starting at `offset`.
pub fn read_u32_be(bytes: &[u8], offset: usize) -> Option<u32> {
  let mut buf = [0; 4];
  buf.copy_from_slice(extract(bytes, offset, 4)?);
  Some(u32::from_be_bytes(buf))
}

// Splits `bytes` into a leading part of `head` bytes, a trailing part of
// `tail` bytes, and everything in between.
pub fn partition(bytes: &[u8], head: usize, tail: usize) -> Option<(&[u8], &[u8], &[u8])> {
  if bytes.len() < head.checked_add(tail)? {
    return None;
  }

  let (head_bytes, rest) = bytes.split_at(head);
  let (body, tail_bytes) = rest.split_at(rest.len() - tail);

  Some((head_bytes, body, tail_bytes))
}
