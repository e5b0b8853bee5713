use crate::pixel::Pixel;

pub const QOI_CACHE_LEN: usize = 64;

// The mutable history an encode or decode call threads through the stream.
// Each call owns a fresh instance; nothing here outlives or is shared across
// calls.
pub struct State {
  // A cache of previously seen pixels, indexed by their hash value % 64.
  cache: [Pixel; QOI_CACHE_LEN],
  // The previously decoded/encoded pixel.
  pub prev_pixel: Pixel,
  // Length of the pending run (Op::Run), encoder side only.
  pub run_count: u8,
}

impl State {
  pub fn new() -> Self {
    Self {
      cache: [Pixel { r: 0, g: 0, b: 0, a: 0 }; QOI_CACHE_LEN],
      prev_pixel: Pixel::default(),
      run_count: 0,
    }
  }

  // The cache slot `pixel` maps to.
  pub fn cache_index(pixel: &Pixel) -> u8 {
    (pixel.qoi_hash() % QOI_CACHE_LEN) as u8
  }

  // Returns the pixel cached in slot `index`. Indices wrap at the cache
  // length, the 6 bit payload of an index op can't exceed it anyway.
  pub fn cache_get(&self, index: u8) -> Pixel {
    self.cache[index as usize % QOI_CACHE_LEN]
  }

  // Inserts the given pixel into the cache. Overwrites any pixel that was
  // previously cached at the computed index.
  pub fn cache_insert(&mut self, pixel: Pixel) {
    self.cache[State::cache_index(&pixel) as usize] = pixel;
  }

  // Returns the slot holding exactly `pixel`, if any. A hash collision leaves
  // some other pixel in the slot, so equality is checked byte for byte.
  pub fn cache_match(&self, pixel: &Pixel) -> Option<u8> {
    let index = State::cache_index(pixel);

    (self.cache[index as usize] == *pixel).then_some(index)
  }

  #[cfg(test)]
  pub fn cache(&self) -> &[Pixel; QOI_CACHE_LEN] {
    &self.cache
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_state() {
    let state = State::new();

    assert_eq!(state.prev_pixel, Pixel { r: 0, g: 0, b: 0, a: 255 });
    assert_eq!(state.run_count, 0);
    assert!(state.cache().iter().all(|p| *p == Pixel { r: 0, g: 0, b: 0, a: 0 }));
  }

  #[test]
  fn test_cache_last_write_wins() {
    let mut state = State::new();
    let pixel_a = Pixel { r: 1, g: 0, b: 0, a: 0 };
    // 64 * 3 + 3 = 195 == 3 (mod 64), the same slot as `pixel_a`.
    let pixel_b = Pixel { r: 65, g: 0, b: 0, a: 0 };

    assert_eq!(State::cache_index(&pixel_a), State::cache_index(&pixel_b));

    state.cache_insert(pixel_a);
    assert_eq!(state.cache_match(&pixel_a), Some(3));

    state.cache_insert(pixel_b);
    assert_eq!(state.cache_match(&pixel_a), None);
    assert_eq!(state.cache_match(&pixel_b), Some(3));
    assert_eq!(state.cache_get(3), pixel_b);
  }

  #[test]
  fn test_zeroed_cache_matches_transparent_black() {
    let state = State::new();

    assert_eq!(state.cache_match(&Pixel { r: 0, g: 0, b: 0, a: 0 }), Some(0));
    assert_eq!(state.cache_match(&Pixel::default()), None);
  }
}
