//! Wire-ready frame buffer for one APA102 strip.
//!
//! Layout, one word per slot:
//!
//! ```text
//! [ start | pixel 0 | pixel 1 | ... | pixel n-1 | end ]
//! ```
//!
//! With `invert` set, every slot is stored complemented, so the start frame
//! becomes all ones and the end frame all zeros.

use heapless::Vec;

use crate::{
    color::PixelWord,
    error::GeometryError,
};

/// Most pixels a single strip can carry.
pub const MAX_PIXELS: usize = 50;

/// Slots in a full buffer: the pixels plus the start and end frame.
pub const MAX_WORDS: usize = MAX_PIXELS + 2;

/// Bytes in a full buffer.
pub const MAX_FRAME_BYTES: usize = 4 * MAX_WORDS;

const START_FRAME: u32 = 0;
const END_FRAME: u32 = !0;

/// Encoded pixels of one strip plus its framing words.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    invert: bool,
    words: Vec<[u8; 4], MAX_WORDS>,
}

impl FrameBuffer {
    /// Allocate a buffer for `pixel_count` pixels, all of them off.
    ///
    /// # Errors
    ///
    /// [`GeometryError::PixelCount`] when `pixel_count` is zero or above
    /// [`MAX_PIXELS`].
    pub fn new(pixel_count: usize, invert: bool) -> Result<Self, GeometryError> {
        if pixel_count == 0 || pixel_count > MAX_PIXELS {
            return Err(GeometryError::PixelCount {
                pixel_count,
                max: MAX_PIXELS,
            });
        }

        let mut frame = Self {
            invert,
            words: Vec::new(),
        };
        let start = frame.store(START_FRAME);
        let end = frame.store(END_FRAME);
        let off = frame.store(PixelWord::OFF.bits());

        // Capacity was checked above, so none of these pushes can fail.
        let _ = frame.words.push(start);
        let _ = frame.words.resize(pixel_count + 1, off);
        let _ = frame.words.push(end);

        Ok(frame)
    }

    /// Number of pixels on the strip.
    pub fn len(&self) -> usize {
        self.words.len() - 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Set a single pixel.
    ///
    /// # Panics
    ///
    /// If `index` is not below [`len`](Self::len).
    pub fn set(&mut self, index: usize, word: PixelWord) {
        assert!(index < self.len(), "pixel {index} out of range for {} pixels", self.len());
        self.words[index + 1] = self.store(word.bits());
    }

    /// Set every pixel to the same word. The framing words are untouched.
    pub fn fill(&mut self, word: PixelWord) {
        let stored = self.store(word.bits());
        let end = self.words.len() - 1;
        self.words[1..end].fill(stored);
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.fill(PixelWord::OFF);
    }

    /// Read a pixel back, undoing the inversion.
    ///
    /// # Panics
    ///
    /// If `index` is not below [`len`](Self::len).
    pub fn pixel(&self, index: usize) -> PixelWord {
        assert!(index < self.len(), "pixel {index} out of range for {} pixels", self.len());
        PixelWord::from_bits(self.load(index + 1))
    }

    /// Raw slot as it goes on the wire, framing words included.
    pub fn slot(&self, slot: usize) -> Option<u32> {
        self.words.get(slot).map(|bytes| u32::from_le_bytes(*bytes))
    }

    /// Complete transmission: start frame, pixels, end frame.
    pub fn as_bytes(&self) -> &[u8] {
        self.words.as_flattened()
    }

    /// Length of one transmission in bits.
    pub fn bit_length(&self) -> usize {
        32 * self.words.len()
    }

    /// Wire value of the start frame for this polarity.
    pub const fn start_frame(&self) -> u32 {
        if self.invert { !START_FRAME } else { START_FRAME }
    }

    /// Wire value of the end frame for this polarity.
    pub const fn end_frame(&self) -> u32 {
        if self.invert { !END_FRAME } else { END_FRAME }
    }

    fn store(&self, word: u32) -> [u8; 4] {
        let word = if self.invert { !word } else { word };
        word.to_le_bytes()
    }

    fn load(&self, slot: usize) -> u32 {
        let word = u32::from_le_bytes(self.words[slot]);
        if self.invert { !word } else { word }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::color::{
        GLOBAL_MAX,
        encode_color,
    };

    #[test]
    fn blue_fill_matches_wire_words() {
        let mut frame = FrameBuffer::new(10, false).unwrap();
        frame.fill(encode_color(0, 0, 255, 10));

        assert_eq!(frame.slot(0), Some(0));
        for slot in 1..=10 {
            assert_eq!(frame.slot(slot), Some(0x0000_FFEA));
        }
        assert_eq!(frame.slot(11), Some(0xFFFF_FFFF));
        assert_eq!(frame.slot(12), None);
    }

    #[test]
    fn new_strip_is_off() {
        let frame = FrameBuffer::new(3, false).unwrap();
        assert_eq!(
            frame.as_bytes(),
            &[0_u8, 0, 0, 0, 0xE0, 0, 0, 0, 0xE0, 0, 0, 0, 0xE0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn inverted_framing_and_bytes() {
        let mut frame = FrameBuffer::new(1, true).unwrap();
        frame.set(0, encode_color(0x01, 0x02, 0x03, 1));

        assert_eq!(frame.slot(0), Some(0xFFFF_FFFF));
        assert_eq!(frame.slot(2), Some(0));
        assert_eq!(
            frame.as_bytes(),
            &[0xFF_u8, 0xFF, 0xFF, 0xFF, !0xE1, !0x03, !0x02, !0x01, 0, 0, 0, 0]
        );
        assert_eq!(frame.pixel(0), encode_color(0x01, 0x02, 0x03, 1));
    }

    #[test]
    fn geometry_limits() {
        assert_eq!(
            FrameBuffer::new(0, false).unwrap_err(),
            GeometryError::PixelCount {
                pixel_count: 0,
                max: MAX_PIXELS
            }
        );
        assert!(FrameBuffer::new(MAX_PIXELS + 1, true).is_err());

        let full = FrameBuffer::new(MAX_PIXELS, false).unwrap();
        assert_eq!(full.len(), MAX_PIXELS);
        assert_eq!(full.as_bytes().len(), MAX_FRAME_BYTES);
    }

    #[test]
    fn bit_length_covers_framing() {
        let frame = FrameBuffer::new(7, false).unwrap();
        assert_eq!(frame.bit_length(), 32 * 9);
        assert_eq!(frame.as_bytes().len() * 8, frame.bit_length());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn set_past_end_panics() {
        let mut frame = FrameBuffer::new(4, false).unwrap();
        frame.set(4, PixelWord::OFF);
    }

    #[test]
    fn full_white_collides_with_end_frame() {
        // The APA102 end frame is all ones, which is also white at global 31.
        let frame = FrameBuffer::new(1, false).unwrap();
        assert_eq!(encode_color(255, 255, 255, GLOBAL_MAX).bits(), frame.end_frame());
    }

    proptest! {
        #[test]
        fn framing_after_new(pixel_count in 1..=MAX_PIXELS, invert in any::<bool>()) {
            let frame = FrameBuffer::new(pixel_count, invert).unwrap();
            prop_assert_eq!(frame.slot(0), Some(frame.start_frame()));
            prop_assert_eq!(frame.slot(pixel_count + 1), Some(frame.end_frame()));
            prop_assert_ne!(frame.start_frame(), frame.end_frame());
        }

        #[test]
        fn start_frame_never_looks_like_a_pixel(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), global in 0..=GLOBAL_MAX) {
            prop_assert_ne!(encode_color(r, g, b, global).bits(), START_FRAME);
        }

        #[test]
        fn set_touches_one_slot(
            pixel_count in 1..=MAX_PIXELS,
            invert in any::<bool>(),
            pick in any::<prop::sample::Index>(),
            fill in 0..u32::MAX,
            r in any::<u8>(),
        ) {
            let index = pick.index(pixel_count);
            let base = PixelWord::from_bits(fill | 0xE0);
            let word = encode_color(r, 0, 0, 3);

            let mut frame = FrameBuffer::new(pixel_count, invert).unwrap();
            frame.fill(base);
            let before = frame.clone();
            frame.set(index, word);

            for slot in 0..pixel_count + 2 {
                if slot == index + 1 {
                    let expected = if invert { !word.bits() } else { word.bits() };
                    prop_assert_eq!(frame.slot(slot), Some(expected));
                } else {
                    prop_assert_eq!(frame.slot(slot), before.slot(slot));
                }
            }
            prop_assert_eq!(frame.pixel(index), word);
        }

        #[test]
        fn inversion_round_trips(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), global in 0..=GLOBAL_MAX) {
            let word = encode_color(r, g, b, global);
            let mut frame = FrameBuffer::new(2, true).unwrap();
            frame.set(1, word);
            prop_assert_eq!(frame.slot(2), Some(!word.bits()));
            prop_assert_eq!(frame.pixel(1), word);
        }
    }
}
