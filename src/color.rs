//! APA102 pixel words and colour encoding.
//!
//! A pixel travels on the wire as four bytes: `0xE0 | global`, blue, green,
//! red. [`PixelWord`] holds those bytes as a little-endian `u32`, so red ends
//! up in the most significant byte.

use palette::Srgb;

/// Largest value of the 5-bit global brightness field.
pub const GLOBAL_MAX: u8 = 31;

/// Size of the hue circle used by [`PixelWord::from_hsv`]: six sextants of
/// 256 steps each.
pub const HUE_MAX: u16 = 6 * HUE_SEXTANT;

const HUE_SEXTANT: u16 = 256;

/// The three protocol bits that open every pixel word.
const HEADER: u8 = 0xE0;

/// One encoded APA102 pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelWord(u32);

/// Decoded fields of a [`PixelWord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channels {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub global: u8,
}

impl PixelWord {
    /// Black at zero brightness.
    pub const OFF: Self = Self::from_rgb(0, 0, 0, 0);

    /// Pack a colour and a global brightness.
    ///
    /// # Panics
    ///
    /// If `global` is above [`GLOBAL_MAX`]; it would overwrite the protocol
    /// header bits.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8, global: u8) -> Self {
        assert!(global <= GLOBAL_MAX, "global brightness above 31");
        Self(u32::from_le_bytes([HEADER | global, blue, green, red]))
    }

    /// Convert an HSV triple with the integer sextant transform, then pack it.
    ///
    /// `hue` wraps modulo [`HUE_MAX`]; 0 is red, 512 green, 1024 blue.
    ///
    /// # Panics
    ///
    /// Same contract as [`from_rgb`](Self::from_rgb) for `global`.
    #[must_use]
    pub const fn from_hsv(hue: u16, saturation: u8, value: u8, global: u8) -> Self {
        let (red, green, blue) = hsv_to_rgb(hue, saturation, value);
        Self::from_rgb(red, green, blue, global)
    }

    /// Raw word as stored before any inversion.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Wrap a raw word. No check is made that the header bits are set.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Bytes in transmission order.
    #[must_use]
    pub const fn to_wire(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Split the word back into its named fields.
    #[must_use]
    pub const fn channels(self) -> Channels {
        let [head, blue, green, red] = self.0.to_le_bytes();
        Channels {
            red,
            green,
            blue,
            global: head & GLOBAL_MAX,
        }
    }

    /// Whether the three protocol header bits are present.
    #[must_use]
    pub const fn has_header(self) -> bool {
        self.0.to_le_bytes()[0] & HEADER == HEADER
    }
}

impl From<Channels> for PixelWord {
    fn from(channels: Channels) -> Self {
        Self::from_rgb(channels.red, channels.green, channels.blue, channels.global)
    }
}

impl From<Srgb<u8>> for PixelWord {
    /// Full global brightness; dim through the colour itself.
    fn from(color: Srgb<u8>) -> Self {
        Self::from_rgb(color.red, color.green, color.blue, GLOBAL_MAX)
    }
}

/// Pack a colour; see [`PixelWord::from_rgb`].
#[must_use]
pub const fn encode_color(red: u8, green: u8, blue: u8, global: u8) -> PixelWord {
    PixelWord::from_rgb(red, green, blue, global)
}

/// Pack an HSV colour; see [`PixelWord::from_hsv`].
#[must_use]
pub const fn encode_hsv(hue: u16, saturation: u8, value: u8, global: u8) -> PixelWord {
    PixelWord::from_hsv(hue, saturation, value, global)
}

/// Integer HSV to RGB.
///
/// Inside each sextant one channel sits at `value`, one at the floor set by
/// the saturation, and the third ramps between them.
#[allow(clippy::cast_possible_truncation)]
const fn hsv_to_rgb(hue: u16, saturation: u8, value: u8) -> (u8, u8, u8) {
    if saturation == 0 {
        return (value, value, value);
    }

    let hue = hue % HUE_MAX;
    let sextant = hue / HUE_SEXTANT;
    let step = (hue % HUE_SEXTANT) as u32;

    let top = value as u32;
    let floor = top * (255 - saturation as u32) / 255;
    let span = top - floor;
    let rising = (floor + span * step / HUE_SEXTANT as u32) as u8;
    let falling = (floor + span * (HUE_SEXTANT as u32 - step) / HUE_SEXTANT as u32) as u8;
    let (top, floor) = (top as u8, floor as u8);

    match sextant {
        0 => (top, rising, floor),
        1 => (falling, top, floor),
        2 => (floor, top, rising),
        3 => (floor, falling, top),
        4 => (rising, floor, top),
        _ => (top, floor, falling),
    }
}
