//! Strip geometry, SPI clocking and the board defaults for the two shows.

use embassy_time::Duration;
use fugit::HertzU32;

/// Period of the animation tick.
pub const FRAME_PERIOD: Duration = Duration::from_millis(10);

/// How long the loop waits for queue room or for a submitted frame.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(20);

/// Hand strip: 30 pixels, normal polarity.
pub const HAND: StripConfig = StripConfig::new(30);

/// Heart strip: 20 pixels, normal polarity.
pub const HEART: StripConfig = StripConfig::new(20);

/// SPI clock polarity and phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    Mode0,
    /// CPOL=1, CPHA=0
    Mode2,
}

/// Fixed settings of one strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripConfig {
    pub pixel_count: usize,
    /// The strip sits behind an inverting level shifter.
    pub invert: bool,
    pub frequency: HertzU32,
}

impl StripConfig {
    /// `pixel_count` pixels, normal polarity, 4 MHz clock.
    #[must_use]
    pub const fn new(pixel_count: usize) -> Self {
        Self {
            pixel_count,
            invert: false,
            frequency: HertzU32::MHz(4),
        }
    }

    #[must_use]
    pub const fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    #[must_use]
    pub const fn with_frequency(mut self, frequency: HertzU32) -> Self {
        self.frequency = frequency;
        self
    }

    /// An inverted line idles high, so the clock polarity flips with it.
    #[must_use]
    pub const fn spi_mode(&self) -> SpiMode {
        if self.invert { SpiMode::Mode2 } else { SpiMode::Mode0 }
    }
}
