//! ESP32-S3 wiring for the two strips.

use esp_hal::{
    assign_resources,
    clock::CpuClock,
    dma_buffers,
    spi::master::Spi,
};

use crate::{
    Strip,
    config::StripConfig,
    error::GeometryError,
    frame::MAX_FRAME_BYTES,
    spi::{
        SpiDmaTransport,
        SpiError,
        spi_config,
    },
};

// ── Pin / peripheral assignments ────────────────────────────────────────────

assign_resources! {
    pub Resources<'d> {
        hand: HandStripResources<'d> {
            sck: GPIO12,
            mosi: GPIO11,
            spi: SPI2,
            dma: DMA_CH0,
        },
        heart: HeartStripResources<'d> {
            sck: GPIO14,
            mosi: GPIO13,
            spi: SPI3,
            dma: DMA_CH1,
        }
    }
}

/// A strip on one of the board's SPI hosts.
pub type SpiStrip<'d> = Strip<SpiDmaTransport<'d>>;

/// Why a board strip could not be brought up.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError {
    #[display("strip geometry: {_0}")]
    Geometry(GeometryError),
    #[display("strip SPI: {_0}")]
    Spi(SpiError),
}

// ── Board initialisation ────────────────────────────────────────────────────

/// Initialise the chip and return the raw peripheral set.
///
/// Call this once at the top of `main`, then use [`split_resources!`] to break
/// the peripherals into the two strip groups.
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    esp_hal::init(config)
}

// ── Resource → strip conversions ────────────────────────────────────────────

// Each expansion owns its own DMA buffer statics.
macro_rules! into_strip {
    ($resources:ident) => {
        impl<'d> $resources<'d> {
            /// Bring up the SPI host and DMA channel and wrap them in a strip.
            ///
            /// # Errors
            ///
            /// [`BoardError`] when the SPI configuration, the DMA buffer or
            /// the strip geometry is rejected.
            pub fn into_strip(self, config: &StripConfig) -> Result<SpiStrip<'d>, BoardError> {
                let (_, _, tx_buffer, tx_descriptors) = dma_buffers!(MAX_FRAME_BYTES);

                let spi = Spi::new(self.spi, spi_config(config)).map_err(SpiError::from)?
                    .with_sck(self.sck)
                    .with_mosi(self.mosi)
                    .with_dma(self.dma)
                    .into_async();
                let transport = SpiDmaTransport::new(spi, tx_descriptors, tx_buffer)?;

                #[cfg(feature = "defmt")]
                defmt::info!(
                    "{} strip: {} pixels, {} Hz, inverted={}",
                    stringify!($resources),
                    config.pixel_count,
                    config.frequency.to_Hz(),
                    config.invert
                );

                Ok(Strip::new(transport, config)?)
            }
        }
    };
}

into_strip!(HandStripResources);
into_strip!(HeartStripResources);
