//! [`Transport`] on an ESP32-S3 SPI master with DMA.
//!
//! The frame is copied into a DMA buffer and the peripheral runs the
//! transfer on its own; [`poll_result`](Transport::poll_result) waits for
//! the done interrupt. While a transfer runs, esp-hal owns both the SPI
//! driver and the buffer, so the channel is kept as a small state enum.

use embassy_time::{
    Duration,
    with_timeout,
};
use esp_hal::{
    Async,
    dma::{
        DmaBufError,
        DmaDescriptor,
        DmaTxBuf,
    },
    spi::{
        self,
        master::{
            Config,
            ConfigError,
            SpiDma,
            SpiDmaTransfer,
        },
    },
    time::Rate,
};

use crate::{
    config::{
        SpiMode,
        StripConfig,
    },
    transport::{
        BusError,
        Transport,
    },
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiError {
    #[display("SPI configuration rejected: {_0:?}")]
    #[from]
    Config(#[error(not(source))] ConfigError),
    #[display("DMA buffer rejected: {_0:?}")]
    #[from]
    Buffer(#[error(not(source))] DmaBufError),
    #[display("SPI transfer failed: {_0:?}")]
    #[from]
    Transfer(#[error(not(source))] spi::Error),
    /// A previous transfer was dropped halfway and took the driver with it.
    #[display("SPI channel lost")]
    ChannelLost,
    /// `poll_result` with nothing queued.
    #[display("no transfer queued")]
    NothingQueued,
}

/// esp-hal SPI configuration for a strip.
pub fn spi_config(config: &StripConfig) -> Config {
    let mode = match config.spi_mode() {
        SpiMode::Mode0 => spi::Mode::_0,
        SpiMode::Mode2 => spi::Mode::_2,
    };
    Config::default()
        .with_frequency(Rate::from_hz(config.frequency.to_Hz()))
        .with_mode(mode)
}

enum Channel<'d> {
    Idle(SpiDma<'d, Async>, DmaTxBuf),
    Busy(SpiDmaTransfer<'d, Async, DmaTxBuf>),
    Lost,
}

/// SPI + DMA channel with a one-deep transfer queue.
pub struct SpiDmaTransport<'d> {
    channel: Channel<'d>,
}

impl<'d> SpiDmaTransport<'d> {
    /// Wrap a configured SPI DMA driver and the TX buffer memory.
    ///
    /// # Errors
    ///
    /// [`SpiError::Buffer`] when the descriptors cannot cover `buffer`.
    pub fn new(
        spi: SpiDma<'d, Async>,
        descriptors: &'static mut [DmaDescriptor],
        buffer: &'static mut [u8],
    ) -> Result<Self, SpiError> {
        let tx = DmaTxBuf::new(descriptors, buffer)?;
        Ok(Self {
            channel: Channel::Idle(spi, tx),
        })
    }

    fn start(&mut self, frame: &[u8]) -> Result<(), SpiError> {
        let Channel::Idle(spi, mut tx) = core::mem::replace(&mut self.channel, Channel::Lost) else {
            #[cfg(feature = "defmt")]
            defmt::error!("SPI channel lost during previous transfer");
            return Err(SpiError::ChannelLost);
        };

        tx.fill(frame);
        match spi.write(frame.len(), tx) {
            Ok(transfer) => {
                self.channel = Channel::Busy(transfer);
                Ok(())
            }
            Err((err, spi, tx)) => {
                self.channel = Channel::Idle(spi, tx);
                Err(SpiError::Transfer(err))
            }
        }
    }

    /// Reclaim the driver from a finished transfer.
    fn finish(&mut self) {
        if let Channel::Busy(transfer) = core::mem::replace(&mut self.channel, Channel::Lost) {
            let (spi, tx) = transfer.wait();
            self.channel = Channel::Idle(spi, tx);
        }
    }

    /// Wait up to `timeout` for the running transfer, if any.
    async fn drain(&mut self, timeout: Duration) -> Result<(), BusError<SpiError>> {
        if let Channel::Busy(transfer) = &mut self.channel {
            with_timeout(timeout, transfer.wait_for_done())
                .await
                .map_err(|_| BusError::Timeout)?;
            self.finish();
        }
        Ok(())
    }
}

impl Transport for SpiDmaTransport<'_> {
    type Error = SpiError;

    async fn transmit(&mut self, frame: &[u8]) -> Result<(), SpiError> {
        self.start(frame)?;
        if let Channel::Busy(transfer) = &mut self.channel {
            transfer.wait_for_done().await;
        }
        self.finish();
        Ok(())
    }

    async fn submit(&mut self, frame: &[u8], timeout: Duration) -> Result<(), BusError<SpiError>> {
        // A transfer left over from a timed-out wait still holds the queue.
        self.drain(timeout).await?;
        self.start(frame)?;
        Ok(())
    }

    async fn poll_result(&mut self, timeout: Duration) -> Result<(), BusError<SpiError>> {
        match self.channel {
            Channel::Idle(..) => Err(BusError::Bus(SpiError::NothingQueued)),
            Channel::Lost => Err(BusError::Bus(SpiError::ChannelLost)),
            Channel::Busy(_) => self.drain(timeout).await,
        }
    }
}
