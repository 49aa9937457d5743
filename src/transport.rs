//! Bus contract consumed by [`Strip`](crate::Strip).
//!
//! A transport moves one encoded frame to the LED strip. Implementations
//! provide a blocking-until-done `transmit`, and a depth-1 queue made of
//! `submit` and `poll_result`.

use embassy_time::Duration;

/// Result of a queue operation that can time out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<E> {
    #[display("timed out")]
    Timeout,
    #[display("{_0:?}")]
    #[from]
    Bus(#[error(not(source))] E),
}

/// SPI channel owned by one strip.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Send `frame` and return once the hardware has clocked it out.
    async fn transmit(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Queue `frame` without waiting for it to finish.
    ///
    /// Waits at most `timeout` for room in the queue, then reports
    /// [`BusError::Timeout`].
    async fn submit(&mut self, frame: &[u8], timeout: Duration) -> Result<(), BusError<Self::Error>>;

    /// Wait up to `timeout` for the queued transfer to finish.
    async fn poll_result(&mut self, timeout: Duration) -> Result<(), BusError<Self::Error>>;
}
