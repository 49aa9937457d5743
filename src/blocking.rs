//! [`Transport`] over any blocking `embedded-hal` SPI bus.
//!
//! Such buses have no transfer queue: `submit` clocks the frame out before it
//! returns, and `poll_result` only flushes. The strip still goes through its
//! `Idle -> Pending -> Idle` cycle, so the show loop runs unchanged, just
//! without overlap.
//!
//! The timeouts go unused: a blocking write has already finished when the
//! call returns, and [`Strip`](crate::Strip) bounds the async side itself.

use embassy_time::Duration;
use embedded_hal::spi::SpiBus;

use crate::transport::{
    BusError,
    Transport,
};

pub struct BlockingTransport<B> {
    bus: B,
}

impl<B: SpiBus> BlockingTransport<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: SpiBus> Transport for BlockingTransport<B> {
    type Error = B::Error;

    async fn transmit(&mut self, frame: &[u8]) -> Result<(), B::Error> {
        self.bus.write(frame)?;
        self.bus.flush()
    }

    async fn submit(&mut self, frame: &[u8], _timeout: Duration) -> Result<(), BusError<B::Error>> {
        self.bus.write(frame)?;
        Ok(())
    }

    async fn poll_result(&mut self, _timeout: Duration) -> Result<(), BusError<B::Error>> {
        self.bus.flush()?;
        Ok(())
    }
}
