//! # heartlight
//!
//! APA102 strip driver and the "hand" / "heart" light show.
//!
//! - **Codec**: [`PixelWord`] packs colour and 5-bit global brightness;
//!   [`FrameBuffer`] holds one strip's wire frame (start frame, pixels, end
//!   frame), optionally inverted for strips behind an inverting buffer.
//! - **Transport**: [`Strip`] pairs a frame buffer with a [`Transport`] and
//!   tracks the single in-flight transfer, so one strip can be clocked out
//!   by DMA while the other is rendered and sent.
//! - **Show**: [`show::render`] draws and sends one 10 ms tick of both shows.
//!
//! With the `esp32s3` feature the crate also provides the board wiring and
//! an SPI + DMA transport.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let peripherals = heartlight::init();
//! let resources = heartlight::split_resources!(peripherals);
//!
//! let mut hand = resources.hand.into_strip(&heartlight::config::HAND)?;
//! let mut heart = resources.heart.into_strip(&heartlight::config::HEART)?;
//!
//! heartlight::show::render(&mut hand, &mut heart, time, TRANSFER_TIMEOUT).await?;
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait, reason = "single-threaded embedded")]

mod blocking;
pub mod color;
pub mod config;
mod error;
mod frame;
pub mod show;
mod strip;
pub mod transport;

#[cfg(feature = "esp32s3")]
mod board;
#[cfg(feature = "esp32s3")]
mod spi;

pub use blocking::BlockingTransport;
#[cfg(feature = "esp32s3")]
pub use board::{
    BoardError,
    HandStripResources,
    HeartStripResources,
    Resources,
    SpiStrip,
    init,
};
pub use color::{
    PixelWord,
    encode_color,
    encode_hsv,
};
pub use error::{
    GeometryError,
    TransportError,
};
pub use frame::{
    FrameBuffer,
    MAX_PIXELS,
};
#[cfg(feature = "esp32s3")]
pub use spi::{
    SpiDmaTransport,
    SpiError,
};
pub use strip::Strip;
pub use transport::Transport;
