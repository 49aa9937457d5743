//! Error types shared by the frame buffer and the strip transport.

/// A strip was requested with a pixel count the buffer cannot hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    #[display("pixel count {pixel_count} outside 1..={max}")]
    PixelCount { pixel_count: usize, max: usize },
}

/// Failure reported while moving a frame to the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// The hardware queue stayed full for the whole submission timeout.
    #[display("transfer queue full until the submission timeout")]
    SubmissionTimeout,
    /// The submitted transfer did not finish in time. It is still in flight.
    #[display("transfer not finished before the completion timeout")]
    CompletionTimeout,
    #[display("bus error: {_0:?}")]
    #[from]
    Bus(#[error(not(source))] E),
}
