//! One APA102 strip: its frame buffer plus the SPI channel it is sent on.
//!
//! The strip is `Idle` or `Pending`. [`Strip::submit`] hands the frame to the
//! transport and moves to `Pending`; [`Strip::wait_result`] collects it and
//! goes back to `Idle`. While pending, the frame belongs to the hardware:
//! writing pixels, submitting again or transmitting are caller bugs and
//! panic.

use embassy_time::{
    Duration,
    TimeoutError,
    with_timeout,
};

use crate::{
    color::PixelWord,
    config::StripConfig,
    error::{
        GeometryError,
        TransportError,
    },
    frame::FrameBuffer,
    transport::{
        BusError,
        Transport,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    Idle,
    Pending,
}

/// APA102 strip driven through a [`Transport`].
pub struct Strip<T> {
    frame: FrameBuffer,
    transport: T,
    state: State,
}

impl<T: Transport> Strip<T> {
    /// Build a strip of `config.pixel_count` pixels, all off, nothing sent yet.
    ///
    /// # Errors
    ///
    /// [`GeometryError`] when the pixel count does not fit the buffer.
    pub fn new(transport: T, config: &StripConfig) -> Result<Self, GeometryError> {
        Ok(Self {
            frame: FrameBuffer::new(config.pixel_count, config.invert)?,
            transport,
            state: State::Idle,
        })
    }

    /// Number of pixels on the strip.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Whether a submitted frame has not been collected yet.
    pub fn is_pending(&self) -> bool {
        self.state == State::Pending
    }

    /// The encoded frame, framing words included.
    pub const fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Set a single pixel.
    ///
    /// # Panics
    ///
    /// If `index` is out of range or a submitted frame is still pending.
    pub fn set(&mut self, index: usize, word: PixelWord) {
        self.frame_mut().set(index, word);
    }

    /// Set every pixel to the same word.
    ///
    /// # Panics
    ///
    /// If a submitted frame is still pending.
    pub fn fill(&mut self, word: PixelWord) {
        self.frame_mut().fill(word);
    }

    /// Turn every pixel off.
    ///
    /// # Panics
    ///
    /// If a submitted frame is still pending.
    pub fn clear(&mut self) {
        self.frame_mut().clear();
    }

    /// Send the frame and wait until the hardware is done with it.
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] for anything the transport reports.
    ///
    /// # Panics
    ///
    /// If a submitted frame is still pending.
    pub async fn transmit(&mut self) -> Result<(), TransportError<T::Error>> {
        assert!(self.state == State::Idle, "transmit while a frame is pending");
        self.transport.transmit(self.frame.as_bytes()).await?;
        Ok(())
    }

    /// Start sending the frame and return without waiting for it.
    ///
    /// # Errors
    ///
    /// [`TransportError::SubmissionTimeout`] when the frame was not queued
    /// within `timeout`, whether the transport said so or simply never
    /// answered; the strip is still idle afterwards.
    ///
    /// # Panics
    ///
    /// If the previous submission was not collected with
    /// [`wait_result`](Self::wait_result).
    pub async fn submit(&mut self, timeout: Duration) -> Result<(), TransportError<T::Error>> {
        assert!(self.state == State::Idle, "submit while a frame is pending");
        let queued = with_timeout(timeout, self.transport.submit(self.frame.as_bytes(), timeout)).await;
        match queued {
            Ok(Ok(())) => {
                self.state = State::Pending;
                Ok(())
            }
            Ok(Err(BusError::Timeout)) | Err(TimeoutError) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("strip queue full for {} ms", timeout.as_millis());
                Err(TransportError::SubmissionTimeout)
            }
            Ok(Err(BusError::Bus(err))) => Err(TransportError::Bus(err)),
        }
    }

    /// Wait for the submitted frame to finish.
    ///
    /// # Errors
    ///
    /// [`TransportError::CompletionTimeout`] when the transfer is still
    /// running after `timeout`. The strip stays pending and can be waited on
    /// again.
    ///
    /// # Panics
    ///
    /// If nothing was submitted.
    pub async fn wait_result(&mut self, timeout: Duration) -> Result<(), TransportError<T::Error>> {
        assert!(self.state == State::Pending, "wait_result without a submitted frame");
        match with_timeout(timeout, self.transport.poll_result(timeout)).await {
            Ok(Ok(())) => {
                self.state = State::Idle;
                Ok(())
            }
            Ok(Err(BusError::Timeout)) | Err(TimeoutError) => Err(TransportError::CompletionTimeout),
            Ok(Err(BusError::Bus(err))) => {
                self.state = State::Idle;
                Err(TransportError::Bus(err))
            }
        }
    }

    fn frame_mut(&mut self) -> &mut FrameBuffer {
        assert!(self.state == State::Idle, "pixels written while a frame is pending");
        &mut self.frame
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use embassy_time::Duration;

    use crate::transport::{
        BusError,
        Transport,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MockError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Transmit(Vec<u8>),
        Submit(Vec<u8>),
        Poll,
    }

    /// Records every call; can be told to never free its queue or never
    /// finish a transfer.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        pub calls: Vec<Call>,
        pub queue_stuck: bool,
        pub never_completes: bool,
        pub fail_transmit: bool,
    }

    impl Transport for MockTransport {
        type Error = MockError;

        async fn transmit(&mut self, frame: &[u8]) -> Result<(), MockError> {
            self.calls.push(Call::Transmit(frame.to_vec()));
            if self.fail_transmit { Err(MockError) } else { Ok(()) }
        }

        async fn submit(&mut self, frame: &[u8], _timeout: Duration) -> Result<(), BusError<MockError>> {
            if self.queue_stuck {
                return Err(BusError::Timeout);
            }
            self.calls.push(Call::Submit(frame.to_vec()));
            Ok(())
        }

        async fn poll_result(&mut self, _timeout: Duration) -> Result<(), BusError<MockError>> {
            self.calls.push(Call::Poll);
            if self.never_completes {
                Err(BusError::Timeout)
            } else {
                Ok(())
            }
        }
    }

    /// Hangs instead of reporting a timeout: `submit` while `queue_full`,
    /// `poll_result` always.
    #[derive(Debug, Default)]
    pub struct StalledTransport {
        pub queue_full: bool,
    }

    impl Transport for StalledTransport {
        type Error = MockError;

        async fn transmit(&mut self, _frame: &[u8]) -> Result<(), MockError> {
            Ok(())
        }

        async fn submit(&mut self, _frame: &[u8], _timeout: Duration) -> Result<(), BusError<MockError>> {
            if self.queue_full {
                return core::future::pending().await;
            }
            Ok(())
        }

        async fn poll_result(&mut self, _timeout: Duration) -> Result<(), BusError<MockError>> {
            core::future::pending().await
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::{
        mock::{
            Call,
            MockError,
            MockTransport,
            StalledTransport,
        },
        *,
    };
    use crate::color::encode_color;

    const TIMEOUT: Duration = Duration::from_millis(5);

    fn strip(pixel_count: usize) -> Strip<MockTransport> {
        Strip::new(MockTransport::default(), &StripConfig::new(pixel_count)).unwrap()
    }

    #[test]
    fn transmit_sends_whole_frame() {
        let mut strip = strip(10);
        strip.fill(encode_color(0, 0, 255, 10));
        block_on(strip.transmit()).unwrap();

        let [Call::Transmit(bytes)] = strip.transport().calls.as_slice() else {
            panic!("unexpected calls {:?}", strip.transport().calls);
        };
        assert_eq!(bytes.len() * 8, 32 * 12);
        assert_eq!(bytes.as_slice(), strip.frame().as_bytes());
        assert_eq!(&bytes[4..8], &[0xEA_u8, 0xFF, 0, 0]);
    }

    #[test]
    fn submit_then_wait_returns_to_idle() {
        let mut strip = strip(3);
        block_on(strip.submit(TIMEOUT)).unwrap();
        assert!(strip.is_pending());

        block_on(strip.wait_result(TIMEOUT)).unwrap();
        assert!(!strip.is_pending());

        strip.set(0, encode_color(1, 2, 3, 4));
        block_on(strip.submit(TIMEOUT)).unwrap();
        assert_eq!(strip.transport().calls.len(), 3);
    }

    #[test]
    #[should_panic(expected = "submit while a frame is pending")]
    fn double_submit_panics() {
        let mut strip = strip(3);
        block_on(strip.submit(TIMEOUT)).unwrap();
        let _ = block_on(strip.submit(TIMEOUT));
    }

    #[test]
    fn double_submit_leaves_queued_frame_alone() {
        let mut strip = strip(2);
        strip.fill(encode_color(9, 9, 9, 9));
        block_on(strip.submit(TIMEOUT)).unwrap();
        let queued = strip.frame().as_bytes().to_vec();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = block_on(strip.submit(TIMEOUT));
        }));
        assert!(result.is_err());
        assert_eq!(strip.transport().calls, [Call::Submit(queued)]);
    }

    #[test]
    #[should_panic(expected = "pixels written while a frame is pending")]
    fn writing_while_pending_panics() {
        let mut strip = strip(3);
        block_on(strip.submit(TIMEOUT)).unwrap();
        strip.fill(PixelWord::OFF);
    }

    #[test]
    #[should_panic(expected = "wait_result without a submitted frame")]
    fn wait_without_submit_panics() {
        let mut strip = strip(3);
        let _ = block_on(strip.wait_result(TIMEOUT));
    }

    #[test]
    fn stuck_queue_times_out_and_stays_idle() {
        let mut strip = strip(3);
        strip.transport.queue_stuck = true;

        let err = block_on(strip.submit(TIMEOUT)).unwrap_err();
        assert_eq!(err, TransportError::SubmissionTimeout);
        assert!(!strip.is_pending());
    }

    #[test]
    fn unfinished_transfer_times_out_and_stays_pending() {
        let mut strip = strip(3);
        strip.transport.never_completes = true;
        block_on(strip.submit(TIMEOUT)).unwrap();

        let err = block_on(strip.wait_result(TIMEOUT)).unwrap_err();
        assert_eq!(err, TransportError::CompletionTimeout);
        assert!(strip.is_pending());

        strip.transport.never_completes = false;
        block_on(strip.wait_result(TIMEOUT)).unwrap();
        assert!(!strip.is_pending());
    }

    #[test]
    fn clear_turns_pixels_off() {
        let mut strip = strip(4);
        strip.fill(encode_color(200, 100, 50, 31));
        strip.clear();
        assert!((0..4).all(|index| strip.frame().pixel(index) == PixelWord::OFF));
    }

    #[test]
    fn hung_submit_gives_up_after_timeout() {
        let stalled = StalledTransport { queue_full: true };
        let mut strip = Strip::new(stalled, &StripConfig::new(3)).unwrap();

        let started = std::time::Instant::now();
        assert_eq!(block_on(strip.submit(TIMEOUT)), Err(TransportError::SubmissionTimeout));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert!(!strip.is_pending());
    }

    #[test]
    fn hung_transfer_gives_up_after_timeout() {
        let mut strip = Strip::new(StalledTransport::default(), &StripConfig::new(3)).unwrap();
        block_on(strip.submit(TIMEOUT)).unwrap();

        assert_eq!(block_on(strip.wait_result(TIMEOUT)), Err(TransportError::CompletionTimeout));
        assert!(strip.is_pending());
        assert_eq!(block_on(strip.wait_result(TIMEOUT)), Err(TransportError::CompletionTimeout));
    }

    #[test]
    fn transmit_errors_surface_to_caller() {
        let mut strip = strip(1);
        strip.transport.fail_transmit = true;
        assert_eq!(block_on(strip.transmit()), Err(TransportError::Bus(MockError)));
    }

    #[test]
    fn oversized_strip_is_rejected() {
        let config = StripConfig::new(crate::frame::MAX_PIXELS + 1);
        assert!(Strip::new(MockTransport::default(), &config).is_err());
    }
}
