//! The hand and heart light shows.
//!
//! Both shows are pure functions of the tick count since boot (one tick is
//! 10 ms). The hand fades out over the first three and a half minutes while
//! drifting around blue; the heart breathes in red, grows brighter as the
//! hand fades, and finally starts to chase.

use core::f32::consts::PI;

use embassy_time::Duration;
use palette::num::{
    Round,
    Trigonometry,
};

use crate::{
    Strip,
    color::{
        HUE_MAX,
        PixelWord,
    },
    config::FRAME_PERIOD,
    error::TransportError,
    transport::Transport,
};

/// Ticks per second.
pub const TICKS_PER_SECOND: u32 = 100;

const HAND_START: u32 = 0;
const HAND_NONE: u32 = 210;
const HAND_HUE_PERIOD: u32 = 45;
const HAND_HUE_MIN: f32 = 220.0;
const HAND_HUE_MAX: f32 = 260.0;
const HAND_GLOBAL: u8 = 5;

const HEART_START: u32 = 30;
const HEART_FULL: u32 = 210;
const HEART_BLINK_START: u32 = 230;
/// In ticks, not seconds.
const HEART_BLINK_PERIOD: u32 = 33;
const HEART_HUE_PERIOD: u32 = 60;
const HEART_HUE_MIN: f32 = 350.0;
const HEART_HUE_MAX: f32 = 370.0;
const HEART_VALUE_PERIOD: u32 = 6;
const HEART_GLOBAL: u8 = 5;

/// Show tick for a given time since boot.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub const fn tick_at(uptime: Duration) -> u32 {
    (uptime.as_millis() / FRAME_PERIOD.as_millis()) as u32
}

/// What one show computed for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub envelope: f32,
    pub hue: u16,
    pub value: u8,
}

/// `min..=max` swing with a period of `period_s` seconds, at its midpoint on
/// tick 0.
fn sinusoid(time: u32, period_s: u32, min: f32, max: f32) -> f32 {
    let period = period_s * TICKS_PER_SECOND;
    #[allow(clippy::cast_precision_loss)]
    let phase = 2.0 * PI * (time % period) as f32 / period as f32;
    min + (max - min) * (1.0 + Trigonometry::sin(phase)) / 2.0
}

fn degrees_to_hue(degrees: f32) -> f32 {
    degrees * f32::from(HUE_MAX) / 360.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hue_between(time: u32, period_s: u32, min_degrees: f32, max_degrees: f32) -> u16 {
    let hue = sinusoid(time, period_s, degrees_to_hue(min_degrees), degrees_to_hue(max_degrees));
    (Round::round(hue) as u16) % HUE_MAX
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_value(level: f32) -> u8 {
    Round::round(level * 255.0) as u8
}

/// Linear ramp from 0 at `start` seconds to 1 at `end` seconds.
#[allow(clippy::cast_precision_loss)]
fn ramp(time: u32, start: u32, end: u32) -> f32 {
    let (start, end) = (start * TICKS_PER_SECOND, end * TICKS_PER_SECOND);
    if time < start {
        0.0
    } else if time > end {
        1.0
    } else {
        (time - start) as f32 / (end - start) as f32
    }
}

/// Hand colour at `time`.
pub fn hand(time: u32) -> Sample {
    let envelope = 1.0 - ramp(time, HAND_START, HAND_NONE);
    Sample {
        envelope,
        hue: hue_between(time, HAND_HUE_PERIOD, HAND_HUE_MIN, HAND_HUE_MAX),
        value: to_value(envelope),
    }
}

/// Heart colour at `time`, before blinking.
pub fn heart(time: u32) -> Sample {
    let envelope = ramp(time, HEART_START, HEART_FULL);
    let envelope = envelope * envelope;
    Sample {
        envelope,
        hue: hue_between(time, HEART_HUE_PERIOD, HEART_HUE_MIN, HEART_HUE_MAX),
        value: to_value(sinusoid(time, HEART_VALUE_PERIOD, envelope / 2.0, envelope)),
    }
}

/// First pixel switched off by the heart chase, if it has started.
///
/// Every third pixel from there on is off too.
pub const fn heart_blink_offset(time: u32) -> Option<usize> {
    if time >= HEART_BLINK_START * TICKS_PER_SECOND {
        Some(((time / HEART_BLINK_PERIOD) % 3) as usize)
    } else {
        None
    }
}

/// Write the hand show for `time` into `strip`.
pub fn render_hand<T: Transport>(strip: &mut Strip<T>, time: u32) {
    let sample = hand(time);
    if time % TICKS_PER_SECOND == 0 {
        #[cfg(feature = "defmt")]
        defmt::debug!("hand: t={}s {}", time / TICKS_PER_SECOND, sample);
    }
    strip.fill(PixelWord::from_hsv(sample.hue, 255, sample.value, HAND_GLOBAL));
}

/// Write the heart show for `time` into `strip`.
pub fn render_heart<T: Transport>(strip: &mut Strip<T>, time: u32) {
    let sample = heart(time);
    if time % TICKS_PER_SECOND == 0 {
        #[cfg(feature = "defmt")]
        defmt::debug!("heart: t={}s {}", time / TICKS_PER_SECOND, sample);
    }
    strip.fill(PixelWord::from_hsv(sample.hue, 255, sample.value, HEART_GLOBAL));
    if let Some(offset) = heart_blink_offset(time) {
        for index in (offset..strip.len()).step_by(3) {
            strip.set(index, PixelWord::OFF);
        }
    }
}

/// Render and send one tick of both shows.
///
/// The hand frame is queued first so its transfer runs while the heart is
/// computed and sent; the hand result is collected last. The hand is always
/// collected, even when the heart transmit fails.
///
/// # Errors
///
/// The first transport error of the tick. When both the heart transmit and
/// the hand collection fail, the heart error is returned and the hand error
/// is only logged.
pub async fn render<T: Transport>(
    hand: &mut Strip<T>,
    heart: &mut Strip<T>,
    time: u32,
    timeout: Duration,
) -> Result<(), TransportError<T::Error>> {
    render_hand(hand, time);
    hand.submit(timeout).await?;

    render_heart(heart, time);
    let heart_sent = heart.transmit().await;

    let hand_done = hand.wait_result(timeout).await;
    match (heart_sent, hand_done) {
        (Err(err), Err(_dropped)) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("hand collect also failed: {}", defmt::Debug2Format(&_dropped));
            Err(err)
        }
        (heart_sent, hand_done) => heart_sent.and(hand_done),
    }
}
