//! Hand and heart show on two APA102 strips.
//!
//! Every 10 ms the hand frame is queued on SPI2, the heart frame is rendered
//! and sent on SPI3, and then the hand transfer is collected. Any strip
//! error stops the firmware: there is nothing useful to do without the
//! display.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_time::{
    Instant,
    Ticker,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use heartlight::{
    config::{
        FRAME_PERIOD,
        HAND,
        HEART,
        TRANSFER_TIMEOUT,
    },
    show,
    split_resources,
};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    let peripherals = heartlight::init();
    let resources = split_resources!(peripherals);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut hand = match resources.hand.into_strip(&HAND) {
        Ok(strip) => strip,
        Err(err) => defmt::panic!("hand strip init failed: {}", err),
    };
    let mut heart = match resources.heart.into_strip(&HEART) {
        Ok(strip) => strip,
        Err(err) => defmt::panic!("heart strip init failed: {}", err),
    };

    // Strips power up showing garbage.
    for strip in [&mut hand, &mut heart] {
        strip.clear();
        if let Err(err) = strip.transmit().await {
            defmt::panic!("blanking strip failed: {}", err);
        }
    }
    info!("strips blanked, show starting");

    let mut ticker = Ticker::every(FRAME_PERIOD);
    loop {
        ticker.next().await;
        let time = show::tick_at(Instant::now().duration_since(Instant::from_ticks(0)));

        if let Err(err) = show::render(&mut hand, &mut heart, time, TRANSFER_TIMEOUT).await {
            defmt::panic!("frame {} failed: {}", time, err);
        }
    }
}
