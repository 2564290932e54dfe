#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#[macro_use]
extern crate alloc;

use esp_backtrace as _;
use esp_println::println;

use tft_touch::{BitBangBus, Calibration, Resolution, Rotation, TouchConfig, Xpt2046};

use esp_hal::{
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    main,
    rtc_cntl::Rtc,
    spi::{
        Mode,
        master::{Config, Spi},
    },
    time::Rate,
    timer::timg::TimerGroup,
};

// Display driver imports
use embedded_graphics::{
    mono_font::{MonoTextStyleBuilder, ascii::FONT_6X9},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
    text::Text,
};
use embedded_hal_bus::spi::ExclusiveDevice;
use mipidsi::interface::SpiInterface;
use mipidsi::options::{Orientation, Rotation as DisplayRotation};
use mipidsi::{Builder, models::ILI9341Rgb565, options::ColorInversion};

// Constants
const DISPLAY_WIDTH: u16 = 320;
const DISPLAY_HEIGHT: u16 = 240;
/// Touches in this strip along the top edge clear the canvas
const TOOLBAR_HEIGHT: u16 = 20;
const BRUSH_DIAMETER: u32 = 6;
const POLL_INTERVAL_MS: u32 = 10;

// Panel specific, measured with the raw readout printed below
const TOUCH_CALIBRATION: Calibration = Calibration::new(230, 3850, 300, 3800);

esp_bootloader_esp_idf::esp_app_desc!();

#[main]
fn main() -> ! {
    // ========================================
    // SYSTEM INITIALIZATION
    // ========================================
    println!("start!");
    esp_alloc::heap_allocator!(size: 32 * 1024);

    let peripherals = esp_hal::init(esp_hal::Config::default());
    let mut delay = Delay::new();

    println!("Disable the RTC and TIMG watchdog timers");
    let mut rtc = Rtc::new(peripherals.LPWR);
    let timer_group0 = TimerGroup::new(peripherals.TIMG0);
    let mut wdt0 = timer_group0.wdt;
    rtc.swd.disable();
    rtc.rwdt.disable();
    wdt0.disable();

    // ========================================
    // DISPLAY SETUP
    // ========================================
    let cs_output = Output::new(peripherals.GPIO14, Level::High, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO22, Level::Low, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO15, Level::Low, OutputConfig::default());
    let _backlight = Output::new(peripherals.GPIO23, Level::High, OutputConfig::default());

    println!("Setup SPI interface");
    let spi = Spi::new(
        peripherals.SPI2,
        Config::default()
            .with_frequency(Rate::from_mhz(40))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(peripherals.GPIO1)
    .with_mosi(peripherals.GPIO2)
    .with_miso(peripherals.GPIO3);

    let spi_device = ExclusiveDevice::new_no_delay(spi, cs_output).unwrap();

    println!("Initialize display driver");
    let mut buffer = [0_u8; 512];
    let di = SpiInterface::new(spi_device, dc, &mut buffer);

    let mut display = Builder::new(ILI9341Rgb565, di)
        .reset_pin(rst)
        .invert_colors(ColorInversion::Normal)
        .color_order(mipidsi::options::ColorOrder::Bgr)
        .orientation(Orientation::new().rotate(DisplayRotation::Deg90))
        .init(&mut delay)
        .unwrap();

    clear_canvas(&mut display).unwrap();

    // ========================================
    // TOUCH DRIVER SETUP
    // ========================================
    println!("Setup touch driver");
    let touch_cs = Output::new(peripherals.GPIO4, Level::High, OutputConfig::default());
    let touch_clk = Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default());
    let touch_din = Output::new(peripherals.GPIO6, Level::Low, OutputConfig::default());
    let touch_dout = Input::new(
        peripherals.GPIO7,
        InputConfig::default().with_pull(Pull::None),
    );

    let config = TouchConfig::default()
        .with_calibration(TOUCH_CALIBRATION)
        .with_resolution(Resolution::new(DISPLAY_WIDTH, DISPLAY_HEIGHT))
        .with_rotation(Rotation::Rotate90);

    let Ok(bus) = BitBangBus::new(touch_cs, touch_clk, touch_din, touch_dout);
    let mut touch = Xpt2046::with_config(bus, Delay::new(), config);

    let text_style = MonoTextStyleBuilder::new()
        .font(&FONT_6X9)
        .text_color(Rgb565::WHITE)
        .background_color(Rgb565::BLUE)
        .build();
    let brush = PrimitiveStyle::with_fill(Rgb565::YELLOW);
    let toolbar_zones = u32::from(TOOLBAR_HEIGHT) * u32::from(DISPLAY_WIDTH);

    // ========================================
    // MAIN APPLICATION LOOP
    // ========================================
    loop {
        delay.delay_millis(POLL_INTERVAL_MS);

        let Ok(pressed) = touch.pressed();
        if !pressed {
            continue;
        }

        println!(
            "Touch: raw=({}, {}) x={} y={} zone={}",
            touch.raw_x(),
            touch.raw_y(),
            touch.x(),
            touch.y(),
            touch.zone()
        );

        if touch.zone() < toolbar_zones {
            clear_canvas(&mut display).unwrap();
            continue;
        }

        Circle::with_center(
            Point::new(i32::from(touch.x()), i32::from(touch.y())),
            BRUSH_DIAMETER,
        )
        .into_styled(brush)
        .draw(&mut display)
        .unwrap();

        let status = format!("x={:3} y={:3}", touch.x(), touch.y());
        Text::new(status.as_str(), Point::new(200, 13), text_style)
            .draw(&mut display)
            .unwrap();
    }
}

fn clear_canvas<T: DrawTarget<Color = Rgb565>>(display: &mut T) -> Result<(), T::Error> {
    display.clear(Rgb565::BLACK)?;

    Rectangle::new(
        Point::zero(),
        Size::new(u32::from(DISPLAY_WIDTH), u32::from(TOOLBAR_HEIGHT)),
    )
    .into_styled(PrimitiveStyle::with_fill(Rgb565::BLUE))
    .draw(display)?;

    let label = MonoTextStyleBuilder::new()
        .font(&FONT_6X9)
        .text_color(Rgb565::WHITE)
        .build();
    Text::new("tap here to clear", Point::new(6, 13), label).draw(display)?;

    Ok(())
}
