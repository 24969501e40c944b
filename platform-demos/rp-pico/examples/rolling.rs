//! Rolling demo for two chained 32x8 HT1632 LED matrix modules ("0832" boards)
//! This example is for the Raspberry Pico with the rp2040 chip
//!
//! Pin layout and connection for this example
//!
//! module  | Pico pin |  Pico function       | purpose
//!  WR       pin 4      GP2 (gpio2)           shared clock, data is taken on the rising edge
//!  DATA     pin 5      GP3 (gpio3)           shared serial data line
//!  CS1      pin 6      GP4 (gpio4)           chip select of the left module (master)
//!  CS2      pin 7      GP5 (gpio5)           chip select of the right module (slave)
//!  VCC      pin 40     VBUS                  the modules want 5V
//!  GND      pin 38     GND
//!
//! The demo cycles through scrolling text, a bouncing circle, a bouncing line and
//! the game of life (which uses the shadow buffer to remember the last generation).

#![deny(unsafe_code)]
#![deny(warnings)]
#![no_std]
#![no_main]

use panic_halt as _;
use cortex_m_rt::entry;
use rp_pico as bsp;
use bsp::hal::{
    gpio::DynPin,
    pac,
    sio::Sio,
    watchdog::Watchdog,
};

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

use ht1632::{Buffer, Config, MatrixDisplay, Role, Toolbox};

const DISPLAYS: usize = 2;
const SYSTEM_CLOCK: u32 = 125_000_000;
// every demo runs this many frames
const FRAMES: usize = 150;

type Matrix = MatrixDisplay<DynPin, DynPin, DynPin, cortex_m::delay::Delay, DISPLAYS>;
type Tools<'a> = Toolbox<'a, DynPin, DynPin, DynPin, cortex_m::delay::Delay, DISPLAYS>;

fn pause(ms: u32) {
    cortex_m::asm::delay(SYSTEM_CLOCK / 1000 * ms);
}

fn output(mut pin: DynPin) -> DynPin {
    pin.into_push_pull_output();
    pin
}

fn demo_text(toolbox: &mut Tools) {
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    let width = toolbox.width() as i32;
    for x in (-60..width).rev() {
        toolbox.clear(false).unwrap();
        Text::with_baseline("Hello HT1632", Point::new(x, 0), style, Baseline::Top)
            .draw(toolbox)
            .unwrap();
        toolbox.sync().unwrap();
        pause(40);
    }
}

fn demo_bouncy_circle(toolbox: &mut Tools) {
    let (mut x, mut y, mut dx, mut dy) = (3, 3, 1, 1);
    let radius = 3;
    for _ in 0..FRAMES {
        toolbox.clear(false).unwrap();
        toolbox.draw_circle(x, y, radius, true).unwrap();
        toolbox.sync().unwrap();

        if x + dx < 0 || x + dx >= toolbox.width() as i32 {
            dx = -dx;
        }
        if y + dy < 0 || y + dy >= toolbox.height() as i32 {
            dy = -dy;
        }
        x += dx;
        y += dy;
        pause(60);
    }
}

fn demo_bouncy_line(toolbox: &mut Tools) {
    let right = toolbox.width() as i32 - 1;
    let (mut top, mut dt) = (0, 1);
    for _ in 0..FRAMES {
        toolbox.clear(false).unwrap();
        toolbox.draw_line(top, 0, right - top, 7, true).unwrap();
        toolbox.sync().unwrap();

        if top + dt < 0 || top + dt > right {
            dt = -dt;
        }
        top += dt;
        pause(30);
    }
}

fn demo_life(toolbox: &mut Tools) {
    toolbox.clear(false).unwrap();
    // an "acorn", grows for quite a while
    for (x, y) in [(10, 3), (12, 4), (9, 5), (10, 5), (13, 5), (14, 5), (15, 5)] {
        toolbox.set_pixel(x, y, true, false).unwrap();
    }
    toolbox.sync().unwrap();
    pause(1000);

    let (width, height) = (toolbox.width() as i32, toolbox.height() as i32);
    for _ in 0..FRAMES {
        toolbox.display().copy_snapshot();
        for x in 0..width {
            for y in 0..height {
                let mut neighbours = 0;
                for (dx, dy) in [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)] {
                    if toolbox.get_pixel(x + dx, y + dy, Buffer::Shadow).unwrap() {
                        neighbours += 1;
                    }
                }
                let alive = match neighbours {
                    2 => toolbox.get_pixel(x, y, Buffer::Shadow).unwrap(),
                    3 => true,
                    _ => false,
                };
                toolbox.set_pixel(x, y, alive, false).unwrap();
            }
        }
        toolbox.display().flush().unwrap();
        pause(100);
    }
}

#[entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let core = pac::CorePeripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    let _clocks = bsp::hal::clocks::init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let sio = Sio::new(pac.SIO);
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // the driver wants one pin type for all chip selects, so every pin is made dynamic
    let clk = output(pins.gpio2.into());
    let data = output(pins.gpio3.into());
    let cs_left = output(pins.gpio4.into());
    let cs_right = output(pins.gpio5.into());

    // the rp2040 toggles pins way faster than the HT1632 can follow
    let delay = cortex_m::delay::Delay::new(core.SYST, SYSTEM_CLOCK);

    let mut matrix: Matrix =
        MatrixDisplay::new(clk, data, delay, Config::default().with_shadow(true)).unwrap();
    matrix.init_display(0, cs_left, Role::Master).unwrap();
    matrix.init_display(1, cs_right, Role::Slave).unwrap();

    let mut toolbox = Toolbox::new(&mut matrix);
    toolbox.set_brightness(8).unwrap();

    loop {
        demo_text(&mut toolbox);
        demo_bouncy_circle(&mut toolbox);
        demo_bouncy_line(&mut toolbox);
        demo_life(&mut toolbox);
    }
}
