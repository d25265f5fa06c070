#[macro_use]
extern crate clap;

use std::process;

use clap::{App, Arg};
use linux_embedded_hal::{Delay, I2cdev};
use log::{error, info};
use mma8452q_rotate::command::{Backend, CommandDisplay};
use mma8452q_rotate::{Mma8452q, MountOffset, OrientationTracker, SlaveAddr, TrackerConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let defaults = TrackerConfig::default();
    let poll_default = defaults.poll_interval_ms.to_string();
    let resync_default = defaults.resync_cycles.to_string();
    let matches = App::new("mma8452q-rotate")
        .version(crate_version!())
        .about("Rotate the display to follow an MMA8452Q orientation sensor")
        .arg(
            Arg::with_name("bus")
                .long("bus")
                .takes_value(true)
                .default_value("/dev/i2c-1")
                .help("I2C bus device"),
        )
        .arg(
            Arg::with_name("sa0-low")
                .long("sa0-low")
                .takes_value(false)
                .help("Sensor strapped to the alternative address 0x1C"),
        )
        .arg(
            Arg::with_name("mount-offset")
                .long("mount-offset")
                .takes_value(true)
                .default_value("0")
                .help("Quarter turns between sensor and display, 0-3"),
        )
        .arg(
            Arg::with_name("backend")
                .long("backend")
                .takes_value(true)
                .possible_values(&["xrandr", "wlr-randr"])
                .default_value("xrandr")
                .help("Tool used to query and rotate the display"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .takes_value(true)
                .default_value("HDMI-1")
                .help("Display output to rotate"),
        )
        .arg(
            Arg::with_name("display")
                .long("display")
                .takes_value(true)
                .help("X display for xrandr [default: :0.0]"),
        )
        .arg(
            Arg::with_name("poll-ms")
                .long("poll-ms")
                .takes_value(true)
                .default_value(&poll_default)
                .help("Polling interval in milliseconds"),
        )
        .arg(
            Arg::with_name("resync-cycles")
                .long("resync-cycles")
                .takes_value(true)
                .default_value(&resync_default)
                .help("Polling cycles between display resync checks"),
        )
        .get_matches();

    let mount_offset = value_t!(matches, "mount-offset", u8)
        .ok()
        .and_then(MountOffset::new)
        .unwrap_or_else(|| {
            eprintln!("--mount-offset must be 0, 1, 2 or 3");
            process::exit(2);
        });
    let poll_interval_ms = value_t!(matches, "poll-ms", u32).unwrap_or_else(|e| e.exit());
    let resync_cycles = value_t!(matches, "resync-cycles", u32).unwrap_or_else(|e| e.exit());
    let config = TrackerConfig {
        mount_offset,
        poll_interval_ms,
        resync_cycles,
        ..defaults
    };

    let output = matches.value_of("output").unwrap_or("HDMI-1");
    let display = match matches.value_of("backend") {
        Some("wlr-randr") => CommandDisplay::new(Backend::WlrRandr, output),
        _ => CommandDisplay::new(Backend::Xrandr, output)
            .with_x_display(matches.value_of("display").unwrap_or(":0.0")),
    };

    let bus = matches.value_of("bus").unwrap_or("/dev/i2c-1");
    let i2c = I2cdev::new(bus).unwrap_or_else(|e| {
        eprintln!("Unable to open {}: {}", bus, e);
        process::exit(1);
    });
    let addr = if matches.is_present("sa0-low") {
        SlaveAddr::Alternative(false)
    } else {
        SlaveAddr::Default
    };
    let dev = Mma8452q::new(i2c, addr).unwrap_or_else(|e| {
        error!("MMA8452Q not found on {}: {:?}", bus, e);
        process::exit(1);
    });

    info!(
        "tracking orientation on {} via {} output {} (offset {})",
        bus,
        display.backend().program(),
        display.output(),
        mount_offset.quarter_turns()
    );
    let tracker = OrientationTracker::start(dev, display, Delay, config).unwrap_or_else(|e| {
        error!("sensor configuration failed: {:?}", e);
        process::exit(1);
    });
    tracker.run()
}
