#![allow(dead_code)]

pub use mma8452q_rotate::{
    Cycle, DisplayAdapter, Mma8452q, MountOffset, Orientation, OrientationTracker, SlaveAddr,
    TrackerConfig, Trigger,
};

use embedded_hal::delay::DelayNs;
use embedded_hal_mock as hal;
pub use hal::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

pub const DEV_ADDR: u8 = 0x1D;

pub fn trans_who_am_i() -> I2cTrans {
    I2cTrans::write_read(DEV_ADDR, vec![0x0D], vec![0x2A])
}

pub fn trans_pl_status(value: u8) -> I2cTrans {
    I2cTrans::write_read(DEV_ADDR, vec![0x10], vec![value])
}

/// Register traffic of `configure()` starting from reset values
pub fn trans_configure() -> Vec<I2cTrans> {
    vec![
        // CTRL_REG1: standby
        I2cTrans::write_read(DEV_ADDR, vec![0x2A], vec![0x00]),
        I2cTrans::write(DEV_ADDR, vec![0x2A, 0x00]),
        // XYZ_DATA_CFG: ±2 g
        I2cTrans::write_read(DEV_ADDR, vec![0x0E], vec![0x00]),
        I2cTrans::write(DEV_ADDR, vec![0x0E, 0x00]),
        // CTRL_REG1: DR = 6.25 Hz
        I2cTrans::write_read(DEV_ADDR, vec![0x2A], vec![0x00]),
        I2cTrans::write(DEV_ADDR, vec![0x2A, 0b0011_0000]),
        // PL_CFG: PL_EN
        I2cTrans::write_read(DEV_ADDR, vec![0x11], vec![0b1000_0000]),
        I2cTrans::write(DEV_ADDR, vec![0x11, 0b1100_0000]),
        // PL_COUNT
        I2cTrans::write(DEV_ADDR, vec![0x12, 0x05]),
        // CTRL_REG1: ACTIVE
        I2cTrans::write_read(DEV_ADDR, vec![0x2A], vec![0b0011_0000]),
        I2cTrans::write(DEV_ADDR, vec![0x2A, 0b0011_0001]),
    ]
}

/// Identification, configuration and the two startup status reads
pub fn trans_start(first: u8, second: u8) -> Vec<I2cTrans> {
    let mut trans = vec![trans_who_am_i()];
    trans.extend(trans_configure());
    trans.push(trans_pl_status(first));
    trans.push(trans_pl_status(second));
    trans
}

/// Delay that returns immediately and records what was requested
#[derive(Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Display reporting a fixed transform, recording applied ones
#[derive(Default)]
pub struct FakeDisplay {
    /// What `current_transform` reports, `None` makes the query fail
    pub shown: Option<Orientation>,
    pub applied: Vec<Orientation>,
    pub queries: usize,
    pub fail_apply: bool,
}

impl FakeDisplay {
    pub fn showing(orientation: Orientation) -> Self {
        FakeDisplay {
            shown: Some(orientation),
            ..Default::default()
        }
    }
}

impl DisplayAdapter for FakeDisplay {
    type Error = &'static str;

    fn current_transform(&mut self) -> Result<Orientation, Self::Error> {
        self.queries += 1;
        self.shown.ok_or("query failed")
    }

    fn apply_transform(&mut self, orientation: Orientation) -> Result<(), Self::Error> {
        if self.fail_apply {
            return Err("apply failed");
        }
        self.applied.push(orientation);
        Ok(())
    }
}

pub fn new_dev(trans: &[I2cTrans]) -> Mma8452q<I2cMock> {
    Mma8452q::new(I2cMock::new(trans), SlaveAddr::Default).unwrap()
}
