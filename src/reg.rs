#![allow(non_upper_case_globals)]

#[cfg(feature = "out_f32")]
use cast::f32;
#[cfg(feature = "out_f32")]
use num_derive::FromPrimitive;

/// I2C slave address with `SA0` pulled high
pub const I2C_SAD: u8 = 0b001_1101;

/// I2C slave address with `SA0` pulled low
pub const I2C_SAD_SA0_LOW: u8 = 0b001_1100;

/// Register mapping
#[allow(dead_code)]
#[allow(non_camel_case_types)]
#[derive(Copy, Clone)]
pub enum Register {
    STATUS = 0x00,
    OUT_X_MSB = 0x01,
    OUT_X_LSB = 0x02,
    OUT_Y_MSB = 0x03,
    OUT_Y_LSB = 0x04,
    OUT_Z_MSB = 0x05,
    OUT_Z_LSB = 0x06,
    SYSMOD = 0x0B,
    WHO_AM_I = 0x0D,
    XYZ_DATA_CFG = 0x0E,
    PL_STATUS = 0x10,
    PL_CFG = 0x11,
    PL_COUNT = 0x12,
    PL_BF_ZCOMP = 0x13,
    CTRL_REG1 = 0x2A,
}

impl Register {
    /// Get register address
    pub fn addr(self) -> u8 {
        self as u8
    }
}

// === STATUS (00h) ===

pub const ZYXOW: u8 = 0b1000_0000;
pub const ZOW: u8 = 0b0100_0000;
pub const YOW: u8 = 0b0010_0000;
pub const XOW: u8 = 0b0001_0000;
pub const ZYXDR: u8 = 0b0000_1000;
pub const ZDR: u8 = 0b0000_0100;
pub const YDR: u8 = 0b0000_0010;
pub const XDR: u8 = 0b0000_0001;

/// STATUS byte followed by X, Y, Z MSB/LSB pairs
pub const OUT_BLOCK_LEN: usize = 7;

// === SYSMOD (0Bh) ===

pub const SYSMOD_MASK: u8 = 0b0000_0011;

/// System mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SysMode {
    /// Standby mode
    Standby = 0b00,
    /// Wake (active) mode
    Wake = 0b01,
    /// Sleep (auto-sleep) mode
    Sleep = 0b10,
}

impl SysMode {
    pub(crate) fn from_bits(bits: u8) -> Option<Self> {
        match bits & SYSMOD_MASK {
            0b00 => Some(SysMode::Standby),
            0b01 => Some(SysMode::Wake),
            0b10 => Some(SysMode::Sleep),
            _ => None,
        }
    }
}

// === WHO_AM_I (0Dh) ===

/// WHO_AM_I device identification register
pub const DEVICE_ID: u8 = 0x2A;

// === XYZ_DATA_CFG (0Eh) ===

pub const FS_MASK: u8 = 0b0000_0011;

/// Full-scale selection
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FullScale {
    /// ±2 g
    G2 = 0b00,
    /// ±4 g
    G4 = 0b01,
    /// ±8 g
    G8 = 0b10,
}

impl FullScale {
    #[cfg(feature = "out_f32")]
    pub(crate) fn convert_out_i16tof32(self, val: i16) -> f32 {
        // counts/g at 12-bit resolution
        let sens: f32 = match self {
            Self::G2 => 1024.0,
            Self::G4 => 512.0,
            Self::G8 => 256.0,
        };
        f32(val) / sens
    }
}

// === PL_STATUS (10h) ===

pub const NEWLP: u8 = 0b1000_0000;
pub const LO: u8 = 0b0100_0000;
pub const LAPO_MASK: u8 = 0b0000_0110;
pub const BAFRO: u8 = 0b0000_0001;

// === PL_CFG (11h) ===

pub const DBCNTM: u8 = 0b1000_0000;
pub const PL_EN: u8 = 0b0100_0000;

// === PL_COUNT (12h) ===

/// 100 ms debounce at 50 Hz sample timing
pub const PL_COUNT_DEFAULT: u8 = 0x05;

// === CTRL_REG1 (2Ah) ===

pub const DR_MASK: u8 = 0b0011_1000;
pub const ACTIVE: u8 = 0b0000_0001;

/// Output Data Rate
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "out_f32", derive(FromPrimitive))]
pub enum Odr {
    /// 800 Hz
    Hz800 = 0b000,
    /// 400 Hz
    Hz400 = 0b001,
    /// 200 Hz
    Hz200 = 0b010,
    /// 100 Hz
    Hz100 = 0b011,
    /// 50 Hz
    Hz50 = 0b100,
    /// 12.5 Hz
    Hz12_5 = 0b101,
    /// 6.25 Hz
    Hz6_25 = 0b110,
    /// 1.56 Hz
    Hz1_56 = 0b111,
}
