//! Portrait/landscape decoding of the `PL_STATUS` register.

use core::fmt;

use crate::reg::{BAFRO, LAPO_MASK, LO, NEWLP};

/// Logical display facing,
/// discriminants follow the `LAPO` code order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Equipment standing vertically in the normal orientation
    PortraitUp = 0,
    /// Equipment standing vertically in the inverted orientation
    PortraitDown = 1,
    /// Equipment is in landscape mode to the right
    LandscapeRight = 2,
    /// Equipment is in landscape mode to the left
    LandscapeLeft = 3,
}

impl Orientation {
    /// All orientations in code order
    pub const ALL: [Orientation; 4] = [
        Orientation::PortraitUp,
        Orientation::PortraitDown,
        Orientation::LandscapeRight,
        Orientation::LandscapeLeft,
    ];

    /// Orientation for a 2-bit code, higher bits are ignored
    pub fn from_code(code: u8) -> Self {
        match code & 0b11 {
            0 => Orientation::PortraitUp,
            1 => Orientation::PortraitDown,
            2 => Orientation::LandscapeRight,
            _ => Orientation::LandscapeLeft,
        }
    }

    /// 2-bit code of this orientation
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Apply the mounting offset, wrapping modulo 4
    pub fn offset_by(self, offset: MountOffset) -> Self {
        Self::from_code(self.code().wrapping_add(offset.quarter_turns()))
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            Orientation::PortraitUp => "portrait up",
            Orientation::PortraitDown => "portrait down",
            Orientation::LandscapeRight => "landscape right",
            Orientation::LandscapeLeft => "landscape left",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quarter turns between the sensor frame and the display frame
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MountOffset(u8);

impl MountOffset {
    /// Sensor mounted in the display frame
    pub const NONE: MountOffset = MountOffset(0);

    /// `None` unless `quarter_turns` is in `0..=3`
    pub fn new(quarter_turns: u8) -> Option<Self> {
        if quarter_turns < 4 {
            Some(MountOffset(quarter_turns))
        } else {
            None
        }
    }

    /// Number of quarter turns
    pub fn quarter_turns(self) -> u8 {
        self.0
    }
}

/// Portrait/landscape status,
/// decoded from PL_STATUS register
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlStatus {
    /// NEWLP bit, cleared by the read that returned it
    pub newlp: bool,
    /// LO bit, Z-tilt lockout
    pub lockout: bool,
    /// LAPO code, bits 2:1
    pub lapo: u8,
    /// BAFRO bit, set when facing back
    pub back: bool,
}

impl From<u8> for PlStatus {
    fn from(reg: u8) -> Self {
        PlStatus {
            newlp: (reg & NEWLP) != 0,
            lockout: (reg & LO) != 0,
            lapo: (reg & LAPO_MASK) >> 1,
            back: (reg & BAFRO) != 0,
        }
    }
}

/// Decode a raw `PL_STATUS` byte into (new event, orientation).
///
/// Only `NEWLP` and `LAPO` are consulted, so every byte is valid input.
pub fn decode(raw: u8, offset: MountOffset) -> (bool, Orientation) {
    let status = PlStatus::from(raw);
    (
        status.newlp,
        Orientation::from_code(status.lapo).offset_by(offset),
    )
}
