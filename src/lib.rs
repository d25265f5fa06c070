//! Platform-agnostic MMA8452Q accelerometer driver which uses I2C via
//! [embedded-hal] and implements the [`Accelerometer` trait][trait]
//! from the `accelerometer` crate, together with an orientation tracker
//! that keeps an attached display rotated to match the device.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal
//! [trait]: https://docs.rs/accelerometer/latest/accelerometer/trait.Accelerometer.html
//!

#![deny(missing_docs)]
#![deny(warnings)]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

mod reg;

#[cfg(feature = "std")]
pub mod command;
pub mod display;
pub mod orientation;
pub mod tracker;

use core::fmt::Debug;

#[cfg(feature = "out_f32")]
pub use accelerometer::vector::F32x3;
pub use accelerometer::vector::I16x3;
pub use accelerometer::{Accelerometer, Error, ErrorKind, RawAccelerometer};
use cast::u16;
use embedded_hal as hal;
use hal::i2c::{ErrorType, I2c};
#[cfg(feature = "out_f32")]
use num_traits::FromPrimitive;

use crate::reg::*;
pub use crate::reg::{FullScale, Odr, SysMode, PL_COUNT_DEFAULT};

pub use crate::display::{DisplayAdapter, Transform};
pub use crate::orientation::{decode, MountOffset, Orientation, PlStatus};
pub use crate::tracker::{Cycle, OrientationTracker, TrackerConfig, TrackerState, Trigger};

/// Possible slave addresses
pub enum SlaveAddr {
    /// Default slave address, `SA0` high
    Default,
    /// Alternative slave address providing bit value for `SA0`
    Alternative(bool),
}

impl SlaveAddr {
    fn addr(self) -> u8 {
        match self {
            SlaveAddr::Default => I2C_SAD,
            SlaveAddr::Alternative(sa0) => I2C_SAD_SA0_LOW | sa0 as u8,
        }
    }
}

/// Data status structure,
/// decoded from STATUS register
#[derive(Debug, PartialEq, Eq)]
pub struct DataStatus {
    /// ZYXOW bit
    pub zyxow: bool,
    /// (XOW, YOW, ZOW) bits
    pub xyzow: (bool, bool, bool),
    /// ZYXDR bit
    pub zyxdr: bool,
    /// (XDR, YDR, ZDR) bits
    pub xyzdr: (bool, bool, bool),
}

impl From<u8> for DataStatus {
    fn from(reg: u8) -> Self {
        DataStatus {
            zyxow: (reg & ZYXOW) != 0,
            xyzow: ((reg & XOW) != 0, (reg & YOW) != 0, (reg & ZOW) != 0),
            zyxdr: (reg & ZYXDR) != 0,
            xyzdr: ((reg & XDR) != 0, (reg & YDR) != 0, (reg & ZDR) != 0),
        }
    }
}

/// Decode one left-justified 12-bit two's complement axis value
/// from its `MSB`, `LSB` register pair
pub fn decode_accel(msb: u8, lsb: u8) -> i16 {
    let value = (((u16(msb) << 8) | u16(lsb)) >> 4) as i16;
    if value > 2047 {
        value - 4096
    } else {
        value
    }
}

/// `MMA8452Q` driver
pub struct Mma8452q<I2C> {
    /// The concrete I²C device implementation
    i2c: I2C,
    /// The I²C device slave address
    addr: u8,
    /// Current full-scale
    #[cfg(feature = "out_f32")]
    fs: FullScale,
}

impl<I2C, E> Mma8452q<I2C>
where
    I2C: I2c + ErrorType<Error = E>,
    E: Debug,
{
    /// Create a new `MMA8452Q` driver from the given `I2C` peripheral
    pub fn new(i2c: I2C, addr: SlaveAddr) -> Result<Self, Error<E>> {
        let mut dev = Self {
            i2c,
            addr: addr.addr(),
            #[cfg(feature = "out_f32")]
            fs: FullScale::G2,
        };

        // Ensure we have the correct device ID
        if dev.get_device_id()? != DEVICE_ID {
            ErrorKind::Device.err()?;
        }

        Ok(dev)
    }

    /// Destroy driver instance, return `I2C` bus instance
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// `WHO_AM_I` register
    pub fn get_device_id(&mut self) -> Result<u8, Error<E>> {
        self.read_reg(Register::WHO_AM_I).map_err(Into::into)
    }

    /// Configure the device for orientation tracking:
    /// standby, ±2 g, 6.25 Hz, portrait/landscape detection with
    /// `PL_COUNT_DEFAULT` debounce, then active.
    ///
    /// `XYZ_DATA_CFG`, the data rate and `PL_CFG` are only writable
    /// in standby, so the order matters.
    pub fn configure(&mut self) -> Result<(), Error<E>> {
        self.set_active(false)?;
        self.set_fs(FullScale::G2)?;
        self.set_odr(Odr::Hz6_25)?;
        self.enable_pl(true)?;
        self.set_pl_count(PL_COUNT_DEFAULT)?;
        self.set_active(true)?;
        Ok(())
    }

    /// Active / standby mode selection,
    /// `CTRL_REG1`: `ACTIVE`
    pub fn set_active(&mut self, active: bool) -> Result<(), Error<E>> {
        self.reg_xset_bits(Register::CTRL_REG1, ACTIVE, active)?;
        Ok(())
    }

    /// Data rate selection,
    /// `CTRL_REG1`: `DR`
    pub fn set_odr(&mut self, odr: Odr) -> Result<(), Error<E>> {
        self.modify_reg(Register::CTRL_REG1, |v| {
            (v & !DR_MASK) | ((odr as u8) << 3)
        })?;
        Ok(())
    }

    /// Full-scale selection,
    /// `XYZ_DATA_CFG`: `FS`
    pub fn set_fs(&mut self, fs: FullScale) -> Result<(), Error<E>> {
        self.modify_reg(Register::XYZ_DATA_CFG, |v| (v & !FS_MASK) | (fs as u8))?;
        #[cfg(feature = "out_f32")]
        {
            self.fs = fs;
        }
        Ok(())
    }

    /// Portrait/landscape detection enable,
    /// `PL_CFG`: `PL_EN`
    pub fn enable_pl(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.reg_xset_bits(Register::PL_CFG, PL_EN, enable)?;
        Ok(())
    }

    /// Debounce counter mode, clear the counter (`true`)
    /// or decrement it (`false`) when the condition is not met,
    /// `PL_CFG`: `DBCNTM`
    pub fn set_pl_debounce_mode(&mut self, clear: bool) -> Result<(), Error<E>> {
        self.reg_xset_bits(Register::PL_CFG, DBCNTM, clear)?;
        Ok(())
    }

    /// Debounce count,
    /// `PL_COUNT`
    pub fn set_pl_count(&mut self, count: u8) -> Result<(), Error<E>> {
        self.write_reg(Register::PL_COUNT, count)?;
        Ok(())
    }

    /// Raw portrait/landscape status,
    /// `PL_STATUS`, reading clears `NEWLP`
    pub fn read_orientation_status(&mut self) -> Result<u8, Error<E>> {
        self.read_reg(Register::PL_STATUS).map_err(Into::into)
    }

    /// Portrait/landscape status,
    /// `PL_STATUS` decoded as [`PlStatus`]
    pub fn get_pl_status(&mut self) -> Result<PlStatus, Error<E>> {
        Ok(PlStatus::from(self.read_orientation_status()?))
    }

    /// Data status,
    /// `STATUS`: as
    /// DataStatus {zyxow: `ZYXOW`, xyzow: (`XOW`, `YOW`, `ZOW`), zyxdr: `ZYXDR`, xyzdr: (`XDR`, `YDR`, `ZDR`)}
    pub fn get_status(&mut self) -> Result<DataStatus, Error<E>> {
        let reg = self.read_reg(Register::STATUS)?;
        Ok(DataStatus::from(reg))
    }

    /// Acceleration sample, 12-bit counts,
    /// `STATUS` followed by `OUT_X_MSB` .. `OUT_Z_LSB`
    pub fn read_acceleration(&mut self) -> Result<I16x3, Error<E>> {
        let mut buf = [0u8; OUT_BLOCK_LEN];
        self.read_regs(Register::STATUS, &mut buf)?;

        Ok(I16x3::new(
            decode_accel(buf[1], buf[2]),
            decode_accel(buf[3], buf[4]),
            decode_accel(buf[5], buf[6]),
        ))
    }

    /// System mode,
    /// `SYSMOD`: `SYSMOD`
    pub fn read_system_mode(&mut self) -> Result<SysMode, Error<E>> {
        let reg = self.read_reg(Register::SYSMOD)?;
        match SysMode::from_bits(reg) {
            Some(mode) => Ok(mode),
            None => Err(Error::new(ErrorKind::Device)),
        }
    }

    /// Dump registers
    #[cfg(debug_assertions)]
    pub fn dump_regs<W>(&mut self, w: &mut W) -> Result<(), Error<E>>
    where
        W: core::fmt::Write,
    {
        let regs = [
            ("SYSMOD (0Bh)", Register::SYSMOD),
            ("XYZ_DATA_CFG (0Eh)", Register::XYZ_DATA_CFG),
            ("PL_STATUS (10h)", Register::PL_STATUS),
            ("PL_CFG (11h)", Register::PL_CFG),
            ("PL_COUNT (12h)", Register::PL_COUNT),
            ("PL_BF_ZCOMP (13h)", Register::PL_BF_ZCOMP),
            ("CTRL_REG1 (2Ah)", Register::CTRL_REG1),
        ];
        for (name, reg) in regs {
            writeln!(w, "{} = {:#010b}", name, self.read_reg(reg)?).unwrap();
        }
        Ok(())
    }

    #[inline]
    fn read_reg(&mut self, reg: Register) -> Result<u8, E> {
        let mut buf = [0u8];
        self.i2c.write_read(self.addr, &[reg.addr()], &mut buf)?;
        Ok(buf[0])
    }

    #[inline]
    fn read_regs(&mut self, reg: Register, buffer: &mut [u8]) -> Result<(), E> {
        self.i2c.write_read(self.addr, &[reg.addr()], buffer)
    }

    #[inline]
    fn write_reg(&mut self, reg: Register, val: u8) -> Result<(), E> {
        self.i2c.write(self.addr, &[reg.addr(), val])
    }

    #[inline]
    fn modify_reg<F>(&mut self, reg: Register, f: F) -> Result<(), E>
    where
        F: FnOnce(u8) -> u8,
    {
        let r = self.read_reg(reg)?;
        self.write_reg(reg, f(r))?;
        Ok(())
    }

    #[inline]
    fn reg_set_bits(&mut self, reg: Register, bits: u8) -> Result<(), E> {
        self.modify_reg(reg, |v| v | bits)
    }

    #[inline]
    fn reg_reset_bits(&mut self, reg: Register, bits: u8) -> Result<(), E> {
        self.modify_reg(reg, |v| v & !bits)
    }

    #[inline]
    fn reg_xset_bits(&mut self, reg: Register, bits: u8, set: bool) -> Result<(), E> {
        if set {
            self.reg_set_bits(reg, bits)
        } else {
            self.reg_reset_bits(reg, bits)
        }
    }
}

impl<I2C, E> RawAccelerometer<I16x3> for Mma8452q<I2C>
where
    I2C: I2c + ErrorType<Error = E>,
    E: Debug,
{
    type Error = E;

    /// Get acceleration reading from the accelerometer
    fn accel_raw(&mut self) -> Result<I16x3, Error<E>> {
        self.read_acceleration()
    }
}

#[cfg(feature = "out_f32")]
impl<I2C, E> Accelerometer for Mma8452q<I2C>
where
    I2C: I2c + ErrorType<Error = E>,
    E: Debug,
{
    type Error = E;

    /// Get normalized ±g reading from the accelerometer
    fn accel_norm(&mut self) -> Result<F32x3, Error<E>> {
        let acc_raw: I16x3 = self.accel_raw()?;

        Ok(F32x3::new(
            self.fs.convert_out_i16tof32(acc_raw.x),
            self.fs.convert_out_i16tof32(acc_raw.y),
            self.fs.convert_out_i16tof32(acc_raw.z),
        ))
    }

    /// Get sample rate of accelerometer in Hz
    fn sample_rate(&mut self) -> Result<f32, Error<Self::Error>> {
        let creg1 = self.read_reg(Register::CTRL_REG1)?;
        let rate = match FromPrimitive::from_u8((creg1 & DR_MASK) >> 3) {
            Some(Odr::Hz800) => 800.0,
            Some(Odr::Hz400) => 400.0,
            Some(Odr::Hz200) => 200.0,
            Some(Odr::Hz100) => 100.0,
            Some(Odr::Hz50) => 50.0,
            Some(Odr::Hz12_5) => 12.5,
            Some(Odr::Hz6_25) => 6.25,
            Some(Odr::Hz1_56) => 1.56,
            None => 0.0,
        };
        Ok(rate)
    }
}
