//! Polling state machine that keeps the display transform in step with
//! the sensor.
//!
//! A cycle acts when the device latches a new orientation event that
//! differs from the last orientation acted upon, or when the periodic
//! resync finds the display showing something other than what the sensor
//! reports.

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c};
use log::{debug, error, info, warn};

use crate::display::DisplayAdapter;
use crate::orientation::{decode, MountOffset, Orientation};
use crate::{Error, Mma8452q};

/// Tracker timing and mounting configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Sensor rotation relative to the display
    pub mount_offset: MountOffset,
    /// Delay between polling cycles
    pub poll_interval_ms: u32,
    /// Polling cycles from one display resync check to the next
    pub resync_cycles: u32,
    /// Delay after configuration before the first status read
    pub settle_ms: u32,
    /// Delay between the two startup status reads
    pub reread_ms: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            mount_offset: MountOffset::NONE,
            poll_interval_ms: 1000,
            resync_cycles: 300,
            settle_ms: 1000,
            reread_ms: 200,
        }
    }
}

/// Tracker state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrackerState {
    /// Last orientation a rotation command was issued for
    pub current: Orientation,
    /// Cycles left until the next resync check, 0 means check now;
    /// a check re-arms it to `resync_cycles` before the cycle's decrement
    pub resync_countdown: u32,
}

/// Why a rotation command was issued
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The device latched a new orientation
    Event,
    /// Periodic check found the display out of step
    Resync,
}

/// Outcome of a single polling cycle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cycle {
    /// Nothing to do, display stays at the contained orientation
    Steady(Orientation),
    /// Rotation command issued
    Rotated {
        /// Orientation before the command
        from: Orientation,
        /// Orientation the display was rotated to
        to: Orientation,
        /// What caused the command
        trigger: Trigger,
    },
    /// Rotation command for the contained orientation failed
    ApplyFailed(Orientation),
    /// Status read failed, cycle skipped
    BusFault,
}

/// Orientation tracker
pub struct OrientationTracker<I2C, D, DELAY> {
    dev: Mma8452q<I2C>,
    display: D,
    delay: DELAY,
    config: TrackerConfig,
    state: TrackerState,
}

impl<I2C, E, D, DELAY> OrientationTracker<I2C, D, DELAY>
where
    I2C: I2c + ErrorType<Error = E>,
    E: Debug,
    D: DisplayAdapter,
    DELAY: DelayNs,
{
    /// Configure the device, settle, read the initial orientation and
    /// rotate the display to it.
    ///
    /// The first status read is discarded since it may carry an event
    /// latched before configuration. Any bus error is returned; a failing
    /// display only gets logged.
    pub fn start(
        mut dev: Mma8452q<I2C>,
        mut display: D,
        mut delay: DELAY,
        config: TrackerConfig,
    ) -> Result<Self, Error<E>> {
        dev.configure()?;
        delay.delay_ms(config.settle_ms);

        dev.read_orientation_status()?;
        delay.delay_ms(config.reread_ms);
        let raw = dev.read_orientation_status()?;
        let (_, orientation) = decode(raw, config.mount_offset);

        info!("initial orientation: {}", orientation);
        if let Err(e) = display.apply_transform(orientation) {
            error!("initial rotation to {} failed: {:?}", orientation, e);
        }

        Ok(OrientationTracker {
            dev,
            display,
            delay,
            config,
            state: TrackerState {
                current: orientation,
                resync_countdown: 0,
            },
        })
    }

    /// Run one polling cycle
    pub fn poll(&mut self) -> Cycle {
        let raw = match self.dev.read_orientation_status() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("orientation status read failed, skipping cycle: {:?}", e);
                return Cycle::BusFault;
            }
        };
        let (is_new, orientation) = decode(raw, self.config.mount_offset);
        debug!("PL_STATUS {:#04x}: {} (new: {})", raw, orientation, is_new);

        let mut trigger = None;
        if is_new {
            info!(
                "orientation changed from {} to {}",
                self.state.current, orientation
            );
            if orientation != self.state.current {
                trigger = Some(Trigger::Event);
            }
        }

        if self.state.resync_countdown == 0 {
            self.state.resync_countdown = self.config.resync_cycles;
            if trigger.is_none() {
                trigger = self.resync_check(orientation);
            }
        }
        self.state.resync_countdown = self.state.resync_countdown.saturating_sub(1);

        let trigger = match trigger {
            Some(trigger) => trigger,
            None => return Cycle::Steady(self.state.current),
        };

        match self.display.apply_transform(orientation) {
            Ok(()) => {
                let from = self.state.current;
                self.state.current = orientation;
                info!("rotated display {} -> {} ({:?})", from, orientation, trigger);
                Cycle::Rotated {
                    from,
                    to: orientation,
                    trigger,
                }
            }
            Err(e) => {
                error!("rotation to {} failed: {:?}", orientation, e);
                Cycle::ApplyFailed(orientation)
            }
        }
    }

    fn resync_check(&mut self, orientation: Orientation) -> Option<Trigger> {
        match self.display.current_transform() {
            Ok(shown) if shown != orientation => {
                info!("resync: display shows {}, sensor reports {}", shown, orientation);
                Some(Trigger::Resync)
            }
            Ok(_) => {
                debug!("resync: display in step");
                None
            }
            Err(e) => {
                warn!("display query failed, resync postponed: {:?}", e);
                None
            }
        }
    }

    /// Poll forever at the configured interval
    pub fn run(mut self) -> ! {
        loop {
            self.poll();
            self.delay.delay_ms(self.config.poll_interval_ms);
        }
    }

    /// Current tracker state
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Tracker configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Display adapter
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Destroy tracker instance, return the driver and display adapter
    pub fn destroy(self) -> (Mma8452q<I2C>, D) {
        (self.dev, self.display)
    }
}
