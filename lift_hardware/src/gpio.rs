//! Raspberry Pi GPIO backends (BCM pin numbering).

use rppal::gpio::{Gpio, InputPin, Level, OutputPin, Trigger};

use lift_traits::Actuator;

use crate::error::{HwError, Result};
use crate::util::logical_level;
use crate::EdgeSink;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

fn output_low(gpio: &Gpio, pin: u8) -> Result<OutputPin> {
    Ok(gpio.get(pin).map_err(gpio_err)?.into_output_low())
}

/// One output per floor indicator; used by the timed-step drive.
pub struct GpioIndicatorActuator {
    pins: Vec<OutputPin>,
}

impl GpioIndicatorActuator {
    /// `pins[i]` drives the indicator of floor `i + 1`. All start off.
    pub fn new(pins: &[u8]) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        let pins = pins
            .iter()
            .map(|p| output_low(&gpio, *p))
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(count = pins.len(), "indicator outputs ready");
        Ok(Self { pins })
    }

    fn write(&mut self, floor: u8, on: bool) -> Result<()> {
        let pin = usize::from(floor)
            .checked_sub(1)
            .and_then(|i| self.pins.get_mut(i))
            .ok_or(HwError::NoSuchIndicator(floor))?;
        if on {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Ok(())
    }
}

impl Actuator for GpioIndicatorActuator {
    // The timed-step car has no motor lines; movement is only shown.
    fn drive_up(&mut self) -> std::result::Result<(), BoxError> {
        Ok(())
    }
    fn drive_down(&mut self) -> std::result::Result<(), BoxError> {
        Ok(())
    }
    fn stop(&mut self) -> std::result::Result<(), BoxError> {
        Ok(())
    }
    fn set_indicator(&mut self, floor: u8, on: bool) -> std::result::Result<(), BoxError> {
        self.write(floor, on)?;
        Ok(())
    }
}

/// Up/down motor relay lines for the feedback drive.
///
/// The two lines are never asserted together: the opposite line is released
/// before a direction is asserted, and both are released on stop and drop.
pub struct GpioMotorActuator {
    up: OutputPin,
    down: OutputPin,
}

impl GpioMotorActuator {
    pub fn new(up_pin: u8, down_pin: u8) -> Result<Self> {
        if up_pin == down_pin {
            return Err(HwError::Interlock);
        }
        let gpio = Gpio::new().map_err(gpio_err)?;
        Ok(Self {
            up: output_low(&gpio, up_pin)?,
            down: output_low(&gpio, down_pin)?,
        })
    }

    fn release(&mut self) {
        self.up.set_low();
        self.down.set_low();
    }
}

impl Drop for GpioMotorActuator {
    fn drop(&mut self) {
        self.release();
    }
}

impl Actuator for GpioMotorActuator {
    fn drive_up(&mut self) -> std::result::Result<(), BoxError> {
        self.down.set_low();
        self.up.set_high();
        tracing::debug!("motor up");
        Ok(())
    }
    fn drive_down(&mut self) -> std::result::Result<(), BoxError> {
        self.up.set_low();
        self.down.set_high();
        tracing::debug!("motor down");
        Ok(())
    }
    fn stop(&mut self) -> std::result::Result<(), BoxError> {
        self.release();
        tracing::debug!("motor stop");
        Ok(())
    }
    // Position is published as a notification instead.
    fn set_indicator(&mut self, _floor: u8, _on: bool) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

/// Interrupt-driven watcher for sensor inputs.
///
/// Every level change is forwarded raw (undebounced) to the sink as
/// `(pin, active)`. Interrupts stay registered until the watcher is dropped.
pub struct SensorWatcher {
    _pins: Vec<InputPin>,
}

impl SensorWatcher {
    pub fn watch(pins: &[u8], active_low: bool, sink: EdgeSink) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        let mut inputs = Vec::with_capacity(pins.len());
        for &pin in pins {
            let raw = gpio.get(pin).map_err(gpio_err)?;
            let mut input = if active_low {
                raw.into_input_pullup()
            } else {
                raw.into_input_pulldown()
            };
            // Report the current level so a car parked on a sensor is seen.
            sink(pin, logical_level(input.is_high(), active_low));
            let s = sink.clone();
            input
                .set_async_interrupt(Trigger::Both, move |level: Level| {
                    s(pin, logical_level(level == Level::High, active_low));
                })
                .map_err(gpio_err)?;
            inputs.push(input);
        }
        tracing::info!(count = inputs.len(), active_low, "sensor interrupts armed");
        Ok(Self { _pins: inputs })
    }
}
