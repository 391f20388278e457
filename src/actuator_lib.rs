use std::cell::RefCell;
use std::rc::Rc;
use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, info};

use crate::data_structure::DriverEvent;

/// Per-channel servo capability: bind the channel, then command angles on it.
///
/// Neither operation can fail; validity of the pin and of the physical output
/// is owned by the implementation, not by the control logic.
pub trait ServoDriver {
    fn attach(&mut self, pin: u8);
    fn write(&mut self, angle: u8);
}

/// Blocking timing collaborator. The pause stalls the whole process; nothing
/// else runs in the meantime.
pub trait Clock {
    fn pause(&mut self, duration: Duration);
}

/// Logical reference to one controllable output: a pin assignment plus the
/// driver that owns the channel. The current angle lives in the driver, not
/// here.
pub struct ServoHandle<D: ServoDriver> {
    pin: u8,
    driver: D,
}

impl<D: ServoDriver> ServoHandle<D> {
    pub fn new(driver: D, pin: u8) -> Self {
        Self { pin, driver }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Bind the driver to this handle's designated pin.
    pub fn attach(&mut self) {
        self.driver.attach(self.pin);
    }

    pub fn command(&mut self, angle: u8) {
        self.driver.write(angle);
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

//#region drivers

/// The shipped backend. Stands in for the physical servo channel and reports
/// every command through the log; a PWM-backed driver would implement the
/// same trait.
#[derive(Debug, Default)]
pub struct SimulatedServo {
    pin: Option<u8>,
    angle: Option<u8>,
}

impl SimulatedServo {
    pub fn pin(&self) -> Option<u8> {
        self.pin
    }

    /// Last commanded angle, `None` until the first command arrives.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}

impl ServoDriver for SimulatedServo {
    fn attach(&mut self, pin: u8) {
        self.pin = Some(pin);
        info!(pin, "servo attached");
    }

    fn write(&mut self, angle: u8) {
        self.angle = Some(angle);
        match self.pin {
            Some(pin) => debug!(pin, angle, "angle commanded"),
            None => debug!(angle, "angle commanded on unbound servo"),
        }
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn pause(&mut self, duration: Duration) {
        sleep(duration);
    }
}

//#endregion

//#region recording doubles

/// Shared event log for the recording doubles. Single-threaded by design, so
/// `Rc<RefCell<..>>` is enough.
pub type TraceLog = Rc<RefCell<Vec<DriverEvent>>>;

pub fn trace_log() -> TraceLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Test double: appends every attach and write to a shared log so a whole
/// pass can be checked command by command without hardware.
pub struct RecordingServo {
    pin: Option<u8>,
    log: TraceLog,
}

impl RecordingServo {
    pub fn new(log: &TraceLog) -> Self {
        Self {
            pin: None,
            log: Rc::clone(log),
        }
    }
}

impl ServoDriver for RecordingServo {
    fn attach(&mut self, pin: u8) {
        self.pin = Some(pin);
        self.log.borrow_mut().push(DriverEvent::Attach { pin });
    }

    fn write(&mut self, angle: u8) {
        let pin = self.pin.expect("write before attach");
        self.log.borrow_mut().push(DriverEvent::Command { pin, angle });
    }
}

/// Test double for the timing collaborator: records the pause instead of
/// sleeping, into the same log as the servo events so interleaving is
/// visible.
pub struct RecordingClock {
    log: TraceLog,
}

impl RecordingClock {
    pub fn new(log: &TraceLog) -> Self {
        Self { log: Rc::clone(log) }
    }
}

impl Clock for RecordingClock {
    fn pause(&mut self, duration: Duration) {
        self.log.borrow_mut().push(DriverEvent::Pause {
            millis: duration.as_millis() as u64,
        });
    }
}

//#endregion

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_servo_tracks_pin_and_last_angle() {
        let mut servo = SimulatedServo::default();
        assert_eq!(servo.pin(), None);
        assert_eq!(servo.angle(), None);

        servo.attach(27);
        servo.write(45);
        servo.write(50);

        assert_eq!(servo.pin(), Some(27));
        assert_eq!(servo.angle(), Some(50));
    }

    #[test]
    fn handle_binds_its_designated_pin() {
        let mut handle = ServoHandle::new(SimulatedServo::default(), 13);
        assert_eq!(handle.pin(), 13);

        handle.attach();
        handle.command(90);

        assert_eq!(handle.driver().pin(), Some(13));
        assert_eq!(handle.driver().angle(), Some(90));
    }

    #[test]
    fn recording_doubles_share_one_ordered_log() {
        let log = trace_log();
        let mut servo = RecordingServo::new(&log);
        let mut clock = RecordingClock::new(&log);

        servo.attach(14);
        servo.write(0);
        clock.pause(Duration::from_millis(20));
        servo.write(5);

        assert_eq!(
            *log.borrow(),
            vec![
                DriverEvent::Attach { pin: 14 },
                DriverEvent::Command { pin: 14, angle: 0 },
                DriverEvent::Pause { millis: 20 },
                DriverEvent::Command { pin: 14, angle: 5 },
            ]
        );
    }
}
