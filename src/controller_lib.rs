use std::time::{Duration, Instant};

use tracing::info;

use crate::actuator_lib::{Clock, ServoDriver, ServoHandle};

pub const SERVO_COUNT: usize = 4;
/// Output channel per servo, in index order. Fixed wiring, not configurable.
pub const SERVO_PINS: [u8; SERVO_COUNT] = [14, 37, 27, 13];

pub const ANGLE_MIN: u8 = 0;
pub const ANGLE_MAX: u8 = 180;
pub const STEP_DEGREES: u8 = 5;
pub const STEP_PAUSE: Duration = Duration::from_millis(20);

/// Angle plan for one full cycle of a single servo: up 0..=180, then back
/// down to 0, in 5 degree steps. The 180 peak appears once, so a cycle is 37
/// ascending plus 36 descending commands.
pub fn cycle_angles() -> Vec<u8> {
    let ascending: Vec<u8> = (ANGLE_MIN..=ANGLE_MAX)
        .step_by(usize::from(STEP_DEGREES))
        .collect();
    let mut plan = ascending.clone();
    plan.extend(ascending.into_iter().rev().skip(1));
    plan
}

/// Drives the four servos through the sweep pattern, one servo at a time.
///
/// Open loop: commands go out, nothing comes back. The only state is which
/// servo is currently sweeping, and that is a local of the pass loop.
pub struct SweepController<D: ServoDriver, C: Clock> {
    servos: [ServoHandle<D>; SERVO_COUNT],
    clock: C,
}

impl<D: ServoDriver, C: Clock> SweepController<D, C> {
    /// Pair each driver with its designated pin, in index order.
    pub fn new(drivers: [D; SERVO_COUNT], clock: C) -> Self {
        let [d0, d1, d2, d3] = drivers;
        let [p0, p1, p2, p3] = SERVO_PINS;
        let servos = [
            ServoHandle::new(d0, p0),
            ServoHandle::new(d1, p1),
            ServoHandle::new(d2, p2),
            ServoHandle::new(d3, p3),
        ];
        Self { servos, clock }
    }

    /// One-time binding phase. Call once at startup; repeated calls are not
    /// guarded.
    pub fn init(&mut self) {
        for servo in &mut self.servos {
            servo.attach();
        }
        info!(servos = SERVO_COUNT, "sweep controller initialized");
    }

    /// One full pass: each servo in index order runs its complete up/down
    /// cycle, with a blocking pause after every command, before the next
    /// servo starts moving.
    pub fn run_pass(&mut self) {
        let plan = cycle_angles();
        for servo in &mut self.servos {
            for &angle in &plan {
                servo.command(angle);
                self.clock.pause(STEP_PAUSE);
            }
        }
    }

    /// Steady state: repeat passes until the process is killed.
    pub fn run(&mut self) -> ! {
        let mut pass = 0u64;
        loop {
            let started = Instant::now();
            self.run_pass();
            pass += 1;
            info!(
                pass,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "sweep pass complete"
            );
        }
    }

    pub fn servos(&self) -> &[ServoHandle<D>; SERVO_COUNT] {
        &self.servos
    }
}
