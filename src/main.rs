use servo_sweep::actuator_lib::{SimulatedServo, SystemClock};
use servo_sweep::controller_lib::SweepController;

// init once, then loop forever
fn main() {
    tracing_subscriber::fmt::init();

    let drivers = [
        SimulatedServo::default(),
        SimulatedServo::default(),
        SimulatedServo::default(),
        SimulatedServo::default(),
    ];
    let mut controller = SweepController::new(drivers, SystemClock);

    controller.init();
    controller.run();
}
