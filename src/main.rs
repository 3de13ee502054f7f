use std::time::Duration;

use elevator_dispatch::logging::init_logging;
use elevator_dispatch::util::{random_direction, random_floor};
use elevator_dispatch::{Direction, ElevatorSystem, SystemError};
use tokio::time::sleep;
use tracing::info;

// Random hall calls issued after the scripted part
const RANDOM_CALLS: usize = 3;

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    if let Err(e) = init_logging() {
        eprintln!("logging disabled: {}", e);
    }

    let system = ElevatorSystem::new(["A", "B"])?;

    system.request_elevator(3, Direction::Up);
    system.request_elevator(5, Direction::Down);

    sleep(Duration::from_millis(2500)).await;
    system.send_internal_request(7, "A")?;

    for _ in 0..RANDOM_CALLS {
        let floor = random_floor();
        system.request_elevator(floor, random_direction(floor));
    }

    sleep(Duration::from_secs(15)).await;
    for elevator in system.elevators() {
        info!("{}", elevator);
    }

    system.shutdown();
    system.join().await;
    Ok(())
}
