//! Frame loop simulation

use rand::Rng;
use stat_engine::StatController;

/// Shortest and longest simulated frame, in seconds (90 and 30 fps)
const MIN_FRAME: f64 = 1.0 / 90.0;
const MAX_FRAME: f64 = 1.0 / 30.0;

/// Outcome of driving a controller for a while
pub struct FrameLoop {
    pub frames: u32,
    pub simulated: f64,
}

impl FrameLoop {
    /// Tick `controller` with jittered frame times until `duration` seconds pass
    pub fn run(controller: &mut StatController, duration: f64, rng: &mut impl Rng) -> Self {
        let mut result = FrameLoop {
            frames: 0,
            simulated: 0.0,
        };

        while result.simulated < duration {
            let dt = rng
                .gen_range(MIN_FRAME..MAX_FRAME)
                .min(duration - result.simulated);
            controller.tick(dt);
            result.simulated += dt;
            result.frames += 1;
        }

        result
    }
}
