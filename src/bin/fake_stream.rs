//! Writes a synthetic activation-frame stream, for exercising the player
//! end to end: `fake_stream | roll2midi`.
//!
//! Frame timestamps advance by a random step while the wall-clock sleep
//! between writes is jittered, so arrival time and frame time drift apart
//! the way a live transcription stream's would.

use rand::Rng;
use roll2midi::FrameCodec;
use std::io::Write;
use std::time::Duration;

const N_NOTES: usize = 88;
const STEPS: [f64; 3] = [0.25, 0.5, 1.0];

fn main() -> std::io::Result<()> {
    let mut out: Box<dyn Write> = match std::env::args().nth(1) {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    let codec = FrameCodec::new(N_NOTES);
    let mut rng = rand::thread_rng();
    let mut timestamp = 1000.0;

    loop {
        let activations: Vec<f32> = (0..N_NOTES)
            .map(|_| if rng.gen_bool(0.01) { 1.0 } else { 0.0 })
            .collect();
        out.write_all(&codec.encode(timestamp, &activations))?;
        out.flush()?;

        let step = STEPS[rng.gen_range(0..STEPS.len())];
        timestamp += step;
        let jitter: f64 = rng.gen_range(-0.5..0.5);
        std::thread::sleep(Duration::from_secs_f64((step + jitter).max(0.0)));
    }
}
