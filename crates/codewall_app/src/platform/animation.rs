use std::thread;
use std::time::{Duration, Instant};

use codewall_engine::display::SharedDisplay;
use codewall_engine::AtomicFileWriter;
use engine_logging::{engine_debug, engine_warn};

use super::page::FRAME_FILE;

/// Renders the display every `interval` for the life of the process and
/// writes each frame to `frame.png`. Idle until the display has started.
pub fn spawn(display: SharedDisplay, writer: AtomicFileWriter, interval: Duration) {
    thread::spawn(move || {
        let mut last = Instant::now();
        let mut write_failed = false;
        loop {
            thread::sleep(interval);
            let now = Instant::now();
            let delta = now - last;
            last = now;

            let frame = display.lock().expect("lock display").render_frame(delta);
            let Some(frame) = frame else {
                continue;
            };
            match writer.write_png(FRAME_FILE, &frame) {
                Ok(_) => {
                    if write_failed {
                        engine_debug!("Frame writes recovered");
                    }
                    write_failed = false;
                }
                // Warn once per run of failures.
                Err(err) if !write_failed => {
                    engine_warn!("Failed to write {}: {}", FRAME_FILE, err);
                    write_failed = true;
                }
                Err(_) => {}
            }
        }
    });
}
