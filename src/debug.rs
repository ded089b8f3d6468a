use std::time::Instant;

use log::trace;

/// A simple RAII timer for store queries.
/// When it goes out of scope it logs the time elapsed since its creation
/// at `trace` level.
pub struct Tracer {
    name: &'static str,
    start_time: Instant,
}

impl Tracer {
    pub fn new(name: &'static str) -> Self {
        Tracer {
            name,
            start_time: Instant::now(),
        }
    }
}

impl Drop for Tracer {
    fn drop(&mut self) {
        trace!("{}: {:.2?}", self.name, self.start_time.elapsed());
    }
}
