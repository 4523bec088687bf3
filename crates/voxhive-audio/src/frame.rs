use std::time::Instant;

/// One fixed-size batch of samples copied out of the driver callback.
/// Never mutated after creation; owned by the capture side until the
/// segmenter consumes it.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    pub timestamp: Instant,
}

impl AudioFrame {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            timestamp: Instant::now(),
        }
    }
}
