#[derive(Debug, Default, Clone, Copy)]
pub struct EnergyMeter;

impl EnergyMeter {
    pub fn new() -> Self {
        Self
    }

    /// Root-mean-square energy of an i16 frame, normalized to 0.0..=1.0.
    pub fn rms(&self, frame: &[i16]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }

        let sum_squares: i64 = frame
            .iter()
            .map(|&sample| {
                let s = sample as i64;
                s * s
            })
            .sum();

        let mean_square = sum_squares as f64 / frame.len() as f64;
        (mean_square.sqrt() / 32768.0) as f32
    }
}
