//! Advisory no-progress detection over raw player positions.

#[derive(Clone, Debug)]
pub struct StuckDetector {
    last_position: Option<(f64, f64)>,
    stuck_ticks: u32,
    threshold: u32,
}

impl StuckDetector {
    pub fn new(threshold: u32) -> Self {
        Self { last_position: None, stuck_ticks: 0, threshold }
    }

    /// Positions compare exactly; any change resets the counter.
    pub fn observe(&mut self, position: (f64, f64)) {
        if self.last_position == Some(position) {
            self.stuck_ticks = self.stuck_ticks.saturating_add(1);
        } else {
            self.stuck_ticks = 0;
            self.last_position = Some(position);
        }
    }

    pub fn stuck_ticks(&self) -> u32 {
        self.stuck_ticks
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck_ticks >= self.threshold
    }
}
