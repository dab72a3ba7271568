/// Metadata of one displayed frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Seconds accumulated up to and including this frame.
    pub elapsed_s: f64,
}

/// Turns the host's per-refresh callbacks into a monotonic frame sequence.
///
/// The host owns the display clock, so `dt` is whatever it measured; values
/// that are negative or not finite count as zero.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    next_index: u64,
    elapsed_s: f64,
    last: Option<Frame>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt_s: f64) -> Frame {
        let dt_s = if dt_s.is_finite() && dt_s > 0.0 {
            dt_s
        } else {
            0.0
        };
        self.elapsed_s += dt_s;
        let frame = Frame {
            index: self.next_index,
            dt_s,
            elapsed_s: self.elapsed_s,
        };
        self.next_index += 1;
        self.last = Some(frame);
        frame
    }

    /// The most recent frame, or frame zero before the first refresh.
    pub fn current(&self) -> Frame {
        self.last.unwrap_or(Frame {
            index: 0,
            dt_s: 0.0,
            elapsed_s: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::FrameClock;

    #[test]
    fn frames_are_numbered_and_accumulate_time() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.current().index, 0);

        let f0 = clock.advance(0.5);
        let f1 = clock.advance(0.25);
        assert_eq!((f0.index, f1.index), (0, 1));
        assert_eq!(f1.elapsed_s, 0.75);
        assert_eq!(clock.current(), f1);
    }

    #[test]
    fn bad_deltas_count_as_zero() {
        let mut clock = FrameClock::new();
        clock.advance(1.0);
        let f = clock.advance(f64::NAN);
        assert_eq!(f.dt_s, 0.0);
        assert_eq!(clock.advance(-3.0).elapsed_s, 1.0);
    }
}
