/// Tells clicks from drags.
///
/// A release counts as a click only when it happens at exactly the position
/// of the preceding press. Any movement in between, or a release without a
/// press, is not a click.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ClickTracker {
    pressed_at: Option<[f64; 2]>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.pressed_at = Some([x, y]);
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Returns the click position when the release completes a click.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<[f64; 2]> {
        let pressed = self.pressed_at.take()?;
        (pressed == [x, y]).then_some(pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::ClickTracker;

    #[test]
    fn release_at_press_position_is_a_click() {
        let mut t = ClickTracker::new();
        t.pointer_down(120.0, 80.5);
        assert!(t.is_pressed());
        assert_eq!(t.pointer_up(120.0, 80.5), Some([120.0, 80.5]));
        assert!(!t.is_pressed());
    }

    #[test]
    fn any_movement_is_a_drag() {
        let mut t = ClickTracker::new();
        t.pointer_down(120.0, 80.0);
        assert_eq!(t.pointer_up(121.0, 80.0), None);
        t.pointer_down(120.0, 80.0);
        assert_eq!(t.pointer_up(120.0, 80.000_001), None);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut t = ClickTracker::new();
        assert_eq!(t.pointer_up(0.0, 0.0), None);

        // A press is consumed by its release.
        t.pointer_down(5.0, 5.0);
        t.pointer_up(5.0, 5.0);
        assert_eq!(t.pointer_up(5.0, 5.0), None);
    }
}
