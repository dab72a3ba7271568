/// Population a city without data (or with a zero count) is drawn as.
pub const MIN_POPULATION: u64 = 1_000;
/// Population mapped to the tallest, widest marker.
pub const MAX_POPULATION: u64 = 40_000_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const DEEP_RED: Self = Self::from_hex(0xB22222);
    pub const RED: Self = Self::from_hex(0xFF0000);
    pub const ORANGE: Self = Self::from_hex(0xFF6F00);
    pub const YELLOW: Self = Self::from_hex(0xD9FF00);
    pub const GREEN: Self = Self::from_hex(0x00FF00);
    pub const VIOLET: Self = Self::from_hex(0x8A2BE2);
    pub const CURSOR_BLUE: Self = Self::from_hex(0x0000FF);
    pub const BORDER_BLUE: Self = Self::from_hex(0x99CCFF);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Linear 0..1 channels, the layout vertex colour buffers use.
    pub fn to_rgb_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// `#RRGGBB`, for CSS and CLI output.
    pub fn css(self) -> String {
        format!("#{:06X}", self.to_hex())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub height: f64,
    pub radius: f64,
    pub color: Color,
}

/// Linear mapping from population to marker dimensions.
///
/// `norm = population / max_population`; height and radius interpolate
/// between their min and max with `norm`. Populations outside
/// `[min_population, max_population]` extrapolate unless `clamp` is set.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PopulationScale {
    pub min_population: u64,
    pub max_population: u64,
    pub min_height: f64,
    pub max_height: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub clamp: bool,
}

impl Default for PopulationScale {
    fn default() -> Self {
        Self {
            min_population: MIN_POPULATION,
            max_population: MAX_POPULATION,
            min_height: 0.01,
            max_height: 0.6,
            min_radius: 0.001,
            max_radius: 0.03,
            clamp: false,
        }
    }
}

impl PopulationScale {
    pub fn clamped() -> Self {
        Self {
            clamp: true,
            ..Self::default()
        }
    }

    /// Missing and zero populations fall back to `min_population`.
    pub fn effective_population(&self, population: Option<u64>) -> u64 {
        match population {
            Some(p) if p > 0 => p,
            _ => self.min_population,
        }
    }

    pub fn normalize(&self, population: Option<u64>) -> f64 {
        let mut pop = self.effective_population(population);
        if self.clamp {
            pop = pop.clamp(self.min_population, self.max_population);
        }
        pop as f64 / self.max_population as f64
    }

    pub fn encode(&self, population: Option<u64>) -> MarkerStyle {
        let norm = self.normalize(population);
        MarkerStyle {
            height: self.min_height + (self.max_height - self.min_height) * norm,
            radius: self.min_radius + (self.max_radius - self.min_radius) * norm,
            color: population_color(self.effective_population(population)),
        }
    }

    /// Style of the selection cursor: four times the marker height, a
    /// slightly wider base radius, always blue.
    pub fn cursor(&self, population: Option<u64>) -> MarkerStyle {
        let norm = self.normalize(population);
        MarkerStyle {
            height: (self.min_height + (self.max_height - self.min_height) * norm) * 4.0,
            radius: 0.002 + (self.max_radius - self.min_radius) * norm,
            color: Color::CURSOR_BLUE,
        }
    }
}

/// Colour bucket for a population; lower bounds are exclusive.
pub fn population_color(population: u64) -> Color {
    match population {
        p if p > 10_000_000 => Color::DEEP_RED,
        p if p > 1_000_000 => Color::RED,
        p if p > 500_000 => Color::ORANGE,
        p if p > 100_000 => Color::YELLOW,
        p if p > 1_000 => Color::GREEN,
        _ => Color::VIOLET,
    }
}

pub fn encode(population: Option<u64>) -> MarkerStyle {
    PopulationScale::default().encode(population)
}

#[cfg(test)]
mod tests {
    use super::{Color, MAX_POPULATION, PopulationScale, encode, population_color};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn megacity_is_deep_red_and_scaled() {
        let s = encode(Some(15_000_000));
        assert_eq!(s.color, Color::DEEP_RED);
        assert_close(s.height, 0.01 + 0.59 * 0.375, 1e-12);
        assert_close(s.radius, 0.001 + 0.029 * 0.375, 1e-12);
    }

    #[test]
    fn missing_population_uses_minimum_reference() {
        let s = encode(None);
        assert_eq!(s.color, Color::VIOLET);
        assert_close(s.height, 0.01 + 0.59 * 1_000.0 / 40_000_000.0, 1e-15);
        assert_eq!(encode(Some(0)), s);
        assert_eq!(encode(Some(1_000)), s);
    }

    #[test]
    fn bucket_lower_bounds_are_exclusive() {
        assert_eq!(population_color(500_001), Color::ORANGE);
        assert_eq!(population_color(500_000), Color::YELLOW);
        assert_eq!(population_color(10_000_000), Color::RED);
        assert_eq!(population_color(10_000_001), Color::DEEP_RED);
        assert_eq!(population_color(1_000_000), Color::ORANGE);
        assert_eq!(population_color(100_000), Color::GREEN);
        assert_eq!(population_color(1_001), Color::GREEN);
        assert_eq!(population_color(1_000), Color::VIOLET);
        assert_eq!(population_color(999), Color::VIOLET);
    }

    #[test]
    fn reference_endpoints_hit_min_and_max() {
        let top = encode(Some(MAX_POPULATION));
        assert_close(top.height, 0.6, 1e-12);
        assert_close(top.radius, 0.03, 1e-12);
    }

    #[test]
    fn clamping_is_opt_in() {
        let big = Some(80_000_000);
        assert_close(encode(big).height, 0.01 + 0.59 * 2.0, 1e-12);

        let clamped = PopulationScale::clamped();
        assert_close(clamped.encode(big).height, 0.6, 1e-12);
        // Colour follows the raw population either way.
        assert_eq!(clamped.encode(big).color, Color::DEEP_RED);
        assert_close(
            clamped.encode(Some(10)).height,
            clamped.encode(Some(1_000)).height,
            0.0,
        );
    }

    #[test]
    fn cursor_is_taller_and_blue() {
        let scale = PopulationScale::default();
        let c = scale.cursor(Some(15_000_000));
        assert_eq!(c.color, Color::CURSOR_BLUE);
        assert_close(c.height, (0.01 + 0.59 * 0.375) * 4.0, 1e-12);
        assert_close(c.radius, 0.002 + 0.029 * 0.375, 1e-12);
    }

    #[test]
    fn color_conversions() {
        assert_eq!(Color::ORANGE.css(), "#FF6F00");
        assert_eq!(Color::from_hex(0x99CCFF).to_hex(), 0x99CCFF);
        assert_eq!(Color::RED.to_rgb_f32(), [1.0, 0.0, 0.0]);
    }
}
