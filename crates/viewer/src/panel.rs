use formats::CityRecord;

/// Contents of the click-to-inspect box.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoPanel {
    pub name: String,
    pub country: String,
    pub population: Option<u64>,
    /// Top-left corner in CSS pixels; `None` while the city is behind the
    /// camera.
    pub screen: Option<[f64; 2]>,
}

impl InfoPanel {
    pub fn for_city(city: &CityRecord, screen: Option<[f64; 2]>) -> Self {
        Self {
            name: city.name.clone(),
            country: city.country.clone(),
            population: city.population.filter(|&p| p > 0),
            screen,
        }
    }

    pub fn population_line(&self) -> String {
        match self.population {
            Some(p) => format!("Population: {p}"),
            None => "Population: -".to_string(),
        }
    }

    /// Text lines in display order.
    pub fn lines(&self) -> [String; 3] {
        [
            self.name.clone(),
            self.country.clone(),
            self.population_line(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::InfoPanel;
    use formats::CityRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn shows_name_country_and_population() {
        let city = CityRecord::new("Lagos", "Nigeria", 6.45, 3.4).with_population(15_388_000);
        let panel = InfoPanel::for_city(&city, Some([10.0, 20.0]));
        assert_eq!(
            panel.lines(),
            [
                "Lagos".to_string(),
                "Nigeria".to_string(),
                "Population: 15388000".to_string(),
            ]
        );
        assert_eq!(panel.screen, Some([10.0, 20.0]));
    }

    #[test]
    fn missing_or_zero_population_shows_dash() {
        let city = CityRecord::new("Somewhere", "X", 0.0, 0.0);
        let missing = InfoPanel::for_city(&city, None);
        assert_eq!(missing.population_line(), "Population: -");

        let zero = InfoPanel::for_city(&city.with_population(0), None);
        assert_eq!(zero.population_line(), "Population: -");
    }
}
