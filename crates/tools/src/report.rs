use formats::{CityDataset, CityRecord, FeatureCollection};
use foundation::GeoPoint;
use layers::PopulationScale;
use scene::NearestCity;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BordersSummary {
    pub features: usize,
    pub without_geometry: usize,
    pub rings: usize,
    pub vertices: usize,
}

impl BordersSummary {
    pub fn of(features: &FeatureCollection) -> Self {
        let mut rings = 0;
        let mut vertices = 0;
        for feature in &features.features {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            for ring in geometry.polygon_rings() {
                rings += 1;
                vertices += ring.len();
            }
        }
        Self {
            features: features.len(),
            without_geometry: features.without_geometry(),
            rings,
            vertices,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitiesSummary {
    pub cities: usize,
    pub skipped: usize,
    pub without_population: usize,
    /// Cities per colour bucket, largest bucket first, as `#RRGGBB`.
    pub buckets: Vec<(String, usize)>,
}

impl CitiesSummary {
    pub fn of(dataset: &CityDataset, scale: &PopulationScale) -> Self {
        let mut buckets: Vec<(String, usize)> = Vec::new();
        for city in &dataset.cities {
            let css = scale.encode(city.population).color.css();
            match buckets.iter_mut().find(|(c, _)| *c == css) {
                Some((_, n)) => *n += 1,
                None => buckets.push((css, 1)),
            }
        }
        buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self {
            cities: dataset.len(),
            skipped: dataset.skipped,
            without_population: dataset
                .cities
                .iter()
                .filter(|c| c.population.is_none())
                .count(),
            buckets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityHit {
    pub index: usize,
    pub name: String,
    pub country: String,
    pub population: Option<u64>,
    pub distance_km: f64,
}

impl CityHit {
    pub fn from_nearest(hit: &NearestCity<'_, CityRecord>) -> Self {
        Self {
            index: hit.index,
            name: hit.city.name.clone(),
            country: hit.city.country.clone(),
            population: hit.city.population,
            distance_km: hit.distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickReport {
    /// `None` when the pixel does not cover the globe.
    pub location: Option<[f64; 2]>,
    pub city: Option<CityHit>,
}

impl PickReport {
    pub fn new(location: Option<GeoPoint>, city: Option<CityHit>) -> Self {
        Self {
            location: location.map(|p| [p.longitude, p.latitude]),
            city,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeReport {
    pub population: Option<u64>,
    pub normalized: f64,
    pub height: f64,
    pub radius: f64,
    pub color: String,
    pub cursor_height: f64,
    pub cursor_radius: f64,
}

impl EncodeReport {
    pub fn new(population: Option<u64>, scale: &PopulationScale) -> Self {
        let style = scale.encode(population);
        let cursor = scale.cursor(population);
        Self {
            population,
            normalized: scale.normalize(population),
            height: style.height,
            radius: style.radius,
            color: style.color.css(),
            cursor_height: cursor.height,
            cursor_radius: cursor.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BordersSummary, CitiesSummary, EncodeReport};
    use formats::{CityDataset, FeatureCollection};
    use layers::PopulationScale;
    use pretty_assertions::assert_eq;

    #[test]
    fn summarises_cities_by_bucket() {
        let ds = CityDataset::from_json_str(
            r#"[
                {"city":"A","lat":0,"lng":0,"population":20000000},
                {"city":"B","lat":0,"lng":1,"population":2000},
                {"city":"C","lat":0,"lng":2,"population":3000},
                {"city":"D","lat":0,"lng":3}
            ]"#,
        )
        .expect("cities");
        let summary = CitiesSummary::of(&ds, &PopulationScale::default());
        assert_eq!(summary.cities, 4);
        assert_eq!(summary.without_population, 1);
        assert_eq!(
            summary.buckets,
            vec![
                ("#00FF00".to_string(), 2),
                ("#8A2BE2".to_string(), 1),
                ("#B22222".to_string(), 1),
            ]
        );
    }

    #[test]
    fn summarises_borders() {
        let fc = FeatureCollection::from_geojson_str(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type":"Feature","properties":{},"geometry":null}
            ]}"#,
        )
        .expect("geojson");
        assert_eq!(
            BordersSummary::of(&fc),
            BordersSummary {
                features: 2,
                without_geometry: 1,
                rings: 1,
                vertices: 4,
            }
        );
    }

    #[test]
    fn encode_report_serialises() {
        let report = EncodeReport::new(Some(15_000_000), &PopulationScale::default());
        assert_eq!(report.color, "#B22222");
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["population"], 15_000_000);
        assert_eq!(json["normalized"], 0.375);
    }
}
