use foundation::math::Vec3;
use foundation::math::sphere::{EARTH_RADIUS_KM, GLOBE_RADIUS, Located, chord_km};

use crate::spatial::{Item as KdItem, KdTree};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NearestOptions {
    /// Radius the cities are projected at; the pick point should lie on it.
    pub sphere_radius: f64,
    pub earth_radius_km: f64,
    /// Exclusive upper bound on the reported distance.
    pub search_radius_km: f64,
}

impl Default for NearestOptions {
    fn default() -> Self {
        Self {
            sphere_radius: GLOBE_RADIUS,
            earth_radius_km: EARTH_RADIUS_KM,
            search_radius_km: 50.0,
        }
    }
}

#[derive(Debug)]
pub struct NearestCity<'a, T> {
    pub city: &'a T,
    /// Position of `city` in the input slice.
    pub index: usize,
    pub distance_km: f64,
    /// The city projected at `NearestOptions::sphere_radius`.
    pub position: Vec3,
}

impl<T> Clone for NearestCity<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NearestCity<'_, T> {}

/// Linear scan for the city closest to `pick`.
///
/// Distance is the straight chord between `pick` and each projected city,
/// scaled to kilometres. A city only becomes the answer when it is strictly
/// closer than the current best and strictly inside the search radius, so on
/// exact ties the earliest city in `cities` wins.
pub fn nearest_city<'a, T: Located>(
    pick: Vec3,
    cities: &'a [T],
    opts: &NearestOptions,
) -> Option<NearestCity<'a, T>> {
    scan(pick, cities, 0..cities.len(), opts)
}

fn scan<'a, T: Located>(
    pick: Vec3,
    cities: &'a [T],
    candidates: impl IntoIterator<Item = usize>,
    opts: &NearestOptions,
) -> Option<NearestCity<'a, T>> {
    let mut best: Option<NearestCity<'a, T>> = None;
    let mut min_dist = f64::INFINITY;

    for index in candidates {
        let Some(city) = cities.get(index) else {
            continue;
        };
        let position = city.location().to_sphere(opts.sphere_radius);
        let dist = chord_km(pick, position, opts.sphere_radius, opts.earth_radius_km);
        if dist < opts.search_radius_km && dist < min_dist {
            min_dist = dist;
            best = Some(NearestCity {
                city,
                index,
                distance_km: dist,
                position,
            });
        }
    }

    best
}

/// Spatial index over city positions on the unit sphere.
///
/// Answers exactly what [`nearest_city`] answers for the same slice: the tree
/// only narrows the candidates, which are then scanned in dataset order with
/// the same distance rule.
#[derive(Debug, Clone, Default)]
pub struct SphereIndex {
    tree: KdTree,
}

/// Candidate radius slack so rounding in the unit-sphere metric never drops
/// a city the kilometre metric would accept.
const RADIUS_SLACK: f64 = 1e-9;

impl SphereIndex {
    pub fn build<T: Located>(cities: &[T]) -> Self {
        let items = cities
            .iter()
            .enumerate()
            .map(|(i, c)| KdItem {
                index: i as u32,
                point: c.location().to_sphere(1.0),
            })
            .collect();
        Self {
            tree: KdTree::build(items),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Indexed equivalent of [`nearest_city`]. `cities` must be the slice
    /// the index was built from; on a length mismatch this falls back to
    /// the linear scan.
    pub fn nearest<'a, T: Located>(
        &self,
        pick: Vec3,
        cities: &'a [T],
        opts: &NearestOptions,
    ) -> Option<NearestCity<'a, T>> {
        if cities.len() != self.tree.len() {
            tracing::warn!(
                indexed = self.tree.len(),
                given = cities.len(),
                "sphere index does not match city list; scanning linearly"
            );
            return nearest_city(pick, cities, opts);
        }

        let unit_pick = pick * (1.0 / opts.sphere_radius);
        let unit_radius = opts.search_radius_km / opts.earth_radius_km;
        let radius = unit_radius * (1.0 + RADIUS_SLACK) + RADIUS_SLACK;
        let candidates = self.tree.within(unit_pick, radius);

        scan(
            pick,
            cities,
            candidates.into_iter().map(|i| i as usize),
            opts,
        )
    }
}
