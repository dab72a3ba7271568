use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Borders,
    Cities,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Borders => f.write_str("borders"),
            DatasetKind::Cities => f.write_str("cities"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }
}

/// What the centred status box should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Hidden,
    Loading(String),
    Error(String),
}

pub const LOADING_MESSAGE: &str = "Loading, please wait...";

/// Failures win over the loading notice; only the city dataset holds the
/// view in the loading state, borders simply appear when they arrive.
pub fn overlay_for(borders: &LoadState, cities: &LoadState) -> Overlay {
    let failures: Vec<String> = [borders, cities]
        .into_iter()
        .zip([DatasetKind::Borders, DatasetKind::Cities])
        .filter_map(|(state, kind)| match state {
            LoadState::Failed(reason) => Some(format!("Failed to load {kind}: {reason}")),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        return Overlay::Error(failures.join("\n"));
    }
    match cities {
        LoadState::Loading => Overlay::Loading(LOADING_MESSAGE.to_string()),
        _ => Overlay::Hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::{LOADING_MESSAGE, LoadState, Overlay, overlay_for};

    #[test]
    fn loading_until_cities_arrive() {
        assert_eq!(
            overlay_for(&LoadState::Ready, &LoadState::Loading),
            Overlay::Loading(LOADING_MESSAGE.to_string())
        );
        let hidden = overlay_for(&LoadState::Loading, &LoadState::Ready);
        assert_eq!(hidden, Overlay::Hidden);
    }

    #[test]
    fn failures_replace_the_loading_box() {
        let failed = LoadState::Failed("timed out after 15000 ms".to_string());
        assert_eq!(
            overlay_for(&failed, &LoadState::Loading),
            Overlay::Error("Failed to load borders: timed out after 15000 ms".to_string())
        );
        let Overlay::Error(msg) = overlay_for(&failed, &failed) else {
            panic!("expected error overlay");
        };
        assert_eq!(msg.lines().count(), 2);
    }
}
