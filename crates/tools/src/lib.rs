pub mod report;
pub mod source;

pub use report::{BordersSummary, CitiesSummary, CityHit, EncodeReport, PickReport};
pub use source::{Loader, Source, SourceError};
