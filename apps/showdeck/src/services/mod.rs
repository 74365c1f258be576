//! Application services for the showdeck client.

pub mod autocomplete;
pub mod genre;
pub mod http;
pub mod shows;
pub mod tvmaze;

pub use autocomplete::{Autocomplete, AutocompleteConfig, Phase, Submission};
pub use shows::{IndexSnapshot, ShowIndex};
pub use tvmaze::{CatalogSource, TvMazeClient};
