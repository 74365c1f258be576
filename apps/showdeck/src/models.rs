//! Wire models for the TVMaze catalog API.
//!
//! Shapes follow the public API responses: a show listing entry, the
//! search hit wrapper, and the detail payload with embedded sub-resources.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Average rating wrapper as the API serializes it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    pub average: Option<f64>,
}

/// Poster image in two sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowImage {
    pub medium: String,
    pub original: String,
}

/// One show from the listing or search endpoints.
///
/// Immutable once received; a later fetch of the same id replaces the
/// prior value wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub image: Option<ShowImage>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub premiered: Option<String>,
    #[serde(default)]
    pub ended: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Show {
    /// Rating with a missing average ranking as 0.
    pub fn rating_average(&self) -> f64 {
        self.rating.average.unwrap_or(0.0)
    }
}

/// Search result entry: a relevance score paired with a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub score: f64,
    pub show: Show,
}

/// Cast member of a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastCredit {
    pub person: Person,
    pub character: Character,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
}

/// One episode of a show. Specials carry no episode number, and unaired
/// episodes may carry an empty air date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub name: String,
    pub season: u32,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub airdate: Option<NaiveDate>,
}

/// Network or streaming channel airing a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
}

/// Sub-resources embedded into a detail response via `embed[]` params.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub cast: Option<Vec<CastCredit>>,
    #[serde(default)]
    pub episodes: Option<Vec<Episode>>,
}

/// Full show detail with embedded cast and episodes.
///
/// Fetched per id and handed straight to the caller; never stored in the
/// aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDetail {
    #[serde(flatten)]
    pub show: Show,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<Embedded>,
    #[serde(default)]
    pub network: Option<Network>,
    #[serde(rename = "webChannel", default)]
    pub web_channel: Option<Network>,
    #[serde(rename = "officialSite", default)]
    pub official_site: Option<String>,
}

impl ShowDetail {
    /// Embedded cast list, empty when the embed is absent.
    pub fn cast(&self) -> &[CastCredit] {
        self.embedded
            .as_ref()
            .and_then(|e| e.cast.as_deref())
            .unwrap_or(&[])
    }

    /// Embedded episode list, empty when the embed is absent.
    pub fn episodes(&self) -> &[Episode] {
        self.embedded
            .as_ref()
            .and_then(|e| e.episodes.as_deref())
            .unwrap_or(&[])
    }
}

/// The API serializes unknown air dates as `""` rather than `null`.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Merge `incoming` into `existing`, keyed by show id.
///
/// A show already present keeps its position and takes the incoming value;
/// new ids are appended in encounter order. Both the catalog service and
/// the aggregator rely on this for their dedup guarantees.
pub fn merge_shows_by_id(existing: &mut Vec<Show>, incoming: impl IntoIterator<Item = Show>) {
    let mut positions: HashMap<u64, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, show)| (show.id, i))
        .collect();

    for show in incoming {
        match positions.get(&show.id) {
            Some(&i) => existing[i] = show,
            None => {
                positions.insert(show.id, existing.len());
                existing.push(show);
            }
        }
    }
}
