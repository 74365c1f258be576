//! Genre bucketing for the show collection.

use std::collections::BTreeMap;

use crate::models::Show;

/// Group shows into per-genre buckets, each sorted by descending rating.
///
/// A show appears in one bucket per genre it carries; shows without genres
/// contribute nothing. A missing rating ranks as 0. The sort is stable, so
/// equally rated shows keep their relative input order.
pub fn group_by_genre_sorted(shows: &[Show]) -> BTreeMap<String, Vec<Show>> {
    let mut buckets: BTreeMap<String, Vec<Show>> = BTreeMap::new();

    for show in shows {
        for genre in &show.genres {
            if genre.is_empty() {
                continue;
            }
            buckets.entry(genre.clone()).or_default().push(show.clone());
        }
    }

    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| b.rating_average().total_cmp(&a.rating_average()));
    }

    buckets
}
