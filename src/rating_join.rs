use tracing::info;

use crate::error::FeatureResult;
use crate::fixture::FeatureDataset;
use crate::ratings::RatingSeriesStore;

/// Fixtures of other competitions get no rating.
pub fn join_ratings(
    dataset: FeatureDataset,
    store: &RatingSeriesStore,
    competition: &str,
) -> FeatureResult<FeatureDataset> {
    let FeatureDataset { fixtures, columns } = dataset;
    let mut rated = 0usize;
    let fixtures = fixtures
        .into_iter()
        .map(|mut fixture| {
            if fixture.competition == competition {
                fixture.home_rating = Some(store.rating_for(&fixture.home_team, fixture.date)?);
                fixture.away_rating = Some(store.rating_for(&fixture.away_team, fixture.date)?);
                rated += 1;
            } else {
                fixture.home_rating = None;
                fixture.away_rating = None;
            }
            Ok(fixture)
        })
        .collect::<FeatureResult<Vec<_>>>()?;

    info!(rated, total = fixtures.len(), competition, "joined ratings");
    Ok(FeatureDataset { fixtures, columns })
}
