//! `GET /api/featured-grants`: random sample of the cached grants.

use axum::Json;
use axum::extract::State;
use grantbridge_core::{FEATURED_SAMPLE_SIZE, NormalizedGrant};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ApiError;
use crate::state::AppState;

/// Up to `count` distinct rows, uniformly chosen.
pub fn sample_featured<R: Rng + ?Sized>(rows: &[NormalizedGrant], count: usize, rng: &mut R) -> Vec<NormalizedGrant> {
    rows.choose_multiple(rng, count).cloned().collect()
}

pub async fn featured_grants(State(state): State<AppState>) -> Result<Json<Vec<NormalizedGrant>>, ApiError> {
    let rows = state.store.cached_grants().await?;
    let picked = sample_featured(&rows, FEATURED_SAMPLE_SIZE, &mut rand::thread_rng());
    tracing::debug!(cached = rows.len(), returned = picked.len(), "serving featured grants");

    Ok(Json(picked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{grant, state_with};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_is_distinct() {
        let rows: Vec<_> = (0..5).map(|i| grant(&i.to_string())).collect();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let picked = sample_featured(&rows, 3, &mut rng);
            let ids: HashSet<_> = picked.iter().map(|g| g.id.clone()).collect();
            assert_eq!(ids.len(), 3);
        }
    }

    #[test]
    fn test_sample_covers_every_row() {
        let rows: Vec<_> = (0..5).map(|i| grant(&i.to_string())).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            seen.extend(sample_featured(&rows, 3, &mut rng).into_iter().map(|g| g.id));
        }
        assert_eq!(seen.len(), 5);
    }

    #[tokio::test]
    async fn test_returns_three_of_five() {
        let (state, _) = state_with(None, 5).await;
        let Json(grants) = featured_grants(State(state)).await.unwrap();
        assert_eq!(grants.len(), 3);
        assert!(grants.iter().all(|g| g.created_at.is_some()));
    }

    #[tokio::test]
    async fn test_returns_all_when_fewer_cached() {
        let (state, _) = state_with(None, 2).await;
        let Json(grants) = featured_grants(State(state)).await.unwrap();
        assert_eq!(grants.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_cache_returns_empty_list() {
        let (state, _) = state_with(None, 0).await;
        let Json(grants) = featured_grants(State(state)).await.unwrap();
        assert!(grants.is_empty());
    }
}
