use tracing::debug;

use super::{
    client::{FoodError, FoodSource},
    parse::{parse_foods, FoodCandidate},
    rank::{query_variants, rank},
};

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 50;

/// Looks a food up by name, retrying alternate spellings until one yields
/// candidates. A blank name never reaches the API.
pub async fn search(
    food: &dyn FoodSource,
    name: &str,
    page: Option<i64>,
    per_page: Option<i64>,
) -> Result<Vec<FoodCandidate>, FoodError> {
    let query = name.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let page = page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32;
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE) as u32;

    let mut candidates = Vec::new();
    for variant in query_variants(query) {
        let body = food.search_by_name(&variant, page, per_page).await?;
        candidates = parse_foods(&body)?;
        if !candidates.is_empty() {
            break;
        }
        debug!(%variant, "no candidates for variant");
    }

    Ok(rank(query, candidates, per_page as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::client::stub::StubFoodSource;

    #[tokio::test]
    async fn blank_query_skips_the_api() {
        let stub = StubFoodSource::new(r#"{"records":[{"foodNm":"x"}]}"#);
        assert!(search(&stub, "   ", None, None).await.unwrap().is_empty());
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn tries_every_variant_when_nothing_matches() {
        let stub = StubFoodSource::new(r#"{"records":[]}"#);
        let out = search(&stub, "참치 김밥", None, None).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(*stub.queries.lock().unwrap(), ["참치 김밥", "참치김밥", "김밥 참치"]);
    }

    #[tokio::test]
    async fn stops_at_first_variant_with_results_and_ranks() {
        let stub = StubFoodSource::new(
            r#"{"records":[{"foodNm":"김밥","enerc":"300"},{"foodNm":"참치김밥","enerc":"480"}]}"#,
        );
        let out = search(&stub, "참치 김밥", Some(0), Some(500)).await.unwrap();
        assert_eq!(stub.calls(), 1);
        assert_eq!(out[0].name, "참치김밥");
        assert_eq!(out.len(), 2);
    }
}
