use std::cmp::Reverse;

use super::parse::FoodCandidate;

/// Spellings to try against the API, in order: as typed (spacing
/// normalized), without spaces, words reversed.
pub fn query_variants(query: &str) -> Vec<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let original = words.join(" ");
    let compact = words.concat();
    let swapped = {
        let mut w = words.clone();
        w.reverse();
        w.join(" ")
    };

    let mut out: Vec<String> = Vec::with_capacity(3);
    for v in [original, compact, swapped] {
        if !v.is_empty() && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn keywords(query: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let variants = query_variants(query);
    let words = query.split_whitespace().map(str::to_string);
    for k in variants.into_iter().chain(words).map(|s| normalize(&s)) {
        if !k.is_empty() && !out.contains(&k) {
            out.push(k);
        }
    }
    out
}

/// Orders candidates by keyword overlap, then calorie data present, then
/// shorter name, then API order; keeps at most `limit`.
pub fn rank(query: &str, candidates: Vec<FoodCandidate>, limit: usize) -> Vec<FoodCandidate> {
    let keys = keywords(query);
    let mut scored: Vec<(usize, FoodCandidate)> = candidates.into_iter().enumerate().collect();
    scored.sort_by_cached_key(|(idx, c)| {
        let name = normalize(&c.name);
        let hits = keys.iter().filter(|k| name.contains(k.as_str())).count();
        (
            Reverse(hits),
            Reverse(c.kcal.is_some()),
            c.name.chars().count(),
            *idx,
        )
    });
    scored.into_iter().take(limit).map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(name: &str, kcal: Option<f64>) -> FoodCandidate {
        FoodCandidate {
            name: name.into(),
            kcal,
        }
    }

    #[test]
    fn variants_are_distinct_and_ordered() {
        assert_eq!(query_variants("  참치   김밥 "), ["참치 김밥", "참치김밥", "김밥 참치"]);
        assert_eq!(query_variants("김밥"), ["김밥"]);
        assert!(query_variants("   ").is_empty());
    }

    #[test]
    fn more_keyword_hits_rank_first() {
        let ranked = rank(
            "참치 김밥",
            vec![food("김밥", Some(300.0)), food("참치김밥", Some(500.0)), food("참치", Some(100.0))],
            10,
        );
        assert_eq!(ranked[0].name, "참치김밥");
    }

    #[test]
    fn calories_then_length_then_api_order_break_ties() {
        let ranked = rank(
            "김밥",
            vec![
                food("야채김밥", None),
                food("소고기김밥", Some(1.0)),
                food("치즈김밥", Some(1.0)),
                food("김밥", None),
            ],
            10,
        );
        let names: Vec<_> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["치즈김밥", "소고기김밥", "김밥", "야채김밥"]);
    }

    #[test]
    fn matching_ignores_case_and_spacing() {
        let ranked = rank("Green Tea", vec![food("latte", Some(1.0)), food("GREENTEA latte", None)], 10);
        assert_eq!(ranked[0].name, "GREENTEA latte");
    }

    #[test]
    fn respects_limit() {
        let all: Vec<_> = (0..5).map(|i| food(&format!("밥{i}"), None)).collect();
        assert_eq!(rank("밥", all, 2).len(), 2);
    }
}
