use elastic_client::vectorstore::{cosine_similarity, maximal_marginal_relevance};
use proptest::prelude::*;

fn matrix(dim: usize) -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(prop::collection::vec(-10.0f32..10.0, dim), 1..8)
}

fn two_matrices() -> impl Strategy<Value = (Vec<Vec<f32>>, Vec<Vec<f32>>)> {
    (1usize..6).prop_flat_map(|d| (matrix(d), matrix(d)))
}

fn query_and_candidates() -> impl Strategy<Value = (Vec<f32>, Vec<Vec<f32>>)> {
    (1usize..6).prop_flat_map(|d| (prop::collection::vec(-10.0f32..10.0, d), matrix(d)))
}

fn is_zero(row: &[f32]) -> bool {
    row.iter().all(|v| *v == 0.0)
}

proptest! {
    #[test]
    fn similarity_is_bounded((x, y) in two_matrices()) {
        let sim = cosine_similarity(&x, &y).unwrap();
        prop_assert_eq!(sim.len(), x.len());
        for row in &sim {
            prop_assert_eq!(row.len(), y.len());
            for v in row {
                prop_assert!((-1.0..=1.0).contains(v), "out of range: {}", v);
            }
        }
    }

    #[test]
    fn self_similarity_is_one((x, _) in two_matrices()) {
        let sim = cosine_similarity(&x, &x).unwrap();
        for (i, row) in x.iter().enumerate() {
            if is_zero(row) {
                prop_assert_eq!(sim[i][i], 0.0);
            } else {
                prop_assert!((sim[i][i] - 1.0).abs() < 1e-5, "diag {} = {}", i, sim[i][i]);
            }
        }
    }

    #[test]
    fn similarity_is_symmetric((x, y) in two_matrices()) {
        let xy = cosine_similarity(&x, &y).unwrap();
        let yx = cosine_similarity(&y, &x).unwrap();
        for i in 0..x.len() {
            for j in 0..y.len() {
                prop_assert!((xy[i][j] - yx[j][i]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn mmr_returns_distinct_indices(
        (query, candidates) in query_and_candidates(),
        lambda in 0.0f32..=1.0,
        k in 0usize..10,
    ) {
        let picked = maximal_marginal_relevance(&query, &candidates, lambda, k).unwrap();
        prop_assert_eq!(picked.len(), k.min(candidates.len()));

        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), picked.len());
        prop_assert!(picked.iter().all(|i| *i < candidates.len()));
    }

    #[test]
    fn mmr_first_pick_is_most_similar(
        (query, candidates) in query_and_candidates(),
        lambda in 0.0f32..=1.0,
    ) {
        let picked = maximal_marginal_relevance(&query, &candidates, lambda, 1).unwrap();
        let sims = cosine_similarity(&[query.clone()], &candidates).unwrap().remove(0);
        let best = sims.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        prop_assert_eq!(sims[picked[0]], best);
    }

    #[test]
    fn mmr_with_lambda_one_ranks_by_relevance((query, candidates) in query_and_candidates()) {
        let picked = maximal_marginal_relevance(&query, &candidates, 1.0, candidates.len()).unwrap();
        let sims = cosine_similarity(&[query.clone()], &candidates).unwrap().remove(0);
        for pair in picked.windows(2) {
            prop_assert!(sims[pair[0]] >= sims[pair[1]]);
        }
    }

    #[test]
    fn mmr_with_lambda_zero_maximizes_diversity((query, candidates) in query_and_candidates()) {
        let picked = maximal_marginal_relevance(&query, &candidates, 0.0, candidates.len()).unwrap();
        let pairwise = cosine_similarity(&candidates, &candidates).unwrap();
        let redundancy = |i: usize, chosen: &[usize]| {
            chosen.iter().map(|s| pairwise[i][*s]).fold(f32::NEG_INFINITY, f32::max)
        };

        for t in 1..picked.len() {
            let chosen = &picked[..t];
            let got = redundancy(picked[t], chosen);
            for i in (0..candidates.len()).filter(|i| !chosen.contains(i)) {
                prop_assert!(
                    got <= redundancy(i, chosen) + 1e-6,
                    "pick {} at step {} has redundancy {}, candidate {} has {}",
                    picked[t], t, got, i, redundancy(i, chosen)
                );
            }
        }
    }
}
