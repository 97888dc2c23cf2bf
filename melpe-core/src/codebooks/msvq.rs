//! Generic M-best multi-stage vector quantization search (STANAG 4591
//! §4.3 "MSVQ (LSFs)", reused verbatim by the 600 b/s LSF-pair and gain
//! MSVQ pools in §4.5.2/§4.5.4).
//!
//! At each stage, every surviving candidate is extended by every codeword
//! of that stage, scored by weighted squared error against the target, and
//! the best `mbest` survivors (by cumulative cost) are carried forward with
//! a back-pointer to the path that produced them. This is the textbook
//! M-best MSVQ search; it is written once here instead of three times in
//! `quant2400`/`quant600::lsf`/`quant600::gain` because the only thing that
//! differs between those call sites is the codebook pools and weights.

#[derive(Debug, Clone)]
struct Candidate {
    path: Vec<u16>,
    vector: Vec<i32>,
    cost: i64,
}

fn weighted_cost(target: &[i16], candidate: &[i32], weights: &[i32]) -> i64 {
    target
        .iter()
        .zip(candidate.iter())
        .zip(weights.iter())
        .map(|((&t, &c), &w)| {
            let d = t as i64 - c as i64;
            (w as i64) * d * d
        })
        .sum()
}

/// Result of an MSVQ search: the per-stage codeword indices (in search
/// order) and the reconstructed vector (sum of the selected stage
/// codewords, *not* yet clamped to any domain-specific bound — callers
/// apply e.g. [`crate::frame::enforce_lsf_bounds`] afterwards).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub indices: Vec<u16>,
    pub reconstructed: Vec<i32>,
}

/// Runs the M-best MSVQ search of `target` (weighted by `weights`, one
/// weight per dimension) against `stages` (one codebook per stage, each a
/// `levels x dim` table), keeping `mbest` survivors per stage.
///
/// `stages` must contain at least one stage; every codeword across every
/// stage must have the same dimensionality as `target`/`weights`.
pub fn search(target: &[i16], weights: &[i32], stages: &[Vec<Vec<i16>>], mbest: usize) -> SearchResult {
    debug_assert!(!stages.is_empty());
    let mut survivors: Vec<Candidate> = Vec::new();

    for (stage_idx, stage) in stages.iter().enumerate() {
        let mut candidates: Vec<Candidate> = Vec::new();
        if stage_idx == 0 {
            for (k, codeword) in stage.iter().enumerate() {
                let vector: Vec<i32> = codeword.iter().map(|&c| c as i32).collect();
                let cost = weighted_cost(target, &vector, weights);
                candidates.push(Candidate { path: vec![k as u16], vector, cost });
            }
        } else {
            for survivor in &survivors {
                for (k, codeword) in stage.iter().enumerate() {
                    let vector: Vec<i32> = survivor
                        .vector
                        .iter()
                        .zip(codeword.iter())
                        .map(|(&a, &b)| a + b as i32)
                        .collect();
                    let cost = weighted_cost(target, &vector, weights);
                    let mut path = survivor.path.clone();
                    path.push(k as u16);
                    candidates.push(Candidate { path, vector, cost });
                }
            }
        }
        candidates.sort_by_key(|c| c.cost);
        candidates.truncate(mbest.max(1));
        survivors = candidates;
    }

    let best = survivors
        .into_iter()
        .min_by_key(|c| c.cost)
        .expect("at least one stage, so at least one survivor");
    SearchResult { indices: best.path, reconstructed: best.vector }
}

/// Reconstructs a vector from its per-stage indices directly (the decoder
/// side: no search, just a sum of the selected codewords).
pub fn reconstruct(indices: &[u16], stages: &[Vec<Vec<i16>>]) -> Vec<i32> {
    let dim = stages[0][0].len();
    let mut vector = vec![0i32; dim];
    for (stage, &idx) in stages.iter().zip(indices.iter()) {
        let codeword = &stage[idx as usize % stage.len()];
        for (v, &c) in vector.iter_mut().zip(codeword.iter()) {
            *v += c as i32;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_stages() -> Vec<Vec<Vec<i16>>> {
        vec![
            vec![vec![0, 0], vec![100, 100]],
            vec![vec![0, 0], vec![10, -10]],
        ]
    }

    #[test]
    fn search_picks_exact_codeword_sum() {
        let stages = toy_stages();
        let weights = [1, 1];
        let target = [110i16, 90];
        let result = search(&target, &weights, &stages, 4);
        assert_eq!(result.reconstructed, vec![110, 90]);
        assert_eq!(result.indices, vec![1, 1]);
    }

    #[test]
    fn reconstruct_matches_search() {
        let stages = toy_stages();
        let weights = [1, 1];
        let target = [5i16, 5];
        let result = search(&target, &weights, &stages, 4);
        let rebuilt = reconstruct(&result.indices, &stages);
        assert_eq!(rebuilt, result.reconstructed);
    }
}
