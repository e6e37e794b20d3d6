use serde_json::json;

use crate::client::{CommonParams, Elasticsearch};
use crate::error::{ApiError, ApiErrorKind, Error, Result};

/// Cosine similarity of two vectors; 0 when either has zero norm.
fn row_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    let sim = dot / denom;
    if denom == 0.0 || !sim.is_finite() {
        0.0
    } else {
        sim.clamp(-1.0, 1.0) as f32
    }
}

/// Row-wise cosine similarity matrix: `out[i][j] = cos(x[i], y[j])`.
///
/// Empty input on either side gives an empty matrix. Rows of different
/// widths are rejected.
pub fn cosine_similarity(x: &[Vec<f32>], y: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
    if x.is_empty() || y.is_empty() {
        return Ok(Vec::new());
    }

    let width = x[0].len();
    if x.iter().chain(y).any(|row| row.len() != width) {
        return Err(Error::InvalidArgument(format!(
            "Number of columns in X and Y must be the same. X has shape ({}, {}) and Y has shape ({}, {}).",
            x.len(),
            width,
            y.len(),
            y.iter().find(|r| r.len() != width).unwrap_or(&y[0]).len()
        )));
    }

    Ok(x
        .iter()
        .map(|a| y.iter().map(|b| row_similarity(a, b)).collect())
        .collect())
}

/// Greedy maximal marginal relevance selection.
///
/// Returns indices into `candidates`: first the one most similar to
/// `query`, then repeatedly the one maximizing
/// `lambda * sim(query) - (1 - lambda) * max sim(selected)`.
/// Ties go to the lower index.
pub fn maximal_marginal_relevance(
    query: &[f32],
    candidates: &[Vec<f32>],
    lambda: f32,
    k: usize,
) -> Result<Vec<usize>> {
    let limit = k.min(candidates.len());
    if limit == 0 {
        return Ok(Vec::new());
    }

    let to_query = cosine_similarity(&[query.to_vec()], candidates)?
        .into_iter()
        .next()
        .unwrap_or_default();

    let mut best = 0;
    for (i, score) in to_query.iter().enumerate() {
        if *score > to_query[best] {
            best = i;
        }
    }

    let mut selected = vec![best];
    // max similarity of each candidate to anything selected so far
    let mut redundancy: Vec<f32> = candidates
        .iter()
        .map(|c| row_similarity(c, &candidates[best]))
        .collect();

    while selected.len() < limit {
        let mut pick = None;
        let mut pick_score = f32::NEG_INFINITY;
        for (i, query_score) in to_query.iter().enumerate() {
            if selected.contains(&i) {
                continue;
            }
            let score = lambda * query_score - (1.0 - lambda) * redundancy[i];
            if pick.is_none() || score > pick_score {
                pick = Some(i);
                pick_score = score;
            }
        }
        let Some(pick) = pick else { break };

        selected.push(pick);
        for (i, c) in candidates.iter().enumerate() {
            redundancy[i] = redundancy[i].max(row_similarity(c, &candidates[pick]));
        }
    }

    Ok(selected)
}

/// Fail unless `model_id` is deployed, by running inference on a dummy
/// document. A 400 means the model answered (the dummy input has the wrong
/// shape) and counts as deployed; a 409 means it exists but is not started.
pub async fn model_must_be_deployed(client: &Elasticsearch, model_id: &str) -> Result<()> {
    let dummy = vec![json!({ "x": "y" })];
    match client
        .ml()
        .infer_trained_model(model_id, dummy, None, &CommonParams::default())
        .await
    {
        Ok(_) => Ok(()),
        Err(Error::Api(e)) if e.kind == ApiErrorKind::BadRequest => Ok(()),
        Err(Error::Api(e)) if e.kind == ApiErrorKind::Conflict => Err(ApiError::new(
            404,
            format!("model '{model_id}' not found, please deploy it first"),
            e.info,
        )
        .into()),
        Err(e) => Err(e),
    }
}
