//! Resolution accuracy evaluation.
//!
//! Runs a labelled set of cross-catalog pairs through pull → search → match
//! and compares each prediction with the expected identifier.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{CatalogError, Searchable, TrackPullable};
use crate::metrics;
use crate::model::CatalogUri;
use crate::searcher::Searcher;

/// One labelled pair: a track on the source catalog and its known
/// counterpart on the target catalog, if it has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalCase {
    pub source: CatalogUri,
    #[serde(default)]
    pub expected: Option<CatalogUri>,
}

/// How a prediction compares to the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum Verdict {
    /// Prediction equals the expected identifier (both absent counts too).
    Correct,
    /// No prediction although a counterpart exists.
    Missing,
    /// A prediction that is not the expected identifier.
    Wrong,
    /// The pull or the search failed.
    Error(String),
}

impl Verdict {
    fn label(&self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::Missing => "missing",
            Verdict::Wrong => "wrong",
            Verdict::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalRow {
    pub case: EvalCase,
    pub predicted: Option<CatalogUri>,
    pub verdict: Verdict,
}

/// Aggregate accuracy over a set of cases. Rows keep the input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub total: usize,
    pub correct: usize,
    pub missing: usize,
    pub wrong: usize,
    pub errors: usize,
    pub rows: Vec<EvalRow>,
}

impl EvaluationReport {
    fn from_rows(rows: Vec<EvalRow>) -> Self {
        let count = |f: fn(&Verdict) -> bool| rows.iter().filter(|r| f(&r.verdict)).count();
        Self {
            total: rows.len(),
            correct: count(|v| matches!(v, Verdict::Correct)),
            missing: count(|v| matches!(v, Verdict::Missing)),
            wrong: count(|v| matches!(v, Verdict::Wrong)),
            errors: count(|v| matches!(v, Verdict::Error(_))),
            rows,
        }
    }

    /// Share of correct predictions, 0 for an empty run.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

/// Identifier of the best matching `target` track for the `source` track at `uri`.
///
/// `None` when no candidate clears the match threshold.
pub async fn get_prediction(
    source: &dyn TrackPullable,
    target: &dyn Searchable,
    searcher: &Searcher,
    uri: &CatalogUri,
) -> Result<Option<CatalogUri>, CatalogError> {
    let track = source.pull_track(uri).await?;
    let results = searcher.search(target, &track, None).await?;

    Ok(results
        .into_iter()
        .find(|candidate| searcher.matcher().matches(&track, &candidate.track))
        .and_then(|candidate| candidate.track.uri(target.kind()).cloned()))
}

fn judge(case: &EvalCase, result: Result<Option<CatalogUri>, CatalogError>) -> EvalRow {
    let (predicted, verdict) = match result {
        Err(e) => {
            warn!(source = %case.source, error = %e, "Evaluation case failed");
            (None, Verdict::Error(e.to_string()))
        }
        Ok(predicted) => {
            let verdict = if predicted == case.expected {
                Verdict::Correct
            } else if predicted.is_none() {
                Verdict::Missing
            } else {
                Verdict::Wrong
            };
            (predicted, verdict)
        }
    };

    metrics::EVAL_CASES
        .with_label_values(&[verdict.label()])
        .inc();

    EvalRow {
        case: case.clone(),
        predicted,
        verdict,
    }
}

/// Evaluate every case, running up to `concurrency` of them at once.
///
/// Each case is searched sequentially on its own; parallelism is across cases.
pub async fn evaluate(
    source: &dyn TrackPullable,
    target: &dyn Searchable,
    searcher: &Searcher,
    cases: &[EvalCase],
    concurrency: usize,
) -> EvaluationReport {
    let rows: Vec<EvalRow> = stream::iter(cases)
        .map(|case| async move {
            let result = get_prediction(source, target, searcher, &case.source).await;
            judge(case, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let report = EvaluationReport::from_rows(rows);
    info!(
        source = source.name(),
        target = target.name(),
        total = report.total,
        correct = report.correct,
        missing = report.missing,
        wrong = report.wrong,
        errors = report.errors,
        "Evaluation finished"
    );
    report
}
