use std::path::Path;

use anyhow::{bail, Context, Result};

use unitunes_core::{evaluate, CatalogKind, EvalCase, EvaluationReport, Verdict};

use crate::app::App;

/// Run labelled cases through pull-then-search and print the accuracy.
pub async fn run(
    app: &App,
    cases_path: &Path,
    source: CatalogKind,
    target: CatalogKind,
    concurrency: usize,
    output: Option<&Path>,
) -> Result<()> {
    let content = std::fs::read_to_string(cases_path)
        .with_context(|| format!("Failed to read {:?}", cases_path))?;
    let cases: Vec<EvalCase> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {:?}", cases_path))?;
    check_cases(&cases, source, target)?;

    let source_catalog = app.catalogs.track_pullable(source)?;
    let target_catalog = app.catalogs.searchable(target)?;

    let report = evaluate(
        source_catalog,
        target_catalog,
        &app.searcher,
        &cases,
        concurrency,
    )
    .await;

    print!("{}", summarize(&report));

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        println!("Report written to {:?}", path);
    }
    Ok(())
}

fn check_cases(cases: &[EvalCase], source: CatalogKind, target: CatalogKind) -> Result<()> {
    for (idx, case) in cases.iter().enumerate() {
        if case.source.kind != source {
            bail!("Case {}: source {} is not a {} identifier", idx, case.source, source);
        }
        if let Some(expected) = &case.expected {
            if expected.kind != target {
                bail!("Case {}: expected {} is not a {} identifier", idx, expected, target);
            }
        }
    }
    Ok(())
}

fn summarize(report: &EvaluationReport) -> String {
    let mut out = String::new();
    for row in &report.rows {
        let predicted = row
            .predicted
            .as_ref()
            .map_or_else(|| "-".to_string(), |uri| uri.to_string());
        let expected = row
            .case
            .expected
            .as_ref()
            .map_or_else(|| "-".to_string(), |uri| uri.to_string());
        match &row.verdict {
            Verdict::Correct => {}
            Verdict::Missing => out.push_str(&format!(
                "missing  {} expected {}\n",
                row.case.source, expected
            )),
            Verdict::Wrong => out.push_str(&format!(
                "wrong    {} predicted {} expected {}\n",
                row.case.source, predicted, expected
            )),
            Verdict::Error(message) => {
                out.push_str(&format!("error    {}: {}\n", row.case.source, message))
            }
        }
    }

    out.push_str(&format!(
        "{} cases: {} correct, {} missing, {} wrong, {} errors ({:.1}% accuracy)\n",
        report.total,
        report.correct,
        report.missing,
        report.wrong,
        report.errors,
        report.accuracy() * 100.0
    ));
    out
}
