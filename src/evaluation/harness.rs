/*!
 * Evaluation run: answer every question, then score it.
 */

use anyhow::{Context, Result};
use log::{info, warn};

use super::questions::EvalItem;
use super::scorer::{EvalSample, Metric, MetricScores, Scorer};
use crate::progress::progress_bar;
use crate::rag::RagEngine;

/// One evaluated question
#[derive(Debug, Clone, PartialEq)]
pub struct EvalRecord {
    pub question: String,
    pub answer: String,
    pub contexts: Vec<String>,
    pub ground_truth: String,
    pub scores: MetricScores,
}

/// Mean of each metric over the records that have it
pub fn metric_means(records: &[EvalRecord]) -> Vec<(Metric, Option<f64>)> {
    Metric::ALL
        .iter()
        .map(|metric| {
            let values: Vec<f64> = records.iter().filter_map(|r| r.scores.get(*metric)).collect();
            let mean = if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            };
            (*metric, mean)
        })
        .collect()
}

/// Answer each item with `engine` and score the answer with `scorer`
pub async fn run_evaluation(
    engine: &mut RagEngine,
    scorer: &dyn Scorer,
    items: &[EvalItem],
) -> Result<Vec<EvalRecord>> {
    let progress = progress_bar(items.len(), "questions");
    progress.set_message("Answering");

    let mut samples = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let answer = engine
            .answer(&item.question)
            .await
            .with_context(|| format!("Failed to answer question {}: {}", idx + 1, item.question))?;
        if answer.is_unanswered() {
            warn!("No relevant context for question {}: {}", idx + 1, item.question);
        }
        samples.push(EvalSample {
            question: item.question.clone(),
            answer: answer.answer,
            contexts: answer.contexts,
            ground_truth: item.ground_truth.clone(),
        });
        progress.inc(1);
    }
    progress.finish_with_message("Answered");
    info!("{}", engine.usage().summary());

    let progress = progress_bar(samples.len(), "questions");
    progress.set_message("Scoring");
    let mut records = Vec::with_capacity(samples.len());
    for sample in samples {
        let scores = scorer.score(&sample).await;
        records.push(EvalRecord {
            question: sample.question,
            answer: sample.answer,
            contexts: sample.contexts,
            ground_truth: sample.ground_truth,
            scores,
        });
        progress.inc(1);
    }
    progress.finish_with_message("Scored");

    for (metric, mean) in metric_means(&records) {
        match mean {
            Some(mean) => info!("{}: mean {:.3}", metric, mean),
            None => info!("{}: no scores", metric),
        }
    }

    Ok(records)
}
