/*!
 * Evaluation results as CSV.
 *
 * Columns: `question, answer, contexts, ground_truth` followed by the four
 * metric columns. `contexts` holds a JSON list of strings; a missing score
 * is an empty cell.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::harness::EvalRecord;
use super::scorer::{Metric, MetricScores};
use crate::file_utils::FileManager;

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    question: String,
    answer: String,
    contexts: String,
    ground_truth: String,
    faithfulness: Option<f64>,
    answer_relevancy: Option<f64>,
    context_precision: Option<f64>,
    context_recall: Option<f64>,
}

impl CsvRow {
    fn from_record(record: &EvalRecord) -> Result<Self> {
        Ok(Self {
            question: record.question.clone(),
            answer: record.answer.clone(),
            contexts: serde_json::to_string(&record.contexts)
                .context("Failed to serialize contexts")?,
            ground_truth: record.ground_truth.clone(),
            faithfulness: record.scores.faithfulness,
            answer_relevancy: record.scores.answer_relevancy,
            context_precision: record.scores.context_precision,
            context_recall: record.scores.context_recall,
        })
    }

    fn into_record(self) -> EvalRecord {
        let contexts = serde_json::from_str(&self.contexts).unwrap_or_else(|_| {
            if self.contexts.is_empty() {
                Vec::new()
            } else {
                vec![self.contexts.clone()]
            }
        });
        EvalRecord {
            question: self.question,
            answer: self.answer,
            contexts,
            ground_truth: self.ground_truth,
            scores: MetricScores {
                faithfulness: self.faithfulness,
                answer_relevancy: self.answer_relevancy,
                context_precision: self.context_precision,
                context_recall: self.context_recall,
            },
        }
    }
}

/// Write records to `path`
pub fn write_results<P: AsRef<Path>>(path: P, records: &[EvalRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        FileManager::ensure_dir(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    for record in records {
        writer
            .serialize(CsvRow::from_record(record)?)
            .with_context(|| format!("Failed to write CSV row to {:?}", path))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {:?}", path))?;
    Ok(())
}

/// Read records written by [`write_results`]
pub fn read_results<P: AsRef<Path>>(path: P) -> Result<Vec<EvalRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, row)| {
            row.map(CsvRow::into_record)
                .with_context(|| format!("Invalid row {} in {:?}", idx + 1, path))
        })
        .collect()
}

/// One metric's column, skipping missing values
pub fn metric_column(records: &[EvalRecord], metric: Metric) -> Vec<f64> {
    records.iter().filter_map(|r| r.scores.get(metric)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(question: &str, faithfulness: Option<f64>) -> EvalRecord {
        EvalRecord {
            question: question.to_string(),
            answer: "Answer, with a comma\nand a newline".to_string(),
            contexts: vec!["ctx \"one\"".to_string(), "ctx two".to_string()],
            ground_truth: "Truth".to_string(),
            scores: MetricScores {
                faithfulness,
                answer_relevancy: Some(0.9),
                context_precision: Some(1.0),
                context_recall: Some(0.5),
            },
        }
    }

    #[test]
    fn test_writeResults_shouldUseExpectedHeader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eval").join("results.csv");
        write_results(&path, &[record("q1", Some(0.7))]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(
            "question,answer,contexts,ground_truth,faithfulness,answer_relevancy,context_precision,context_recall\n"
        ));
    }

    #[test]
    fn test_readResults_shouldRestoreRecordsAndMissingScores() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let records = vec![record("q1", Some(0.7)), record("q2", None)];
        write_results(&path, &records).unwrap();

        let read = read_results(&path).unwrap();
        assert_eq!(read, records);
        assert_eq!(metric_column(&read, Metric::Faithfulness), vec![0.7]);
    }
}
