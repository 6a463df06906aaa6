/*!
 * RAG quality metrics.
 *
 * Four scores in [0, 1] per answered question:
 * - faithfulness: share of the answer's claims supported by the contexts
 * - answer_relevancy: embedding similarity between question and answer
 * - context_precision: average precision of the retrieved contexts, judged
 *   against the reference answer
 * - context_recall: share of the reference answer covered by the contexts
 *
 * Judgements come from a hosted model; a metric whose judgement fails or
 * cannot be parsed is recorded as missing instead of aborting the run.
 */

use async_trait::async_trait;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::providers::{CompletionProvider, EmbeddingProvider};
use crate::store::cosine_similarity;

static SCORE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?|-?\.\d+").unwrap());
static VERDICT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[01]\b").unwrap());

/// The four evaluation metrics, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Faithfulness,
    AnswerRelevancy,
    ContextPrecision,
    ContextRecall,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Faithfulness,
        Metric::AnswerRelevancy,
        Metric::ContextPrecision,
        Metric::ContextRecall,
    ];

    /// Column name
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Faithfulness => "faithfulness",
            Metric::AnswerRelevancy => "answer_relevancy",
            Metric::ContextPrecision => "context_precision",
            Metric::ContextRecall => "context_recall",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Scores for one question; `None` when a metric could not be computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    pub faithfulness: Option<f64>,
    pub answer_relevancy: Option<f64>,
    pub context_precision: Option<f64>,
    pub context_recall: Option<f64>,
}

impl MetricScores {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Faithfulness => self.faithfulness,
            Metric::AnswerRelevancy => self.answer_relevancy,
            Metric::ContextPrecision => self.context_precision,
            Metric::ContextRecall => self.context_recall,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Faithfulness => &mut self.faithfulness,
            Metric::AnswerRelevancy => &mut self.answer_relevancy,
            Metric::ContextPrecision => &mut self.context_precision,
            Metric::ContextRecall => &mut self.context_recall,
        };
        *slot = value;
    }
}

/// What a scorer sees for one question
#[derive(Debug, Clone, PartialEq)]
pub struct EvalSample {
    pub question: String,
    pub answer: String,
    pub contexts: Vec<String>,
    pub ground_truth: String,
}

/// Computes metric scores for a sample
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, sample: &EvalSample) -> MetricScores;
}

/// Scorer backed by a judge model and an embedding model
#[derive(Debug, Clone)]
pub struct LlmJudgeScorer {
    judge: Arc<dyn CompletionProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl LlmJudgeScorer {
    pub fn new(judge: Arc<dyn CompletionProvider>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { judge, embedder }
    }

    async fn ask(&self, metric: Metric, prompt: &str) -> Option<String> {
        match self.judge.complete(prompt).await {
            Ok(completion) => Some(completion.text),
            Err(e) => {
                warn!("{} judgement failed: {}", metric, e);
                None
            }
        }
    }

    async fn faithfulness(&self, sample: &EvalSample) -> Option<f64> {
        if sample.contexts.is_empty() {
            return None;
        }
        let reply = self
            .ask(Metric::Faithfulness, &faithfulness_prompt(sample))
            .await?;
        parse_score(&reply).or_else(|| unparsed(Metric::Faithfulness, &reply))
    }

    async fn context_recall(&self, sample: &EvalSample) -> Option<f64> {
        if sample.contexts.is_empty() {
            return Some(0.0);
        }
        let reply = self
            .ask(Metric::ContextRecall, &context_recall_prompt(sample))
            .await?;
        parse_score(&reply).or_else(|| unparsed(Metric::ContextRecall, &reply))
    }

    async fn context_precision(&self, sample: &EvalSample) -> Option<f64> {
        if sample.contexts.is_empty() {
            return Some(0.0);
        }
        let reply = self
            .ask(Metric::ContextPrecision, &context_precision_prompt(sample))
            .await?;
        let verdicts = parse_verdicts(&reply, sample.contexts.len());
        match verdicts {
            Some(verdicts) => Some(average_precision(&verdicts)),
            None => unparsed(Metric::ContextPrecision, &reply),
        }
    }

    async fn answer_relevancy(&self, sample: &EvalSample) -> Option<f64> {
        if sample.answer.trim().is_empty() {
            return Some(0.0);
        }
        let texts = vec![sample.question.clone(), sample.answer.clone()];
        match self.embedder.embed_batch(&texts).await {
            Ok(vectors) if vectors.len() == 2 => {
                Some((cosine_similarity(&vectors[0], &vectors[1]) as f64).clamp(0.0, 1.0))
            }
            Ok(_) => {
                warn!("answer_relevancy: embedding count mismatch");
                None
            }
            Err(e) => {
                warn!("answer_relevancy embedding failed: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Scorer for LlmJudgeScorer {
    async fn score(&self, sample: &EvalSample) -> MetricScores {
        MetricScores {
            faithfulness: self.faithfulness(sample).await,
            answer_relevancy: self.answer_relevancy(sample).await,
            context_precision: self.context_precision(sample).await,
            context_recall: self.context_recall(sample).await,
        }
    }
}

fn unparsed(metric: Metric, reply: &str) -> Option<f64> {
    warn!("Could not read a {} score from: {}", metric, reply.trim());
    None
}

fn numbered_contexts(contexts: &[String]) -> String {
    contexts
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}]\n{}", i + 1, c))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn faithfulness_prompt(sample: &EvalSample) -> String {
    format!(
        "Split the ANSWER into its individual factual claims and decide for each whether it can be inferred from the CONTEXT.\n\
         Reply with JSON {{\"score\": x}} where x is the fraction of claims that are supported, between 0 and 1.\n\n\
         CONTEXT:\n{}\n\nQUESTION:\n{}\n\nANSWER:\n{}\n\nScore:",
        numbered_contexts(&sample.contexts),
        sample.question,
        sample.answer
    )
}

fn context_recall_prompt(sample: &EvalSample) -> String {
    format!(
        "Split the REFERENCE ANSWER into its individual statements and decide for each whether it can be attributed to the CONTEXT.\n\
         Reply with JSON {{\"score\": x}} where x is the fraction of statements that are attributable, between 0 and 1.\n\n\
         CONTEXT:\n{}\n\nQUESTION:\n{}\n\nREFERENCE ANSWER:\n{}\n\nScore:",
        numbered_contexts(&sample.contexts),
        sample.question,
        sample.ground_truth
    )
}

fn context_precision_prompt(sample: &EvalSample) -> String {
    format!(
        "For each numbered CONTEXT below, decide whether it was useful for arriving at the REFERENCE ANSWER to the QUESTION.\n\
         Reply with a JSON list of {} verdicts in context order, 1 for useful and 0 for not useful, e.g. [1, 0].\n\n\
         QUESTION:\n{}\n\nREFERENCE ANSWER:\n{}\n\nCONTEXTS:\n{}\n\nVerdicts:",
        sample.contexts.len(),
        sample.question,
        sample.ground_truth,
        numbered_contexts(&sample.contexts)
    )
}

#[derive(Debug, Deserialize)]
struct ScoreReply {
    score: f64,
}

/// Score from a `{"score": x}` reply, else the last number in the reply,
/// clamped to [0, 1]
pub fn parse_score(reply: &str) -> Option<f64> {
    let from_json = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str::<ScoreReply>(&reply[start..=end])
            .ok()
            .map(|r| r.score),
        _ => None,
    };

    from_json
        .or_else(|| {
            SCORE_REGEX
                .find_iter(reply)
                .last()
                .and_then(|m| m.as_str().parse::<f64>().ok())
        })
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

/// `expected` 0/1 verdicts from a JSON list or, failing that, from the
/// first bare 0/1 tokens of the reply
pub fn parse_verdicts(reply: &str, expected: usize) -> Option<Vec<bool>> {
    let start = reply.find('[');
    let end = reply.rfind(']');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(&reply[start..=end]) {
                let verdicts: Option<Vec<bool>> = values
                    .iter()
                    .map(|v| match v {
                        serde_json::Value::Bool(b) => Some(*b),
                        serde_json::Value::Number(n) => n.as_f64().map(|f| f >= 0.5),
                        _ => None,
                    })
                    .collect();
                if let Some(verdicts) = verdicts.filter(|v| v.len() == expected) {
                    return Some(verdicts);
                }
            }
        }
    }

    let tokens: Vec<bool> = VERDICT_REGEX
        .find_iter(reply)
        .map(|m| m.as_str() == "1")
        .take(expected)
        .collect();
    (tokens.len() == expected).then_some(tokens)
}

/// Mean of precision@k over the relevant positions; 0 when none is relevant
pub fn average_precision(verdicts: &[bool]) -> f64 {
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (idx, relevant) in verdicts.iter().enumerate() {
        if *relevant {
            hits += 1;
            sum += hits as f64 / (idx + 1) as f64;
        }
    }
    if hits == 0 { 0.0 } else { sum / hits as f64 }
}
