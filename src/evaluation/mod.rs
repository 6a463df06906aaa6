/*!
 * Evaluation of the question-answering pipeline.
 *
 * - `questions`: synthetic question sets from the question model
 * - `scorer`: per-answer metrics judged by a model
 * - `harness`: answers and scores a question set
 * - `results`: CSV persistence
 * - `charts`: SVG box plot and line charts
 */

pub mod charts;
pub mod harness;
pub mod questions;
pub mod results;
pub mod scorer;

pub use charts::write_charts;
pub use harness::{EvalRecord, metric_means, run_evaluation};
pub use questions::{EvalItem, QuestionStyle, generate_questions, load_eval_items, save_eval_items};
pub use results::{read_results, write_results};
pub use scorer::{EvalSample, LlmJudgeScorer, Metric, MetricScores, Scorer};
