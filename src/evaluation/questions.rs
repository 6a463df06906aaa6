/*!
 * Synthetic question generation.
 *
 * The whole thesis and its bibliography are sent to the question model in
 * one prompt; the reply is a JSON list of `{question, ground_truth}`.
 */

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

use crate::file_utils::FileManager;
use crate::providers::{CompletionProvider, TokenUsageStats};

/// One evaluation question with its reference answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalItem {
    pub question: String,
    pub ground_truth: String,
}

/// Which question set to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStyle {
    /// About 50 questions of any granularity
    Detailed,
    /// About 15 big-picture questions
    Conceptual,
}

/// Prompt for `style` over the thesis and bibliography text
pub fn build_question_prompt(style: QuestionStyle, thesis: &str, bibliography: &str) -> String {
    match style {
        QuestionStyle::Conceptual => format!(
            r#"Generate approximately 15 high-level, conceptual questions based on the document below (master's thesis), along with their answers.

The questions should:
- focus on big-picture aspects of the thesis:
  - research goals and motivations
  - theoretical background
  - methodology
  - data used in the study
  - overall findings and key conclusions
  - limitations and future work
- DO NOT ask about low-level details.

The answers must:
- include citing if needed: find appropriate tags in the bibliography file and extract the author and year -> use citations in a form (Author, Year)
- be written as complete, grammatically correct sentences
- vary in length depending on the question
- use bullet points, numbered lists, or tables if suitable

Formatting requirements:
- Produce strictly valid JSON
- Output a list of objects, each with:
  - "question"
  - "ground_truth"

The document:

{thesis}

The bibliography (.bib format):

{bibliography}
"#
        ),
        QuestionStyle::Detailed => format!(
            r#"Generate approximately 50 questions based on the document below (master's thesis) along with their answers.

- Each answer must be written as a complete, grammatically correct sentence, even if it is short.
- The answers should vary in length and format depending on the question.
- Don't forget about bullet points, numbered lists, or tables if suitable.
- Make sure every question is meaningful and answerable based on the document.
- Include citing if needed: find appropriate tags in the bibliography file and extract the author and year -> use citations in a form (Author, Year)
- Generate the output strictly in valid JSON format as a list of objects, where each object has two fields: "question" and "ground_truth".

The document:

{thesis}

The bibliography (.bib format):

{bibliography}
"#
        ),
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```)
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim().trim_matches('`').trim_start();
    let text = text.strip_prefix("json").unwrap_or(text);
    text.trim()
}

/// Parse the model reply into evaluation items.
///
/// When the fenced text is not valid JSON, the outermost `[...]` is tried
/// before giving up.
pub fn parse_eval_items(raw: &str) -> Result<Vec<EvalItem>> {
    let text = strip_code_fences(raw);
    match serde_json::from_str::<Vec<EvalItem>>(text) {
        Ok(items) => Ok(items),
        Err(first_error) => {
            let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
                return Err(anyhow!("Reply is not a JSON list: {}", first_error));
            };
            if end <= start {
                return Err(anyhow!("Reply is not a JSON list: {}", first_error));
            }
            warn!("Reply had text around the JSON list; parsing the bracketed part");
            serde_json::from_str(&text[start..=end])
                .with_context(|| format!("Reply is not a JSON list of questions ({})", first_error))
        }
    }
}

/// Ask `llm` for questions about the thesis
pub async fn generate_questions(
    llm: &dyn CompletionProvider,
    thesis: &str,
    bibliography: &str,
    style: QuestionStyle,
) -> Result<Vec<EvalItem>> {
    let prompt = build_question_prompt(style, thesis, bibliography);
    info!(
        "Requesting {:?} questions from {} ({} prompt characters)",
        style,
        llm.model_name(),
        prompt.chars().count()
    );

    let mut usage = TokenUsageStats::with_provider_info("anthropic", llm.model_name());
    let started = Instant::now();
    let completion = llm
        .complete(&prompt)
        .await
        .context("Question generation request failed")?;
    usage.record(&completion, started.elapsed());
    info!("{}", usage.summary());

    let items = parse_eval_items(&completion.text)?;
    if items.is_empty() {
        warn!("The model returned an empty question list");
    }
    Ok(items)
}

/// Write items as JSON indented by four spaces
pub fn save_eval_items<P: AsRef<Path>>(path: P, items: &[EvalItem]) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    items
        .serialize(&mut serializer)
        .context("Failed to serialize evaluation items")?;
    let json = String::from_utf8(buffer).context("Serialized JSON was not UTF-8")?;
    FileManager::write_to_file(path, &json)
}

/// Read an evaluation set
pub fn load_eval_items<P: AsRef<Path>>(path: P) -> Result<Vec<EvalItem>> {
    FileManager::read_json(path)
}
