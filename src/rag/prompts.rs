/*!
 * Prompt for grounded answers.
 */

/// Returned instead of an answer when retrieval finds nothing relevant
pub const NO_CONTEXT_ANSWER: &str = "Unable to find relevant context in the thesis";

/// Phrase the model is told to use for off-topic questions
pub const OFF_TOPIC_ANSWER: &str = "This question is not related to the provided thesis context.";

/// Separator between retrieved chunks in the prompt
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Join retrieved chunks into the prompt context
pub fn join_contexts(contexts: &[String]) -> String {
    contexts.join(CONTEXT_SEPARATOR)
}

/// Build the strict context-only prompt
pub fn build_answer_prompt(context_text: &str, question: &str) -> String {
    format!(
        r#"You are answering a question based strictly on the provided CONTEXT, which comes from a master's thesis.
The CONTEXT may contain chapter or section headers; these headers are metadata only and must NOT be mentioned, paraphrased, or used as sources in your answer.

When citing, always use the original citation tags from the context (don't change their form).
Do NOT cite chapter titles, section names, or headers.
Use all citation tags that are relevant to your answer.
Do NOT invent new citation keys.
If the question is not related to the CONTEXT, do NOT attempt to answer it; instead, clearly say:
'{off_topic}'

CONTEXT:

{context}

QUESTION:

{question}

Provide a clear answer:
"#,
        off_topic = OFF_TOPIC_ANSWER,
        context = context_text,
        question = question,
    )
}
