// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval and answer generation.
//!
//! `Retriever` is pure composition: embed the question, ask the store for
//! nearest chunks. Answer generation is an external collaborator behind
//! `AnswerProvider`; the command implementation pipes a JSON payload to a
//! user-configured process and reads the answer from its stdout, the same
//! protocol the embedding command provider speaks.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::embedding::{embed_chunk, EmbeddingProvider};
use crate::store::{SearchHit, VectorStore};

/// Default number of chunks to retrieve per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Answers "top-k most similar chunks" queries against one store.
pub struct Retriever<'a> {
    provider: &'a mut dyn EmbeddingProvider,
    store: &'a VectorStore,
}

impl<'a> Retriever<'a> {
    pub fn new(provider: &'a mut dyn EmbeddingProvider, store: &'a VectorStore) -> Self {
        Self { provider, store }
    }

    /// Embeds the question and returns up to `k` nearest chunks.
    pub fn query(&mut self, question: &str, k: usize) -> Result<Vec<SearchHit>> {
        let vector = embed_chunk(self.provider, question)?;
        if vector.is_empty() {
            bail!("Cannot search with an empty question");
        }

        debug!(k, store_records = self.store.len(), "running similarity search");
        Ok(self.store.search(&vector, k)?)
    }
}

/// Trait for answer-generation collaborators.
pub trait AnswerProvider {
    /// Returns the model identifier.
    fn model_id(&self) -> &str;

    /// Generates an answer to `question` given retrieved context chunks in
    /// rank order.
    fn generate(&mut self, question: &str, contexts: &[String]) -> Result<String>;
}

/// Renders the retrieval context into the prompt handed to the answerer.
pub fn build_prompt(question: &str, contexts: &[String]) -> String {
    let context = contexts.join("\n\n");
    format!(
        "Based on the following resume information, please answer the question.\n\n\
         Resume Information:\n{context}\n\n\
         Question: {question}\n\n\
         Please provide a comprehensive answer based on the resume information provided."
    )
}

/// Answer provider that shells out to an external process.
///
/// The command receives `{model, question, context, prompt}` as JSON on
/// stdin and must print the answer to stdout.
pub struct CommandAnswerer {
    command: String,
    model: String,
}

impl CommandAnswerer {
    pub fn new(command: String, model: String) -> Self {
        Self { command, model }
    }
}

impl AnswerProvider for CommandAnswerer {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn generate(&mut self, question: &str, contexts: &[String]) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "question": question,
            "context": contexts,
            "prompt": build_prompt(question, contexts),
        });

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn answer command: {}", self.command))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A command that answers without reading stdin closes the pipe
            // early; that is not a failure.
            if let Err(err) = stdin.write_all(payload.to_string().as_bytes()) {
                if err.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(err).context("Failed to write answer payload to stdin");
                }
            }
        }

        let output = child
            .wait_with_output()
            .context("Failed to read answer command output")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Answer command failed (status {}): {}",
                output.status,
                stderr.trim()
            );
        }

        let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if answer.is_empty() {
            bail!("Answer command produced no output");
        }
        Ok(answer)
    }
}
