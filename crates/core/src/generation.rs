use crate::error::GenerationError;
use crate::models::ScoredChunk;
use crate::traits::Completer;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

/// Format retrieved chunks into a single context block, each prefixed with
/// its source file and similarity score.
pub fn format_context(hits: &[ScoredChunk]) -> String {
    let mut parts = Vec::new();
    for hit in hits {
        parts.push(format!(
            "[Source: {} | Score: {:.3}]",
            hit.chunk.source, hit.score
        ));
        parts.push(hit.chunk.text.clone());
        parts.push(String::new());
    }
    parts.join("\n")
}

/// Compose the support-assistant prompt: retrieved context first, the user
/// question after it. Deterministic for a given question and hit list.
pub fn build_prompt(question: &str, hits: &[ScoredChunk]) -> String {
    let context = format_context(hits);

    format!(
        "You are a helpful support assistant for the SmartHeat Pro thermostat.\n\
         \n\
         You must ONLY use the information in the CONTEXT below to answer the user's question.\n\
         If the answer is not in the context, say you don't know and suggest that the user contact SmartHeat support.\n\
         \n\
         CONTEXT:\n\
         {context}\n\
         \n\
         QUESTION:\n\
         {question}\n\
         \n\
         Answer in a concise, clear way, in 3 to 6 sentences at most.\n\
         If a specific document/source is important, mention it briefly."
    )
}

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet".to_string(),
            max_tokens: 512,
            temperature: 0.2,
            top_p: 0.9,
        }
    }
}

/// Client for a hosted messages-style completion service.
pub struct HttpCompleter {
    endpoint: String,
    api_key: Option<String>,
    options: GenerationOptions,
    client: Client,
}

impl HttpCompleter {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            options,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Completer for HttpCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        info!(model = %self.options.model, "calling generation service");

        let body = json!({
            "model": self.options.model,
            "max_tokens": self.options.max_tokens,
            "temperature": self.options.temperature,
            "top_p": self.options.top_p,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": prompt }
                    ],
                }
            ],
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().to_string();
            let details = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend { status, details });
        }

        let parsed: Value = response.json().await?;
        let answer = parsed
            .pointer("/content/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GenerationError::Response(format!("unexpected completion payload: {parsed}"))
            })?;

        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;

    fn hit(index: u64, source: &str, text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                chunk_id: format!("id-{index}"),
                source: source.to_string(),
                chunk_index: index,
                text: text.to_string(),
            },
            score,
        }
    }

    #[test]
    fn context_lists_chunks_in_supplied_order() {
        let hits = vec![
            hit(0, "setup.txt", "Hold the pair button.", 0.91),
            hit(1, "faq.txt", "Check the breaker.", 0.42),
        ];

        let context = format_context(&hits);
        let first = context.find("Hold the pair button.").unwrap();
        let second = context.find("Check the breaker.").unwrap();
        assert!(first < second);
        assert!(context.contains("[Source: setup.txt | Score: 0.910]"));
        assert!(context.contains("[Source: faq.txt | Score: 0.420]"));
    }

    #[test]
    fn prompt_places_context_before_question() {
        let hits = vec![hit(0, "setup.txt", "Press and hold for 5 seconds.", 0.8)];
        let prompt = build_prompt("How do I pair the device?", &hits);

        let context_at = prompt.find("Press and hold for 5 seconds.").unwrap();
        let question_at = prompt.find("How do I pair the device?").unwrap();
        assert!(context_at < question_at);
        assert!(prompt.contains("CONTEXT:"));
        assert!(prompt.contains("QUESTION:"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let hits = vec![hit(0, "a.txt", "some text", 0.5)];
        assert_eq!(
            build_prompt("question?", &hits),
            build_prompt("question?", &hits)
        );
    }

    #[test]
    fn empty_context_still_composes_a_prompt() {
        let prompt = build_prompt("Is anyone there?", &[]);
        assert!(prompt.contains("CONTEXT:"));
        assert!(prompt.contains("Is anyone there?"));
    }
}
