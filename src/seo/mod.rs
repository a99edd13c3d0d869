//! SEO title/description generation through a text-generation API.

mod prompt;

pub use prompt::build_prompt;

use crate::llm::{LlmClient, LlmMessage};
use crate::models::{ProductCategory, SeoPair};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 60;
pub const MAX_DESCRIPTION_CHARS: usize = 160;

#[derive(Debug, Error)]
pub enum SeoError {
    #[error("text generation failed: {0}")]
    Generation(String),
    #[error("no candidate returned by the text-generation api")]
    EmptyResponse,
    #[error("malformed reply: {reason}; raw content: {raw}")]
    MalformedReply { reason: String, raw: String },
    #[error(
        "generated text exceeds limits: title {title_chars}/60 chars, description {description_chars}/160 chars"
    )]
    ConstraintViolation {
        title_chars: usize,
        description_chars: usize,
    },
}

/// Product fields handed to the generator. `description` is expected to be
/// normalized text, not raw HTML.
#[derive(Debug, Clone, Copy)]
pub struct SeoInput<'a> {
    pub name: &'a str,
    pub short_description: &'a str,
    pub description: &'a str,
    pub categories: &'a [ProductCategory],
}

#[async_trait]
pub trait SeoGenerator: Send + Sync {
    /// Produces one candidate pair. Implementations do not retry.
    async fn generate(&self, input: &SeoInput<'_>) -> Result<SeoPair, SeoError>;
}

pub struct LlmSeoGenerator {
    llm: LlmClient,
    context: Option<String>,
}

impl LlmSeoGenerator {
    pub fn new(llm: LlmClient, context: Option<String>) -> Self {
        Self { llm, context }
    }
}

#[async_trait]
impl SeoGenerator for LlmSeoGenerator {
    async fn generate(&self, input: &SeoInput<'_>) -> Result<SeoPair, SeoError> {
        let prompt = build_prompt(input, self.context.as_deref());
        let response = self
            .llm
            .chat(&[LlmMessage::user(prompt)])
            .await
            .map_err(|err| SeoError::Generation(err.to_string()))?;
        let content = response
            .candidates
            .into_iter()
            .next()
            .ok_or(SeoError::EmptyResponse)?;
        let pair = parse_reply(&content)?;
        validate(pair)
    }
}

#[derive(Deserialize)]
struct SeoReply {
    meta_title: Option<String>,
    meta_description: Option<String>,
}

/// Parses the reply content as a JSON object carrying `meta_title` and
/// `meta_description`. A surrounding Markdown code fence is tolerated.
pub fn parse_reply(content: &str) -> Result<SeoPair, SeoError> {
    let malformed = |reason: String| SeoError::MalformedReply {
        reason,
        raw: content.to_string(),
    };
    let cleaned = strip_markdown_fence(content);
    let reply: SeoReply = serde_json::from_str(cleaned)
        .map_err(|err| malformed(format!("invalid json: {err}")))?;
    let title = reply
        .meta_title
        .ok_or_else(|| malformed("missing \"meta_title\"".into()))?;
    let description = reply
        .meta_description
        .ok_or_else(|| malformed("missing \"meta_description\"".into()))?;
    Ok(SeoPair {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
    })
}

/// Checks the length limits, counted in characters.
pub fn validate(pair: SeoPair) -> Result<SeoPair, SeoError> {
    let title_chars = pair.title.chars().count();
    let description_chars = pair.description.chars().count();
    if title_chars > MAX_TITLE_CHARS || description_chars > MAX_DESCRIPTION_CHARS {
        return Err(SeoError::ConstraintViolation {
            title_chars,
            description_chars,
        });
    }
    Ok(pair)
}

/// Returns the body of a fenced block (language tag dropped), or the trimmed
/// input when it is not fenced.
fn strip_markdown_fence(input: &str) -> &str {
    let trimmed = input.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(categories: &'a [ProductCategory]) -> SeoInput<'a> {
        SeoInput {
            name: "Oak Rigid Plank",
            short_description: "Stone polymer core",
            description: "## Specs\nClick-lock install",
            categories,
        }
    }

    #[test]
    fn prompt_embeds_all_inputs_and_contract() {
        let categories = vec![ProductCategory {
            id: 3,
            name: "Vinyl".into(),
            slug: "vinyl".into(),
        }];
        let prompt = build_prompt(&input(&categories), Some("flooring supplier"));
        assert!(prompt.contains("Product Name: Oak Rigid Plank"));
        assert!(prompt.contains("Short Description: Stone polymer core"));
        assert!(prompt.contains("## Specs\nClick-lock install"));
        assert!(prompt.contains("Categories: Vinyl"));
        assert!(prompt.contains("Store context: flooring supplier"));
        assert!(prompt.contains("\"meta_title\""));
        assert!(prompt.contains("60 characters or fewer"));
        assert!(prompt.contains("160 characters or fewer"));
    }

    #[test]
    fn prompt_without_categories_or_context() {
        let prompt = build_prompt(&input(&[]), None);
        assert!(prompt.contains("Categories: none"));
        assert!(!prompt.contains("Store context"));
    }

    #[test]
    fn parses_plain_and_fenced_replies() {
        let plain = r#"{"meta_title": "Oak Plank", "meta_description": "Durable oak."}"#;
        let pair = parse_reply(plain).expect("plain");
        assert_eq!(pair.title, "Oak Plank");
        assert_eq!(pair.description, "Durable oak.");

        let fenced = "```json\n{\"meta_title\": \"A\", \"meta_description\": \"B\"}\n```";
        let pair = parse_reply(fenced).expect("fenced");
        assert_eq!(pair.title, "A");
        assert_eq!(pair.description, "B");
    }

    #[test]
    fn non_json_reply_is_malformed() {
        let err = parse_reply("Sure! Here is your title.").expect_err("malformed");
        match err {
            SeoError::MalformedReply { reason, raw } => {
                assert!(reason.starts_with("invalid json"));
                assert_eq!(raw, "Sure! Here is your title.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = parse_reply(r#"{"meta_title": "Only title"}"#).expect_err("malformed");
        assert!(
            matches!(err, SeoError::MalformedReply { ref reason, .. } if reason.contains("meta_description"))
        );
    }

    #[test]
    fn length_limits_count_characters() {
        let ok = SeoPair {
            title: "é".repeat(60),
            description: "ü".repeat(160),
        };
        assert!(validate(ok).is_ok());

        let err = validate(SeoPair {
            title: "t".repeat(61),
            description: "d".repeat(10),
        })
        .expect_err("too long");
        assert!(matches!(
            err,
            SeoError::ConstraintViolation {
                title_chars: 61,
                description_chars: 10
            }
        ));

        assert!(
            validate(SeoPair {
                title: "t".into(),
                description: "d".repeat(161),
            })
            .is_err()
        );
    }
}
