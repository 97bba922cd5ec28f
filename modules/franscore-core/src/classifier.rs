//! Production `Classifier` backed by the OpenAI client.

use ai_client::OpenAi;
use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use franscore_common::{ModerationAssessment, TermSentiment};

use crate::Classifier;

const MODERATION_SYSTEM_PROMPT: &str = "\
You are a content moderation AI for a franchise review platform. Analyze the \
review and provide:
1. category: \"clean\" (appropriate), \"needs_review\" (questionable), or \
\"rejected\" (violates guidelines)
2. sentiment: \"positive\", \"negative\", or \"neutral\"
3. sentiment_score from -1.0 (very negative) to 1.0 (very positive)
4. flags, e.g. \"profanity\", \"spam\", \"defamatory\", \"personal_attack\", \
\"fake_review\"
5. a brief summary of the review

Grounds for rejection: profanity or hate speech, personal attacks on \
individuals, clearly defamatory statements without evidence, spam or \
promotional content, off-topic content.";

const TERM_EXTRACTION_SYSTEM_PROMPT: &str = "\
Extract key words and phrases from this franchise review. For each, identify \
whether the surrounding context is positive, negative, or neutral. Focus on \
franchise-relevant terms: support, training, profit, culture, communication, \
fees, marketing, territory, and similar.";

/// Wrapper shape for term extraction so the schema has an object root,
/// which strict structured output requires.
#[derive(Debug, Deserialize, JsonSchema)]
struct ExtractedTerms {
    keywords: Vec<TermSentiment>,
}

/// Stands in when OPENAI_API_KEY is missing. Every call errors, which the
/// callers already treat as "degrade to manual review".
pub struct UnconfiguredClassifier;

#[async_trait]
impl Classifier for UnconfiguredClassifier {
    async fn classify(&self, _title: &str, _content: &str) -> Result<ModerationAssessment> {
        Err(anyhow::anyhow!("classifier not configured"))
    }

    async fn extract_terms(&self, _content: &str) -> Result<Vec<TermSentiment>> {
        Err(anyhow::anyhow!("classifier not configured"))
    }
}

pub struct OpenAiClassifier {
    ai: OpenAi,
}

impl OpenAiClassifier {
    pub fn new(ai: OpenAi) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(&self, title: &str, content: &str) -> Result<ModerationAssessment> {
        let assessment: ModerationAssessment = self
            .ai
            .extract(
                MODERATION_SYSTEM_PROMPT,
                format!("Title: {title}\n\nContent: {content}"),
            )
            .await?;
        Ok(assessment)
    }

    async fn extract_terms(&self, content: &str) -> Result<Vec<TermSentiment>> {
        let extracted: ExtractedTerms = self
            .ai
            .extract(TERM_EXTRACTION_SYSTEM_PROMPT, content.to_string())
            .await?;
        Ok(extracted.keywords)
    }
}
