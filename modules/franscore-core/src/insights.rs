//! Per-brand term-sentiment tracking behind the insight word cloud.
//!
//! Counts only ever grow. There is no decrement path: rejecting or
//! removing a review leaves previously folded terms in place (known
//! asymmetry, kept deliberately).

use sqlx::PgConnection;
use uuid::Uuid;

use franscore_common::TermSentiment;
use franscore_domains::insights::WordFrequency;

use crate::Result;

/// Longest term the store accepts; matches the column width.
const MAX_WORD_LEN: usize = 100;

/// Normalize extractor output: lowercase, trim, drop empties and
/// over-long strings, and collapse duplicates so one review increments a
/// given `(brand, word)` pair at most once. The last sentiment observed
/// for a duplicated word wins.
pub fn dedupe_terms(terms: Vec<TermSentiment>) -> Vec<TermSentiment> {
    let mut out: Vec<TermSentiment> = Vec::with_capacity(terms.len());
    for term in terms {
        let word = term.word.trim().to_lowercase();
        if word.is_empty() || word.len() > MAX_WORD_LEN {
            continue;
        }
        match out.iter_mut().find(|t| t.word == word) {
            Some(existing) => existing.sentiment = term.sentiment,
            None => out.push(TermSentiment {
                word,
                sentiment: term.sentiment,
            }),
        }
    }
    out
}

/// Fold one approved review's terms into the brand's counters. Runs
/// inside the moderation transaction so the word cloud and the status
/// change commit together.
pub async fn fold_review_terms(
    brand_id: Uuid,
    terms: &[TermSentiment],
    conn: &mut PgConnection,
) -> Result<()> {
    for term in terms {
        WordFrequency::record_term(brand_id, &term.word, term.sentiment.as_str(), conn).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use franscore_common::Sentiment;

    fn term(word: &str, sentiment: Sentiment) -> TermSentiment {
        TermSentiment {
            word: word.to_string(),
            sentiment,
        }
    }

    #[test]
    fn terms_are_lowercased_and_trimmed() {
        let out = dedupe_terms(vec![term("  Training  ", Sentiment::Positive)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].word, "training");
    }

    #[test]
    fn duplicates_collapse_to_one_increment() {
        let out = dedupe_terms(vec![
            term("support", Sentiment::Positive),
            term("Support", Sentiment::Negative),
            term("fees", Sentiment::Negative),
        ]);
        assert_eq!(out.len(), 2);
        // Latest observed sentiment wins for the collapsed pair.
        assert_eq!(out[0].word, "support");
        assert_eq!(out[0].sentiment, Sentiment::Negative);
    }

    #[test]
    fn empty_and_oversized_words_are_dropped() {
        let long = "x".repeat(MAX_WORD_LEN + 1);
        let out = dedupe_terms(vec![
            term("", Sentiment::Neutral),
            term("   ", Sentiment::Neutral),
            term(&long, Sentiment::Neutral),
            term("territory", Sentiment::Positive),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].word, "territory");
    }
}
