//! Keyword relevance scoring
//!
//! Relevance is plain case-insensitive substring overlap between a prompt and a
//! keyword list; the score is the number of keywords found.

use promptlens_types::Matched;

/// Keywords of one list found in a text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordMatch {
    /// Matching keywords, in the order they appear in the keyword list
    pub matched_keywords: Vec<String>,
    /// Number of matching keywords
    pub score: u32,
}

/// Score `text` against `keywords`.
#[must_use]
pub fn match_keywords<S: AsRef<str>>(text: &str, keywords: &[S]) -> KeywordMatch {
    let text_lower = text.to_lowercase();
    let matched_keywords: Vec<String> = keywords
        .iter()
        .map(|kw| kw.as_ref())
        .filter(|kw| !kw.is_empty() && text_lower.contains(&kw.to_lowercase()))
        .map(str::to_string)
        .collect();
    let score = u32::try_from(matched_keywords.len()).unwrap_or(u32::MAX);
    KeywordMatch {
        matched_keywords,
        score,
    }
}

/// Score every item, keep those with a positive score, and order them by
/// descending score. The sort is stable, so ties keep their input order.
pub fn match_items_by_keywords<T, F>(text: &str, items: Vec<T>, keywords_of: F) -> Vec<Matched<T>>
where
    F: Fn(&T) -> &[String],
{
    let mut matches: Vec<Matched<T>> = items
        .into_iter()
        .filter_map(|item| {
            let KeywordMatch {
                matched_keywords,
                score,
            } = match_keywords(text, keywords_of(&item));
            (score > 0).then_some(Matched {
                item,
                matched_keywords,
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}
