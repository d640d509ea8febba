//! Inline-mode responder: shows the query text in a few transformed forms.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{
    InlineQuery, InlineQueryResult, InlineQueryResultArticle, InputMessageContent,
    InputMessageContentText,
};
use tracing::debug;

/// One inline suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTransform {
    /// Stable result id
    pub id: &'static str,
    /// Title shown in the result list
    pub title: &'static str,
    /// Text sent when the result is picked
    pub text: String,
}

/// Transformed variants of an inline query; empty for a blank query.
///
/// # Examples
///
/// ```
/// use unsplash_relay_bot::bot::inline::text_transforms;
/// let results = text_transforms("Hello");
/// assert_eq!(results[0].text, "HELLO");
/// assert!(text_transforms("  ").is_empty());
/// ```
#[must_use]
pub fn text_transforms(query: &str) -> Vec<TextTransform> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    vec![
        TextTransform {
            id: "upper",
            title: "UPPERCASE",
            text: query.to_uppercase(),
        },
        TextTransform {
            id: "lower",
            title: "lowercase",
            text: query.to_lowercase(),
        },
        TextTransform {
            id: "reversed",
            title: "desreveR",
            text: query.chars().rev().collect(),
        },
    ]
}

fn to_article(transform: TextTransform) -> InlineQueryResult {
    let content = InputMessageContent::Text(InputMessageContentText::new(transform.text.clone()));
    InlineQueryResult::Article(
        InlineQueryResultArticle::new(transform.id.to_string(), transform.title, content)
            .description(transform.text),
    )
}

/// Answer an inline query with [`text_transforms`].
///
/// # Errors
///
/// Returns an error if the answer cannot be delivered to Telegram.
pub async fn answer_inline_query(bot: Bot, query: InlineQuery) -> Result<()> {
    let results: Vec<InlineQueryResult> = text_transforms(&query.query)
        .into_iter()
        .map(to_article)
        .collect();
    debug!(
        "Answering inline query from {} with {} results",
        query.from.id,
        results.len()
    );

    bot.answer_inline_query(query.id, results).await?;
    Ok(())
}
