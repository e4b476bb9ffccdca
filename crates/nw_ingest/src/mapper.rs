use crate::client::{Envelope, RawArticle};
use chrono::{DateTime, Local, NaiveDateTime};
use nw_core::Article;
use uuid::Uuid;

/// Converts an upstream envelope into canonical articles tagged with the
/// request-time category. Provider articles without a usable title are
/// dropped; nothing else is rejected.
pub fn map_envelope(envelope: &Envelope, category: &str) -> Vec<Article> {
    envelope
        .articles
        .iter()
        .filter_map(|raw| map_article(raw, category))
        .collect()
}

fn map_article(raw: &RawArticle, category: &str) -> Option<Article> {
    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let (source_id, source_name) = match &raw.source {
        Some(source) => (source.id.clone(), source.name.clone()),
        None => (None, None),
    };

    Some(Article {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: raw.description.clone(),
        content: raw.content.clone(),
        author: raw.author.clone(),
        source_id,
        source_name,
        url: raw.url.clone(),
        image_url: raw.url_to_image.clone(),
        published_at: raw.published_at.as_deref().map(parse_published_at),
        fetched_at: Local::now().naive_local(),
        category: category.to_string(),
    })
}

/// Parses the provider's ISO-8601 offset instant, keeping the wall-clock
/// reading. A value that does not parse falls back to now rather than null.
fn parse_published_at(raw: &str) -> NaiveDateTime {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .unwrap_or_else(|_| Local::now().naive_local())
}
