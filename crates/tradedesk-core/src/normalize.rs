//! Mapping from provider payloads to canonical values.
//!
//! Provider adapters deserialize their own schema and hand the extracted
//! fields to the helpers here, so the canonical invariants (price untouched,
//! consistent day range, non-empty articles, ten-article cap) live in one
//! place.

use std::sync::OnceLock;

use regex::Regex;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::fallback::{round_cents, uniform, RandomSource};
use crate::{DataQuality, NewsArticle, NewsBatch, ProviderId, Quote, SourceError, Symbol, UtcDateTime};

pub const MAX_ARTICLES: usize = 10;

const SYNTHETIC_CHANGE_PERCENT: f64 = 2.0;
const MISSING_HIGH_FACTOR: f64 = 1.02;
const MISSING_LOW_FACTOR: f64 = 0.98;
const MISSING_OPEN_FACTOR: f64 = 0.999;

/// Price-like fields extracted from one provider response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteFields {
    pub price: Option<f64>,
    pub name: Option<String>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
    pub as_of: Option<UtcDateTime>,
}

impl QuoteFields {
    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }
}

/// Builds a canonical quote from provider fields.
///
/// The provider price is kept as reported. Change fields come from the
/// provider when present, from the previous close when only that is known,
/// and otherwise from a jittered previous close; the last case is tagged
/// [`DataQuality::MarketAccurate`].
pub fn quote_from_fields(
    provider: ProviderId,
    symbol: &Symbol,
    fields: QuoteFields,
    random: &dyn RandomSource,
) -> Result<Quote, SourceError> {
    let price = fields
        .price
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or_else(|| {
            SourceError::invalid_response(format!("{provider} response has no positive price"))
        })?;

    let positive = |value: Option<f64>| value.filter(|v| v.is_finite() && *v > 0.0);
    let previous_close = positive(fields.previous_close);

    let (change, change_percent, previous_close, data_quality) =
        match (fields.change, fields.change_percent, previous_close) {
            (Some(change), Some(change_percent), previous_close)
                if change.is_finite() && change_percent.is_finite() =>
            {
                (change, change_percent, previous_close, DataQuality::Live)
            }
            (_, _, Some(previous_close)) => {
                let change = price - previous_close;
                (
                    change,
                    change / previous_close * 100.0,
                    Some(previous_close),
                    DataQuality::Live,
                )
            }
            _ => {
                let change_percent =
                    uniform(random, -SYNTHETIC_CHANGE_PERCENT, SYNTHETIC_CHANGE_PERCENT);
                let previous_close = price / (1.0 + change_percent / 100.0);
                (
                    price - previous_close,
                    change_percent,
                    Some(round_cents(previous_close)),
                    DataQuality::MarketAccurate,
                )
            }
        };

    let name = fields
        .name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| symbol.default_name());

    // The day range must contain the price even when a provider reports
    // only one bound, or a stale one.
    let high = positive(fields.high)
        .unwrap_or_else(|| round_cents(price * MISSING_HIGH_FACTOR))
        .max(price);
    let low = positive(fields.low)
        .unwrap_or_else(|| round_cents(price * MISSING_LOW_FACTOR))
        .min(price);

    let quote = Quote {
        symbol: symbol.as_str().to_owned(),
        name,
        price,
        change: round_cents(change),
        change_percent: round_cents(change_percent),
        high,
        low,
        open: positive(fields.open).unwrap_or_else(|| round_cents(price * MISSING_OPEN_FACTOR)),
        previous_close,
        volume: fields
            .volume
            .filter(|volume| volume.is_finite() && *volume >= 0.0)
            .map_or(0, |volume| volume as u64),
        last_updated: fields.as_of.unwrap_or_else(UtcDateTime::now),
        source: provider.display_name().to_owned(),
        data_quality,
    };

    Ok(quote.validated()?)
}

/// Keeps complete articles, caps the list and rejects an empty result.
pub fn collect_articles<I>(
    provider: ProviderId,
    candidates: I,
    limit: usize,
) -> Result<NewsBatch, SourceError>
where
    I: IntoIterator<Item = Option<NewsArticle>>,
{
    let articles = candidates
        .into_iter()
        .flatten()
        .take(limit.clamp(1, MAX_ARTICLES))
        .collect::<Vec<_>>();

    if articles.is_empty() {
        return Err(SourceError::invalid_response(format!(
            "{provider} returned no articles with both title and description"
        )));
    }

    Ok(NewsBatch { articles })
}

fn rss_item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>").expect("static pattern"))
}

fn cdata_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("static pattern"))
}

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("static pattern"))
}

static TITLE_PATTERN: OnceLock<Regex> = OnceLock::new();
static DESCRIPTION_PATTERN: OnceLock<Regex> = OnceLock::new();
static LINK_PATTERN: OnceLock<Regex> = OnceLock::new();
static PUB_DATE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn extract_tag<'a>(
    content: &'a str,
    cell: &'static OnceLock<Regex>,
    tag: &str,
) -> Option<&'a str> {
    cell.get_or_init(|| {
        Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}>")).expect("static pattern")
    })
    .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Unwraps CDATA sections, strips markup and common entities, and trims.
pub fn clean_text(raw: &str) -> String {
    let unwrapped = cdata_pattern().replace_all(raw, "$1");
    let stripped = markup_pattern().replace_all(&unwrapped, "");
    stripped
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .trim()
        .to_owned()
}

/// Extracts `<item>` entries from an RSS 2.0 document. Items missing a title
/// or description after cleaning are dropped.
pub fn parse_rss(xml: &str, source_name: &str) -> Vec<NewsArticle> {
    rss_item_pattern()
        .captures_iter(xml)
        .filter_map(|captures| captures.get(1))
        .filter_map(|item| {
            let item = item.as_str();
            let title = clean_text(extract_tag(item, &TITLE_PATTERN, "title")?);
            let description = clean_text(extract_tag(item, &DESCRIPTION_PATTERN, "description")?);
            let link = extract_tag(item, &LINK_PATTERN, "link").map(clean_text);
            let published_at = extract_tag(item, &PUB_DATE_PATTERN, "pubDate")
                .map(clean_text)
                .and_then(|value| parse_provider_timestamp(&value));

            NewsArticle::new(title, description, source_name)
                .map(|article| article.with_url(link).with_published_at(published_at))
        })
        .collect()
}

/// Best-effort timestamp parsing across the formats providers publish:
/// RFC 3339, RFC 2822 and Alpha Vantage's compact `YYYYMMDDTHHMMSS`.
pub fn parse_provider_timestamp(value: &str) -> Option<UtcDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(UtcDateTime::from_any_offset(parsed));
    }

    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc2822) {
        return Some(UtcDateTime::from_any_offset(parsed));
    }

    let compact = format_description!("[year][month][day]T[hour][minute][second]");
    PrimitiveDateTime::parse(value, &compact)
        .ok()
        .map(|parsed| UtcDateTime::from_any_offset(parsed.assume_utc()))
}
