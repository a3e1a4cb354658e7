use serde::Deserialize;

use super::Transport;
use crate::http_client::{HttpRequest, HttpResponse};
use crate::normalize::collect_articles;
use crate::provider::{parse_json, Endpoint, FetchFuture, NewsRequest, Provider};
use crate::{NewsArticle, NewsBatch, ProviderId, SourceError, UtcDateTime};

const BASE_URL: &str = "https://finnhub.io/api/v1/news";

/// General market news.
#[derive(Clone)]
pub struct FinnhubNewsProvider {
    transport: Transport,
    api_key: String,
}

impl FinnhubNewsProvider {
    pub fn new(transport: Transport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
        }
    }
}

impl Provider for FinnhubNewsProvider {
    type Request = NewsRequest;
    type Output = NewsBatch;

    fn id(&self) -> ProviderId {
        ProviderId::Finnhub
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::News
    }

    fn fetch<'a>(&'a self, _request: &'a NewsRequest) -> FetchFuture<'a> {
        let url = format!(
            "{BASE_URL}?category=general&token={}",
            urlencoding::encode(&self.api_key)
        );
        Box::pin(self.transport.get(self.id(), HttpRequest::get(url)))
    }

    fn validate(&self, request: &NewsRequest, response: HttpResponse) -> Result<NewsBatch, SourceError> {
        let items = match parse_json::<NewsPayload>(self.id(), &response.body)? {
            NewsPayload::Items(items) => items,
            NewsPayload::Error { error } => {
                return Err(SourceError::invalid_response(format!("finnhub: {error}")));
            }
        };

        let candidates = items.into_iter().map(|item| {
            NewsArticle::new(
                item.headline.unwrap_or_default(),
                item.summary.unwrap_or_default(),
                item.source.unwrap_or_else(|| String::from("Finnhub")),
            )
            .map(|article| {
                article.with_url(item.url).with_published_at(
                    item.datetime
                        .and_then(|seconds| UtcDateTime::from_unix_timestamp(seconds).ok()),
                )
            })
        });

        collect_articles(self.id(), candidates, request.limit)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NewsPayload {
    Items(Vec<NewsItem>),
    Error { error: String },
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    datetime: Option<i64>,
}
