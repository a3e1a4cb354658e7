use serde::Deserialize;

use super::Transport;
use crate::http_client::{HttpAuth, HttpRequest, HttpResponse};
use crate::normalize::{collect_articles, parse_provider_timestamp};
use crate::provider::{parse_json, Endpoint, FetchFuture, NewsRequest, Provider};
use crate::{NewsArticle, NewsBatch, ProviderId, SourceError};

const BASE_URL: &str = "https://newsapi.org/v2/top-headlines?category=business&language=en";

/// Top business headlines. The key travels in the `X-Api-Key` header.
#[derive(Clone)]
pub struct NewsApiProvider {
    transport: Transport,
    auth: HttpAuth,
}

impl NewsApiProvider {
    pub fn new(transport: Transport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            auth: HttpAuth::header("X-Api-Key", api_key),
        }
    }
}

impl Provider for NewsApiProvider {
    type Request = NewsRequest;
    type Output = NewsBatch;

    fn id(&self) -> ProviderId {
        ProviderId::Newsapi
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::News
    }

    fn fetch<'a>(&'a self, _request: &'a NewsRequest) -> FetchFuture<'a> {
        let http_request = HttpRequest::get(BASE_URL).with_auth(&self.auth);
        Box::pin(self.transport.get(self.id(), http_request))
    }

    fn validate(&self, request: &NewsRequest, response: HttpResponse) -> Result<NewsBatch, SourceError> {
        let payload: HeadlinesResponse = parse_json(self.id(), &response.body)?;

        if payload.status.as_deref() == Some("error") {
            let message = payload.message.unwrap_or_else(|| String::from("unknown error"));
            return Err(match payload.code.as_deref() {
                Some("rateLimited") => SourceError::rate_limited(format!("newsapi: {message}")),
                _ => SourceError::invalid_response(format!("newsapi: {message}")),
            });
        }

        let candidates = payload.articles.into_iter().map(|article| {
            let source_name = article
                .source
                .and_then(|source| source.name)
                .unwrap_or_else(|| String::from("NewsAPI"));

            NewsArticle::new(
                article.title.unwrap_or_default(),
                article.description.unwrap_or_default(),
                source_name,
            )
            .map(|canonical| {
                canonical.with_url(article.url).with_published_at(
                    article
                        .published_at
                        .as_deref()
                        .and_then(parse_provider_timestamp),
                )
            })
        });

        collect_articles(self.id(), candidates, request.limit)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadlinesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<HeadlineArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadlineArticle {
    #[serde(default)]
    source: Option<HeadlineSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HeadlineSource {
    #[serde(default)]
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::{transport, RecordingHttpClient};
    use crate::SourceErrorKind;

    #[tokio::test]
    async fn drops_articles_without_description_and_sends_key_header() {
        let body = r#"{"status":"ok","totalResults":2,"articles":[
            {"source":{"id":null,"name":"Bloomberg"},"title":"Treasury yields climb",
             "description":"The 10-year yield rose to 4.5%.","url":"https://news.example/y",
             "publishedAt":"2025-06-10T14:30:00Z"},
            {"source":{"id":null,"name":"CNBC"},"title":"Live updates","description":null}
        ]}"#;
        let client = RecordingHttpClient::ok(body);
        let provider = NewsApiProvider::new(transport(client.clone()), "news-key");
        let request = NewsRequest::new(10);

        let response = provider.fetch(&request).await.expect("fetch");
        let batch = provider.validate(&request, response).expect("news");

        assert_eq!(batch.articles.len(), 1);
        assert_eq!(batch.articles[0].source_name, "Bloomberg");
        assert_eq!(
            client.recorded_requests()[0]
                .headers
                .get("x-api-key")
                .map(String::as_str),
            Some("news-key")
        );
    }

    #[test]
    fn rate_limited_status_is_classified() {
        let provider = NewsApiProvider::new(transport(RecordingHttpClient::ok("")), "demo");
        let body = r#"{"status":"error","code":"rateLimited","message":"You have made too many requests recently."}"#;

        let error = provider
            .validate(&NewsRequest::new(10), HttpResponse::ok(body))
            .expect_err("rate limited");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    }
}
