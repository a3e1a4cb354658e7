use super::Transport;
use crate::http_client::{HttpRequest, HttpResponse};
use crate::normalize::{collect_articles, parse_rss};
use crate::provider::{Endpoint, FetchFuture, NewsRequest, Provider};
use crate::{NewsBatch, ProviderId, SourceError};

const FEED_URL: &str = "https://feeds.finance.yahoo.com/rss/2.0/headline";

/// Yahoo Finance headline RSS feed; no key required.
#[derive(Clone)]
pub struct YahooRssProvider {
    transport: Transport,
}

impl YahooRssProvider {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

impl Provider for YahooRssProvider {
    type Request = NewsRequest;
    type Output = NewsBatch;

    fn id(&self) -> ProviderId {
        ProviderId::YahooRss
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::News
    }

    fn fetch<'a>(&'a self, _request: &'a NewsRequest) -> FetchFuture<'a> {
        let http_request =
            HttpRequest::get(FEED_URL).with_header("accept", "application/rss+xml, text/xml");
        Box::pin(self.transport.get(self.id(), http_request))
    }

    fn validate(&self, request: &NewsRequest, response: HttpResponse) -> Result<NewsBatch, SourceError> {
        let articles = parse_rss(&response.body, "Yahoo Finance");
        collect_articles(self.id(), articles.into_iter().map(Some), request.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::{transport, RecordingHttpClient};
    use crate::SourceErrorKind;

    #[test]
    fn feed_without_items_is_invalid() {
        let provider = YahooRssProvider::new(transport(RecordingHttpClient::ok("")));
        let error = provider
            .validate(
                &NewsRequest::new(10),
                HttpResponse::ok("<rss><channel><title>Yahoo</title></channel></rss>"),
            )
            .expect_err("empty feed");
        assert_eq!(error.kind(), SourceErrorKind::InvalidResponse);
    }

    #[test]
    fn items_become_articles_with_yahoo_source() {
        let provider = YahooRssProvider::new(transport(RecordingHttpClient::ok("")));
        let xml = "<rss><channel><item><title>Dow gains</title>\
                   <description>Blue chips advanced.</description>\
                   <link>https://finance.example/dow</link></item></channel></rss>";

        let batch = provider
            .validate(&NewsRequest::new(10), HttpResponse::ok(xml))
            .expect("news");
        assert_eq!(batch.articles[0].source_name, "Yahoo Finance");
        assert_eq!(batch.articles[0].url.as_deref(), Some("https://finance.example/dow"));
    }
}
