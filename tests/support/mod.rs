//! Scripted HTTP doubles shared by the behaviour tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tradedesk_core::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// What the double answers for a matching URL.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Fail(HttpError),
    Delayed(Duration, String),
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::Status(200, body.to_owned())
    }
}

/// Answers by the first route whose pattern is a substring of the URL;
/// unmatched URLs get a 404. Every requested URL is recorded.
#[derive(Debug, Default)]
pub struct RoutedHttpClient {
    routes: Vec<(String, Reply)>,
    requests: Mutex<Vec<String>>,
}

impl RoutedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, reply: Reply) -> Self {
        self.routes.push((pattern.to_owned(), reply));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.requested()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

impl HttpClient for RoutedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.url.clone());
        }

        let reply = self
            .routes
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        Box::pin(async move {
            match reply {
                Some(Reply::Status(status, body)) => Ok(HttpResponse::new(status, body)),
                Some(Reply::Fail(error)) => Err(error),
                Some(Reply::Delayed(delay, body)) => {
                    tokio::time::sleep(delay).await;
                    Ok(HttpResponse::ok(body))
                }
                None => Ok(HttpResponse::new(404, "")),
            }
        })
    }
}

pub const YAHOO_CHART: &str = "query1.finance.yahoo.com/v8/finance/chart";
pub const ALPHA_VANTAGE: &str = "www.alphavantage.co/query";
pub const POLYGON: &str = "api.polygon.io";
pub const TWELVE_DATA: &str = "api.twelvedata.com";
pub const FMP: &str = "financialmodelingprep.com";
pub const FINNHUB: &str = "finnhub.io";
pub const NEWSAPI: &str = "newsapi.org";
pub const YAHOO_RSS: &str = "feeds.finance.yahoo.com";

/// Yahoo chart body whose meta carries a full intraday quote.
pub fn yahoo_quote_body(price: f64, previous_close: f64) -> String {
    format!(
        r#"{{"chart":{{"result":[{{"meta":{{"regularMarketPrice":{price},"previousClose":{previous_close},
        "regularMarketDayHigh":{high},"regularMarketDayLow":{low},"regularMarketOpen":{previous_close},
        "regularMarketVolume":1000000,"regularMarketTime":1749565800}}}}],"error":null}}}}"#,
        high = price + 1.0,
        low = previous_close - 1.0,
    )
}

/// Yahoo chart body with a daily close series.
pub fn yahoo_closes_body(closes: &[f64]) -> String {
    let closes = closes
        .iter()
        .map(|close| close.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{"chart":{{"result":[{{"meta":{{"regularMarketVolume":1000}},
        "indicators":{{"quote":[{{"close":[{closes}]}}]}}}}],"error":null}}}}"#
    )
}

/// Alpha Vantage throttle notice, served with status 200.
pub const ALPHA_VANTAGE_NOTE: &str = r#"{"Note":"Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
