use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 15;
const INDEX_PREFIX: char = '^';

/// Uppercased ticker as accepted by the quote and history operations.
///
/// Plain tickers (`AAPL`, `BRK.B`) come from user input. Index tickers carry
/// a leading caret (`^VIX`) and only enter through [`Symbol::parse_index`],
/// which the sentiment index set uses for its provider-facing symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parses a plain ticker: 1–15 characters, a leading ASCII letter, then
    /// letters, digits, `.` or `-`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();
        check_ticker(&ticker, 0)?;
        Ok(Self(ticker))
    }

    /// Like [`Symbol::parse`] but also accepts a single leading `^`.
    pub fn parse_index(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();
        match ticker.strip_prefix(INDEX_PREFIX) {
            Some(body) => check_ticker(body, 1)?,
            None => check_ticker(&ticker, 0)?,
        }
        Ok(Self(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_index(&self) -> bool {
        self.0.starts_with(INDEX_PREFIX)
    }

    /// Ticker as the dashboard shows it: `^VIX` becomes `VIX`.
    pub fn display_ticker(&self) -> &str {
        self.0.trim_start_matches(INDEX_PREFIX)
    }

    /// Display name used when a provider does not report a company name.
    pub fn default_name(&self) -> String {
        format!("{} Corporation", self.display_ticker())
    }
}

/// `offset` is the position of `body` inside the full input, so reported
/// indices point at the caller's character.
fn check_ticker(body: &str, offset: usize) -> Result<(), ValidationError> {
    let mut chars = body.chars();
    let first = chars.next().ok_or(ValidationError::EmptySymbol)?;

    let len = body.chars().count();
    if len > MAX_TICKER_LEN {
        return Err(ValidationError::SymbolTooLong {
            len,
            max: MAX_TICKER_LEN,
        });
    }
    if !first.is_ascii_alphabetic() {
        return Err(ValidationError::SymbolInvalidStart { ch: first });
    }

    match chars
        .enumerate()
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-')))
    {
        Some((index, ch)) => Err(ValidationError::SymbolInvalidChar {
            ch,
            index: offset + index + 1,
        }),
        None => Ok(()),
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_index(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
