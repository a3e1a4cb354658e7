use serde::{Deserialize, Serialize};

use crate::{ProviderId, Provenance, Resolved, SourceError, UtcDateTime, ValidationError};

pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Standard response envelope for machine-readable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    /// Wraps a resolved result. Fallback results get the synthetic source
    /// appended to the chain and a warning describing how many attempts failed.
    pub fn from_resolved(
        request_id: impl Into<String>,
        resolved: Resolved<T>,
    ) -> Result<Self, ValidationError> {
        let Resolved {
            data,
            provenance,
            selected_source,
            mut source_chain,
            errors,
            latency_ms,
        } = resolved;

        let mut warnings = Vec::new();
        match (provenance, selected_source) {
            (Provenance::Fallback, _) => {
                warnings.push(format!(
                    "all providers failed ({} attempt(s)); serving simulated data",
                    errors.len()
                ));
                source_chain.push(ProviderId::Synthetic);
            }
            (Provenance::Live, Some(provider)) if !errors.is_empty() => {
                warnings.push(format!(
                    "source fallback succeeded with '{}' after {} failed attempt(s)",
                    provider.as_str(),
                    errors.len()
                ));
            }
            _ => {}
        }

        let mut meta = EnvelopeMeta::new(
            request_id,
            SCHEMA_VERSION,
            provenance,
            source_chain,
            latency_ms,
        )?;
        for warning in warnings {
            meta.push_warning(warning);
        }

        for error in &errors {
            error.validate()?;
        }

        Ok(Self { meta, data, errors })
    }
}

/// Metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    pub provenance: Provenance,
    pub source_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        schema_version: impl Into<String>,
        provenance: Provenance,
        source_chain: Vec<ProviderId>,
        latency_ms: u64,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            schema_version: schema_version.into(),
            generated_at: UtcDateTime::now(),
            provenance,
            source_chain,
            latency_ms,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }

        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }

        Ok(())
    }
}

/// Structured record of one failed provider attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProviderId>,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            retryable: None,
            source: None,
        };
        error.validate()?;
        Ok(error)
    }

    /// Infallible conversion; source error codes are static and non-empty.
    pub fn from_source(provider: ProviderId, error: &SourceError) -> Self {
        let message = if error.message().trim().is_empty() {
            String::from("provider failed without a message")
        } else {
            error.message().to_owned()
        };

        Self {
            code: error.code().to_owned(),
            message,
            retryable: Some(error.retryable()),
            source: Some(provider),
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn with_source(mut self, source: ProviderId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }

        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }

        Ok(())
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };

    let mut parts = version.split('.');
    let major = parts.next();
    let minor = parts.next();
    let patch = parts.next();

    if parts.next().is_some() {
        return false;
    }

    [major, minor, patch].iter().all(|part| {
        part.is_some_and(|segment| {
            !segment.is_empty() && segment.chars().all(|ch| ch.is_ascii_digit())
        })
    })
}
