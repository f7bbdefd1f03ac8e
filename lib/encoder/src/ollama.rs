//! Embeddings from a local Ollama server (`POST /api/embed`).

use serde::{Deserialize, Serialize};
use skillmatch_core::{Encoder, Error, Result, Vector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    /// Native output size of `model`; every response is checked against it
    pub dimension: usize,
    /// Maximum texts per request
    pub batch_size: usize,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimension: 384,
            batch_size: 64,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct OllamaEncoder {
    endpoint: Url,
    config: OllamaConfig,
    agent: ureq::Agent,
}

impl OllamaEncoder {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.dimension == 0 {
            return Err(Error::InvalidArgument("embedding dimension must be at least 1".to_string()));
        }
        if config.batch_size == 0 {
            return Err(Error::InvalidArgument("batch size must be at least 1".to_string()));
        }

        let endpoint = embed_endpoint(&config.base_url)
            .map_err(|e| Error::InvalidArgument(format!("invalid Ollama URL {}: {}", config.base_url, e)))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();

        Ok(Self {
            endpoint,
            config,
            agent,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: texts,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| Error::Encoding(format!("failed to serialize embed request: {}", e)))?;

        debug!("Requesting {} embeddings from {}", texts.len(), self.endpoint);
        let response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| {
                warn!("Ollama request failed: {}", e);
                map_request_error(&self.config.model, e)
            })?;

        parse_embeddings(&response, texts.len(), self.config.dimension)
    }
}

impl Encoder for OllamaEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.batch_size) {
            vectors.extend(self.embed_chunk(chunk)?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// `{base_url}/api/embed`, keeping any path prefix of a proxied server
fn embed_endpoint(base_url: &str) -> std::result::Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("api/embed")
}

fn map_request_error(model: &str, error: ureq::Error) -> Error {
    match error {
        ureq::Error::StatusCode(404) => {
            Error::ModelUnavailable(format!("model '{}' is not available on the server", model))
        }
        ureq::Error::StatusCode(status) if status >= 500 => {
            Error::ModelUnavailable(format!("embedding server error: HTTP {}", status))
        }
        ureq::Error::StatusCode(status) => {
            Error::Encoding(format!("embedding request rejected: HTTP {}", status))
        }
        ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound
        | ureq::Error::Timeout(_)
        | ureq::Error::Io(_) => Error::ModelUnavailable(format!("embedding server unreachable: {}", error)),
        other => Error::Encoding(other.to_string()),
    }
}

fn parse_embeddings(body: &str, expected: usize, dimension: usize) -> Result<Vec<Vector>> {
    let response: EmbedResponse = serde_json::from_str(body)
        .map_err(|e| Error::Encoding(format!("malformed embed response: {}", e)))?;

    if response.embeddings.len() != expected {
        return Err(Error::Encoding(format!(
            "requested {} embeddings, server returned {}",
            expected,
            response.embeddings.len()
        )));
    }

    response
        .embeddings
        .into_iter()
        .map(|embedding| {
            if embedding.len() != dimension {
                return Err(Error::InvalidDimension {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            Ok(Vector::new(embedding))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_base_url() {
        let encoder = OllamaEncoder::new(OllamaConfig {
            base_url: "http://ollama.internal:11434/".to_string(),
            ..OllamaConfig::default()
        })
        .unwrap();
        assert_eq!(encoder.endpoint().as_str(), "http://ollama.internal:11434/api/embed");
        assert_eq!(encoder.dimension(), 384);
        assert_eq!(encoder.model_name(), "all-minilm");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        assert_eq!(
            embed_endpoint("http://gw/ollama").unwrap().as_str(),
            "http://gw/ollama/api/embed"
        );
        assert_eq!(
            embed_endpoint("http://gw/ollama/").unwrap().as_str(),
            "http://gw/ollama/api/embed"
        );
        assert_eq!(
            embed_endpoint("http://localhost:11434").unwrap().as_str(),
            "http://localhost:11434/api/embed"
        );
    }

    #[test]
    fn test_invalid_config() {
        let bad_url = OllamaEncoder::new(OllamaConfig {
            base_url: "not a url".to_string(),
            ..OllamaConfig::default()
        });
        assert!(matches!(bad_url, Err(Error::InvalidArgument(_))));

        let zero_batch = OllamaEncoder::new(OllamaConfig {
            batch_size: 0,
            ..OllamaConfig::default()
        });
        assert!(matches!(zero_batch, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let body = serde_json::to_value(EmbedRequest {
            model: "all-minilm",
            input: &texts,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"model": "all-minilm", "input": ["a", "b"]}));
    }

    #[test]
    fn test_parse_embeddings() {
        let vectors = parse_embeddings(r#"{"model":"m","embeddings":[[0.1,0.2],[0.3,0.4]]}"#, 2, 2).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1].as_slice(), &[0.3, 0.4]);
    }

    #[test]
    fn test_parse_rejects_bad_responses() {
        assert!(matches!(parse_embeddings("{}", 1, 2), Err(Error::Encoding(_))));
        assert!(matches!(
            parse_embeddings(r#"{"embeddings":[[0.1,0.2]]}"#, 2, 2),
            Err(Error::Encoding(_))
        ));
        assert_eq!(
            parse_embeddings(r#"{"embeddings":[[0.1,0.2,0.3]]}"#, 1, 2).unwrap_err(),
            Error::InvalidDimension { expected: 2, actual: 3 }
        );
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            map_request_error("m", ureq::Error::StatusCode(404)),
            Error::ModelUnavailable(_)
        ));
        assert!(matches!(
            map_request_error("m", ureq::Error::StatusCode(503)),
            Error::ModelUnavailable(_)
        ));
        assert!(matches!(
            map_request_error("m", ureq::Error::StatusCode(400)),
            Error::Encoding(_)
        ));
        assert!(matches!(
            map_request_error("m", ureq::Error::ConnectionFailed),
            Error::ModelUnavailable(_)
        ));
    }

    #[test]
    fn test_unreachable_server_is_model_unavailable() {
        let encoder = OllamaEncoder::new(OllamaConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            ..OllamaConfig::default()
        })
        .unwrap();
        let err = encoder.encode("numerical reasoning").unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)), "unexpected error: {:?}", err);
    }
}
