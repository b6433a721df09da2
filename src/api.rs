// API client module: contains a small blocking HTTP client that sends a
// local image to a hosted inference endpoint. It is intentionally small
// and synchronous; the interesting work (model inference) happens on the
// remote side.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Default inference endpoint: a plant-disease classification model on
/// the HuggingFace Inference API. Override with `HF_INFERENCE_URL`.
pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/ozair23/mobilenet_v2_1.0_224-finetuned-plantdisease";

/// Placeholder used when no real credential is configured. The remote
/// service will reject it, but the request/response flow still works and
/// the rejection is reported like any other status.
const PLACEHOLDER_TOKEN: &str = "hftoken";

const TOKEN_FILE: &str = ".plantdiag_token";

/// Simple API client that holds a reqwest blocking client, the URL of
/// the inference endpoint and the bearer token sent with each request.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    token: String,
}

/// One entry of the classification response returned by the HuggingFace
/// Inference API: `[{"label": ..., "score": ...}, ...]`.
#[derive(Serialize, Deserialize, Debug)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

/// Raw outcome of one inference call. The status code is available
/// before the body is decoded, so callers can report the status even
/// when the body turns out not to be JSON.
#[derive(Debug)]
pub struct InferenceResponse {
    status: StatusCode,
    body: String,
}

impl InferenceResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Decode the body as JSON. Fails if the server returned something
    /// that is not valid JSON (e.g. an HTML error page).
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.body).context("Parsing inference response json")
    }

    /// Typed view of the body when it matches the classification shape.
    /// Returns `None` for anything else (error objects, non-JSON); this
    /// is a convenience on top of `json()`, never a validation gate.
    pub fn predictions(&self) -> Option<Vec<Prediction>> {
        serde_json::from_str(&self.body).ok()
    }
}

impl ApiClient {
    /// Create an ApiClient from explicit endpoint and token values.
    pub fn new(endpoint: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }

    /// Create an ApiClient configured from the environment: endpoint
    /// from `HF_INFERENCE_URL` (falling back to the default model URL)
    /// and token from `HF_API_TOKEN`, then a saved token file, then the
    /// placeholder value.
    pub fn from_env() -> Result<Self> {
        let endpoint =
            std::env::var("HF_INFERENCE_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        let token = std::env::var("HF_API_TOKEN")
            .ok()
            .or_else(|| load_token().ok())
            .unwrap_or_else(|| PLACEHOLDER_TOKEN.into());
        Self::new(&endpoint, &token)
    }

    /// Replace the bearer token used for subsequent requests.
    pub fn set_token(&mut self, token: &str) {
        self.token = token.to_string();
    }

    /// Helper to build the Authorization header map for a request.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let val = format!("Bearer {}", self.token);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&val).unwrap());
        headers
    }

    /// Send one image to the inference endpoint and return the raw
    /// outcome. The file is opened in binary mode, read fully into
    /// memory and sent as the request body as-is; no content-type is
    /// set. Exactly one request is issued, with no retry on any
    /// failure. A missing or unreadable file fails before any network
    /// activity.
    pub fn classify(&self, file_path: &Path) -> Result<InferenceResponse> {
        let mut file = File::open(file_path)
            .with_context(|| format!("Failed to open image file {}", file_path.display()))?;
        let mut image_bytes = Vec::new();
        file.read_to_end(&mut image_bytes)
            .with_context(|| format!("Failed to read image file {}", file_path.display()))?;

        let res = self
            .client
            .post(&self.endpoint)
            .headers(self.auth_headers())
            .body(image_bytes)
            .send()
            .context("Failed to send inference request")?;

        let status = res.status();
        let body = res
            .text()
            .context("Failed to read inference response body")?;
        Ok(InferenceResponse { status, body })
    }
}

/// Persist the token into a file in the user's home directory so later
/// runs pick it up without the environment variable.
pub fn persist_token(token: &str) -> Result<()> {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(TOKEN_FILE);
    std::fs::write(path, token)?;
    Ok(())
}

/// Load a previously saved token from the user's home directory.
pub fn load_token() -> Result<String> {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(TOKEN_FILE);
    let data = std::fs::read_to_string(path)?;
    Ok(data.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // The client is blocking, so tests drive wiremock from a runtime
    // owned by the test and issue the request from the test thread.
    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().unwrap()
    }

    fn image_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn classify_sends_raw_bytes_with_bearer_header() {
        let rt = runtime();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/"))
                .and(header("authorization", "Bearer testtoken"))
                .and(body_bytes(b"fake-jpeg-bytes".to_vec()))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                    {"label": "Tomato___Late_blight", "score": 0.93},
                    {"label": "Tomato___healthy", "score": 0.04}
                ])))
                .expect(1)
                .mount(&server),
        );

        let file = image_file(b"fake-jpeg-bytes");
        let api = ApiClient::new(&server.uri(), "testtoken").unwrap();
        let resp = api.classify(file.path()).unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let preds = resp.predictions().unwrap();
        assert_eq!(preds[0].label, "Tomato___Late_blight");
        assert!(resp.json().is_ok());
        rt.block_on(server.verify());
    }

    #[test]
    fn missing_file_fails_before_any_request() {
        let rt = runtime();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server),
        );

        let api = ApiClient::new(&server.uri(), "testtoken").unwrap();
        let err = api
            .classify(Path::new("definitely-not-here.jpg"))
            .unwrap_err();
        assert!(err.to_string().contains("definitely-not-here.jpg"));
        rt.block_on(server.verify());
    }

    #[test]
    fn non_json_body_still_reports_status() {
        let rt = runtime();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(503).set_body_string("<html>upstream unavailable</html>"),
                )
                .mount(&server),
        );

        let file = image_file(b"bytes");
        let api = ApiClient::new(&server.uri(), "testtoken").unwrap();
        let resp = api.classify(file.path()).unwrap();

        assert_eq!(resp.status().as_u16(), 503);
        assert!(resp.json().is_err());
        assert!(resp.predictions().is_none());
    }

    #[test]
    fn server_error_is_not_retried() {
        let rt = runtime();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(500)
                        .set_body_json(serde_json::json!({"error": "model crashed"})),
                )
                .expect(1)
                .mount(&server),
        );

        let file = image_file(b"bytes");
        let api = ApiClient::new(&server.uri(), "testtoken").unwrap();
        let resp = api.classify(file.path()).unwrap();

        assert_eq!(resp.status().as_u16(), 500);
        assert!(resp.json().is_ok());
        rt.block_on(server.verify());
    }

    #[test]
    fn predictions_requires_classification_shape() {
        let resp = InferenceResponse {
            status: StatusCode::OK,
            body: r#"{"error": "Model is currently loading"}"#.into(),
        };
        assert!(resp.predictions().is_none());
        assert!(resp.json().is_ok());
    }
}
