// Prediction client: a small blocking HTTP client that talks to the
// prediction service of a deployed Vertex AI endpoint over REST.

use crate::config::Settings;
use crate::error::{ClassifyError, Result};
use crate::schema::{
    ImageClassificationInstance, ImageClassificationParams, PredictRequest, PredictResponse,
};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Anything able to classify a batch of instances. The run loop only talks
/// to this trait, so it can be driven without a network.
pub trait Predictor {
    fn predict(
        &self,
        instances: &[ImageClassificationInstance],
        params: &ImageClassificationParams,
    ) -> Result<PredictResponse>;
}

/// Resource name of an endpoint.
pub fn endpoint_path(project: &str, location: &str, endpoint_id: &str) -> String {
    format!(
        "projects/{}/locations/{}/endpoints/{}",
        project, location, endpoint_id
    )
}

/// Holds the reqwest blocking client, the service base URL, the endpoint
/// resource name and an optional OAuth2 bearer token. Built once and reused
/// for every request.
#[derive(Clone)]
pub struct PredictionClient {
    client: Client,
    base_url: String,
    endpoint: String,
    token: Option<String>,
}

impl PredictionClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = settings.api_base_url();
        let endpoint = endpoint_path(&settings.project, &settings.location, &settings.endpoint_id);
        info!("Prediction client configured: base_url={}, endpoint={}", base_url, endpoint);
        Ok(PredictionClient {
            client,
            base_url,
            endpoint,
            token: settings.access_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn predict_url(&self) -> String {
        format!("{}/v1/{}:predict", self.base_url, self.endpoint)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(t) = &self.token {
            let mut val = HeaderValue::from_str(&format!("Bearer {}", t)).map_err(|e| {
                ClassifyError::InvalidSetting {
                    name: "access-token",
                    reason: e.to_string(),
                }
            })?;
            val.set_sensitive(true);
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }
}

impl Predictor for PredictionClient {
    fn predict(
        &self,
        instances: &[ImageClassificationInstance],
        params: &ImageClassificationParams,
    ) -> Result<PredictResponse> {
        let url = self.predict_url();
        debug!("POST {} ({} instance(s))", url, instances.len());

        let body = PredictRequest {
            instances,
            parameters: params,
        };
        let res = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(&body)
            .send()?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let text = res.text()?;
        serde_json::from_str(&text).map_err(|e| ClassifyError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::path::PathBuf;

    fn settings(api_endpoint: &str, token: Option<&str>) -> Settings {
        Settings {
            project: "my-project".into(),
            location: "us-central1".into(),
            endpoint_id: "987".into(),
            api_endpoint: api_endpoint.into(),
            images_dir: PathBuf::from("assets/images"),
            params: ImageClassificationParams::default(),
            access_token: token.map(str::to_string),
            continue_on_error: false,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn endpoint_path_shape() {
        assert_eq!(
            endpoint_path("p", "us-central1", "42"),
            "projects/p/locations/us-central1/endpoints/42"
        );
    }

    #[test]
    fn predict_url_uses_regional_host() {
        let client =
            PredictionClient::new(&settings("us-central1-aiplatform.googleapis.com", None)).unwrap();
        assert_eq!(
            client.predict_url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-project/locations/us-central1/endpoints/987:predict"
        );
    }

    #[test]
    fn token_sets_authorization_header() {
        let client = PredictionClient::new(&settings("localhost", None)).unwrap();
        assert!(client.auth_headers().unwrap().is_empty());

        let client = PredictionClient::new(&settings("localhost", Some("abc"))).unwrap();
        let headers = client.auth_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let client = PredictionClient::new(&settings("localhost", Some("bad\ntoken"))).unwrap();
        assert!(matches!(
            client.auth_headers(),
            Err(ClassifyError::InvalidSetting { name: "access-token", .. })
        ));
    }
}
