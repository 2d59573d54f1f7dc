//! HTTP adapter for the hosting platform's control API.

use async_trait::async_trait;
use serde_json::Value;
use sitewright_core::deploy::HealthPolicy;
use sitewright_core::orchestrator::{Platform, SiteBundle};
use sitewright_core::{Result, SiteError};
use tracing::{debug, info};

/// Talks to the hosting control plane over HTTP. Publish failures caused by
/// the network or a 5xx response are reported as transient so the
/// orchestrator retries them; 4xx responses are permanent.
pub struct HttpPlatform {
    client: reqwest::Client,
    control_base: String,
}

impl HttpPlatform {
    pub fn new(control_base: impl Into<String>, health: &HealthPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(health.probe_timeout())
            .build()
            .map_err(|e| SiteError::Registry(format!("http client init: {e}")))?;
        Ok(Self {
            client,
            control_base: control_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.control_base)
    }
}

#[async_trait]
impl Platform for HttpPlatform {
    async fn build(&self, bundle: &SiteBundle) -> Result<()> {
        // Bundles are rendered in-process; nothing to hand off yet.
        debug!(
            website_id = %bundle.website_id,
            files = bundle.files.len(),
            template_version = %bundle.template_version,
            "bundle built"
        );
        Ok(())
    }

    async fn publish(&self, bundle: &SiteBundle) -> Result<()> {
        let url = self.url(&format!("/sites/{}/bundle", bundle.website_id));
        let response = self
            .client
            .put(&url)
            .json(bundle)
            .send()
            .await
            .map_err(|e| SiteError::TransientPublish(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!(website_id = %bundle.website_id, "bundle published");
            Ok(())
        } else if status.is_server_error() {
            Err(SiteError::TransientPublish(format!(
                "control plane returned {status}"
            )))
        } else {
            Err(SiteError::Publish(format!(
                "control plane returned {status}"
            )))
        }
    }

    async fn activate(&self, bundle: &SiteBundle) -> Result<String> {
        let url = self.url(&format!("/sites/{}/activate", bundle.website_id));
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "template_version": bundle.template_version,
            }))
            .send()
            .await
            .map_err(|e| SiteError::Activation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SiteError::Activation(format!(
                "control plane returned {}",
                response.status()
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| SiteError::Activation(e.to_string()))?;
        match body.get("live_url").and_then(Value::as_str) {
            Some(live_url) => Ok(live_url.to_string()),
            None => Err(SiteError::Activation(
                "activation response missing live_url".into(),
            )),
        }
    }

    async fn rollback(&self, website_id: &str) -> Result<()> {
        let url = self.url(&format!("/sites/{website_id}/rollback"));
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| SiteError::Activation(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SiteError::Activation(format!(
                "rollback returned {}",
                response.status()
            )));
        }
        info!(website_id = %website_id, "traffic rolled back to previous bundle");
        Ok(())
    }

    async fn health_check(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SiteError::HealthCheck(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SiteError::HealthCheck(format!(
                "probe returned {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> SiteBundle {
        SiteBundle {
            website_id: "acme-hvac".into(),
            business_id: "biz-1".into(),
            template_version: "v1".into(),
            files: vec![],
        }
    }

    fn platform(server: &mockito::ServerGuard) -> HttpPlatform {
        HttpPlatform::new(server.url(), &HealthPolicy::default()).unwrap()
    }

    #[tokio::test]
    async fn publish_succeeds_on_2xx() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/sites/acme-hvac/bundle")
            .with_status(200)
            .create_async()
            .await;

        platform(&server).publish(&bundle()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn publish_5xx_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/sites/acme-hvac/bundle")
            .with_status(503)
            .create_async()
            .await;

        match platform(&server).publish(&bundle()).await {
            Err(SiteError::TransientPublish(msg)) => assert!(msg.contains("503")),
            other => panic!("expected TransientPublish, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_4xx_is_permanent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/sites/acme-hvac/bundle")
            .with_status(413)
            .create_async()
            .await;

        match platform(&server).publish(&bundle()).await {
            Err(SiteError::Publish(msg)) => assert!(msg.contains("413")),
            other => panic!("expected Publish, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn activate_returns_live_url_from_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/sites/acme-hvac/activate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"live_url": "https://acme-hvac.sites.sitewright.dev"}"#)
            .create_async()
            .await;

        let url = platform(&server).activate(&bundle()).await.unwrap();
        assert_eq!(url, "https://acme-hvac.sites.sitewright.dev");
    }

    #[tokio::test]
    async fn activate_without_live_url_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/sites/acme-hvac/activate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        assert!(matches!(
            platform(&server).activate(&bundle()).await,
            Err(SiteError::Activation(_))
        ));
    }

    #[tokio::test]
    async fn health_check_maps_non_2xx_to_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(500)
            .create_async()
            .await;

        let p = platform(&server);
        let probe_url = format!("{}/healthz", server.url());
        assert!(matches!(
            p.health_check(&probe_url).await,
            Err(SiteError::HealthCheck(_))
        ));
    }

    #[tokio::test]
    async fn rollback_posts_to_control_plane() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/sites/acme-hvac/rollback")
            .with_status(200)
            .create_async()
            .await;

        platform(&server).rollback("acme-hvac").await.unwrap();
        mock.assert_async().await;
    }
}
