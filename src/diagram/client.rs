// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;
use url::Url;

use crate::config::DiagramServerConfig;

use super::{DiagramError, DiagramFetcher};

/// Fetches PNG renders from a PlantUML server.
#[derive(Debug, Clone)]
pub struct PlantUmlClient {
    http: reqwest::Client,
    endpoint: Url,
    base_path: Vec<String>,
}

impl PlantUmlClient {
    pub fn new(config: &DiagramServerConfig) -> Result<Self, DiagramError> {
        let endpoint = Url::parse(&format!("{}://{}/", config.scheme(), config.server))
            .map_err(|source| DiagramError::Endpoint { server: config.server.clone(), source })?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| DiagramError::Client { source })?;
        let base_path = config
            .base_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self { http, endpoint, base_path })
    }

    /// `{scheme}://{server}/{base_path}/png/{payload}`
    pub fn diagram_url(&self, payload: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear().extend(&self.base_path).push("png").push(payload);
        }
        url
    }
}

#[async_trait]
impl DiagramFetcher for PlantUmlClient {
    async fn fetch(&self, payload: &str) -> Result<Vec<u8>, DiagramError> {
        let url = self.diagram_url(payload);
        tracing::debug!(%url, "fetching diagram");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| DiagramError::Request { url: url.to_string(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiagramError::Status { url: url.to_string(), status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| DiagramError::Request { url: url.to_string(), source })?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::PlantUmlClient;
    use crate::config::DiagramServerConfig;

    #[rstest]
    #[case("www.plantuml.com", "plantuml", false, "https://www.plantuml.com/plantuml/png/SyfFKj2rKt3CoKnELR1Io4ZDoSa70000")]
    #[case("localhost:8080", "", true, "http://localhost:8080/png/SyfFKj2rKt3CoKnELR1Io4ZDoSa70000")]
    #[case("uml.internal", "/a/b/", false, "https://uml.internal/a/b/png/SyfFKj2rKt3CoKnELR1Io4ZDoSa70000")]
    fn builds_diagram_urls(
        #[case] server: &str,
        #[case] base_path: &str,
        #[case] disable_tls: bool,
        #[case] expected: &str,
    ) {
        let config = DiagramServerConfig {
            server: server.to_owned(),
            base_path: base_path.to_owned(),
            disable_tls,
            ..DiagramServerConfig::default()
        };
        let client = PlantUmlClient::new(&config).expect("client");
        assert_eq!(client.diagram_url("SyfFKj2rKt3CoKnELR1Io4ZDoSa70000").as_str(), expected);
    }

    #[test]
    fn rejects_unparseable_server() {
        let config =
            DiagramServerConfig { server: "bad host".to_owned(), ..DiagramServerConfig::default() };
        assert!(PlantUmlClient::new(&config).is_err());
    }
}
