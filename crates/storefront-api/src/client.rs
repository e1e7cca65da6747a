// Hand-crafted async HTTP client for the storefront products REST API.
//
// Base path: /api/products/
// Bodies: JSON, except create which is multipart/form-data.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{ErrorResponse, ProductForm, ProductPatch, ProductResponse};

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the products collection.
///
/// Holds a fixed base URL (e.g. `http://localhost:5000/api/products`);
/// every operation is addressed relative to it.
#[derive(Debug, Clone)]
pub struct ProductsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProductsClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/` so it addresses the collection.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::UnsupportedBaseUrl(raw.to_owned()));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }

    /// The collection URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{id}`, with the id percent-encoded as a single segment.
    fn item_url(&self, id: &str) -> Url {
        let mut url = self.base_url.clone();
        // normalize_base_url rejected cannot-be-a-base URLs, so this succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        debug!("POST {url} (multipart)");

        let resp = self.http.post(url).multipart(form).send().await?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    /// Success with any (or no) body, e.g. `204 No Content`.
    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if let Ok(body) = serde_json::from_str::<ErrorResponse>(&raw) {
            let errors = body.field_errors();
            Error::Api {
                status: status.as_u16(),
                message: body.message,
                errors,
            }
        } else {
            let raw = raw.trim();
            Error::Api {
                status: status.as_u16(),
                message: (!raw.is_empty()).then(|| raw.to_owned()),
                errors: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET /` -- the full product collection.
    pub async fn list_products(&self) -> Result<Vec<ProductResponse>, Error> {
        self.get(self.base_url.clone()).await
    }

    /// `GET /{id}`.
    pub async fn get_product(&self, id: &str) -> Result<ProductResponse, Error> {
        self.get(self.item_url(id)).await
    }

    /// `POST /` with a multipart body.
    pub async fn create_product(&self, form: &ProductForm) -> Result<ProductResponse, Error> {
        let body = form.to_multipart()?;
        self.post_multipart(self.base_url.clone(), body).await
    }

    /// `PUT /{id}` with the changed fields as JSON.
    pub async fn update_product(
        &self,
        id: &str,
        patch: &ProductPatch,
    ) -> Result<ProductResponse, Error> {
        self.put(self.item_url(id), patch).await
    }

    /// `DELETE /{id}`.
    pub async fn delete_product(&self, id: &str) -> Result<(), Error> {
        self.delete(self.item_url(id)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ProductsClient::from_reqwest(
            "http://localhost:5000/api/products",
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "http://localhost:5000/api/products/"
        );
    }

    #[test]
    fn item_url_encodes_id_as_one_segment() {
        let client = ProductsClient::from_reqwest(
            "http://localhost:5000/api/products/",
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(
            client.item_url("42").as_str(),
            "http://localhost:5000/api/products/42"
        );
        assert_eq!(
            client.item_url("a/b").as_str(),
            "http://localhost:5000/api/products/a%2Fb"
        );
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        let err = ProductsClient::from_reqwest("mailto:shop@example.com", reqwest::Client::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedBaseUrl(_)));
    }
}
