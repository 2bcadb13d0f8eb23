//! HTTP adapter for the remote content API.
//!
//! Reads are anonymous; writes carry the `x-admin-token` header the backend
//! checks before mutating anything. A 404 on a by-id read is a miss, not an
//! error.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::application::source::{
    ContentSource, NewArticle, NewProduct, SourceError, UpdateArticle, UpdateProduct,
};
use crate::domain::entities::{ArticleRecord, ContentId, ProductRecord};
use crate::infra::error::InfraError;

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

// Admin write responses wrap the record next to a human-readable message.
#[derive(Debug, Deserialize)]
struct ArticleEnvelope {
    article: ArticleRecord,
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    product: ProductRecord,
}

pub struct HttpContentSource {
    client: Client,
    base_url: Url,
    admin_token: Option<String>,
}

impl HttpContentSource {
    /// Build an adapter rooted at `base_url` (e.g. `http://127.0.0.1:3001`).
    /// Writes fail with 403 upstream unless `admin_token` is provided.
    pub fn new(base_url: Url, admin_token: Option<String>) -> Result<Self, InfraError> {
        if base_url.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "remote base url `{base_url}` cannot carry path segments"
            )));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            admin_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor: the base is never cannot-be-a-base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.admin_token.as_deref() {
            Some(token) => builder.header(ADMIN_TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn get_collection<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, SourceError> {
        let response = self
            .client
            .get(self.endpoint(segments))
            .send()
            .await
            .map_err(map_reqwest)?;
        decode(response).await
    }

    async fn get_by_id<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: ContentId,
    ) -> Result<Option<T>, SourceError> {
        let response = self
            .client
            .get(self.endpoint(&["api", collection, &id.to_string()]))
            .send()
            .await
            .map_err(map_reqwest)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    async fn send_write<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SourceError> {
        let response = self.authorized(builder).send().await.map_err(map_reqwest)?;
        decode(response).await
    }

    async fn send_delete(&self, builder: RequestBuilder) -> Result<(), SourceError> {
        let response = self.authorized(builder).send().await.map_err(map_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                code: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, SourceError> {
        self.get_collection(&["api", "articles"]).await
    }

    async fn list_products(&self) -> Result<Vec<ProductRecord>, SourceError> {
        self.get_collection(&["api", "products"]).await
    }

    async fn article_by_id(&self, id: ContentId) -> Result<Option<ArticleRecord>, SourceError> {
        self.get_by_id("articles", id).await
    }

    async fn product_by_id(&self, id: ContentId) -> Result<Option<ProductRecord>, SourceError> {
        self.get_by_id("products", id).await
    }

    async fn create_article(&self, params: NewArticle) -> Result<ArticleRecord, SourceError> {
        let builder = self
            .client
            .post(self.endpoint(&["api", "articles", "admin", "add"]))
            .json(&params);
        let envelope: ArticleEnvelope = self.send_write(builder).await?;
        Ok(envelope.article)
    }

    async fn update_article(
        &self,
        id: ContentId,
        params: UpdateArticle,
    ) -> Result<ArticleRecord, SourceError> {
        let builder = self
            .client
            .put(self.endpoint(&["api", "articles", "admin", "update", &id.to_string()]))
            .json(&params);
        let envelope: ArticleEnvelope = self.send_write(builder).await?;
        Ok(envelope.article)
    }

    async fn delete_article(&self, id: ContentId) -> Result<(), SourceError> {
        let builder = self
            .client
            .delete(self.endpoint(&["api", "articles", "admin", "delete", &id.to_string()]));
        self.send_delete(builder).await
    }

    async fn create_product(&self, params: NewProduct) -> Result<ProductRecord, SourceError> {
        let builder = self
            .client
            .post(self.endpoint(&["api", "products", "admin", "add"]))
            .json(&params);
        let envelope: ProductEnvelope = self.send_write(builder).await?;
        Ok(envelope.product)
    }

    async fn update_product(
        &self,
        id: ContentId,
        params: UpdateProduct,
    ) -> Result<ProductRecord, SourceError> {
        let builder = self
            .client
            .put(self.endpoint(&["api", "products", "admin", "update", &id.to_string()]))
            .json(&params);
        let envelope: ProductEnvelope = self.send_write(builder).await?;
        Ok(envelope.product)
    }

    async fn delete_product(&self, id: ContentId) -> Result<(), SourceError> {
        let builder = self
            .client
            .delete(self.endpoint(&["api", "products", "admin", "delete", &id.to_string()]));
        self.send_delete(builder).await
    }
}

fn map_reqwest(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::from_transport(err)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SourceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            code: status.as_u16(),
        });
    }
    response.json::<T>().await.map_err(SourceError::from_decode)
}
