//! In-memory content source used by the integration tests.

// Each test binary uses a different slice of this module.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::watch;

use vitrine::application::source::{
    ContentSource, NewArticle, NewProduct, SourceError, UpdateArticle, UpdateProduct,
};
use vitrine::domain::entities::{ArticleRecord, ContentId, ProductRecord};

pub fn id(raw: i64) -> ContentId {
    ContentId::new(raw).expect("test ids are positive")
}

pub fn article(raw_id: i64, title: &str) -> ArticleRecord {
    ArticleRecord {
        id: id(raw_id),
        title: title.to_string(),
        published_at: OffsetDateTime::UNIX_EPOCH,
        image_url: format!("https://example.test/images/{raw_id}.jpg"),
        summary: format!("Summary of {title}"),
        body: vec![format!("Body of {title}")],
    }
}

pub fn product(raw_id: i64, name: &str) -> ProductRecord {
    ProductRecord {
        id: id(raw_id),
        name: name.to_string(),
        price: 75.0,
        image_url: format!("https://example.test/products/{raw_id}.jpg"),
        description: format!("Description of {name}"),
    }
}

/// Handle that releases one gated `list_articles` call.
pub struct Release(watch::Sender<bool>);

impl Release {
    pub fn open(&self) {
        let _ = self.0.send(true);
    }
}

/// Scripted remote source: counts every call, can fail reads or writes on
/// demand, and can hold `list_articles` calls open until released so tests
/// control completion order.
pub struct ScriptedSource {
    articles: Mutex<Vec<ArticleRecord>>,
    products: Mutex<Vec<ProductRecord>>,
    gates: Mutex<VecDeque<watch::Receiver<bool>>>,
    fail_lists: AtomicBool,
    fail_writes: AtomicBool,
    pub list_article_calls: AtomicUsize,
    pub list_product_calls: AtomicUsize,
    pub by_id_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(articles: Vec<ArticleRecord>, products: Vec<ProductRecord>) -> Arc<Self> {
        Arc::new(Self {
            articles: Mutex::new(articles),
            products: Mutex::new(products),
            gates: Mutex::new(VecDeque::new()),
            fail_lists: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            list_article_calls: AtomicUsize::new(0),
            list_product_calls: AtomicUsize::new(0),
            by_id_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_articles(&self, articles: Vec<ArticleRecord>) {
        *self.articles.lock().expect("articles lock") = articles;
    }

    pub fn set_products(&self, products: Vec<ProductRecord>) {
        *self.products.lock().expect("products lock") = products;
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Queue a gate: the next un-gated `list_articles` call blocks until the
    /// returned handle is opened. Gates apply in call order.
    pub fn hold_next_list(&self) -> Release {
        let (tx, rx) = watch::channel(false);
        self.gates.lock().expect("gates lock").push_back(rx);
        Release(tx)
    }

    pub fn list_pairs(&self) -> usize {
        self.list_article_calls.load(Ordering::SeqCst)
    }

    async fn pass_gate(&self) {
        let gate = self.gates.lock().expect("gates lock").pop_front();
        if let Some(mut rx) = gate {
            let _ = rx.wait_for(|open| *open).await;
        }
    }

    fn check_write(&self) -> Result<(), SourceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SourceError::Status { code: 500 });
        }
        Ok(())
    }

    fn next_article_id(&self) -> i64 {
        let articles = self.articles.lock().expect("articles lock");
        articles.iter().map(|a| a.id.get()).max().unwrap_or(0) + 1
    }

    fn next_product_id(&self) -> i64 {
        let products = self.products.lock().expect("products lock");
        products.iter().map(|p| p.id.get()).max().unwrap_or(0) + 1
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, SourceError> {
        self.list_article_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(SourceError::Transport("scripted failure".to_string()));
        }
        Ok(self.articles.lock().expect("articles lock").clone())
    }

    async fn list_products(&self) -> Result<Vec<ProductRecord>, SourceError> {
        self.list_product_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(SourceError::Transport("scripted failure".to_string()));
        }
        Ok(self.products.lock().expect("products lock").clone())
    }

    async fn article_by_id(&self, id: ContentId) -> Result<Option<ArticleRecord>, SourceError> {
        self.by_id_calls.fetch_add(1, Ordering::SeqCst);
        let articles = self.articles.lock().expect("articles lock");
        Ok(articles.iter().find(|a| a.id == id).cloned())
    }

    async fn product_by_id(&self, id: ContentId) -> Result<Option<ProductRecord>, SourceError> {
        self.by_id_calls.fetch_add(1, Ordering::SeqCst);
        let products = self.products.lock().expect("products lock");
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_article(&self, params: NewArticle) -> Result<ArticleRecord, SourceError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let record = ArticleRecord {
            id: ContentId::new(self.next_article_id()).expect("generated ids are positive"),
            title: params.title,
            published_at: params.published_at.unwrap_or(OffsetDateTime::UNIX_EPOCH),
            image_url: params.image_url,
            summary: params.summary,
            body: params.body,
        };
        self.articles
            .lock()
            .expect("articles lock")
            .push(record.clone());
        Ok(record)
    }

    async fn update_article(
        &self,
        id: ContentId,
        params: UpdateArticle,
    ) -> Result<ArticleRecord, SourceError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut articles = self.articles.lock().expect("articles lock");
        let record = articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SourceError::Status { code: 404 })?;
        record.title = params.title;
        record.published_at = params.published_at;
        record.image_url = params.image_url;
        record.summary = params.summary;
        record.body = params.body;
        Ok(record.clone())
    }

    async fn delete_article(&self, id: ContentId) -> Result<(), SourceError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut articles = self.articles.lock().expect("articles lock");
        if !articles.iter().any(|a| a.id == id) {
            return Err(SourceError::Status { code: 404 });
        }
        articles.retain(|a| a.id != id);
        Ok(())
    }

    async fn create_product(&self, params: NewProduct) -> Result<ProductRecord, SourceError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let record = ProductRecord {
            id: ContentId::new(self.next_product_id()).expect("generated ids are positive"),
            name: params.name,
            price: params.price,
            image_url: params.image_url,
            description: params.description,
        };
        self.products
            .lock()
            .expect("products lock")
            .push(record.clone());
        Ok(record)
    }

    async fn update_product(
        &self,
        id: ContentId,
        params: UpdateProduct,
    ) -> Result<ProductRecord, SourceError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut products = self.products.lock().expect("products lock");
        let record = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SourceError::Status { code: 404 })?;
        record.name = params.name;
        record.price = params.price;
        record.image_url = params.image_url;
        record.description = params.description;
        Ok(record.clone())
    }

    async fn delete_product(&self, id: ContentId) -> Result<(), SourceError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut products = self.products.lock().expect("products lock");
        if !products.iter().any(|p| p.id == id) {
            return Err(SourceError::Status { code: 404 });
        }
        products.retain(|p| p.id != id);
        Ok(())
    }
}

/// Poll until `condition` holds, failing the test after a short deadline.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    panic!("condition not reached within deadline");
}
