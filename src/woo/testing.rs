//! In-memory stand-in for the store used by unit tests.

use super::{WooApi, WooError};
use crate::models::{
    CreatedProduct, MediaUpload, MetaEntry, NewProduct, Product, ProductCategory, UploadedMedia,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
pub struct FakeWoo {
    pub catalog: Vec<Product>,
    pub fail_page: Option<u32>,
    pub fail_updates: HashSet<u64>,
    pub fail_create_named: Option<String>,
    pub page_requests: Mutex<Vec<u32>>,
    pub updates: Mutex<Vec<(u64, Vec<MetaEntry>)>>,
    pub uploads: Mutex<Vec<MediaUpload>>,
    pub created: Mutex<Vec<NewProduct>>,
}

impl FakeWoo {
    pub fn with_catalog(catalog: Vec<Product>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn page_requests(&self) -> Vec<u32> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn updated_ids(&self) -> Vec<u64> {
        self.updates.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }
}

pub fn product(id: u64) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        description: format!("<h4>Specs</h4><p>Product {id} details</p><img src=\"/p{id}.jpg\" alt=\"p{id}\">"),
        short_description: format!("Short {id}"),
        categories: vec![ProductCategory {
            id: 9,
            name: "Flooring".into(),
            slug: "flooring".into(),
        }],
        meta_data: Vec::new(),
    }
}

pub fn catalog(count: u64) -> Vec<Product> {
    (1..=count).map(product).collect()
}

#[async_trait]
impl WooApi for FakeWoo {
    async fn list_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError> {
        self.page_requests.lock().unwrap().push(page);
        if self.fail_page == Some(page) {
            return Err(WooError::Remote {
                status: 500,
                body: "internal".into(),
            });
        }
        let start = ((page - 1) * per_page) as usize;
        Ok(self
            .catalog
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn update_product_meta(
        &self,
        product_id: u64,
        meta: &[MetaEntry],
    ) -> Result<(), WooError> {
        if self.fail_updates.contains(&product_id) {
            return Err(WooError::Network("connection reset".into()));
        }
        self.updates
            .lock()
            .unwrap()
            .push((product_id, meta.to_vec()));
        Ok(())
    }

    async fn upload_media(&self, upload: &MediaUpload) -> Result<UploadedMedia, WooError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(upload.clone());
        let id = 100 + uploads.len() as u64;
        Ok(UploadedMedia {
            id,
            source_url: format!("https://shop.example/uploads/{}", upload.title),
        })
    }

    async fn create_product(&self, product: &NewProduct) -> Result<CreatedProduct, WooError> {
        if self.fail_create_named.as_deref() == Some(product.name.as_str()) {
            return Err(WooError::Remote {
                status: 400,
                body: "invalid product".into(),
            });
        }
        let mut created = self.created.lock().unwrap();
        created.push(product.clone());
        Ok(CreatedProduct {
            id: 500 + created.len() as u64,
            name: product.name.clone(),
        })
    }
}

/// Local HTTP endpoint that records every raw request it receives. Each
/// connection is answered with `reply`, or closed without an answer when
/// `reply` is `None`.
pub struct RecordingServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl RecordingServer {
    pub async fn start(reply: Option<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let raw = read_request(&mut socket).await;
                log.lock().unwrap().push(raw);
                if let Some(reply) = &reply {
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Builds a `200 OK` JSON response.
pub fn json_reply(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&raw[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= end + 4 + body_len {
                break;
            }
        }
        match tokio::time::timeout(Duration::from_millis(500), socket.read(&mut chunk)).await {
            Ok(Ok(n)) if n > 0 => raw.extend_from_slice(&chunk[..n]),
            _ => break,
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}
