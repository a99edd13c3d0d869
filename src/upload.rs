//! Creates one store product per image file in a local directory.

use crate::config::ProductTemplate;
use crate::models::{CategoryLink, CreatedProduct, ImageRef, MediaUpload, NewProduct};
use crate::woo::{WooApi, WooError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read image directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to upload {file}: {source}")]
    Upload {
        file: String,
        #[source]
        source: WooError,
    },
    #[error("failed to create product {name}: {source}")]
    CreateProduct {
        name: String,
        #[source]
        source: WooError,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UploadSummary {
    pub created: Vec<CreatedProduct>,
}

/// Uploads every image directly inside `dir` and creates a product for it from
/// `template`. Files are handled in name order; the first failure stops the
/// pass and products created before it are kept.
pub async fn upload_directory(
    api: &dyn WooApi,
    template: &ProductTemplate,
    dir: &Path,
) -> Result<UploadSummary, UploadError> {
    let started = Instant::now();
    let images = list_images(dir).await?;
    info!(target: "wooh.upload", dir = %dir.display(), images = images.len(), "starting image upload");

    let mut summary = UploadSummary::default();
    for path in images {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let upload = MediaUpload {
            path: path.clone(),
            title: name.clone(),
            caption: template.description.clone(),
        };
        let media = api
            .upload_media(&upload)
            .await
            .map_err(|source| UploadError::Upload {
                file: file.clone(),
                source,
            })?;
        info!(target: "wooh.upload", file = %file, media_id = media.id, "uploaded image");

        let product = new_product(template, name.clone(), ImageRef {
            id: media.id,
            src: media.source_url,
        });
        let created = api
            .create_product(&product)
            .await
            .map_err(|source| UploadError::CreateProduct { name, source })?;
        info!(target: "wooh.upload", product_id = created.id, name = %created.name, "created product");
        crate::metrics::upload_completed(&file, created.id);
        summary.created.push(created);
    }
    crate::metrics::stage_elapsed("upload_images", started.elapsed().as_millis());
    Ok(summary)
}

fn new_product(template: &ProductTemplate, name: String, image: ImageRef) -> NewProduct {
    NewProduct {
        name,
        product_type: template.product_type.clone(),
        regular_price: template.regular_price.clone(),
        description: template.description.clone(),
        short_description: template.short_description.clone(),
        categories: template
            .categories
            .iter()
            .cloned()
            .map(|id| CategoryLink { id })
            .collect(),
        images: vec![image],
    }
}

async fn list_images(dir: &Path) -> Result<Vec<PathBuf>, UploadError> {
    let read_err = |source| UploadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        let metadata = tokio::fs::metadata(&path).await.map_err(read_err)?;
        if metadata.is_dir() {
            continue;
        }
        if has_image_extension(&path) {
            images.push(path);
        } else {
            debug!(target: "wooh.upload", path = %path.display(), "skipping non-image file");
        }
    }
    images.sort();
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryRef;
    use crate::woo::testing::FakeWoo;
    use tempfile::TempDir;

    fn template() -> ProductTemplate {
        ProductTemplate {
            categories: vec![CategoryRef::Int(15), CategoryRef::Slug("rugs".into())],
            ..ProductTemplate::default()
        }
    }

    fn touch(dir: &TempDir, name: &str) {
        std::fs::write(dir.path().join(name), b"img").unwrap();
    }

    #[tokio::test]
    async fn creates_one_product_per_image_in_name_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "walnut.png");
        touch(&dir, "ash.jpg");
        touch(&dir, "notes.txt");
        touch(&dir, "SHOUT.JPG");
        std::fs::create_dir(dir.path().join("nested.gif")).unwrap();

        let api = FakeWoo::default();
        let summary = upload_directory(&api, &template(), dir.path())
            .await
            .expect("upload");

        let names: Vec<&str> = summary.created.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ash", "walnut"]);

        let uploads = api.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].title, "ash");
        assert_eq!(uploads[0].caption, "Product description");
        assert!(uploads[0].path.ends_with("ash.jpg"));
    }

    #[tokio::test]
    async fn product_references_uploaded_media_and_template() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "oak.jpeg");
        let api = FakeWoo::default();
        upload_directory(&api, &template(), dir.path())
            .await
            .expect("upload");

        let created = api.created.lock().unwrap();
        let product = &created[0];
        assert_eq!(product.name, "oak");
        assert_eq!(product.product_type, "simple");
        assert_eq!(product.regular_price, "0.00");
        assert_eq!(product.short_description, "Short Product Description");
        assert_eq!(
            product.images,
            vec![ImageRef {
                id: 101,
                src: "https://shop.example/uploads/oak".into(),
            }]
        );
        let body = serde_json::to_value(product).unwrap();
        assert_eq!(body["type"], "simple");
        assert_eq!(
            body["categories"],
            serde_json::json!([{"id": 15}, {"id": "rugs"}])
        );
    }

    #[tokio::test]
    async fn first_failure_stops_the_pass() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.png");
        touch(&dir, "b.png");
        touch(&dir, "c.png");
        let api = FakeWoo {
            fail_create_named: Some("b".into()),
            ..FakeWoo::default()
        };
        let err = upload_directory(&api, &template(), dir.path())
            .await
            .expect_err("b fails");
        assert!(matches!(err, UploadError::CreateProduct { ref name, .. } if name == "b"));
        assert_eq!(api.created.lock().unwrap().len(), 1);
        assert_eq!(api.uploads.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_directory_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let api = FakeWoo::default();
        let err = upload_directory(&api, &template(), &dir.path().join("absent"))
            .await
            .expect_err("missing");
        assert!(matches!(err, UploadError::ReadDir { .. }));
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert!(has_image_extension(Path::new("a.gif")));
        assert!(has_image_extension(Path::new("dir/a.b.jpeg")));
        assert!(!has_image_extension(Path::new("a.PNG")));
        assert!(!has_image_extension(Path::new("a.webp")));
        assert!(!has_image_extension(Path::new("jpg")));
    }
}
