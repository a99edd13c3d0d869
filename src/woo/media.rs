use super::{RETRY_BASE_DELAY, WooClient, WooError, check_status, decode, is_connect_error};
use crate::models::{MediaUpload, UploadedMedia};
use crate::retry::retry_transient;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::debug;

impl WooClient {
    /// Uploads a local file to the WordPress media library using the
    /// application-password credentials.
    pub(super) async fn post_media(&self, upload: &MediaUpload) -> Result<UploadedMedia, WooError> {
        let bytes = tokio::fs::read(&upload.path).await?;
        let file_name = upload
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| upload.title.clone());
        let mime = mime_for(&upload.path);
        let url = self.media_url();

        let response = retry_transient(
            self.retries,
            RETRY_BASE_DELAY,
            |attempt| {
                debug!(target: "wooh.woo", file = %file_name, attempt, "upload_media");
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .unwrap_or_else(|_| Part::bytes(bytes.clone()).file_name(file_name.clone()));
                let form = Form::new()
                    .part("file", part)
                    .text("title", upload.title.clone())
                    .text("caption", upload.caption.clone());
                self.http
                    .post(&url)
                    .basic_auth(&self.credentials.wp_user, Some(&self.credentials.wp_key))
                    .multipart(form)
                    .send()
            },
            is_connect_error,
        )
        .await
        .map_err(|err| WooError::Network(err.to_string()))?;
        let response = check_status(response).await?;
        decode(response).await
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
