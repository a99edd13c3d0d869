use super::{
    RETRY_BASE_DELAY, WooClient, WooError, check_status, decode, is_connect_error,
    is_transport_error,
};
use crate::models::{CreatedProduct, MetaEntry, MetaUpdate, NewProduct, Product};
use crate::retry::retry_transient;
use tracing::debug;

impl WooClient {
    pub(super) async fn fetch_products_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooError> {
        let url = self.products_url();
        let paging = [("page", page.to_string()), ("per_page", per_page.to_string())];
        let response = retry_transient(
            self.retries,
            RETRY_BASE_DELAY,
            |attempt| {
                debug!(target: "wooh.woo", page, attempt, "list_products");
                self.http
                    .get(&url)
                    .header("Accept", "application/json")
                    .query(&self.auth_query())
                    .query(&paging)
                    .send()
            },
            is_transport_error,
        )
        .await
        .map_err(|err| WooError::Network(err.to_string()))?;
        let response = check_status(response).await?;
        decode(response).await
    }

    pub(super) async fn put_product_meta(
        &self,
        product_id: u64,
        meta: &[MetaEntry],
    ) -> Result<(), WooError> {
        let url = self.product_url(product_id);
        let body = MetaUpdate {
            meta_data: meta.to_vec(),
        };
        let response = retry_transient(
            self.retries,
            RETRY_BASE_DELAY,
            |attempt| {
                debug!(target: "wooh.woo", product_id, attempt, "update_product_meta");
                self.http
                    .put(&url)
                    .query(&self.auth_query())
                    .json(&body)
                    .send()
            },
            is_transport_error,
        )
        .await
        .map_err(|err| WooError::Network(err.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    pub(super) async fn post_product(
        &self,
        product: &NewProduct,
    ) -> Result<CreatedProduct, WooError> {
        let url = self.products_url();
        let response = retry_transient(
            self.retries,
            RETRY_BASE_DELAY,
            |attempt| {
                debug!(target: "wooh.woo", name = %product.name, attempt, "create_product");
                self.http
                    .post(&url)
                    .query(&self.auth_query())
                    .json(product)
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
