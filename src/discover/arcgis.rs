// src/discover/arcgis.rs

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::http::Transport;

/// Attribute row of a single feature, keyed by column name.
pub type Attributes = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default, rename = "exceededTransferLimit")]
    exceeded_transfer_limit: bool,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    attributes: Attributes,
}

/// ArcGIS reports failures as `{"error": {...}}` with a 200 status.
#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Build the `query` URL for one page of the layer.
pub fn query_url(layer: &Url, offset: usize, page_size: usize) -> Result<Url> {
    let mut url = layer.join("query")?;
    url.query_pairs_mut()
        .append_pair("where", "1=1")
        .append_pair("outFields", "*")
        .append_pair("returnGeometry", "false")
        .append_pair("f", "json")
        .append_pair("orderByFields", "OBJECTID")
        .append_pair("resultOffset", &offset.to_string())
        .append_pair("resultRecordCount", &page_size.to_string());
    Ok(url)
}

/// Fetch every feature's attributes from the layer, following pagination
/// until the service stops reporting `exceededTransferLimit`. A page that
/// repeats the previous one means the layer ignores `resultOffset`; that is
/// an upstream error rather than an endless loop.
#[instrument(level = "info", skip(transport))]
pub async fn query_layer<T: Transport>(
    transport: &T,
    layer: &Url,
    page_size: usize,
) -> Result<Vec<Attributes>> {
    let mut rows = Vec::new();
    let mut previous: Option<Vec<Attributes>> = None;

    loop {
        let url = query_url(layer, rows.len(), page_size)?;
        let resp = transport.get(&url).await?;
        if !resp.status.is_success() {
            return Err(ScrapeError::UpstreamQuery(format!(
                "GET {} returned {}",
                url, resp.status
            )));
        }

        let page: QueryResponse = serde_json::from_str(&resp.body)
            .map_err(|e| ScrapeError::UpstreamQuery(format!("decoding {}: {}", url, e)))?;
        if let Some(err) = page.error {
            return Err(ScrapeError::UpstreamQuery(format!(
                "service error {}: {}",
                err.code, err.message
            )));
        }

        let features: Vec<Attributes> = page.features.into_iter().map(|f| f.attributes).collect();
        let n = features.len();
        if n > 0 && previous.as_ref() == Some(&features) {
            return Err(ScrapeError::UpstreamQuery(format!(
                "{} returned the same page again at offset {}; layer does not page",
                layer,
                rows.len()
            )));
        }
        rows.extend(features.iter().cloned());
        debug!(page_rows = n, total = rows.len(), "fetched feature page");

        if !page.exceeded_transfer_limit || n == 0 {
            break;
        }
        previous = Some(features);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn query_url_carries_paging() {
        let layer = Url::parse("https://example.com/rest/services/SBWM/SBWM/MapServer/2/").unwrap();
        let url = query_url(&layer, 2000, 1000).unwrap();
        assert_eq!(url.path(), "/rest/services/SBWM/SBWM/MapServer/2/query");
        let q: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(q.contains(&("where".into(), "1=1".into())));
        assert!(q.contains(&("resultOffset".into(), "2000".into())));
        assert!(q.contains(&("resultRecordCount".into(), "1000".into())));
        assert!(q.contains(&("returnGeometry".into(), "false".into())));
        assert!(q.contains(&("orderByFields".into(), "OBJECTID".into())));
    }

    #[test]
    fn service_error_body_decodes() {
        let body = r#"{"error":{"code":400,"message":"Invalid query","details":[]}}"#;
        let page: QueryResponse = serde_json::from_str(body).unwrap();
        assert!(page.features.is_empty());
        assert_eq!(page.error.unwrap().code, 400);
    }

    /// A layer without pagination support: every request gets the same page
    /// back with `exceededTransferLimit` still set.
    struct UnpagedLayer {
        requests: AtomicUsize,
    }

    impl Transport for UnpagedLayer {
        async fn get(&self, _url: &Url) -> Result<Response> {
            let n = self.requests.fetch_add(1, Ordering::SeqCst);
            if n >= 50 {
                return Err(ScrapeError::UpstreamQuery("runaway paging".into()));
            }
            Ok(Response {
                status: StatusCode::OK,
                body: r#"{"features":[{"attributes":{"OBJECTID":1,"AFP_OID":"2260001"}}],"exceededTransferLimit":true}"#
                    .to_string(),
            })
        }
    }

    #[tokio::test]
    async fn repeated_page_is_upstream_error() {
        let layer = Url::parse("https://example.com/MapServer/2/").unwrap();
        let site = UnpagedLayer {
            requests: AtomicUsize::new(0),
        };

        let err = query_layer(&site, &layer, 1000).await.unwrap_err();

        match err {
            ScrapeError::UpstreamQuery(msg) => assert!(msg.contains("same page"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(site.requests.load(Ordering::SeqCst), 2);
    }
}
