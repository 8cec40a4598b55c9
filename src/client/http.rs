//! reqwest-backed [`MergeService`].

use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use super::{
    ArchiveHandle, ArchiveRequest, DownloadMode, Endpoints, ErrorBody, MergeService,
    ProgressResponse, RenderResponse, UploadFile,
};
use crate::config::ClientConfig;
use crate::editor::capabilities::Variant;
use crate::editor::preview::{ImageProbe, decode_dimensions};
use crate::error::DataMergeError;
use crate::geometry::Size;
use crate::progress::ProgressKind;
use crate::spreadsheet::{IngestResponse, SpreadsheetData};
use crate::submission::RenderRequest;
use crate::template::TemplateUpload;

/// HTTP client for one render service and one editor variant.
#[derive(Debug, Clone)]
pub struct HttpMergeClient {
    http: reqwest::Client,
    base: Url,
    endpoints: Endpoints,
}

impl HttpMergeClient {
    pub fn new(config: &ClientConfig, variant: Variant) -> Result<Self, DataMergeError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            DataMergeError::validation(format!("Invalid server URL '{}': {}", config.base_url, e))
        })?;
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base,
            endpoints: Endpoints::for_variant(variant),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a path or server-returned URL against the base URL.
    pub fn resolve(&self, url: &str) -> Result<Url, DataMergeError> {
        self.base
            .join(url)
            .map_err(|e| DataMergeError::MalformedResponse(format!("Bad URL '{}': {}", url, e)))
    }

    async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &'static str,
        file: &UploadFile,
    ) -> Result<T, DataMergeError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part(field, part);
        debug!("POST {} ({}, {} bytes)", path, file.file_name, file.bytes.len());
        let response = self
            .http
            .post(self.resolve(path)?)
            .multipart(form)
            .send()
            .await?;
        decode_json(response).await
    }
}

/// Turn a response into `T`, mapping `{error}` bodies to collaborator errors.
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, DataMergeError> {
    let bytes = checked(response).await?;
    serde_json::from_slice(&bytes).map_err(|e| DataMergeError::MalformedResponse(e.to_string()))
}

/// Body bytes of a successful response.
async fn checked(response: Response) -> Result<Vec<u8>, DataMergeError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if status.is_success() {
        return Ok(bytes.to_vec());
    }
    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Server error")
                .to_string()
        });
    Err(DataMergeError::Collaborator {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl MergeService for HttpMergeClient {
    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn upload_template(&self, file: &UploadFile) -> Result<TemplateUpload, DataMergeError> {
        let path = self
            .endpoints
            .upload_template
            .ok_or_else(|| DataMergeError::validation("This editor does not use a template"))?;
        let upload: TemplateUpload = self.upload(path, "template", file).await?;
        info!("template stored as {}", upload.filename);
        Ok(upload)
    }

    async fn upload_spreadsheet(&self, file: &UploadFile) -> Result<SpreadsheetData, DataMergeError> {
        let ingest: IngestResponse = self
            .upload(self.endpoints.upload_spreadsheet, "csv", file)
            .await?;
        let data = SpreadsheetData::from(ingest);
        info!(
            "spreadsheet loaded: {} columns, {} records",
            data.columns().len(),
            data.rows().len()
        );
        Ok(data)
    }

    async fn render(&self, request: &RenderRequest) -> Result<Vec<String>, DataMergeError> {
        debug!(
            "POST {} ({} records, {} boxes)",
            self.endpoints.render,
            request.csv_data.len(),
            request.text_boxes.len()
        );
        let response = self
            .http
            .post(self.resolve(self.endpoints.render)?)
            .json(request)
            .send()
            .await?;
        let body: RenderResponse = decode_json(response).await?;
        Ok(body.preview_urls)
    }

    async fn progress(&self, kind: ProgressKind) -> Result<Option<f64>, DataMergeError> {
        let Some(path) = self.endpoints.progress(kind) else {
            return Ok(None);
        };
        let response = self.http.get(self.resolve(path)?).send().await?;
        let body: ProgressResponse = decode_json(response).await?;
        Ok(Some(body.percent))
    }

    async fn prepare_archive(&self, preview_urls: &[String]) -> Result<ArchiveHandle, DataMergeError> {
        let DownloadMode::Prepared { prepare, .. } = self.endpoints.download else {
            return Err(DataMergeError::validation(
                "This editor downloads archives directly",
            ));
        };
        let response = self
            .http
            .post(self.resolve(prepare)?)
            .json(&ArchiveRequest { preview_urls })
            .send()
            .await?;
        decode_json(response).await
    }

    async fn fetch_archive(&self, handle: &ArchiveHandle) -> Result<Vec<u8>, DataMergeError> {
        let DownloadMode::Prepared { fetch, .. } = self.endpoints.download else {
            return Err(DataMergeError::validation(
                "This editor downloads archives directly",
            ));
        };
        let path = format!("{}/{}/{}", fetch, handle.timestamp, handle.unique_id);
        debug!("GET {}", path);
        let response = self.http.get(self.resolve(&path)?).send().await?;
        checked(response).await
    }

    async fn download_archive(&self, preview_urls: &[String]) -> Result<Vec<u8>, DataMergeError> {
        let DownloadMode::Direct(path) = self.endpoints.download else {
            return Err(DataMergeError::validation(
                "This editor stages archives before download",
            ));
        };
        let response = self
            .http
            .post(self.resolve(path)?)
            .json(&ArchiveRequest { preview_urls })
            .send()
            .await?;
        checked(response).await
    }
}

#[async_trait]
impl ImageProbe for HttpMergeClient {
    async fn probe(&self, url: &str) -> Result<Size, DataMergeError> {
        let url = self.resolve(url)?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DataMergeError::ResourceLoad(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(DataMergeError::ResourceLoad(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DataMergeError::ResourceLoad(format!("Failed to read image data: {}", e)))?;
        decode_dimensions(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpMergeClient {
        HttpMergeClient::new(&ClientConfig::new(base), Variant::Combined).unwrap()
    }

    #[test]
    fn test_resolve_relative_urls() {
        let c = client("http://render.local:5000/");
        assert_eq!(
            c.resolve("/static/previews/p1.png").unwrap().as_str(),
            "http://render.local:5000/static/previews/p1.png"
        );
        assert_eq!(
            c.resolve("https://cdn.example/x.png").unwrap().as_str(),
            "https://cdn.example/x.png"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpMergeClient::new(&ClientConfig::new("not a url"), Variant::Combined).unwrap_err();
        assert!(matches!(err, DataMergeError::Validation(_)));
    }

    #[tokio::test]
    async fn test_wrong_download_mode_is_rejected_locally() {
        let c = HttpMergeClient::new(&ClientConfig::new("http://127.0.0.1:9"), Variant::TextOnly)
            .unwrap();
        assert!(matches!(
            c.prepare_archive(&[]).await,
            Err(DataMergeError::Validation(_))
        ));
        assert!(matches!(
            c.upload_template(&UploadFile::new("t.png", vec![1])).await,
            Err(DataMergeError::Validation(_))
        ));
        assert_eq!(c.progress(ProgressKind::Preview).await.unwrap(), None);
    }
}
