//! # Preview Navigator
//!
//! After a preview run, the navigator steps through the records one at a
//! time. Records are rendered on demand with the box configuration captured
//! at preview time, and each preview URL is cached by record index so going
//! back never re-renders.
//!
//! Record numbers shown to the user are 1-based; indices are 0-based.

use log::{debug, info};

use crate::client::MergeService;
use crate::error::DataMergeError;
use crate::geometry::Size;
use crate::spreadsheet::Record;
use crate::submission::{BoxConfig, RenderRequest};

/// Snapshot of a preview run plus the navigation cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewNavigator {
    template: Option<String>,
    boxes: Vec<BoxConfig>,
    records: Vec<Record>,
    /// Blank-canvas size sent by variants without a template.
    canvas: Option<Size>,
    urls: Vec<Option<String>>,
    current: usize,
}

impl PreviewNavigator {
    pub fn new(
        template: Option<String>,
        boxes: Vec<BoxConfig>,
        records: Vec<Record>,
        canvas: Option<Size>,
    ) -> Self {
        let urls = vec![None; records.len()];
        Self {
            template,
            boxes,
            records,
            canvas,
            urls,
            current: 0,
        }
    }

    /// Number of records.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// 0-based index of the record on display.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_url(&self) -> Option<&str> {
        self.cached(self.current)
    }

    pub fn cached(&self, index: usize) -> Option<&str> {
        self.urls.get(index).and_then(|u| u.as_deref())
    }

    pub fn boxes(&self) -> &[BoxConfig] {
        &self.boxes
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Every record's URL, once all are cached.
    pub fn all_urls(&self) -> Option<Vec<String>> {
        self.urls.iter().cloned().collect()
    }

    /// Render request for records `start..end`.
    pub fn request(&self, start: usize, end: usize) -> RenderRequest {
        let end = end.min(self.records.len());
        let start = start.min(end);
        RenderRequest {
            template: self.template.clone(),
            csv_data: self.records[start..end].to_vec(),
            text_boxes: self.boxes.clone(),
            canvas_width: self.canvas.map(|c| c.width),
            canvas_height: self.canvas.map(|c| c.height),
        }
    }

    pub fn full_request(&self) -> RenderRequest {
        self.request(0, self.records.len())
    }

    /// Cache URLs rendered for records starting at `start`.
    pub fn store(&mut self, start: usize, urls: Vec<String>) {
        for (slot, url) in self.urls.iter_mut().skip(start).zip(urls) {
            *slot = Some(url);
        }
    }

    /// Show record `index`, rendering it first if it is not cached.
    ///
    /// On failure the current record stays on display.
    pub async fn show<S>(&mut self, service: &S, index: usize) -> Result<String, DataMergeError>
    where
        S: MergeService + ?Sized,
    {
        if index >= self.total() {
            return Err(DataMergeError::validation(format!(
                "Record {} is out of range (1-{})",
                index + 1,
                self.total()
            )));
        }
        if let Some(url) = self.cached(index) {
            let url = url.to_string();
            self.current = index;
            return Ok(url);
        }

        debug!("Generating preview for record {}...", index + 1);
        let urls = service.render(&self.request(index, index + 1)).await?;
        let url = urls.into_iter().next().ok_or_else(|| {
            DataMergeError::MalformedResponse("Server returned no preview URL".to_string())
        })?;
        self.urls[index] = Some(url.clone());
        self.current = index;
        info!("Showing record {} of {}", index + 1, self.total());
        Ok(url)
    }

    /// Step by `direction` records. Out of range is a no-op returning `None`.
    pub async fn navigate<S>(
        &mut self,
        service: &S,
        direction: isize,
    ) -> Result<Option<String>, DataMergeError>
    where
        S: MergeService + ?Sized,
    {
        let Some(index) = self
            .current
            .checked_add_signed(direction)
            .filter(|&i| i < self.total())
        else {
            return Ok(None);
        };
        self.show(service, index).await.map(Some)
    }

    /// Jump to a 1-based record number.
    pub async fn jump<S>(&mut self, service: &S, record_number: i64) -> Result<String, DataMergeError>
    where
        S: MergeService + ?Sized,
    {
        if record_number < 1 || record_number as u64 > self.total() as u64 {
            return Err(DataMergeError::validation(format!(
                "Record number must be between 1 and {}",
                self.total()
            )));
        }
        self.show(service, (record_number - 1) as usize).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ArchiveHandle, Endpoints, UploadFile};
    use crate::progress::ProgressKind;
    use crate::spreadsheet::SpreadsheetData;
    use crate::template::TemplateUpload;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Renders `/p/{name}.png` per record and counts calls.
    #[derive(Default)]
    struct FakeRenderer {
        calls: Mutex<Vec<usize>>,
        fail: bool,
    }

    #[async_trait]
    impl MergeService for FakeRenderer {
        fn endpoints(&self) -> &Endpoints {
            &Endpoints::COMBINED
        }
        async fn upload_template(&self, _: &UploadFile) -> Result<TemplateUpload, DataMergeError> {
            unimplemented!()
        }
        async fn upload_spreadsheet(&self, _: &UploadFile) -> Result<SpreadsheetData, DataMergeError> {
            unimplemented!()
        }
        async fn render(&self, request: &RenderRequest) -> Result<Vec<String>, DataMergeError> {
            self.calls.lock().unwrap().push(request.csv_data.len());
            if self.fail {
                return Err(DataMergeError::Collaborator {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(request
                .csv_data
                .iter()
                .map(|r| format!("/p/{}.png", r["name"]))
                .collect())
        }
        async fn progress(&self, _: ProgressKind) -> Result<Option<f64>, DataMergeError> {
            Ok(None)
        }
        async fn prepare_archive(&self, _: &[String]) -> Result<ArchiveHandle, DataMergeError> {
            unimplemented!()
        }
        async fn fetch_archive(&self, _: &ArchiveHandle) -> Result<Vec<u8>, DataMergeError> {
            unimplemented!()
        }
        async fn download_archive(&self, _: &[String]) -> Result<Vec<u8>, DataMergeError> {
            unimplemented!()
        }
    }

    fn navigator(names: &[&str]) -> PreviewNavigator {
        let records = names
            .iter()
            .map(|n| Record::from([("name".to_string(), n.to_string())]))
            .collect();
        let mut nav = PreviewNavigator::new(Some("t.png".to_string()), vec![], records, None);
        nav.store(0, vec![format!("/p/{}.png", names[0])]);
        nav
    }

    #[tokio::test]
    async fn test_navigate_renders_on_demand_and_caches() {
        let svc = FakeRenderer::default();
        let mut nav = navigator(&["ada", "grace", "alan"]);

        assert_eq!(nav.navigate(&svc, 1).await.unwrap().as_deref(), Some("/p/grace.png"));
        assert_eq!(nav.current(), 1);
        assert_eq!(nav.navigate(&svc, -1).await.unwrap().as_deref(), Some("/p/ada.png"));
        assert_eq!(nav.navigate(&svc, 1).await.unwrap().as_deref(), Some("/p/grace.png"));
        assert_eq!(*svc.calls.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_navigate_out_of_range_is_noop() {
        let svc = FakeRenderer::default();
        let mut nav = navigator(&["ada", "grace"]);
        assert_eq!(nav.navigate(&svc, -1).await.unwrap(), None);
        assert_eq!(nav.current(), 0);
        nav.navigate(&svc, 1).await.unwrap();
        assert_eq!(nav.navigate(&svc, 1).await.unwrap(), None);
        assert_eq!(nav.current(), 1);
    }

    #[tokio::test]
    async fn test_jump_validates_record_number() {
        let svc = FakeRenderer::default();
        let mut nav = navigator(&["ada", "grace", "alan"]);
        for bad in [0, -3, 4] {
            assert!(matches!(
                nav.jump(&svc, bad).await,
                Err(DataMergeError::Validation(_))
            ));
            assert_eq!(nav.current(), 0);
        }
        assert_eq!(nav.jump(&svc, 3).await.unwrap(), "/p/alan.png");
        assert_eq!(nav.current(), 2);
    }

    #[tokio::test]
    async fn test_render_failure_keeps_current_record() {
        let svc = FakeRenderer {
            fail: true,
            ..FakeRenderer::default()
        };
        let mut nav = navigator(&["ada", "grace"]);
        assert!(nav.navigate(&svc, 1).await.is_err());
        assert_eq!(nav.current(), 0);
        assert_eq!(nav.cached(1), None);
    }

    #[test]
    fn test_all_urls_only_when_complete() {
        let mut nav = navigator(&["ada", "grace"]);
        assert_eq!(nav.all_urls(), None);
        nav.store(1, vec!["/p/grace.png".to_string()]);
        assert_eq!(
            nav.all_urls(),
            Some(vec!["/p/ada.png".to_string(), "/p/grace.png".to_string()])
        );
    }

    #[test]
    fn test_request_carries_snapshot() {
        let nav = PreviewNavigator::new(
            None,
            vec![],
            vec![Record::new(), Record::new()],
            Some(Size::new(800.0, 600.0)),
        );
        let req = nav.full_request();
        assert_eq!(req.template, None);
        assert_eq!(req.csv_data.len(), 2);
        assert_eq!(req.canvas_width, Some(800.0));
        assert_eq!(nav.request(1, 9).csv_data.len(), 1);
    }
}
