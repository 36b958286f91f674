//! Query keys and the upload form state machine.

/// Key for the datasets list query.
pub const DATASETS_KEY: &str = "datasets";
/// Key for the most recent pipeline run, whichever session produced it.
pub const PIPELINE_LAST_KEY: &str = "pipeline:last";
/// Key for the API liveness probe.
pub const HEALTH_KEY: &str = "health";

pub fn claims_key(dataset_id: &str) -> String {
    format!("claims:{dataset_id}")
}

pub fn candidates_key(dataset_id: &str) -> String {
    format!("candidates:{dataset_id}")
}

/// Matches every per-dataset key for one dataset id.
pub fn dataset_keys(dataset_id: &str) -> impl Fn(&str) -> bool {
    let claims = claims_key(dataset_id);
    let candidates = candidates_key(dataset_id);
    move |key| key == claims || key == candidates
}

/// State machine behind the upload form.
///
/// Submission is possible only with a file selected and no submission in
/// flight; `begin_submit` hands out the file at most once per flight. Success
/// resets the form, failure keeps the operator's selections so they can retry
/// without re-picking the file.
///
/// Generic over the file handle: `web_sys::File` in the browser, anything
/// cloneable in host tests.
#[derive(Debug, Clone)]
pub struct UploadForm<F> {
    file: Option<F>,
    source: String,
    in_flight: bool,
}

impl<F: Clone> UploadForm<F> {
    pub fn new() -> Self {
        Self {
            file: None,
            source: String::new(),
            in_flight: false,
        }
    }

    pub fn select_file(&mut self, file: Option<F>) {
        if !self.in_flight {
            self.file = file;
        }
    }

    pub fn set_source(&mut self, source: String) {
        if !self.in_flight {
            self.source = source;
        }
    }

    pub fn file(&self) -> Option<&F> {
        self.file.as_ref()
    }

    /// Source-system tag; empty means auto-detect.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_tag(&self) -> Option<String> {
        (!self.source.is_empty()).then(|| self.source.clone())
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.in_flight
    }

    /// Starts a submission, returning the file to send. `None` means the
    /// submission must not happen: nothing selected, or one is already in
    /// flight.
    pub fn begin_submit(&mut self) -> Option<F> {
        if !self.can_submit() {
            return None;
        }
        self.in_flight = true;
        self.file.clone()
    }

    pub fn finish_success(&mut self) {
        self.in_flight = false;
        self.file = None;
        self.source.clear();
    }

    pub fn finish_error(&mut self) {
        self.in_flight = false;
    }
}

impl<F: Clone> Default for UploadForm<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_means_no_submission() {
        let mut form = UploadForm::<String>::new();
        assert!(!form.can_submit());
        assert_eq!(form.begin_submit(), None);
        assert!(!form.in_flight(), "a refused submit must not lock the form");
    }

    #[test]
    fn test_submission_is_single_flight() {
        let mut form = UploadForm::new();
        form.select_file(Some("claims.csv".to_string()));
        assert_eq!(form.begin_submit(), Some("claims.csv".to_string()));
        assert!(form.in_flight());
        assert_eq!(form.begin_submit(), None, "second submit while in flight");
    }

    #[test]
    fn test_success_resets_the_form() {
        let mut form = UploadForm::new();
        form.select_file(Some("claims.csv".to_string()));
        form.set_source("alpha".to_string());
        form.begin_submit();
        form.finish_success();
        assert_eq!(form.file(), None);
        assert_eq!(form.source(), "");
        assert!(!form.in_flight());
    }

    #[test]
    fn test_failure_retains_selections_for_retry() {
        let mut form = UploadForm::new();
        form.select_file(Some("claims.csv".to_string()));
        form.set_source("alpha".to_string());
        form.begin_submit();
        form.finish_error();
        assert_eq!(form.file(), Some(&"claims.csv".to_string()));
        assert_eq!(form.source(), "alpha");
        assert!(form.can_submit(), "retry must be possible without re-selecting");
    }

    #[test]
    fn test_selections_are_frozen_while_in_flight() {
        let mut form = UploadForm::new();
        form.select_file(Some("claims.csv".to_string()));
        form.begin_submit();
        form.select_file(Some("other.json".to_string()));
        form.set_source("beta".to_string());
        form.finish_error();
        assert_eq!(form.file(), Some(&"claims.csv".to_string()));
        assert_eq!(form.source(), "");
    }

    #[test]
    fn test_empty_source_means_auto_detect() {
        let mut form = UploadForm::<String>::new();
        assert_eq!(form.source_tag(), None);
        form.set_source("gamma".to_string());
        assert_eq!(form.source_tag(), Some("gamma".to_string()));
    }

    #[test]
    fn test_dataset_key_predicate() {
        let matches = dataset_keys("d1");
        assert!(matches(&claims_key("d1")));
        assert!(matches(&candidates_key("d1")));
        assert!(!matches(&claims_key("d2")));
        assert!(!matches(DATASETS_KEY));
    }
}
