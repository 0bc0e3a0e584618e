use classifier::ClassifierContext;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) classifier: ClassifierContext,
    pub(crate) allowed_origin: Option<String>,
    pub(crate) max_upload_bytes: usize,
}
