//! Mock backends for testing
//!
//! These mocks let the runtime be driven end to end without a network.

use crate::backend::{Answer, AskBackend, BackendError, UploadDocument};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend that returns queued responses
pub struct MockBackend {
    answers: Mutex<VecDeque<Result<Answer, BackendError>>>,
    upload_results: Mutex<VecDeque<Result<(), BackendError>>>,
    /// Record of all questions asked
    pub questions: Mutex<Vec<String>>,
    /// Record of all documents uploaded
    pub uploads: Mutex<Vec<UploadDocument>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            upload_results: Mutex::new(VecDeque::new()),
            questions: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful answer
    pub fn queue_answer(&self, text: impl Into<String>) {
        self.answers.lock().unwrap().push_back(Ok(Answer::new(text)));
    }

    /// Queue a failed call
    pub fn queue_error(&self, error: BackendError) {
        self.answers.lock().unwrap().push_back(Err(error));
    }

    /// Queue the outcome of the next upload
    pub fn queue_upload_result(&self, result: Result<(), BackendError>) {
        self.upload_results.lock().unwrap().push_back(result);
    }

    pub fn recorded_questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    pub fn recorded_uploads(&self) -> Vec<UploadDocument> {
        self.uploads.lock().unwrap().clone()
    }

    /// Record the question and take the next queued answer
    fn next_answer(&self, question: &str) -> Result<Answer, BackendError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::transport("No mock response queued")))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AskBackend for MockBackend {
    async fn ask(&self, question: &str) -> Result<Answer, BackendError> {
        self.next_answer(question)
    }

    async fn upload(&self, document: &UploadDocument) -> Result<(), BackendError> {
        self.uploads.lock().unwrap().push(document.clone());
        self.upload_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Delayed Mock Backend (for ordering and timeout testing)
// ============================================================================

/// Mock backend that sleeps before answering.
///
/// The answer is taken from the queue when the call starts, so answers pair
/// with questions in call order no matter which call finishes first.
pub struct DelayedMockBackend {
    inner: MockBackend,
    delay: Duration,
    /// Per-question delay overrides
    delays: Mutex<HashMap<String, Duration>>,
}

impl DelayedMockBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockBackend::new(),
            delay,
            delays: Mutex::new(HashMap::new()),
        }
    }

    /// Override the delay for one question
    pub fn with_delay_for(self, question: impl Into<String>, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(question.into(), delay);
        self
    }

    pub fn queue_answer(&self, text: impl Into<String>) {
        self.inner.queue_answer(text);
    }

    pub fn queue_error(&self, error: BackendError) {
        self.inner.queue_error(error);
    }

    pub fn recorded_questions(&self) -> Vec<String> {
        self.inner.recorded_questions()
    }
}

#[async_trait]
impl AskBackend for DelayedMockBackend {
    async fn ask(&self, question: &str) -> Result<Answer, BackendError> {
        let result = self.inner.next_answer(question);
        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(question)
            .copied()
            .unwrap_or(self.delay);
        tokio::time::sleep(delay).await;
        result
    }

    fn name(&self) -> &str {
        "delayed-mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::backend::DocumentKind;
    use crate::config::{ChatConfig, SubmitPolicy};
    use crate::dispatcher::{
        Banner, DispatchError, ERROR_BANNER, FALLBACK_MESSAGE, UPLOAD_FAILURE_BANNER,
        UPLOAD_SUCCESS_BANNER,
    };
    use crate::exchange::{Exchange, ExchangeId, ExchangeStatus};
    use crate::runtime::{ChatError, ChatHandle, ChatRuntime};
    use crate::sections::{DecodedAnswer, SectionCategory, SectionDecoder};
    use std::io::Write;

    const WAIT: Duration = Duration::from_secs(2);

    fn config(policy: SubmitPolicy, timeout: Option<Duration>) -> ChatConfig {
        ChatConfig {
            submit_policy: policy,
            request_timeout: timeout,
            ..ChatConfig::default()
        }
    }

    fn start<B: AskBackend + 'static>(backend: &Arc<B>, config: &ChatConfig) -> ChatHandle {
        ChatRuntime::spawn(config, Arc::clone(backend))
    }

    async fn settle(handle: &ChatHandle, id: ExchangeId) -> Exchange {
        tokio::time::timeout(WAIT, handle.wait_for_exchange(id))
            .await
            .expect("exchange should settle in time")
            .unwrap()
            .expect("exchange should still exist")
    }

    /// Wait until the backend has seen `n` calls, so queued answers pair
    /// with questions in submission order
    async fn wait_for_calls(backend: &DelayedMockBackend, n: usize) {
        tokio::time::timeout(WAIT, async {
            while backend.recorded_questions().len() < n {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("backend call should start");
    }

    /// Backend whose every call panics
    struct PanickingBackend;

    #[async_trait]
    impl AskBackend for PanickingBackend {
        async fn ask(&self, _question: &str) -> Result<Answer, BackendError> {
            panic!("backend bug")
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_mock_backend() {
        let mock = MockBackend::new();
        mock.queue_answer("A1");

        assert_eq!(mock.ask("Q1").await.unwrap().text, "A1");
        // Nothing queued
        assert!(mock.ask("Q2").await.is_err());
        assert_eq!(mock.recorded_questions(), vec!["Q1", "Q2"]);
    }

    /// Integration test: pending exchange then fulfilled answer
    #[tokio::test]
    async fn test_question_is_answered() {
        let backend = Arc::new(DelayedMockBackend::new(Duration::from_millis(50)));
        backend.queue_answer("Article 21 guarantees...");
        let handle = start(&backend, &ChatConfig::default());

        let id = handle.submit("What is Article 21?").await.unwrap().unwrap();

        let snapshot = handle.snapshot();
        let exchange = snapshot.exchange(id).unwrap();
        assert_eq!(exchange.status(), ExchangeStatus::Pending);
        assert_eq!(exchange.answer(), None);
        assert!(snapshot.busy);

        let exchange = settle(&handle, id).await;
        assert_eq!(exchange.status(), ExchangeStatus::Fulfilled);
        assert_eq!(exchange.answer(), Some("Article 21 guarantees..."));
        assert_eq!(backend.recorded_questions(), vec!["What is Article 21?"]);
        assert!(handle.snapshot().banner.is_none());
    }

    /// Integration test: unreachable backend yields the fallback answer and banner
    #[tokio::test]
    async fn test_network_failure() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_error(BackendError::transport("Connection refused"));
        let handle = start(&backend, &ChatConfig::default());

        let id = handle.submit("Q").await.unwrap().unwrap();
        let exchange = settle(&handle, id).await;

        assert_eq!(exchange.status(), ExchangeStatus::Failed);
        assert_eq!(exchange.answer(), Some(FALLBACK_MESSAGE));
        assert_eq!(handle.snapshot().banner, Some(Banner::error(ERROR_BANNER)));
    }

    #[tokio::test]
    async fn test_blank_submit_is_noop() {
        let backend = Arc::new(MockBackend::new());
        let handle = start(&backend, &ChatConfig::default());

        assert_eq!(handle.submit("   ").await, Ok(None));
        assert!(handle.snapshot().exchanges.is_empty());
        assert!(backend.recorded_questions().is_empty());
    }

    #[tokio::test]
    async fn test_single_flight_rejects_second_submit() {
        let backend = Arc::new(DelayedMockBackend::new(Duration::from_millis(100)));
        backend.queue_answer("A1");
        let handle = start(&backend, &ChatConfig::default());

        let id = handle.submit("Q1").await.unwrap().unwrap();
        assert_eq!(
            handle.submit("Q2").await,
            Err(ChatError::Rejected(DispatchError::Busy))
        );

        settle(&handle, id).await;
        assert_eq!(handle.snapshot().exchanges.len(), 1);
        assert_eq!(backend.recorded_questions(), vec!["Q1"]);
    }

    /// Integration test: reset while a call is in flight, then the stale
    /// completion lands
    #[tokio::test]
    async fn test_reset_while_pending() {
        let backend = Arc::new(
            DelayedMockBackend::new(Duration::from_millis(10))
                .with_delay_for("Old", Duration::from_millis(150)),
        );
        backend.queue_error(BackendError::transport("late failure"));
        backend.queue_answer("fresh");
        let handle = start(&backend, &ChatConfig::default());

        let stale = handle.submit("Old").await.unwrap().unwrap();
        wait_for_calls(&backend, 1).await;
        handle.reset().await.unwrap();
        assert!(handle.snapshot().exchanges.is_empty());
        assert!(!handle.snapshot().busy);

        let fresh = handle.submit("New").await.unwrap().unwrap();
        assert_ne!(stale, fresh);
        let exchange = settle(&handle, fresh).await;
        assert_eq!(exchange.answer(), Some("fresh"));

        // Let the stale failure arrive
        tokio::time::sleep(Duration::from_millis(250)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.exchanges.len(), 1);
        assert_eq!(snapshot.exchanges[0].id(), fresh);
        assert!(snapshot.exchange(stale).is_none());
        assert!(snapshot.banner.is_none());
    }

    /// Integration test: second question answered before the first
    #[tokio::test]
    async fn test_concurrent_out_of_order() {
        let backend = Arc::new(
            DelayedMockBackend::new(Duration::from_millis(10))
                .with_delay_for("Q1", Duration::from_millis(200)),
        );
        backend.queue_answer("A1");
        backend.queue_answer("A2");
        let handle = start(&backend, &config(SubmitPolicy::Concurrent, None));

        let first = handle.submit("Q1").await.unwrap().unwrap();
        wait_for_calls(&backend, 1).await;
        let second = handle.submit("Q2").await.unwrap().unwrap();

        let exchange = settle(&handle, second).await;
        assert_eq!(exchange.answer(), Some("A2"));
        assert!(handle.snapshot().exchange(first).unwrap().is_pending());

        let exchange = settle(&handle, first).await;
        assert_eq!(exchange.answer(), Some("A1"));

        let snapshot = handle.snapshot();
        let questions: Vec<_> = snapshot.exchanges.iter().map(|e| e.question()).collect();
        assert_eq!(questions, vec!["Q1", "Q2"]);
    }

    /// Integration test: a call that never answers is bounded by the timeout
    #[tokio::test]
    async fn test_request_timeout() {
        let backend = Arc::new(DelayedMockBackend::new(Duration::from_secs(30)));
        backend.queue_answer("too late");
        let config = config(SubmitPolicy::SingleFlight, Some(Duration::from_millis(50)));
        let handle = start(&backend, &config);

        let id = handle.submit("Q").await.unwrap().unwrap();
        let exchange = settle(&handle, id).await;

        assert_eq!(exchange.status(), ExchangeStatus::Failed);
        assert_eq!(exchange.answer(), Some(FALLBACK_MESSAGE));
        assert!(!handle.snapshot().busy);
    }

    #[tokio::test]
    async fn test_structured_answer_decodes() {
        let sep = "═".repeat(60);
        let raw = format!(
            "✨ Legal Summary ✨\nRight to life.\n{sep}\n📋 Conclusion\nProtected.\n{sep}\nLegal Analysis\nDetails."
        );
        let backend = Arc::new(MockBackend::new());
        backend.queue_answer(raw);
        let handle = start(&backend, &ChatConfig::default());

        let id = handle.submit("What is Article 21?").await.unwrap().unwrap();
        let exchange = settle(&handle, id).await;

        let DecodedAnswer::Structured { sections } =
            SectionDecoder::default().decode_answer(exchange.answer().unwrap())
        else {
            panic!("expected a structured answer");
        };
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].category, Some(SectionCategory::Summary));
        assert!(sections[1].is_conclusion);
        assert_eq!(sections[1].body, "Protected.");
    }

    /// Integration test: document upload through the runtime
    #[tokio::test]
    async fn test_upload_document() {
        let mut file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .unwrap();
        file.write_all(b"%PDF-1.4 brief").unwrap();

        let backend = Arc::new(MockBackend::new());
        let handle = start(&backend, &ChatConfig::default());

        handle.upload(file.path()).await.unwrap();
        let snapshot = tokio::time::timeout(WAIT, handle.wait_idle())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.banner, Some(Banner::info(UPLOAD_SUCCESS_BANNER)));
        let uploads = backend.recorded_uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].kind, DocumentKind::Pdf);
        assert_eq!(uploads[0].bytes, b"%PDF-1.4 brief");
        assert!(uploads[0].file_name.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_upload_failures() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_upload_result(Err(
            BackendError::server("HTTP 400").with_server_message("Invalid file type")
        ));
        let handle = start(&backend, &ChatConfig::default());

        let err = handle.upload("notes.txt").await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Rejected(DispatchError::UnsupportedDocument { .. })
        ));

        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        handle.upload(file.path()).await.unwrap();
        let snapshot = tokio::time::timeout(WAIT, handle.wait_idle())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.banner, Some(Banner::error("Invalid file type")));

        // Missing file fails before the backend is reached
        let dir = tempfile::tempdir().unwrap();
        handle.upload(dir.path().join("missing.doc")).await.unwrap();
        let snapshot = tokio::time::timeout(WAIT, handle.wait_idle())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.banner, Some(Banner::error(UPLOAD_FAILURE_BANNER)));
        assert_eq!(backend.recorded_uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_input_is_projected() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_answer("A");
        let handle = start(&backend, &ChatConfig::default());
        let mut rx = handle.subscribe();

        handle.set_input("What is Art").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().input, "What is Art");

        let id = handle.submit("What is Article 21?").await.unwrap().unwrap();
        assert_eq!(handle.snapshot().input, "");
        assert_eq!(settle(&handle, id).await.status(), ExchangeStatus::Fulfilled);
    }

    #[tokio::test]
    async fn test_handle_reports_stopped_runtime() {
        let backend = Arc::new(MockBackend::new());
        let (runtime, handle) = ChatRuntime::new(&ChatConfig::default(), Arc::clone(&backend));
        drop(runtime);

        assert_eq!(handle.submit("Q").await, Err(ChatError::Stopped));
        assert_eq!(handle.snapshot().exchanges.len(), 0);
    }

    /// Integration test: a panicking backend still settles the exchange
    #[tokio::test]
    async fn test_backend_panic_fails_exchange() {
        let backend = Arc::new(PanickingBackend);
        let handle = start(&backend, &ChatConfig::default());

        let id = handle.submit("Q").await.unwrap().unwrap();
        let exchange = settle(&handle, id).await;

        assert_eq!(exchange.status(), ExchangeStatus::Failed);
        assert_eq!(exchange.answer(), Some(FALLBACK_MESSAGE));
        assert!(!handle.snapshot().busy);

        // The runtime keeps serving after the panic
        assert!(handle.submit("Q2").await.unwrap().is_some());
    }
}
