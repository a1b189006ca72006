//! Pipeline integration tests with in-process mocks.
//!
//! No pdfium, no tesseract, no network: a scripted [`CompletionClient`] and
//! a fixed-output [`OcrEngine`] stand in for the external collaborators, so
//! these always run.

use fliprisk::{
    analyze, extract, process, AnalysisConfig, AnalysisFailure, AnalyzerError, ChatRequest,
    Completion, CompletionClient, DocumentKind, EmptyTextPolicy, ExtractedText, OcrEngine,
    PipelineProgressCallback, Upload,
};
use edgequake_llm::{LLMProvider, MockProvider};
use futures::future::BoxFuture;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Completion client that replays one canned reply and records what it saw.
struct ScriptedClient {
    reply: Result<Completion, AnalysisFailure>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl ScriptedClient {
    fn replying(content: &str) -> Self {
        Self::with(Ok(Completion {
            content: content.to_string(),
            input_tokens: Some(10),
            output_tokens: Some(2),
        }))
    }

    fn failing(failure: AnalysisFailure) -> Self {
        Self::with(Err(failure))
    }

    fn with(reply: Result<Completion, AnalysisFailure>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> String {
        self.last_request
            .lock()
            .unwrap()
            .as_ref()
            .map(|r| r.prompt.clone())
            .expect("client was never called")
    }
}

impl CompletionClient for ScriptedClient {
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<Completion, AnalysisFailure>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        let reply = self.reply.clone();
        Box::pin(async move { reply })
    }
}

/// OCR engine returning a fixed string and counting invocations.
struct FixedOcr {
    output: String,
    calls: AtomicUsize,
}

impl FixedOcr {
    fn new(output: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            output: output.into(),
            calls: AtomicUsize::new(0),
        })
    }
}

impl OcrEngine for FixedOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

fn image_bytes(format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255])));
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn png_upload() -> Upload {
    Upload::new("statement.png", "image/png", image_bytes(ImageFormat::Png))
}

fn config_with_ocr(ocr: Arc<FixedOcr>) -> AnalysisConfig {
    AnalysisConfig::builder()
        .ocr_engine(ocr as Arc<dyn OcrEngine>)
        .build()
        .expect("valid config")
}

// ── Routing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_type_never_reaches_the_client() {
    let client = ScriptedClient::replying("RESULT");
    let ocr = FixedOcr::new("text");
    let config = config_with_ocr(ocr.clone());

    for mime in ["text/csv", "image/gif", "application/msword"] {
        let upload = Upload::new("file.bin", mime, b"whatever".to_vec());
        let err = process(upload, &client, &config).await.unwrap_err();
        assert!(
            matches!(err, AnalyzerError::UnsupportedFileType { ref mime_type } if mime_type == mime),
            "{mime}: got {err:?}"
        );
    }

    assert_eq!(client.calls(), 0, "completion client must not be invoked");
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0, "extraction must not start");
}

// ── Image path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn png_text_is_ocr_output_verbatim() {
    let raw = "  ACME Corp\n\nTotal liabilities: 1,204,000\n\x0c";
    let ocr = FixedOcr::new(raw);
    let config = config_with_ocr(ocr.clone());

    let extracted = extract(png_upload(), &config).await.unwrap();
    assert_eq!(extracted.text, raw);
    assert_eq!(extracted.pages, None);
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn jpeg_text_is_ocr_output_verbatim() {
    let raw = "Q3 revenue flat YoY";
    let config = config_with_ocr(FixedOcr::new(raw));

    for mime in ["image/jpeg", "image/jpg"] {
        let upload = Upload::new("scan.jpg", mime, image_bytes(ImageFormat::Jpeg));
        let extracted = extract(upload, &config).await.unwrap();
        assert_eq!(extracted.text, raw, "{mime}");
    }
}

#[tokio::test]
async fn undecodable_image_stops_before_analysis() {
    let client = ScriptedClient::replying("RESULT");
    let config = config_with_ocr(FixedOcr::new("unused"));
    let upload = Upload::new("broken.png", "image/png", b"definitely not a png".to_vec());

    let err = process(upload, &client, &config).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::ImageDecodeFailed { .. }), "got {err:?}");
    assert_eq!(client.calls(), 0);
}

// ── Prompt ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn prompt_carries_full_text_not_preview() {
    let long_text: String = (0..1200).map(|i| format!("line{i} ")).collect();
    assert!(long_text.chars().count() > 3000);

    let client = ScriptedClient::replying("RESULT");
    let config = config_with_ocr(FixedOcr::new(long_text.clone()));

    let report = process(png_upload(), &client, &config).await.unwrap();

    let prompt = client.last_prompt();
    assert!(prompt.contains(&long_text), "prompt must embed the full text");
    assert!(prompt.contains("Document Text:\n"));
    assert_eq!(report.extracted_text.text, long_text);
    assert_eq!(report.preview(3000).chars().count(), 3000);
    assert_eq!(report.stats.extracted_chars, long_text.chars().count());
}

#[tokio::test]
async fn request_uses_fixed_role_and_temperature() {
    let client = ScriptedClient::replying("RESULT");
    let config = config_with_ocr(FixedOcr::new("Debt covenant waived"));

    process(png_upload(), &client, &config).await.unwrap();

    let req = client.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(req.system, "You are a financial risk analysis assistant.");
    assert_eq!(req.temperature, 0.2);
    assert_eq!(req.model, "gpt-4o-mini");
}

// ── Analysis result ──────────────────────────────────────────────────────────

#[tokio::test]
async fn analysis_is_returned_verbatim() {
    let client = ScriptedClient::replying("RESULT");
    let config = config_with_ocr(FixedOcr::new("Cash: 12"));

    let report = process(png_upload(), &client, &config).await.unwrap();
    assert_eq!(report.analysis, "RESULT");
    assert_eq!(report.kind, DocumentKind::Png);
    assert_eq!(report.filename, "statement.png");
    assert_eq!(report.stats.input_tokens, Some(10));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn markdown_answer_is_not_reformatted() {
    let answer = "## 8. Overall Risk Rating\n\n**7/10** — liquidity  \n\n```\nraw\n```";
    let client = ScriptedClient::replying(answer);
    let config = config_with_ocr(FixedOcr::new("x"));

    let report = process(png_upload(), &client, &config).await.unwrap();
    assert_eq!(report.analysis, answer);
}

#[tokio::test]
async fn authentication_failure_is_analysis_request_failed() {
    let client = ScriptedClient::failing(AnalysisFailure::Authentication {
        message: "Incorrect API key provided".into(),
    });
    let config = config_with_ocr(FixedOcr::new("Revenue"));

    let result = process(png_upload(), &client, &config).await;
    match result {
        Err(AnalyzerError::AnalysisRequestFailed(AnalysisFailure::Authentication { message })) => {
            assert!(message.contains("API key"), "{message}")
        }
        other => panic!("expected AnalysisRequestFailed, got {other:?}"),
    }
    assert_eq!(client.calls(), 1);
}

// ── Empty extraction ─────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_text_rejected_under_reject_policy() {
    let client = ScriptedClient::replying("RESULT");
    let config = AnalysisConfig::builder()
        .ocr_engine(FixedOcr::new("   \n") as Arc<dyn OcrEngine>)
        .empty_text(EmptyTextPolicy::Reject)
        .build()
        .unwrap();

    let err = process(png_upload(), &client, &config).await.unwrap_err();
    assert!(
        matches!(err, AnalyzerError::ExtractionProducedEmptyText { ref filename } if filename == "statement.png"),
        "got {err:?}"
    );
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn empty_text_still_sent_under_default_policy() {
    let client = ScriptedClient::replying("RESULT");
    let config = config_with_ocr(FixedOcr::new(""));

    let report = process(png_upload(), &client, &config).await.unwrap();
    assert_eq!(report.analysis, "RESULT");
    assert_eq!(client.calls(), 1);
    assert!(client.last_prompt().ends_with("Document Text:\n\n"));
}

// ── Credential ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_halts_before_extraction() {
    let ocr = FixedOcr::new("text");
    let config = config_with_ocr(ocr.clone());

    let err = analyze(png_upload(), None, &config).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::MissingCredential), "got {err:?}");
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct EventLog(Mutex<Vec<&'static str>>);

impl PipelineProgressCallback for EventLog {
    fn on_extraction_start(&self, _filename: &str, _kind: DocumentKind) {
        self.0.lock().unwrap().push("extract-start");
    }
    fn on_extraction_complete(&self, _extracted: &ExtractedText) {
        self.0.lock().unwrap().push("extract-done");
    }
    fn on_analysis_start(&self, _prompt_chars: usize) {
        self.0.lock().unwrap().push("analysis-start");
    }
    fn on_analysis_complete(&self, _analysis_chars: usize) {
        self.0.lock().unwrap().push("analysis-done");
    }
    fn on_failure(&self, _error: &str) {
        self.0.lock().unwrap().push("failed");
    }
}

#[tokio::test]
async fn progress_events_in_stage_order() {
    let log = Arc::new(EventLog::default());
    let config = AnalysisConfig::builder()
        .ocr_engine(FixedOcr::new("text") as Arc<dyn OcrEngine>)
        .progress_callback(log.clone() as Arc<dyn PipelineProgressCallback>)
        .build()
        .unwrap();

    process(png_upload(), &ScriptedClient::replying("ok"), &config)
        .await
        .unwrap();
    assert_eq!(
        log.0.lock().unwrap().as_slice(),
        ["extract-start", "extract-done", "analysis-start", "analysis-done"]
    );
}

#[tokio::test]
async fn progress_reports_failure() {
    let log = Arc::new(EventLog::default());
    let config = AnalysisConfig::builder()
        .ocr_engine(FixedOcr::new("text") as Arc<dyn OcrEngine>)
        .progress_callback(log.clone() as Arc<dyn PipelineProgressCallback>)
        .build()
        .unwrap();

    let client = ScriptedClient::failing(AnalysisFailure::Network("connection refused".into()));
    assert!(process(png_upload(), &client, &config).await.is_err());
    assert_eq!(log.0.lock().unwrap().last(), Some(&"failed"));
}

/// Keeps the text handed over when extraction completes.
#[derive(Default)]
struct TextCapture(Mutex<Option<String>>);

impl PipelineProgressCallback for TextCapture {
    fn on_extraction_complete(&self, extracted: &ExtractedText) {
        *self.0.lock().unwrap() = Some(extracted.text.clone());
    }
}

#[tokio::test]
async fn extracted_text_is_reported_before_a_failed_analysis() {
    let capture = Arc::new(TextCapture::default());
    let config = AnalysisConfig::builder()
        .ocr_engine(FixedOcr::new("Going concern doubt") as Arc<dyn OcrEngine>)
        .progress_callback(capture.clone() as Arc<dyn PipelineProgressCallback>)
        .build()
        .unwrap();

    let client = ScriptedClient::failing(AnalysisFailure::Authentication {
        message: "Incorrect API key provided".into(),
    });
    let err = process(png_upload(), &client, &config).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::AnalysisRequestFailed(_)));
    assert_eq!(capture.0.lock().unwrap().as_deref(), Some("Going concern doubt"));
}

#[tokio::test]
async fn extracted_text_is_reported_before_empty_text_rejection() {
    let capture = Arc::new(TextCapture::default());
    let config = AnalysisConfig::builder()
        .ocr_engine(FixedOcr::new(" \n") as Arc<dyn OcrEngine>)
        .empty_text(EmptyTextPolicy::Reject)
        .progress_callback(capture.clone() as Arc<dyn PipelineProgressCallback>)
        .build()
        .unwrap();

    let err = process(png_upload(), &ScriptedClient::replying("RESULT"), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::ExtractionProducedEmptyText { .. }));
    assert_eq!(capture.0.lock().unwrap().as_deref(), Some(" \n"));
}

// ── edgequake-llm provider backend ───────────────────────────────────────────

#[tokio::test]
async fn provider_backend_passes_empty_answer_through() {
    let mock = MockProvider::new();
    mock.add_response("").await;
    let config = AnalysisConfig::builder()
        .provider(Arc::new(mock) as Arc<dyn LLMProvider>)
        .ocr_engine(FixedOcr::new("Cash: 12") as Arc<dyn OcrEngine>)
        .build()
        .unwrap();

    // A pre-built provider needs no session credential.
    let report = analyze(png_upload(), None, &config).await.unwrap();
    assert_eq!(report.analysis, "");
}

#[tokio::test]
async fn provider_backend_returns_answer_verbatim() {
    let mock = MockProvider::new();
    mock.add_response("RESULT").await;
    let config = AnalysisConfig::builder()
        .provider(Arc::new(mock) as Arc<dyn LLMProvider>)
        .ocr_engine(FixedOcr::new("Cash: 12") as Arc<dyn OcrEngine>)
        .build()
        .unwrap();

    let report = analyze(png_upload(), None, &config).await.unwrap();
    assert_eq!(report.analysis, "RESULT");
}
