//! Job processor trait and the weather summary pipeline.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::FutureExt;
use nimbus_core::{ModelConfig, ProcessingError, WeatherRequest, WeatherSummary};

/// Result type for job processors.
pub type ProcessResult = Result<WeatherSummary, ProcessingError>;

/// Future type for async job processors.
pub type ProcessFuture = Pin<Box<dyn Future<Output = ProcessResult> + Send>>;

/// Future type for model backends.
pub type BackendFuture = Pin<Box<dyn Future<Output = Result<String, ProcessingError>> + Send>>;

/// Trait for turning a weather observation into a summary.
///
/// The drainer awaits one call at a time; no other job starts until the
/// returned future resolves.
pub trait JobProcessor: Send + Sync + 'static {
    /// Process a request and return the summary.
    fn process(&self, request: &WeatherRequest) -> ProcessFuture;
}

/// A simple function-based processor.
pub struct FnProcessor<F>
where
    F: Fn(&WeatherRequest) -> ProcessFuture + Send + Sync + 'static,
{
    processor: F,
}

impl<F> FnProcessor<F>
where
    F: Fn(&WeatherRequest) -> ProcessFuture + Send + Sync + 'static,
{
    /// Create a new function-based processor.
    pub fn new(processor: F) -> Self {
        Self { processor }
    }
}

impl<F> JobProcessor for FnProcessor<F>
where
    F: Fn(&WeatherRequest) -> ProcessFuture + Send + Sync + 'static,
{
    fn process(&self, request: &WeatherRequest) -> ProcessFuture {
        (self.processor)(request)
    }
}

/// A language model that completes a prompt.
pub trait ModelBackend: Send + Sync + 'static {
    /// Generate raw text for `prompt` using the model at `model_path`.
    fn generate(&self, prompt: String, model_path: String) -> BackendFuture;
}

/// Backend that always answers with the same text.
///
/// Stands in for real inference until a model runtime is wired up.
#[derive(Debug, Clone)]
pub struct CannedModel {
    output: String,
}

impl CannedModel {
    pub const DEFAULT_OUTPUT: &'static str =
        r#"{"summary": "It's a bright and breezy day with a touch of fun in the air!"}"#;

    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl Default for CannedModel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_OUTPUT)
    }
}

impl ModelBackend for CannedModel {
    fn generate(&self, prompt: String, model_path: String) -> BackendFuture {
        tracing::debug!(
            model_path = %model_path,
            prompt_len = prompt.len(),
            "Canned model answering prompt"
        );
        let output = self.output.clone();
        Box::pin(async move { Ok(output) })
    }
}

/// Build the summary prompt for a request.
pub fn build_prompt(request: &WeatherRequest) -> Result<String, ProcessingError> {
    let data = serde_json::to_string(request)
        .map_err(|e| ProcessingError::Backend(format!("Failed to encode request: {}", e)))?;

    Ok(format!(
        "You are a weather tip writer. Using the JSON below, output ONLY a JSON object:\n\
         {{\"summary\":\"<<=25 words>\"}}\n\
         \n\
         Rules:\n\
         - One sentence, \u{2264}25 words, NO emojis.\n\
         - Should be in English Language\n\
         - You should use a happy/goofy tone\n\
         - No extra keys or text outside the JSON.\n\
         \n\
         Here is the current weather data:\n\
         {}",
        data
    ))
}

/// Processor that prompts a model backend and validates its answer.
pub struct SummaryProcessor<B: ModelBackend> {
    backend: Arc<B>,
    model: ModelConfig,
}

impl<B: ModelBackend> SummaryProcessor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            model: ModelConfig::default(),
        }
    }

    /// Set where the model path is read from.
    pub fn with_model_config(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }
}

impl<B: ModelBackend> JobProcessor for SummaryProcessor<B> {
    fn process(&self, request: &WeatherRequest) -> ProcessFuture {
        let prompt = build_prompt(request);
        let model_path = self.model.model_path();
        let backend = self.backend.clone();

        Box::pin(async move {
            let raw = backend.generate(prompt?, model_path).await?;
            WeatherSummary::from_model_output(&raw)
        })
    }
}

/// Run a processor, turning a panic into a processing error.
pub(crate) async fn run_guarded(
    processor: &dyn JobProcessor,
    request: &WeatherRequest,
) -> ProcessResult {
    let future = match std::panic::catch_unwind(AssertUnwindSafe(|| processor.process(request))) {
        Ok(future) => future,
        Err(panic) => return Err(ProcessingError::Panicked(panic_message(panic.as_ref()))),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ProcessingError::Panicked(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use std::sync::Mutex;

    use super::*;
    use nimbus_core::CloudCover;

    fn request() -> WeatherRequest {
        WeatherRequest::new(18.0, 65.0, 1.2, 12.0, CloudCover::Full)
    }

    /// Backend that remembers what it was asked.
    #[derive(Default)]
    struct RecordingModel {
        output: String,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ModelBackend for Arc<RecordingModel> {
        fn generate(&self, prompt: String, model_path: String) -> BackendFuture {
            self.calls.lock().unwrap().push((prompt, model_path));
            let output = self.output.clone();
            Box::pin(async move { Ok(output) })
        }
    }

    #[test]
    fn prompt_embeds_request_json() {
        let prompt = build_prompt(&request()).unwrap();
        assert!(prompt.starts_with("You are a weather tip writer."));
        assert!(prompt.contains(r#"{"summary":"<<=25 words>"}"#));
        assert!(prompt.contains(r#""clouds":"full""#));
        assert!(prompt.contains(r#""rainMmPerHour":1.2"#));
    }

    #[tokio::test]
    async fn canned_model_yields_valid_summary() {
        let processor = SummaryProcessor::new(CannedModel::default());
        let summary = processor.process(&request()).await.unwrap();
        assert_eq!(
            summary.summary,
            "It's a bright and breezy day with a touch of fun in the air!"
        );
    }

    #[tokio::test]
    async fn backend_receives_prompt_and_model_path() {
        let model = Arc::new(RecordingModel {
            output: r#"{"summary": "Grab a brolly, puddles are plotting."}"#.into(),
            ..Default::default()
        });
        let processor = SummaryProcessor::new(model.clone()).with_model_config(ModelConfig {
            env_var: "NIMBUS_TEST_PROCESSOR_MODEL_PATH".into(),
            default_path: "/models/test".into(),
        });

        processor.process(&request()).await.unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("Here is the current weather data:"));
        assert_eq!(calls[0].1, "/models/test");
    }

    #[tokio::test]
    async fn invalid_model_output_is_a_processing_error() {
        let processor = SummaryProcessor::new(CannedModel::new("Sunny!"));
        let err = processor.process(&request()).await.unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidOutput(_)));

        let wordy = format!(r#"{{"summary": "{}"}}"#, vec!["la"; 30].join(" "));
        let processor = SummaryProcessor::new(CannedModel::new(wordy));
        let err = processor.process(&request()).await.unwrap_err();
        assert!(matches!(err, ProcessingError::TooManyWords { words: 30 }));
    }

    #[tokio::test]
    async fn panics_become_processing_errors() {
        let eager = FnProcessor::new(|_req: &WeatherRequest| -> ProcessFuture {
            panic!("model exploded")
        });
        let err = run_guarded(&eager, &request()).await.unwrap_err();
        assert_eq!(err, ProcessingError::Panicked("model exploded".into()));

        let lazy = FnProcessor::new(|_req: &WeatherRequest| -> ProcessFuture {
            Box::pin(async {
                let tokens = 3;
                if tokens > 2 {
                    panic!("{} tokens", tokens);
                }
                Ok(WeatherSummary::new("unreachable"))
            })
        });
        let err = run_guarded(&lazy, &request()).await.unwrap_err();
        assert_eq!(err, ProcessingError::Panicked("3 tokens".into()));
    }
}
