//! Test utilities for Reelforge pipeline tests.
//!
//! Mock providers and collaborators with call counters, plus helpers that
//! assemble an engine around them.

#![allow(dead_code)]

use async_trait::async_trait;
use reelforge_core::{
    AudioClip, CompletionOptions, ContentSource, GenerationRequest, ImageAsset, ImageOptions,
    VoiceOptions,
};
use reelforge_error::{ProviderError, ProviderErrorKind, ReelforgeResult};
use reelforge_interface::{
    EncodeJob, EncodedVideo, FrameRenderer, ImageProvider, LlmProvider, RegisteredCapability,
    RenderRequest, TemplateStore, TtsProvider, VideoEncoder,
};
use reelforge_pipeline::{CapabilityRegistry, WorkflowEngine, WorkflowEngineBuilder};
use reelforge_rate_limit::ReelforgeConfig;
use reelforge_storage::InMemoryArtifactStore;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Template used by most workflow tests.
pub const TEMPLATE: &str =
    "<h1>{{topic}}</h1><img src=\"{{image}}\"/><p>{{text}}</p><span>{{author}}</span><i>{{rating}}</i>";

/// Storyboard JSON with `n` scenes narrated as `Scene <i>: ...`.
pub fn storyboard_json(n: usize) -> String {
    let scenes: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "narration": format!("Scene {}: bees share where the flowers are", i),
                "visual": format!("bee number {} dancing", i),
            })
        })
        .collect();
    serde_json::json!({ "scenes": scenes }).to_string()
}

fn provider_error(kind: ProviderErrorKind) -> reelforge_error::ReelforgeError {
    ProviderError::new(kind).into()
}

/// LLM that answers storyboard prompts from a script and echoes everything else.
///
/// Narration refinement returns the narration unchanged, image prompt
/// derivation returns `Illustration of <narration>` and title prompts
/// return a quoted title.
#[derive(Default)]
pub struct ScriptedLlm {
    storyboards: Mutex<VecDeque<String>>,
    book_info: Option<String>,
    fail_with: Option<ProviderErrorKind>,
    storyboard_prompts: Mutex<Vec<String>>,
    storyboard_calls: AtomicUsize,
    book_info_calls: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    /// Answer storyboard prompts with `responses` in order; the last one repeats.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            storyboards: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    /// Answer storyboard prompts with a valid storyboard of `n` scenes.
    pub fn with_scenes(n: usize) -> Self {
        Self::new(vec![storyboard_json(n)])
    }

    /// Fail every call with `kind`.
    pub fn failing(kind: ProviderErrorKind) -> Self {
        Self {
            fail_with: Some(kind),
            ..Self::default()
        }
    }

    /// Answer book description prompts with `reply`.
    pub fn with_book_info(mut self, reply: impl Into<String>) -> Self {
        self.book_info = Some(reply.into());
        self
    }

    pub fn book_info_calls(&self) -> usize {
        self.book_info_calls.load(Ordering::SeqCst)
    }

    /// Every storyboard prompt received, in order.
    pub fn storyboard_prompts(&self) -> Vec<String> {
        self.storyboard_prompts.lock().unwrap().clone()
    }

    pub fn storyboard_calls(&self) -> usize {
        self.storyboard_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_storyboard(&self) -> String {
        let mut queue = self.storyboards.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or_default()
        }
    }
}

fn after<'a>(prompt: &'a str, marker: &str) -> &'a str {
    prompt
        .split_once(marker)
        .map(|(_, rest)| rest)
        .unwrap_or(prompt)
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> ReelforgeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = &self.fail_with {
            return Err(provider_error(kind.clone()));
        }

        if prompt.starts_with("Describe the book") {
            self.book_info_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self
                .book_info
                .clone()
                .unwrap_or_else(|| "I am not sure which book you mean.".to_string()));
        }
        if prompt.contains("\"scenes\"") {
            self.storyboard_calls.fetch_add(1, Ordering::SeqCst);
            self.storyboard_prompts.lock().unwrap().push(prompt.to_string());
            return Ok(self.next_storyboard());
        }
        if prompt.starts_with("Rewrite the following narration") {
            return Ok(after(prompt, "Narration:\n").trim().to_string());
        }
        if prompt.starts_with("Write an English prompt") {
            let narration = after(prompt, "Scene narration:\n");
            let narration = narration.lines().next().unwrap_or_default();
            return Ok(format!("Illustration of {}", narration));
        }
        if prompt.contains("video title") {
            return Ok("\"Waggle Dance Secrets Revealed\"".to_string());
        }
        Ok("ok".to_string())
    }
}

/// TTS that fails for texts containing any of the given markers.
#[derive(Default)]
pub struct MockTts {
    fail_on: Vec<String>,
    fail_with: Option<ProviderErrorKind>,
    duration_seconds: f64,
    calls: AtomicUsize,
}

impl MockTts {
    pub fn new() -> Self {
        Self {
            duration_seconds: 2.5,
            ..Self::default()
        }
    }

    /// Reject texts containing `marker`.
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: vec![marker.to_string()],
            ..Self::new()
        }
    }

    /// Fail every call with `kind`.
    pub fn failing(kind: ProviderErrorKind) -> Self {
        Self {
            fail_with: Some(kind),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsProvider for MockTts {
    async fn synthesize(&self, text: &str, _voice: &VoiceOptions) -> ReelforgeResult<AudioClip> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = &self.fail_with {
            return Err(provider_error(kind.clone()));
        }
        if self.fail_on.iter().any(|m| text.contains(m.as_str())) {
            return Err(provider_error(ProviderErrorKind::Rejected {
                key: "tts/mock".to_string(),
                message: "voice rejected the text".to_string(),
            }));
        }
        Ok(AudioClip::new(
            format!("audio:{}", text).into_bytes(),
            "audio/mpeg",
            self.duration_seconds,
        ))
    }
}

/// Image provider tracking how many calls are in flight at once.
#[derive(Default)]
pub struct MockImage {
    fail_on: Vec<String>,
    fail_all: bool,
    delay: Duration,
    slow: Vec<(String, Duration)>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `ProviderRejected`.
    pub fn failing_all() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Reject prompts containing `marker`.
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: vec![marker.to_string()],
            ..Self::default()
        }
    }

    /// Sleep `delay` inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sleep `delay` for prompts containing `marker`, overriding the base delay.
    pub fn slow_on(mut self, marker: &str, delay: Duration) -> Self {
        self.slow.push((marker.to_string(), delay));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for MockImage {
    async fn generate(&self, prompt: &str, options: &ImageOptions) -> ReelforgeResult<ImageAsset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .slow
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, delay)| *delay)
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_all || self.fail_on.iter().any(|m| prompt.contains(m.as_str())) {
            return Err(provider_error(ProviderErrorKind::Rejected {
                key: "image/mock".to_string(),
                message: "content policy".to_string(),
            }));
        }
        Ok(ImageAsset::new(
            format!("png:{}", prompt).into_bytes(),
            "image/png",
            *options.width(),
            *options.height(),
        ))
    }
}

/// Renderer that records every request and returns the markup as the image.
#[derive(Default)]
pub struct RecordingRenderer {
    requests: Mutex<Vec<RenderRequest>>,
    fail_all: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_all() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<RenderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FrameRenderer for RecordingRenderer {
    async fn render(&self, request: &RenderRequest) -> ReelforgeResult<ImageAsset> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_all {
            return Err(provider_error(ProviderErrorKind::Rejected {
                key: "render/mock".to_string(),
                message: "browser crashed".to_string(),
            }));
        }
        Ok(ImageAsset::new(
            request.markup().clone().into_bytes(),
            "image/png",
            *request.width(),
            *request.height(),
        ))
    }
}

/// Template store backed by a map.
#[derive(Default)]
pub struct StaticTemplates {
    templates: HashMap<String, String>,
}

impl StaticTemplates {
    pub fn with(id: &str, template: &str) -> Self {
        let mut templates = HashMap::new();
        templates.insert(id.to_string(), template.to_string());
        Self { templates }
    }
}

#[async_trait]
impl TemplateStore for StaticTemplates {
    async fn load(&self, template_id: &str) -> ReelforgeResult<String> {
        self.templates.get(template_id).cloned().ok_or_else(|| {
            provider_error(ProviderErrorKind::Rejected {
                key: "templates/static".to_string(),
                message: format!("unknown template {}", template_id),
            })
        })
    }
}

/// Encoder that records jobs instead of writing video.
#[derive(Default)]
pub struct RecordingEncoder {
    jobs: Mutex<Vec<EncodeJob>>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn last_job(&self) -> Option<EncodeJob> {
        self.jobs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl VideoEncoder for RecordingEncoder {
    async fn encode(&self, job: &EncodeJob) -> ReelforgeResult<EncodedVideo> {
        self.jobs.lock().unwrap().push(job.clone());
        Ok(EncodedVideo {
            path: job.output_path().clone(),
            duration_seconds: job.total_duration(),
        })
    }
}

/// Registry with one provider per type, each registered under `mock`.
pub fn registry(
    llm: Arc<ScriptedLlm>,
    tts: Arc<MockTts>,
    image: Arc<MockImage>,
) -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry
        .register(RegisteredCapability::llm("mock", llm))
        .unwrap();
    registry
        .register(RegisteredCapability::tts("mock", tts))
        .unwrap();
    registry
        .register(RegisteredCapability::image("mock", image))
        .unwrap();
    registry
}

/// Default configuration with millisecond backoff and the given scene concurrency.
pub fn fast_config(max_concurrent_scenes: usize) -> ReelforgeConfig {
    let mut config = ReelforgeConfig::default();
    config.pipeline.max_concurrent_scenes = max_concurrent_scenes;
    config.retry.initial_backoff_ms = 1;
    config.retry.max_delay_ms = 2;
    config.retry.jitter = false;
    config
}

/// A topic request for `n` scenes using the `default` template.
pub fn topic_request(n: usize) -> GenerationRequest {
    GenerationRequest::builder()
        .source(ContentSource::Topic("How bees dance".to_string()))
        .n_storyboard(n)
        .frame_template("default")
        .output_path(Some(std::path::PathBuf::from("out/bees.mp4")))
        .build()
        .expect("valid request")
}

/// Everything a workflow test needs to make assertions.
pub struct Harness {
    pub llm: Arc<ScriptedLlm>,
    pub tts: Arc<MockTts>,
    pub image: Arc<MockImage>,
    pub renderer: Arc<RecordingRenderer>,
    pub encoder: Arc<RecordingEncoder>,
    pub store: Arc<InMemoryArtifactStore>,
}

impl Harness {
    pub fn new(llm: ScriptedLlm, tts: MockTts, image: MockImage) -> Self {
        Self {
            llm: Arc::new(llm),
            tts: Arc::new(tts),
            image: Arc::new(image),
            renderer: Arc::new(RecordingRenderer::new()),
            encoder: Arc::new(RecordingEncoder::new()),
            store: Arc::new(InMemoryArtifactStore::new()),
        }
    }

    pub fn with_renderer(mut self, renderer: RecordingRenderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Engine builder wired to the mocks, not yet built.
    pub fn builder(&self, config: ReelforgeConfig) -> WorkflowEngineBuilder {
        WorkflowEngine::builder()
            .registry(Arc::new(registry(
                Arc::clone(&self.llm),
                Arc::clone(&self.tts),
                Arc::clone(&self.image),
            )))
            .templates(Arc::new(StaticTemplates::with("default", TEMPLATE)))
            .renderer(Arc::clone(&self.renderer) as Arc<dyn FrameRenderer>)
            .encoder(Arc::clone(&self.encoder) as Arc<dyn VideoEncoder>)
            .store(Arc::clone(&self.store) as Arc<dyn reelforge_storage::ArtifactStore>)
            .config(config)
    }

    pub fn engine(&self, config: ReelforgeConfig) -> WorkflowEngine {
        self.builder(config).build().expect("engine builds")
    }
}
