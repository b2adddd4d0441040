//! Workflow engine: storyboard, bounded scene fan-out, composition.

use crate::frame::FrameContext;
use crate::scene::SceneContext;
use crate::storyboard::{fetch_book_info, resolve_title};
use crate::{
    ArtifactTracker, CapabilityLimiters, CapabilityRegistry, Composition, FrameComposer,
    ProviderCaller, SceneGenerator, StoryboardProcessor, VideoCompositor, WorkflowRun,
};
use reelforge_core::{
    CapabilitySelection, CapabilityType, ContentSource, FailureKind, GenerationRequest,
    GenerationResult, ImageStyle, ProgressEvent, ProgressKind, Scene, SceneStatus, StageName,
    StageStatus, VoiceOptions,
};
use reelforge_error::{
    BuilderError, BuilderErrorKind, PipelineError, PipelineErrorKind, ReelforgeError,
    ReelforgeResult,
};
use reelforge_interface::{FrameRenderer, TemplateStore, VideoEncoder};
use reelforge_rate_limit::{ReelforgeConfig, RetryPolicy};
use reelforge_storage::ArtifactStore;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Fraction of progress reported once the storyboard exists.
const STORYBOARD_PROGRESS: f32 = 0.1;
/// Fraction of progress reported once every scene has finished.
const SCENES_PROGRESS: f32 = 0.9;

/// Runs generation requests end to end.
///
/// Sequences the storyboard stage, a bounded fan-out of scene tasks (scene
/// generation plus frame composition) and video composition. Failures are
/// reported in the returned [`GenerationResult`], never as a raw error.
///
/// # Examples
///
/// ```no_run
/// use reelforge_core::{ContentSource, GenerationRequest};
/// use reelforge_interface::{FrameRenderer, TemplateStore, VideoEncoder};
/// use reelforge_pipeline::{CapabilityRegistry, WorkflowEngine};
/// use reelforge_storage::InMemoryArtifactStore;
/// use std::sync::Arc;
///
/// # async fn example(
/// #     registry: CapabilityRegistry,
/// #     templates: Arc<dyn TemplateStore>,
/// #     renderer: Arc<dyn FrameRenderer>,
/// #     encoder: Arc<dyn VideoEncoder>,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// let engine = WorkflowEngine::builder()
///     .registry(Arc::new(registry))
///     .templates(templates)
///     .renderer(renderer)
///     .encoder(encoder)
///     .store(Arc::new(InMemoryArtifactStore::new()))
///     .build()?;
///
/// let request = GenerationRequest::builder()
///     .source(ContentSource::Topic("How bees dance".to_string()))
///     .frame_template("default")
///     .build()?;
///
/// let result = engine.generate(request).await;
/// println!("success: {}", result.success);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(pattern = "owned", build_fn(private, name = "build_internal"))]
pub struct WorkflowEngine {
    /// Capabilities shared read-only by every run.
    registry: Arc<CapabilityRegistry>,
    /// Template lookup for frame composition.
    templates: Arc<dyn TemplateStore>,
    /// Frame rendering collaborator.
    renderer: Arc<dyn FrameRenderer>,
    /// Video encoding collaborator.
    encoder: Arc<dyn VideoEncoder>,
    /// Storage for audio, illustrations and frames.
    store: Arc<dyn ArtifactStore>,
    /// Engine configuration.
    #[builder(default)]
    config: ReelforgeConfig,
    /// Optional progress channel.
    #[builder(default, setter(strip_option))]
    progress: Option<UnboundedSender<ProgressEvent>>,
    #[builder(setter(skip))]
    limiters: CapabilityLimiters,
}

impl WorkflowEngineBuilder {
    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator is missing or the configuration
    /// fails validation.
    pub fn build(self) -> Result<WorkflowEngine, BuilderError> {
        let mut engine = self
            .build_internal()
            .map_err(|e| BuilderError::new(BuilderErrorKind::MissingField(e.to_string())))?;
        engine
            .config
            .validate()
            .map_err(|e| BuilderError::new(BuilderErrorKind::ValidationFailed(e.to_string())))?;
        engine.limiters = CapabilityLimiters::from_config(&engine.config);
        Ok(engine)
    }
}

impl WorkflowEngine {
    /// Start building an engine.
    pub fn builder() -> WorkflowEngineBuilder {
        WorkflowEngineBuilder::default()
    }

    /// The capability registry.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// The engine configuration.
    pub fn config(&self) -> &ReelforgeConfig {
        &self.config
    }

    /// Run a request to completion.
    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        let (result, _) = self.execute(request, CancellationToken::new()).await;
        result
    }

    /// Run a request, stopping early when `cancel` fires.
    ///
    /// Returns the result together with the run record.
    #[instrument(skip_all, fields(request_id = %request.request_id()))]
    pub async fn execute(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> (GenerationResult, WorkflowRun) {
        let mut run = WorkflowRun::new(*request.request_id());
        let mut progress = ProgressReporter::new(self.progress.clone(), *request.request_id());

        info!(scenes = request.n_storyboard(), template = %request.frame_template(), "Starting run");
        let composition = self.drive(&request, &mut run, &mut progress, &cancel).await;
        run.finish();

        let result = run.to_result(composition.map(|c| {
            (c.video.path, c.video.duration_seconds, c.scenes_included)
        }));
        progress.send(
            ProgressKind::Completed {
                success: result.success,
            },
            1.0,
        );
        info!(
            success = result.success,
            scenes = result.scenes_included.len(),
            errors = result.errors.len(),
            "Run finished"
        );
        (result, run)
    }

    async fn drive(
        &self,
        request: &GenerationRequest,
        run: &mut WorkflowRun,
        progress: &mut ProgressReporter,
        cancel: &CancellationToken,
    ) -> Option<Composition> {
        let caller = match self.preflight(request) {
            Ok(caller) => caller,
            Err(e) => {
                warn!(error = %e, "Request rejected before any stage started");
                run.record_error(StageName::Storyboard, None, &e);
                self.advance(run, progress, StageName::Storyboard, StageStatus::Failed, 0.0);
                return None;
            }
        };

        self.storyboard_stage(&caller, request, run, progress, cancel)
            .await?;
        self.scenes_stage(&caller, request, run, progress, cancel)
            .await?;
        self.composition_stage(request, run, progress, cancel).await
    }

    /// Validate the request and resolve its capabilities.
    fn preflight(&self, request: &GenerationRequest) -> ReelforgeResult<ProviderCaller> {
        request.validate()?;
        ProviderCaller::resolve(
            &self.registry,
            &self.selection_for(request),
            RetryPolicy::from(&self.config.retry),
            self.limiters.clone(),
        )
    }

    /// Request overrides, falling back to configured defaults per type.
    fn selection_for(&self, request: &GenerationRequest) -> CapabilitySelection {
        let requested = request.capability_selection();
        let pick = |capability_type: CapabilityType| {
            requested
                .get(capability_type)
                .or_else(|| self.config.default_capability(capability_type))
                .map(str::to_string)
        };
        CapabilitySelection {
            llm: pick(CapabilityType::Llm),
            tts: pick(CapabilityType::Tts),
            image: pick(CapabilityType::Image),
        }
    }

    async fn storyboard_stage(
        &self,
        caller: &ProviderCaller,
        request: &GenerationRequest,
        run: &mut WorkflowRun,
        progress: &mut ProgressReporter,
        cancel: &CancellationToken,
    ) -> Option<()> {
        self.advance(run, progress, StageName::Storyboard, StageStatus::Running, 0.0);

        let title = match until_cancelled(cancel, async {
            Ok(resolve_title(caller, request).await)
        })
        .await
        {
            Ok(title) => title,
            Err(e) => return self.fail_stage(run, progress, StageName::Storyboard, e),
        };
        run.set_title(title.clone());

        match request.source() {
            ContentSource::Book {
                title: book_title,
                author,
            } if self.config.pipeline.fetch_book_info => {
                let fetched = until_cancelled(cancel, async {
                    Ok(fetch_book_info(caller, book_title, author.as_deref()).await)
                })
                .await;
                match fetched {
                    Ok(book) => run.set_book(book),
                    Err(e) => return self.fail_stage(run, progress, StageName::Storyboard, e),
                }
            }
            _ => {}
        }

        let processor = StoryboardProcessor::from_config(&self.config);
        let generated = until_cancelled(
            cancel,
            processor.generate(
                caller,
                request.source(),
                *request.n_storyboard(),
                &title,
                run.book().as_ref(),
            ),
        )
        .await;

        match generated.and_then(|board| run.set_storyboard(board)) {
            Ok(()) => {
                progress.scenes_total = run.scenes().len();
                self.advance(
                    run,
                    progress,
                    StageName::Storyboard,
                    StageStatus::Succeeded,
                    STORYBOARD_PROGRESS,
                );
                Some(())
            }
            Err(e) => self.fail_stage(run, progress, StageName::Storyboard, e),
        }
    }

    async fn scenes_stage(
        &self,
        caller: &ProviderCaller,
        request: &GenerationRequest,
        run: &mut WorkflowRun,
        progress: &mut ProgressReporter,
        cancel: &CancellationToken,
    ) -> Option<()> {
        self.advance(
            run,
            progress,
            StageName::Scenes,
            StageStatus::Running,
            STORYBOARD_PROGRESS,
        );

        let composer = FrameComposer::new(
            Arc::clone(&self.templates),
            Arc::clone(&self.renderer),
            RetryPolicy::from(&self.config.retry),
            self.config.video_settings(),
        );
        let template =
            match until_cancelled(cancel, composer.load_template(request.frame_template())).await {
                Ok(template) => template,
                Err(e) => return self.fail_stage(run, progress, StageName::Scenes, e),
            };

        let shared = Arc::new(SceneTask {
            caller: caller.clone(),
            store: Arc::clone(&self.store),
            generator: SceneGenerator::from_config(&self.config),
            composer,
            template_id: request.frame_template().clone(),
            template,
            topic: request.source().topic_text().to_string(),
            title: run.title().clone().unwrap_or_default(),
            ext: run.frame_ext(request.ext()),
            voice: request.voice().clone(),
            style: request.image_style().clone(),
            semaphore: Arc::new(Semaphore::new(self.config.pipeline.max_concurrent_scenes)),
            cancel: cancel.clone(),
            progress: progress.clone(),
        });

        let mut tasks = JoinSet::new();
        let mut task_scenes = HashMap::new();
        for scene in run.scenes().to_vec() {
            let index = *scene.index();
            let task = Arc::clone(&shared);
            let handle = tasks.spawn(async move { task.run(scene).await });
            task_scenes.insert(handle.id(), index);
        }
        debug!(
            scenes = task_scenes.len(),
            max_concurrent = self.config.pipeline.max_concurrent_scenes,
            "Spawned scene tasks"
        );

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, outcome)) => {
                    let index = *outcome.scene.index();
                    for e in &outcome.errors {
                        run.record_error(StageName::Scenes, Some(index), e);
                    }
                    run.update_scene(outcome.scene);
                }
                Err(join_error) => {
                    let Some(index) = task_scenes.get(&join_error.id()).copied() else {
                        error!(error = %join_error, "Unknown scene task failed");
                        continue;
                    };
                    error!(scene = index, error = %join_error, "Scene task did not complete");
                    let e: ReelforgeError =
                        PipelineError::new(PipelineErrorKind::SceneGenerationFailed {
                            index,
                            reason: join_error.to_string(),
                        })
                        .into();
                    run.record_error(StageName::Scenes, Some(index), &e);
                    if let Some(mut scene) = run.scenes().get(index).cloned() {
                        scene.mark_failed();
                        run.update_scene(scene);
                    }
                }
            }
        }

        if cancel.is_cancelled() {
            return self.fail_stage(run, progress, StageName::Scenes, cancelled());
        }

        let usable = run.usable_scene_count();
        info!(usable, total = run.scenes().len(), "Scenes finished");
        if usable == 0 {
            return self.fail_stage(
                run,
                progress,
                StageName::Scenes,
                run_aborted("no scene produced a usable frame"),
            );
        }

        self.advance(
            run,
            progress,
            StageName::Scenes,
            StageStatus::Succeeded,
            SCENES_PROGRESS,
        );
        Some(())
    }

    async fn composition_stage(
        &self,
        request: &GenerationRequest,
        run: &mut WorkflowRun,
        progress: &mut ProgressReporter,
        cancel: &CancellationToken,
    ) -> Option<Composition> {
        self.advance(
            run,
            progress,
            StageName::Composition,
            StageStatus::Running,
            SCENES_PROGRESS,
        );

        let compositor = VideoCompositor::from_config(Arc::clone(&self.encoder), &self.config);
        let output_path = request.output_path().clone().unwrap_or_else(|| {
            compositor.output_path_for(run.title().as_deref().unwrap_or_default())
        });

        let composed = until_cancelled(
            cancel,
            compositor.compose(run.scenes(), request.bgm().clone(), output_path),
        )
        .await;

        match composed {
            Ok(composition) => {
                self.advance(
                    run,
                    progress,
                    StageName::Composition,
                    StageStatus::Succeeded,
                    1.0,
                );
                Some(composition)
            }
            Err(e) => self.fail_stage(run, progress, StageName::Composition, e),
        }
    }

    /// Move a stage and report it.
    fn advance(
        &self,
        run: &mut WorkflowRun,
        progress: &ProgressReporter,
        stage: StageName,
        status: StageStatus,
        fraction: f32,
    ) {
        if let Err(e) = run.transition(stage, status) {
            error!(error = %e, "Stage transition rejected");
            return;
        }
        let kind = match status {
            StageStatus::Running => ProgressKind::StageStarted { stage },
            status => ProgressKind::StageFinished { stage, status },
        };
        progress.send(kind, fraction);
    }

    /// Record a stage failure and abort the run.
    ///
    /// Anything other than a cancellation or an explicit abort is followed
    /// by a `RunAborted` record naming the stage.
    fn fail_stage<T>(
        &self,
        run: &mut WorkflowRun,
        progress: &ProgressReporter,
        stage: StageName,
        error: ReelforgeError,
    ) -> Option<T> {
        warn!(%stage, error = %error, "Stage failed");
        run.record_error(stage, None, &error);
        let kind = FailureKind::classify(&error);
        if kind != FailureKind::Cancelled && kind != FailureKind::RunAborted {
            run.record_error(
                stage,
                None,
                &run_aborted(&format!("{} stage failed", stage)),
            );
        }
        let fraction = progress.current();
        self.advance(run, progress, stage, StageStatus::Failed, fraction);
        None
    }
}

/// Await `future` unless `cancel` fires first.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = ReelforgeResult<T>>,
) -> ReelforgeResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(cancelled()),
        result = future => result,
    }
}

fn cancelled() -> ReelforgeError {
    PipelineError::new(PipelineErrorKind::Cancelled).into()
}

fn run_aborted(reason: &str) -> ReelforgeError {
    PipelineError::new(PipelineErrorKind::RunAborted(reason.to_string())).into()
}

/// Sends progress events for one run. Clones share the scene counter.
#[derive(Debug, Clone)]
struct ProgressReporter {
    sender: Option<UnboundedSender<ProgressEvent>>,
    request_id: Uuid,
    scenes_total: usize,
    scenes_done: Arc<AtomicUsize>,
    last: Arc<std::sync::Mutex<f32>>,
}

impl ProgressReporter {
    fn new(sender: Option<UnboundedSender<ProgressEvent>>, request_id: Uuid) -> Self {
        Self {
            sender,
            request_id,
            scenes_total: 0,
            scenes_done: Arc::new(AtomicUsize::new(0)),
            last: Arc::new(std::sync::Mutex::new(0.0)),
        }
    }

    /// Last fraction reported.
    fn current(&self) -> f32 {
        self.last.lock().map(|last| *last).unwrap_or_default()
    }

    fn send(&self, kind: ProgressKind, progress: f32) {
        if let Ok(mut last) = self.last.lock() {
            *last = progress;
        }
        let Some(sender) = &self.sender else {
            return;
        };
        let event = ProgressEvent {
            request_id: self.request_id,
            kind,
            progress,
            scenes_done: self.scenes_done.load(Ordering::SeqCst),
            scenes_total: self.scenes_total,
        };
        if sender.send(event).is_err() {
            debug!("Progress receiver dropped");
        }
    }

    fn scene_fraction(&self, done: usize) -> f32 {
        let total = self.scenes_total.max(1) as f32;
        let fraction =
            STORYBOARD_PROGRESS + (SCENES_PROGRESS - STORYBOARD_PROGRESS) * (done as f32 / total);
        fraction.min(SCENES_PROGRESS)
    }

    fn scene_started(&self, index: usize) {
        let done = self.scenes_done.load(Ordering::SeqCst);
        self.send(ProgressKind::SceneStarted { index }, self.scene_fraction(done));
    }

    fn scene_finished(&self, index: usize, status: SceneStatus) {
        let done = self.scenes_done.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(
            ProgressKind::SceneFinished { index, status },
            self.scene_fraction(done),
        );
    }
}

/// What a scene task hands back to the run owner.
struct SceneOutcome {
    scene: Scene,
    errors: Vec<ReelforgeError>,
}

/// Inputs shared by every scene task of one run.
struct SceneTask {
    caller: ProviderCaller,
    store: Arc<dyn ArtifactStore>,
    generator: SceneGenerator,
    composer: FrameComposer,
    template_id: String,
    template: String,
    topic: String,
    title: String,
    ext: BTreeMap<String, serde_json::Value>,
    voice: VoiceOptions,
    style: Option<ImageStyle>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    progress: ProgressReporter,
}

impl SceneTask {
    /// Wait for a slot, process the scene, report it and release the slot.
    ///
    /// A cancelled scene discards every artifact it stored.
    async fn run(self: Arc<Self>, mut scene: Scene) -> SceneOutcome {
        let index = *scene.index();

        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            debug!(scene = index, "Scene cancelled before it started");
            scene.mark_failed();
            return SceneOutcome {
                scene,
                errors: Vec::new(),
            };
        };

        self.progress.scene_started(index);
        let tracker = ArtifactTracker::new();

        let processed = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            errors = self.process(&tracker, &mut scene) => Some(errors),
        };

        let errors = match processed {
            Some(errors) => {
                let status = scene.settle();
                debug!(scene = index, %status, errors = errors.len(), "Scene processed");
                errors
            }
            None => {
                let released = tracker.release(self.store.as_ref()).await;
                info!(scene = index, released, "Scene cancelled, artifacts discarded");
                scene.clear_artifacts();
                scene.mark_failed();
                vec![cancelled()]
            }
        };

        self.progress.scene_finished(index, *scene.status());
        drop(permit);

        SceneOutcome { scene, errors }
    }

    async fn process(&self, tracker: &ArtifactTracker, scene: &mut Scene) -> Vec<ReelforgeError> {
        let ctx = SceneContext {
            caller: &self.caller,
            store: self.store.as_ref(),
            tracker,
            voice: &self.voice,
            style: self.style.as_ref(),
            title: &self.title,
        };
        let mut errors = self.generator.generate(&ctx, scene).await;

        if *scene.status() != SceneStatus::Failed {
            let frame = FrameContext {
                template_id: &self.template_id,
                template: &self.template,
                topic: &self.topic,
                ext: &self.ext,
            };
            if let Err(e) = self
                .composer
                .compose(&frame, self.store.as_ref(), tracker, scene)
                .await
            {
                errors.push(e);
            }
        }

        errors
    }
}
