//! One open image and everything derived from it.
//!
//! A [`Session`] is a cheap handle; the state lives in a worker task that
//! owns both native buffers and processes commands one at a time. Engine
//! calls run on the blocking pool with the source buffer moved into the job
//! and moved back out with the result, so the buffer has exactly one owner
//! at every point.

use futures_util::{Stream, StreamExt};
use posterize::{Palette, PixelBuffer, PosterizeError, PosterizedImage, Posterizer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

use crate::error::{ExportError, SessionError};
use crate::models::{AppConfig, ColorLimits, ExportConfig, QuantizationRequest};
use crate::services::debounce::{Completion, DebounceScheduler, Ticket};
use crate::services::export;
use crate::services::image_source::{ImageDecoder, ImageSource, InMemoryImage};
use crate::services::native_buffer::{BufferInfo, BufferKind, BufferLedger, NativeBuffer};
use crate::services::publisher::{Notice, Rendered, ResultPublisher};

/// Snapshot of a session's state
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub source: Option<BufferInfo>,
    pub derived: Option<BufferInfo>,
    /// Palette of the current derived buffer as `#RRGGBB`
    pub palette: Vec<String>,
    /// Request the derived buffer was computed for
    pub current: Option<QuantizationRequest>,
    /// Latest submitted request
    pub desired: QuantizationRequest,
    /// Engine calls performed so far
    pub computations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportTarget {
    Image,
    Palette,
}

enum LoadInput {
    Path(PathBuf),
    Image(InMemoryImage),
}

enum Command {
    Recolor(QuantizationRequest),
    Load {
        input: LoadInput,
        reply: oneshot::Sender<Result<Arc<Rendered>, SessionError>>,
    },
    Export {
        target: ExportTarget,
        path: PathBuf,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Status(oneshot::Sender<SessionStatus>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a session worker
#[derive(Clone)]
pub struct Session {
    commands: mpsc::UnboundedSender<Command>,
    publisher: Arc<ResultPublisher>,
    ledger: BufferLedger,
    limits: ColorLimits,
}

impl Session {
    /// Start a session decoding images with [`ImageDecoder`]
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: AppConfig) -> Self {
        Self::with_source(config, Arc::new(ImageDecoder))
    }

    pub fn with_source(config: AppConfig, images: Arc<dyn ImageSource>) -> Self {
        let config = config.sanitized();
        let (commands, rx) = mpsc::unbounded_channel();
        let publisher = Arc::new(ResultPublisher::new());
        let ledger = BufferLedger::new();
        let limits = config.limits();

        let worker = Worker {
            images,
            publisher: publisher.clone(),
            ledger: ledger.clone(),
            scheduler: DebounceScheduler::new(config.quiet_period(), config.default_request()),
            export_config: config.export.clone(),
            source: None,
            source_info: None,
            derived: None,
            cache: None,
            in_flight: None,
            computations: 0,
        };
        tokio::spawn(worker.run(rx));

        tracing::debug!(
            default = %config.default_request(),
            quiet_period_ms = config.debounce.quiet_period_ms,
            "Session started"
        );

        Self {
            commands,
            publisher,
            ledger,
            limits,
        }
    }

    /// Decode the file at `path` and make it the session's image
    ///
    /// On failure the previous image and result stay as they were.
    pub async fn load_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Arc<Rendered>, SessionError> {
        let input = LoadInput::Path(path.as_ref().to_path_buf());
        self.load(input).await
    }

    /// Same as [`load_from_path`](Self::load_from_path) for pasted images
    pub async fn load_from_image(
        &self,
        image: InMemoryImage,
    ) -> Result<Arc<Rendered>, SessionError> {
        self.load(LoadInput::Image(image)).await
    }

    async fn load(&self, input: LoadInput) -> Result<Arc<Rendered>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Load { input, reply })?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Ask for a recompute; returns immediately
    ///
    /// Color count changes wait for the quiet period, a change of the
    /// monochrome switch alone is computed right away.
    pub fn request_recolor(&self, request: QuantizationRequest) -> Result<(), SessionError> {
        self.send(Command::Recolor(request))
    }

    /// Save the current quantized image as PNG
    pub async fn export_image(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        self.export(ExportTarget::Image, path.as_ref()).await
    }

    /// Save the current palette as a strip of swatches
    pub async fn export_palette(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        self.export(ExportTarget::Palette, path.as_ref()).await
    }

    async fn export(&self, target: ExportTarget, path: &Path) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Export {
            target,
            path: path.to_path_buf(),
            reply,
        })?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn status(&self) -> Result<SessionStatus, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Status(reply))?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Forward every request from `controls` to [`request_recolor`](Self::request_recolor)
    ///
    /// The forwarding task ends with the stream or when the session closes.
    pub fn follow_controls<S>(&self, controls: S) -> JoinHandle<()>
    where
        S: Stream<Item = QuantizationRequest> + Send + 'static,
    {
        let session = self.clone();
        tokio::spawn(async move {
            futures_util::pin_mut!(controls);
            while let Some(request) = controls.next().await {
                if session.request_recolor(request).is_err() {
                    break;
                }
            }
        })
    }

    /// Latest published result; changes whenever a new one is published
    pub fn results(&self) -> watch::Receiver<Option<Arc<Rendered>>> {
        self.publisher.subscribe()
    }

    pub fn latest(&self) -> Option<Arc<Rendered>> {
        self.publisher.latest()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.publisher.notices()
    }

    pub fn ledger(&self) -> &BufferLedger {
        &self.ledger
    }

    pub fn limits(&self) -> ColorLimits {
        self.limits
    }

    /// Stop the worker and release both buffers
    pub async fn close(self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown(reply))?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).map_err(|_| SessionError::Closed)
    }
}

/// Derived buffer with the palette it was computed with
struct Derived {
    buffer: NativeBuffer,
    palette: Palette,
    request: QuantizationRequest,
}

/// Last color reduction of the current source
struct ColorCache {
    color_count: u16,
    image: PosterizedImage,
}

/// Everything a finished job hands back
struct JobOutput {
    source: NativeBuffer,
    cache: Option<ColorCache>,
    outcome: Result<PosterizedImage, PosterizeError>,
    engine_called: bool,
}

struct InFlight {
    ticket: Ticket,
    handle: JoinHandle<JobOutput>,
}

enum Event {
    Command(Command),
    Closed,
    Finished(Ticket, Result<JobOutput, JoinError>),
    Fire,
}

struct Worker {
    images: Arc<dyn ImageSource>,
    publisher: Arc<ResultPublisher>,
    ledger: BufferLedger,
    scheduler: DebounceScheduler,
    export_config: ExportConfig,
    /// `None` while no image is loaded or while a job holds it
    source: Option<NativeBuffer>,
    source_info: Option<BufferInfo>,
    derived: Option<Derived>,
    cache: Option<ColorCache>,
    in_flight: Option<InFlight>,
    computations: u64,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let deadline = self.fire_deadline();
            let event = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => Event::Command(command),
                    None => Event::Closed,
                },
                (ticket, output) = join_in_flight(&mut self.in_flight) => Event::Finished(ticket, output),
                _ = sleep_until(deadline) => Event::Fire,
            };

            match event {
                Event::Command(Command::Recolor(request)) => self.recolor(request),
                Event::Command(Command::Load { input, reply }) => {
                    let result = self.load(input).await;
                    if let Err(ref e) = result {
                        self.publisher.notify(Notice::error(e));
                    }
                    let _ = reply.send(result);
                }
                Event::Command(Command::Export {
                    target,
                    path,
                    reply,
                }) => {
                    let result = self.export(target, &path).await;
                    match result {
                        Ok(()) => {
                            let what = match target {
                                ExportTarget::Image => "image",
                                ExportTarget::Palette => "palette",
                            };
                            self.publisher.notify(Notice::info(format!(
                                "Saved {what} to {}",
                                path.display()
                            )));
                        }
                        Err(ref e) => self.publisher.notify(Notice::error(e)),
                    }
                    let _ = reply.send(result);
                }
                Event::Command(Command::Status(reply)) => {
                    let _ = reply.send(self.status());
                }
                Event::Command(Command::Shutdown(reply)) => {
                    self.shutdown().await;
                    let _ = reply.send(());
                    return;
                }
                Event::Closed => {
                    self.shutdown().await;
                    return;
                }
                Event::Finished(ticket, output) => {
                    self.in_flight = None;
                    self.finish(ticket, output);
                }
                Event::Fire => {
                    if let Some(ticket) = self.scheduler.fire(Instant::now()) {
                        self.spawn_job(ticket);
                    }
                }
            }
        }
    }

    /// Deadline to sleep until, if a job could start now
    fn fire_deadline(&self) -> Option<Instant> {
        if self.in_flight.is_some() || self.source.is_none() {
            return None;
        }
        self.scheduler.deadline()
    }

    fn recolor(&mut self, request: QuantizationRequest) {
        let desired = self.scheduler.desired();
        if request == desired {
            return;
        }

        let now = Instant::now();
        if request.color_count == desired.color_count {
            tracing::debug!(%request, "Monochrome switch changed");
            self.scheduler.submit_now(request, now);
        } else {
            tracing::trace!(%request, "Recolor requested");
            self.scheduler.submit(request, now);
        }
    }

    fn spawn_job(&mut self, ticket: Ticket) {
        let Some(source) = self.source.take() else {
            return;
        };
        let cache = self.cache.take();
        tracing::debug!(
            generation = ticket.generation,
            request = %ticket.request,
            "Starting quantization"
        );

        let handle =
            tokio::task::spawn_blocking(move || run_job(source, cache, ticket.request));
        self.in_flight = Some(InFlight { ticket, handle });
    }

    fn finish(&mut self, ticket: Ticket, output: Result<JobOutput, JoinError>) {
        let completion = self.scheduler.complete(ticket, Instant::now());
        let output = match output {
            Ok(output) => output,
            Err(e) => {
                // The source went down with the job and was released there
                tracing::error!(%e, "Quantization task failed");
                self.source_info = None;
                self.release_derived();
                self.publisher.notify(Notice::error(&SessionError::Decode(
                    "image processing failed; please load the image again".to_string(),
                )));
                return;
            }
        };

        self.source = Some(output.source);
        self.cache = output.cache;
        if output.engine_called {
            self.computations += 1;
        }

        match (output.outcome, completion) {
            (Ok(image), Completion::Fresh) => {
                self.adopt(image, ticket.request);
            }
            (Ok(_), Completion::Stale) => {
                tracing::debug!(
                    generation = ticket.generation,
                    request = %ticket.request,
                    "Discarded superseded result"
                );
            }
            (Err(e), Completion::Fresh) => {
                let error = SessionError::from(e);
                tracing::warn!(%error, request = %ticket.request, "Quantization failed");
                self.publisher.notify(Notice::error(&error));
            }
            (Err(_), Completion::Stale) => {}
        }
    }

    /// Replace the derived buffer with `image` and publish it
    fn adopt(&mut self, image: PosterizedImage, request: QuantizationRequest) -> Arc<Rendered> {
        let pixels = image.to_buffer();
        let rendered = Arc::new(Rendered {
            generation: self.scheduler.generation(),
            request,
            width: image.width(),
            height: image.height(),
            rgba: image.to_rgba8(),
            palette: image.palette().clone(),
        });

        // The old derived buffer goes before the new one is acquired
        self.release_derived();
        let buffer = self.ledger.acquire(BufferKind::Derived, pixels);
        self.derived = Some(Derived {
            buffer,
            palette: rendered.palette.clone(),
            request,
        });

        self.publisher.publish(rendered.clone());
        rendered
    }

    async fn load(&mut self, input: LoadInput) -> Result<Arc<Rendered>, SessionError> {
        // Let a running job hand the current source back first
        if let Some(job) = self.in_flight.take() {
            let output = job.handle.await;
            self.finish(job.ticket, output);
        }

        let pixels = match input {
            LoadInput::Path(path) => {
                tracing::info!(path = %path.display(), "Loading image");
                self.images.decode_path(&path).await?
            }
            LoadInput::Image(image) => {
                tracing::info!("Loading in-memory image");
                self.images.decode_image(image).await?
            }
        };

        let fresh = self.ledger.acquire(BufferKind::Source, pixels);
        let request = self.scheduler.desired();
        let output = tokio::task::spawn_blocking(move || run_job(fresh, None, request))
            .await
            .map_err(|e| SessionError::Decode(format!("image processing failed: {e}")))?;
        self.computations += 1;

        // On error `output.source` is dropped here, releasing the new buffer
        let image = output.outcome?;

        let info = output.source.info();
        if let Some(old) = self.source.replace(output.source) {
            old.release();
        }
        self.source_info = Some(info);
        self.cache = output.cache;
        self.scheduler.reset(request);

        tracing::info!(
            width = image.width(),
            height = image.height(),
            colors = image.palette().len(),
            %request,
            "Image loaded"
        );
        Ok(self.adopt(image, request))
    }

    async fn export(&self, target: ExportTarget, path: &Path) -> Result<(), SessionError> {
        let derived = self.derived.as_ref().ok_or(SessionError::UseBeforeReady)?;

        // Read-only copies; the native buffer never leaves the worker
        let palette = derived.palette.clone();
        let pixels: Option<PixelBuffer> = match target {
            ExportTarget::Image => Some(derived.buffer.pixels().clone()),
            ExportTarget::Palette => None,
        };
        let config = self.export_config.clone();
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let bytes = match pixels {
                Some(pixels) => export::encode_image(&pixels, &palette, &config)?,
                None => export::encode_palette(&palette, &config)?,
            };
            export::write_png(&path, &bytes)
        })
        .await
        .map_err(|e| SessionError::Export(ExportError::Task(e.to_string())))??;
        Ok(())
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            source: self.source_info.clone(),
            derived: self.derived.as_ref().map(|d| d.buffer.info()),
            palette: self
                .derived
                .as_ref()
                .map(|d| d.palette.to_hex_strings())
                .unwrap_or_default(),
            current: self.derived.as_ref().map(|d| d.request),
            desired: self.scheduler.desired(),
            computations: self.computations,
        }
    }

    fn release_derived(&mut self) {
        if let Some(old) = self.derived.take() {
            old.buffer.release();
        }
    }

    async fn shutdown(&mut self) {
        if let Some(job) = self.in_flight.take() {
            // Wait for the source to come back so it is released here
            if let Ok(output) = job.handle.await {
                self.source = Some(output.source);
            }
        }
        self.cache = None;
        self.release_derived();
        if let Some(source) = self.source.take() {
            source.release();
        }
        self.source_info = None;
        tracing::debug!(stats = ?self.ledger.stats(), "Session closed");
    }
}

/// Engine call for one request, run on the blocking pool
///
/// Monochrome results are derived from the color reduction, which is kept
/// so that flipping the switch back and forth does not reduce again.
fn run_job(
    source: NativeBuffer,
    cache: Option<ColorCache>,
    request: QuantizationRequest,
) -> JobOutput {
    let cached = cache.filter(|c| c.color_count == request.color_count);

    let (color, engine_called) = match cached {
        Some(cache) => (Ok(cache.image), false),
        None => (
            Posterizer::new(request.color_count).quantize(source.pixels()),
            true,
        ),
    };

    match color {
        Ok(image) => {
            let outcome = if request.monochrome {
                Ok(image.to_monochrome())
            } else {
                Ok(image.clone())
            };
            JobOutput {
                source,
                cache: Some(ColorCache {
                    color_count: request.color_count,
                    image,
                }),
                outcome,
                engine_called,
            }
        }
        Err(e) => JobOutput {
            source,
            cache: None,
            outcome: Err(e),
            engine_called,
        },
    }
}

async fn join_in_flight(in_flight: &mut Option<InFlight>) -> (Ticket, Result<JobOutput, JoinError>) {
    match in_flight {
        Some(job) => {
            let output = (&mut job.handle).await;
            (job.ticket, output)
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
