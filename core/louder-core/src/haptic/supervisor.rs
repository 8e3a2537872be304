//! Lifecycle owner for the persistent haptic engine process.
//!
//! ## State Machine
//!
//! ```text
//! Absent ──send_pulse──▶ Launching ──spawned──▶ Ready
//!   ▲                        │                    │
//!   └──── missing binary ────┘                    │
//!   └──── spawn error ───────┘                    │
//!   └──── write failure / process exit ───────────┘
//! ```
//!
//! Callers that arrive while a launch is in flight await the same shared
//! launch future, so concurrent pulses never start a second process. Nothing
//! retries on its own: the next `send_pulse` after a reset launches again.

use crate::error::{LouderError, Result};
use crate::haptic::HapticCommand;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

/// Environment variable pointing at an explicit engine binary.
pub const ENGINE_PATH_ENV: &str = "LOUDER_HAPTIC_ENGINE";
const ENGINE_BINARY_NAME: &str = "HapticEngine";

pub type ActuatorStdin = Box<dyn AsyncWrite + Send + Unpin>;

/// A freshly spawned engine: its command pipe and a future that resolves on exit.
pub struct ActuatorProcess {
    pub stdin: ActuatorStdin,
    pub exited: BoxFuture<'static, ()>,
}

/// Starts engine processes. The supervisor only ever calls this from `Absent`.
pub trait ActuatorSpawner: Send + Sync + 'static {
    fn spawn(&self, path: &Path) -> BoxFuture<'static, io::Result<ActuatorProcess>>;
}

/// Spawns the engine as a child process with a piped stdin.
#[derive(Debug, Clone, Default)]
pub struct ProcessSpawner {
    inherit_stderr: bool,
}

impl ProcessSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets the engine's own diagnostics through to our stderr.
    pub fn with_inherited_stderr(mut self, inherit: bool) -> Self {
        self.inherit_stderr = inherit;
        self
    }
}

impl ActuatorSpawner for ProcessSpawner {
    fn spawn(&self, path: &Path) -> BoxFuture<'static, io::Result<ActuatorProcess>> {
        let stderr = if self.inherit_stderr {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        let spawned = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(stderr)
            .spawn();

        async move {
            let mut child = spawned?;
            let stdin = child.stdin.take().ok_or_else(|| {
                io::Error::new(io::ErrorKind::BrokenPipe, "engine stdin was not piped")
            })?;
            let exited = async move {
                match child.wait().await {
                    Ok(status) => tracing::debug!(%status, "Haptic engine exited"),
                    Err(err) => tracing::debug!(error = %err, "Haptic engine wait failed"),
                }
            }
            .boxed();
            Ok(ActuatorProcess {
                stdin: Box::new(stdin),
                exited,
            })
        }
        .boxed()
    }
}

/// Ordered engine locations: explicit override, packaged copies, then user installs.
pub fn default_actuator_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = std::env::var_os(ENGINE_PATH_ENV).filter(|value| !value.is_empty()) {
        candidates.push(PathBuf::from(path));
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join("native").join(ENGINE_BINARY_NAME));
        candidates.push(exe_dir.join("..").join("native").join(ENGINE_BINARY_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".config/opencode/native").join(ENGINE_BINARY_NAME));
        candidates.push(home.join(".local/share/louder").join(ENGINE_BINARY_NAME));
    }

    candidates
}

async fn resolve_engine_path(candidates: &[PathBuf]) -> Option<PathBuf> {
    for candidate in candidates {
        if tokio::fs::try_exists(candidate).await.unwrap_or(false) {
            return Some(candidate.clone());
        }
    }
    None
}

/// Live connection to a running engine.
///
/// The `id` ties the handle to one spawn so a stale reset cannot clear a newer engine.
#[derive(Clone)]
pub struct EngineHandle {
    id: u64,
    stdin: Arc<tokio::sync::Mutex<ActuatorStdin>>,
}

impl EngineHandle {
    /// Writes one protocol line. Returns `false` once the pipe is unusable.
    pub async fn write(&self, command: &HapticCommand) -> bool {
        let line = command.to_wire();
        let mut stdin = self.stdin.lock().await;
        if let Err(err) = stdin.write_all(line.as_bytes()).await {
            tracing::debug!(error = %err, "Haptic engine write failed");
            return false;
        }
        if let Err(err) = stdin.flush().await {
            tracing::debug!(error = %err, "Haptic engine flush failed");
            return false;
        }
        true
    }
}

type SharedLaunch = Shared<BoxFuture<'static, Option<EngineHandle>>>;

enum EngineState {
    Absent,
    Launching(SharedLaunch),
    Ready(EngineHandle),
}

struct SupervisorInner {
    candidates: Vec<PathBuf>,
    spawner: Arc<dyn ActuatorSpawner>,
    state: Mutex<EngineState>,
    next_id: AtomicU64,
    launches: AtomicUsize,
}

impl SupervisorInner {
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Must be called with the state lock held; the caller stores the result.
    fn start_launch(self: &Arc<Self>) -> SharedLaunch {
        let attempt = self.launches.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(attempt, "Launching haptic engine");

        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.launch().await })
            .map(|joined| joined.ok().flatten())
            .boxed()
            .shared()
    }

    async fn launch(self: Arc<Self>) -> Option<EngineHandle> {
        let outcome = self.spawn_engine().await;

        let mut state = self.lock_state();
        match outcome {
            Ok((handle, exited)) => {
                *state = EngineState::Ready(handle.clone());
                drop(state);
                tracing::debug!(engine = handle.id, "Haptic engine ready");
                self.watch_exit(handle.id, exited);
                Some(handle)
            }
            Err(err) => {
                *state = EngineState::Absent;
                tracing::debug!(error = %err, "Haptic engine launch failed");
                None
            }
        }
    }

    async fn spawn_engine(&self) -> Result<(EngineHandle, BoxFuture<'static, ()>)> {
        let path = resolve_engine_path(&self.candidates)
            .await
            .ok_or(LouderError::ActuatorNotFound {
                searched: self.candidates.len(),
            })?;

        let process = self
            .spawner
            .spawn(&path)
            .await
            .map_err(|err| LouderError::io(format!("spawning {}", path.display()), err))?;

        let handle = EngineHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            stdin: Arc::new(tokio::sync::Mutex::new(process.stdin)),
        };
        Ok((handle, process.exited))
    }

    fn watch_exit(self: &Arc<Self>, id: u64, exited: BoxFuture<'static, ()>) {
        let inner: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            exited.await;
            if let Some(inner) = inner.upgrade() {
                inner.reset(id, "process exited");
            }
        });
    }

    fn reset(&self, id: u64, reason: &'static str) {
        let mut state = self.lock_state();
        if matches!(&*state, EngineState::Ready(handle) if handle.id == id) {
            *state = EngineState::Absent;
            tracing::debug!(engine = id, reason, "Haptic engine reset");
        }
    }
}

/// Owns at most one live engine process and forwards pulses to it.
pub struct HapticSupervisor {
    inner: Arc<SupervisorInner>,
}

impl HapticSupervisor {
    /// `candidates` is searched in order; the first existing path is launched.
    pub fn new(candidates: Vec<PathBuf>, spawner: Arc<dyn ActuatorSpawner>) -> Self {
        Self {
            inner: Arc::new(SupervisorInner {
                candidates,
                spawner,
                state: Mutex::new(EngineState::Absent),
                next_id: AtomicU64::new(1),
                launches: AtomicUsize::new(0),
            }),
        }
    }

    /// Supervisor over the default engine locations using real child processes.
    pub fn with_defaults(inherit_stderr: bool) -> Self {
        Self::new(
            default_actuator_candidates(),
            Arc::new(ProcessSpawner::new().with_inherited_stderr(inherit_stderr)),
        )
    }

    /// Sends one pulse, launching the engine first if needed.
    ///
    /// Never fails loudly: an unavailable engine or a dead pipe yields `false`.
    pub async fn send_pulse(&self, command: HapticCommand) -> bool {
        let Some(handle) = self.acquire().await else {
            return false;
        };

        if handle.write(&command).await {
            true
        } else {
            self.inner.reset(handle.id, "write failed");
            false
        }
    }

    async fn acquire(&self) -> Option<EngineHandle> {
        let launch = {
            let mut state = self.inner.lock_state();
            match &*state {
                EngineState::Ready(handle) => return Some(handle.clone()),
                EngineState::Launching(launch) => launch.clone(),
                EngineState::Absent => {
                    let launch = self.inner.start_launch();
                    *state = EngineState::Launching(launch.clone());
                    launch
                }
            }
        };
        launch.await
    }

    /// Number of launches started over this supervisor's lifetime.
    pub fn launch_count(&self) -> usize {
        self.inner.launches.load(Ordering::SeqCst)
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.inner.lock_state(), EngineState::Ready(_))
    }
}
