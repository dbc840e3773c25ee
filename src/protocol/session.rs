//! MPD client session.
//!
//! A [`Session`] is a cheap, cloneable handle. The protocol itself runs on a
//! control task that owns the write half of the transport and consumes two
//! queues: lines from the reader task and commands from callers. All writes
//! and all state decisions happen on that one task.

use std::sync::{Arc, Mutex, OnceLock};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::classify::{self, IdleStep};
use super::command::{Command, CommandKind};
use super::reader::spawn_reader;
use crate::error::{JukeboxError, Result};

/// Control task states.
///
/// Handling a command is not a state of its own: it runs inside `Ready` and
/// resolves back to `Ready` or to `Fatal`. Callers see it as
/// [`SessionStatus::Busy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    /// Waiting for the `OK MPD <version>` greeting
    #[default]
    Connecting,
    /// Waiting for a command; any server line is a violation
    Ready,
    /// A fatal fault happened; nothing is serviced anymore
    Fatal,
    /// Every session handle was dropped
    Closed,
}

/// Externally observable session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Greeting not received yet
    Connecting,
    /// Waiting for the next command
    Ready,
    /// A command is on the wire (including an outstanding idle)
    Busy,
    /// Terminal; every submission fails with `SessionClosed`
    Closed,
}

impl From<State> for SessionStatus {
    fn from(state: State) -> Self {
        match state {
            State::Connecting => Self::Connecting,
            State::Ready => Self::Ready,
            State::Fatal | State::Closed => Self::Closed,
        }
    }
}

/// Subsystems reported by one idle round, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdleEvent {
    /// Names from the `changed: <system>` lines
    pub subsystems: Vec<String>,
}

/// Handle to an MPD session.
///
/// Commands are strictly sequential on the wire. Clones share the same
/// session, and concurrent submissions are serviced one at a time in the
/// order they reach the control task.
///
/// While an `idle` is outstanding the only valid submission is `noidle`.
/// Anything else is a usage error: it fails with
/// [`JukeboxError::CallerMisuse`] and ends the session.
///
/// After any fatal fault every submission, queued or new, fails promptly
/// with [`JukeboxError::SessionClosed`].
#[derive(Clone)]
pub struct Session {
    id: String,
    version: Arc<OnceLock<String>>,
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SessionStatus>,
    events: Arc<Mutex<Option<mpsc::UnboundedReceiver<IdleEvent>>>>,
}

impl Session {
    /// Start a session that expects the server greeting first.
    ///
    /// Returns immediately; use [`Session::wait_ready`] or
    /// [`Session::connect`] to wait for the handshake. Must be called from
    /// within a Tokio runtime.
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::with_start_state(stream, State::Connecting)
    }

    /// Start a session in an explicit initial state.
    ///
    /// `State::Ready` skips the greeting, for streams whose greeting was
    /// already consumed. The version then stays unset.
    pub fn with_start_state<S>(stream: S, start: State) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let (lines, reader) = spawn_reader(read_half);
        Self::spawn(write_half, lines, reader, start, None)
    }

    /// Start a session and wait for the greeting.
    pub async fn connect<S>(stream: S) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let (mut lines, reader) = spawn_reader(read_half);

        let version = match handshake(&mut lines).await {
            Ok(version) => version,
            Err(e) => {
                reader.abort();
                return Err(e);
            },
        };

        Ok(Self::spawn(write_half, lines, reader, State::Ready, Some(version)))
    }

    fn spawn<W>(
        writer: W,
        lines: mpsc::UnboundedReceiver<String>,
        reader: JoinHandle<()>,
        start: State,
        version: Option<String>,
    ) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let version_cell = Arc::new(OnceLock::new());
        if let Some(version) = version {
            let _ = version_cell.set(version);
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SessionStatus::from(start));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let machine = Machine {
            writer,
            lines,
            commands: cmd_rx,
            reader,
            version: Arc::clone(&version_cell),
            status: status_tx,
            events: event_tx,
        };
        let span = tracing::info_span!("session", id = %id);
        tokio::spawn(machine.run(start).instrument(span));

        Self {
            id,
            version: version_cell,
            commands: cmd_tx,
            status: status_rx,
            events: Arc::new(Mutex::new(Some(event_rx))),
        }
    }

    /// Session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Protocol version from the greeting, once received.
    pub fn version(&self) -> Option<&str> {
        self.version.get().map(String::as_str)
    }

    /// Current phase
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Check if the session reached its terminal state
    pub fn is_closed(&self) -> bool {
        self.status() == SessionStatus::Closed
    }

    /// Wait until the greeting is processed.
    ///
    /// Fails with `SessionClosed` if the session died first.
    pub async fn wait_ready(&self) -> Result<()> {
        let mut status = self.status.clone();
        let result = status
            .wait_for(|s| *s != SessionStatus::Connecting)
            .await
            .map(|s| *s);
        match result {
            Ok(SessionStatus::Ready | SessionStatus::Busy) => Ok(()),
            _ => Err(JukeboxError::SessionClosed),
        }
    }

    /// Wait until the session reaches its terminal state.
    pub async fn closed(&self) {
        let mut status = self.status.clone();
        // A dropped sender means the control task is gone as well
        let _ = status.wait_for(|s| *s == SessionStatus::Closed).await;
    }

    /// Take the receiver of idle events. Only the first call gets it.
    ///
    /// Events queue up until taken, so none are lost. The queue is unbounded:
    /// a session that idles repeatedly without anyone taking or draining the
    /// receiver keeps one [`IdleEvent`] per completed idle in memory.
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<IdleEvent>> {
        self.events.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Submit a command and wait for its completion.
    pub async fn submit(&self, name: &str, params: &str) -> Result<()> {
        let (cmd, done) = Command::new(name, params);
        self.commands
            .send(cmd)
            .map_err(|_| JukeboxError::SessionClosed)?;
        done.await.map_err(|_| JukeboxError::SessionClosed)?
    }

    /// Add a URI to the play queue.
    pub async fn add(&self, uri: &str) -> Result<()> {
        self.submit("add", uri).await
    }

    /// Wait for a change in the given subsystems (all when empty).
    ///
    /// The changed subsystems are delivered through [`Session::take_events`];
    /// take the receiver before idling in a loop so events do not pile up.
    pub async fn idle(&self, subsystems: &[&str]) -> Result<()> {
        self.submit("idle", &subsystems.join(" ")).await
    }

    /// Cancel an outstanding idle.
    pub async fn noidle(&self) -> Result<()> {
        self.submit("noidle", "").await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("version", &self.version())
            .field("status", &self.status())
            .finish()
    }
}

/// Read the greeting and return the version it announces.
async fn handshake(lines: &mut mpsc::UnboundedReceiver<String>) -> Result<String> {
    let line = lines.recv().await.ok_or(JukeboxError::ConnectionClosed)?;
    let version = classify::greeting(&line)?;
    tracing::info!("connected to MPD {}", version);
    Ok(version)
}

/// The control task.
struct Machine<W> {
    writer: W,
    lines: mpsc::UnboundedReceiver<String>,
    commands: mpsc::UnboundedReceiver<Command>,
    reader: JoinHandle<()>,
    version: Arc<OnceLock<String>>,
    status: watch::Sender<SessionStatus>,
    events: mpsc::UnboundedSender<IdleEvent>,
}

impl<W> Machine<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn run(mut self, start: State) {
        let mut state = start;
        loop {
            self.publish(state);
            state = match state {
                State::Connecting => self.connecting().await,
                State::Ready => self.ready().await,
                State::Fatal | State::Closed => break,
            };
        }

        if state == State::Closed {
            tracing::debug!("all handles dropped, closing");
        }
        self.reader.abort();
        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!("shutdown failed: {}", e);
        }
    }

    fn publish(&self, state: State) {
        self.set_status(SessionStatus::from(state));
    }

    fn set_status(&self, status: SessionStatus) {
        self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    async fn connecting(&mut self) -> State {
        match handshake(&mut self.lines).await {
            Ok(version) => {
                let _ = self.version.set(version);
                State::Ready
            },
            Err(e) => self.fatal(e, None),
        }
    }

    async fn ready(&mut self) -> State {
        tokio::select! {
            cmd = self.commands.recv() => match cmd {
                Some(cmd) => self.handle(cmd).await,
                None => State::Closed,
            },
            line = self.lines.recv() => match line {
                Some(line) => self.fatal(classify::unexpected(&line), None),
                None => self.fatal(JukeboxError::ConnectionClosed, None),
            },
        }
    }

    async fn handle(&mut self, cmd: Command) -> State {
        match cmd.kind {
            CommandKind::Add | CommandKind::Idle => self.set_status(SessionStatus::Busy),
            CommandKind::NoIdle | CommandKind::Other(_) => {},
        }
        match cmd.kind {
            CommandKind::Add => self.add(cmd).await,
            CommandKind::Idle => self.idle(cmd).await,
            CommandKind::NoIdle | CommandKind::Other(_) => {
                tracing::debug!("ignoring {} while not idling", cmd.kind);
                cmd.complete(Ok(()));
                State::Ready
            },
        }
    }

    async fn add(&mut self, cmd: Command) -> State {
        if let Err(e) = self.write(&cmd.wire()).await {
            return self.fatal(e, Some(cmd));
        }

        let Some(line) = self.lines.recv().await else {
            return self.fatal(JukeboxError::ConnectionClosed, Some(cmd));
        };

        match classify::reply(&line) {
            Ok(()) => {
                cmd.complete(Ok(()));
                State::Ready
            },
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{}", e);
                cmd.complete(Err(e));
                State::Ready
            },
            Err(e) => self.fatal(e, Some(cmd)),
        }
    }

    async fn idle(&mut self, idle: Command) -> State {
        if let Err(e) = self.write(&idle.wire()).await {
            return self.fatal(e, Some(idle));
        }

        let mut changed = Vec::new();
        let mut callers_gone = false;
        loop {
            tokio::select! {
                cmd = self.commands.recv(), if !callers_gone => match cmd {
                    None => callers_gone = true,
                    Some(cmd) if cmd.kind == CommandKind::NoIdle => {
                        return self.cancel_idle(idle, cmd, changed).await;
                    },
                    Some(cmd) => {
                        let msg = format!("{} submitted while idling", cmd.kind);
                        cmd.complete(Err(JukeboxError::CallerMisuse(msg.clone())));
                        return self.fatal(JukeboxError::CallerMisuse(msg), Some(idle));
                    },
                },
                line = self.lines.recv() => {
                    let Some(line) = line else {
                        return self.fatal(JukeboxError::ConnectionClosed, Some(idle));
                    };
                    match classify::idle(&line) {
                        Ok(IdleStep::Changed(system)) => changed.push(system),
                        Ok(IdleStep::Done) => {
                            self.emit(changed);
                            idle.complete(Ok(()));
                            return State::Ready;
                        },
                        Err(e) => return self.fatal(e, Some(idle)),
                    }
                },
            }
        }
    }

    async fn cancel_idle(&mut self, idle: Command, noidle: Command, changed: Vec<String>) -> State {
        if let Err(e) = self.write(&noidle.wire()).await {
            noidle.complete(Err(JukeboxError::ConnectionClosed));
            return self.fatal(e, Some(idle));
        }
        if !changed.is_empty() {
            self.emit(changed);
        }
        idle.complete(Ok(()));
        noidle.complete(Ok(()));
        State::Ready
    }

    fn emit(&self, subsystems: Vec<String>) {
        tracing::debug!("idle finished: {:?}", subsystems);
        if self.events.send(IdleEvent { subsystems }).is_err() {
            tracing::debug!("idle event receiver dropped");
        }
    }

    async fn write(&mut self, line: &str) -> Result<()> {
        tracing::debug!("-> {}", line);
        self.writer.write_all(format!("{line}\n").as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    fn fatal(&self, err: JukeboxError, pending: Option<Command>) -> State {
        tracing::error!("unrecoverable: {}", err);
        if let Some(cmd) = pending {
            cmd.complete(Err(err));
        }
        State::Fatal
    }
}
