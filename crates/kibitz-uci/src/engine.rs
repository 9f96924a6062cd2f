//! Engine process lifecycle: spawn, handshake, search requests, shutdown.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command as Process, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::command::{Command, GoParams, PositionSpec};
use crate::error::UciError;
use crate::message::{BestMove, EngineMessage, parse_message};
use crate::provider::EngineProvider;

/// How long the engine gets to exit after `quit` before it is killed.
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Default engine location for the current platform.
pub fn default_engine_path() -> PathBuf {
    if cfg!(target_os = "windows") {
        PathBuf::from("stockfish.exe")
    } else if cfg!(target_os = "macos") {
        PathBuf::from("/opt/homebrew/bin/stockfish")
    } else {
        PathBuf::from("/usr/local/bin/stockfish")
    }
}

/// How to start and talk to the engine process.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine executable.
    pub path: PathBuf,
    /// Command-line arguments for the executable.
    pub args: Vec<String>,
    /// `setoption` pairs applied after the handshake.
    pub options: Vec<(String, String)>,
    /// Time allowed for `uciok` and `readyok`.
    pub handshake_timeout: Duration,
    /// Time allowed for `bestmove` beyond the search's own time limit.
    pub reply_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_engine_path(),
            args: Vec::new(),
            options: Vec::new(),
            handshake_timeout: Duration::from_secs(5),
            reply_timeout: Duration::from_secs(10),
        }
    }
}

/// Lines forwarded by the stdout reader thread.
enum ReaderEvent {
    Line(String),
    Closed,
}

/// A pending wait for a specific reply.
struct Wait {
    expected: &'static str,
    /// Deadline and the budget it was computed from; `None` waits forever.
    limit: Option<(Instant, Duration)>,
}

impl Wait {
    fn new(expected: &'static str, budget: Duration) -> Wait {
        Wait {
            expected,
            limit: Some((Instant::now() + budget, budget)),
        }
    }

    /// Wait until the reply arrives or the engine exits.
    fn unbounded(expected: &'static str) -> Wait {
        Wait {
            expected,
            limit: None,
        }
    }
}

/// A running UCI engine process.
///
/// A reader thread forwards the engine's stdout line by line over a channel
/// so waits can time out. The process is shut down when the engine is
/// dropped: `quit` first, then a kill if it does not exit in time.
pub struct UciEngine {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    events: Receiver<ReaderEvent>,
    name: String,
    options: Vec<String>,
    handshake_timeout: Duration,
    reply_timeout: Duration,
    /// The engine's output is closed; no more replies will arrive.
    exited: bool,
    /// `shutdown` already ran.
    closed: bool,
}

impl UciEngine {
    /// Start the engine, complete the UCI handshake and apply configured options.
    pub fn spawn(config: &EngineConfig) -> Result<Self, UciError> {
        info!(path = %config.path.display(), "starting engine");
        let mut child = Process::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => UciError::EngineNotFound {
                    path: config.path.clone(),
                },
                _ => UciError::Spawn {
                    path: config.path.clone(),
                    source,
                },
            })?;

        let (tx, rx) = mpsc::channel::<ReaderEvent>();
        let pipes = child.stdin.take().zip(child.stdout.take());
        let spawned = pipes
            .ok_or_else(|| io::Error::other("engine pipes unavailable"))
            .and_then(|(stdin, stdout)| {
                thread::Builder::new()
                    .name("uci-reader".to_string())
                    .spawn(move || read_lines(stdout, tx))
                    .map(|_| stdin)
            });
        let stdin = match spawned {
            Ok(stdin) => stdin,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
        };

        let mut engine = UciEngine {
            child,
            stdin: BufWriter::new(stdin),
            events: rx,
            name: config.path.display().to_string(),
            options: Vec::new(),
            handshake_timeout: config.handshake_timeout,
            reply_timeout: config.reply_timeout,
            exited: false,
            closed: false,
        };
        engine.handshake(&config.options)?;
        Ok(engine)
    }

    /// Options the engine advertised during the handshake.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Return `true` if the engine advertised an option with this name.
    pub fn supports_option(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.eq_ignore_ascii_case(name))
    }

    /// Send `isready` and wait for `readyok`.
    pub fn sync(&mut self) -> Result<(), UciError> {
        self.send(&Command::IsReady)?;
        let wait = Wait::new("readyok", self.handshake_timeout);
        loop {
            if let EngineMessage::ReadyOk = self.next_message(&wait)? {
                return Ok(());
            }
        }
    }

    /// Shut the engine down, reporting any error the drop path would swallow.
    pub fn quit(mut self) -> Result<(), UciError> {
        self.shutdown()
    }

    fn handshake(&mut self, options: &[(String, String)]) -> Result<(), UciError> {
        self.send(&Command::Uci)?;
        let wait = Wait::new("uciok", self.handshake_timeout);
        loop {
            match self.next_message(&wait)? {
                EngineMessage::IdName(name) => self.name = name,
                EngineMessage::Option { name } => self.options.push(name),
                EngineMessage::UciOk => break,
                _ => {}
            }
        }

        for (name, value) in options {
            if !self.supports_option(name) {
                warn!(option = %name, "engine does not advertise option, sending anyway");
            }
            self.send(&Command::SetOption {
                name: name.clone(),
                value: value.clone(),
            })?;
        }

        self.sync()?;
        info!(engine = %self.name, options = self.options.len(), "engine ready");
        Ok(())
    }

    fn send(&mut self, command: &Command) -> Result<(), UciError> {
        debug!(cmd = %command, "gui -> engine");
        let result = writeln!(self.stdin, "{command}").and_then(|()| self.stdin.flush());
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                self.exited = true;
                Err(self.exited_error())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Wait for the next parsable message; unparsable lines are logged and skipped.
    fn next_message(&mut self, wait: &Wait) -> Result<EngineMessage, UciError> {
        loop {
            let line = self.next_line(wait)?;
            match parse_message(&line) {
                Ok(msg) => return Ok(msg),
                Err(err) => warn!(error = %err, "ignoring engine output"),
            }
        }
    }

    fn next_line(&mut self, wait: &Wait) -> Result<String, UciError> {
        if self.exited {
            return Err(self.exited_error());
        }
        let event = match wait.limit {
            Some((deadline, budget)) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match self.events.recv_timeout(remaining) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Disconnected) => None,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(UciError::Timeout {
                            expected: wait.expected,
                            timeout: budget,
                        });
                    }
                }
            }
            None => self.events.recv().ok(),
        };
        match event {
            Some(ReaderEvent::Line(line)) => Ok(line),
            Some(ReaderEvent::Closed) | None => {
                self.exited = true;
                Err(self.exited_error())
            }
        }
    }

    fn exited_error(&mut self) -> UciError {
        // The output closes slightly before the OS reports the exit.
        let deadline = Instant::now() + Duration::from_millis(100);
        let status = loop {
            match self.child.try_wait() {
                Ok(Some(status)) => break status.to_string(),
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(5)),
                Ok(None) => break "output closed".to_string(),
                Err(err) => break err.to_string(),
            }
        };
        UciError::EngineExited { status }
    }

    fn shutdown(&mut self) -> Result<(), UciError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.exited {
            let _ = self.send(&Command::Quit);
        }

        let deadline = Instant::now() + QUIT_GRACE;
        loop {
            match self.child.try_wait()? {
                Some(status) => {
                    debug!(%status, "engine exited");
                    return Ok(());
                }
                None if Instant::now() >= deadline => {
                    warn!(engine = %self.name, "engine ignored quit, killing it");
                    self.child.kill()?;
                    self.child.wait()?;
                    return Ok(());
                }
                None => thread::sleep(Duration::from_millis(10)),
            }
        }
    }
}

impl EngineProvider for UciEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_game(&mut self) -> Result<(), UciError> {
        self.send(&Command::UciNewGame)?;
        self.sync()
    }

    fn best_move(
        &mut self,
        position: &PositionSpec,
        limits: &GoParams,
    ) -> Result<BestMove, UciError> {
        self.send(&Command::Position(position.clone()))?;
        self.send(&Command::Go(limits.clone()))?;

        // Searches without a time limit run as long as they need.
        let mut wait = match limits.expected_duration() {
            Some(expected) => Wait::new("bestmove", expected + self.reply_timeout),
            None => Wait::unbounded("bestmove"),
        };
        let mut stopped = false;
        let mut last_info = None;
        loop {
            let message = match self.next_message(&wait) {
                Err(UciError::Timeout { timeout, .. }) if !stopped => {
                    warn!(
                        engine = %self.name,
                        ?timeout,
                        "search overran its time limit, sending stop"
                    );
                    self.send(&Command::Stop)?;
                    stopped = true;
                    wait = Wait::new("bestmove", self.handshake_timeout);
                    continue;
                }
                result => result?,
            };
            match message {
                EngineMessage::Info(info) if info.depth.is_some() || info.score.is_some() => {
                    last_info = Some(info);
                }
                EngineMessage::BestMove { best, ponder } => {
                    debug!(best = ?best, ponder = ?ponder, "engine answered");
                    return Ok(BestMove {
                        best,
                        ponder,
                        info: last_info,
                    });
                }
                _ => {}
            }
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "engine shutdown failed");
        }
    }
}

/// Forward engine stdout to the channel until EOF or the receiver goes away.
///
/// Invalid UTF-8 is replaced rather than treated as the end of output.
fn read_lines(stdout: ChildStdout, tx: Sender<ReaderEvent>) {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                debug!(line = %trimmed, "engine -> gui");
                if tx.send(ReaderEvent::Line(trimmed.to_string())).is_err() {
                    return;
                }
            }
        }
    }
    let _ = tx.send(ReaderEvent::Closed);
}
