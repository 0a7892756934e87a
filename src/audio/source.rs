//! Audio source adapter: lazy PCM chunk stream over an ffmpeg subprocess.
//!
//! Decodes a media file to raw 16-bit mono PCM and yields it in fixed-size
//! chunks. The decoder is an external process; the adapter guarantees it is
//! killed and reaped on every exit path — normal exhaustion, early
//! abandonment, or error.

use crate::config::AudioConfig;
use crate::error::{Result, SubwireError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};

/// Trait for cancellable lazy audio chunk sources.
///
/// This trait allows swapping implementations (real ffmpeg decoder vs mock).
#[async_trait]
pub trait AudioChunkSource: Send {
    /// Read the next audio chunk.
    ///
    /// # Returns
    /// `Ok(Some(chunk))` with up to the configured chunk size of PCM bytes
    /// (only the final chunk may be shorter), `Ok(None)` at end-of-input.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;

    /// Stop the source early, releasing the underlying decoder resource.
    ///
    /// Idempotent; called on every bridge wind-down path.
    async fn stop(&mut self) -> Result<()>;
}

/// Trait for opening an audio chunk source from a resolved media path.
#[async_trait]
pub trait SourceOpener: Send + Sync {
    async fn open(&self, path: &Path) -> Result<Box<dyn AudioChunkSource>>;
}

/// PCM chunk stream backed by an ffmpeg child process.
pub struct FfmpegSource {
    child: Child,
    stdout: Option<ChildStdout>,
    chunk_size: usize,
    yielded_any: bool,
    stopped: bool,
}

impl FfmpegSource {
    /// Spawn ffmpeg decoding `path` to raw 16-bit mono PCM on stdout.
    ///
    /// A missing binary fails here with `SourceUnavailable`. A bad input
    /// path makes ffmpeg exit without output, which surfaces as
    /// `SourceUnavailable` on the first read instead.
    pub fn open(path: &Path, config: &AudioConfig) -> Result<Self> {
        let mut child = Command::new(&config.ffmpeg_path)
            .arg("-i")
            .arg(path)
            .args(["-f", "s16le", "-acodec", "pcm_s16le"])
            .args(["-ar", &config.sample_rate.to_string()])
            .args(["-ac", "1"])
            .args(["-loglevel", "quiet"])
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            // Backstop: abandoned streams must not leak the subprocess
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SubwireError::SourceUnavailable {
                message: format!("failed to spawn {}: {}", config.ffmpeg_path, e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SubwireError::SourceUnavailable {
                message: "decoder stdout not captured".to_string(),
            }
        })?;

        Ok(Self {
            child,
            stdout: Some(stdout),
            chunk_size: config.chunk_size,
            yielded_any: false,
            stopped: false,
        })
    }

    /// Reap the child after stdout reached end-of-input.
    ///
    /// If the decoder exited unsuccessfully before producing anything
    /// (bad path, unreadable container), report `SourceUnavailable`.
    async fn finish(&mut self) -> Result<Option<Vec<u8>>> {
        self.stdout = None;
        let status = self.child.wait().await?;
        self.stopped = true;

        if !self.yielded_any && !status.success() {
            return Err(SubwireError::SourceUnavailable {
                message: format!("decoder exited with {} before producing audio", status),
            });
        }
        Ok(None)
    }
}

#[async_trait]
impl AudioChunkSource for FfmpegSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.stopped {
            return Ok(None);
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;

        // Fill to chunk_size; only the last chunk may come up short.
        while filled < self.chunk_size {
            let n = stdout.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return self.finish().await;
        }

        buf.truncate(filled);
        self.yielded_any = true;
        Ok(Some(buf))
    }

    async fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        self.stdout = None;
        // start_kill fails if the child already exited; wait reaps either way
        self.child.start_kill().ok();
        self.child.wait().await?;
        Ok(())
    }
}

/// Opener that spawns an [`FfmpegSource`] per session.
pub struct FfmpegOpener {
    config: AudioConfig,
}

impl FfmpegOpener {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SourceOpener for FfmpegOpener {
    async fn open(&self, path: &Path) -> Result<Box<dyn AudioChunkSource>> {
        Ok(Box::new(FfmpegSource::open(path, &self.config)?))
    }
}

/// Mock audio chunk source for testing.
pub struct MockChunkSource {
    chunks: VecDeque<Vec<u8>>,
    fail_read: bool,
    released: Arc<AtomicBool>,
}

impl MockChunkSource {
    /// Create a mock source with no chunks.
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
            fail_read: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Configure the mock to yield the given chunks in order.
    pub fn with_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks.into();
        self
    }

    /// Configure the mock to fail on the next read.
    pub fn with_read_failure(mut self) -> Self {
        self.fail_read = true;
        self
    }

    /// Probe that flips to true once `stop` has been called.
    pub fn released_probe(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl Default for MockChunkSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioChunkSource for MockChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.fail_read {
            return Err(SubwireError::SourceUnavailable {
                message: "mock read failure".to_string(),
            });
        }
        if self.released.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.chunks.pop_front())
    }

    async fn stop(&mut self) -> Result<()> {
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock opener handing out a pre-built source (single use).
pub struct MockSourceOpener {
    source: tokio::sync::Mutex<Option<Box<dyn AudioChunkSource>>>,
}

impl MockSourceOpener {
    pub fn new(source: Box<dyn AudioChunkSource>) -> Self {
        Self {
            source: tokio::sync::Mutex::new(Some(source)),
        }
    }

    /// Opener whose `open` fails with `SourceUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            source: tokio::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl SourceOpener for MockSourceOpener {
    async fn open(&self, _path: &Path) -> Result<Box<dyn AudioChunkSource>> {
        self.source
            .lock()
            .await
            .take()
            .ok_or_else(|| SubwireError::SourceUnavailable {
                message: "mock source unavailable".to_string(),
            })
    }
}
