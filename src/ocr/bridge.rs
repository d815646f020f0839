//! Persistent Python worker per engine.
//!
//! `load` spawns `<python> <script> --engine <key> --device <device> [args]`
//! and waits for a `{"ready": true}` line on stdout. Each image is one JSON
//! request line (`{"image": "<path>"}`) answered by one JSON line carrying
//! `text`, `segments` or `error`. Killing the worker releases the model and
//! any device memory it holds.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::str::FromStr;

use crate::ocr::engines::EngineKind;
use crate::ocr::OcrStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Auto => "auto",
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Device::Auto),
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda),
            other => anyhow::bail!("unknown device '{other}' (expected auto, cpu or cuda)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    python: PathBuf,
    script: PathBuf,
    device: Device,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            python: PathBuf::from("python3"),
            script: PathBuf::from("ocr/bridge/ocr_bridge.py"),
            device: Device::Auto,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_python(mut self, python: PathBuf) -> Self {
        self.python = python;
        self
    }

    pub fn with_script(mut self, script: PathBuf) -> Self {
        self.script = script;
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn device(&self) -> Device {
        self.device
    }

    fn command(&self, kind: EngineKind) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.arg(&self.script)
            .arg("--engine")
            .arg(kind.key())
            .arg("--device")
            .arg(self.device.as_str())
            .args(kind.bridge_args());
        cmd
    }
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    image: &'a Path,
}

#[derive(Debug, Default, Deserialize)]
struct BridgeReply {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    segments: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

struct Worker {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl Worker {
    /// Reads until a JSON object arrives. Anything else on stdout is model
    /// chatter (progress prints, warnings) and is skipped.
    fn read_reply(&mut self) -> Result<BridgeReply> {
        loop {
            let mut line = String::new();
            let read = self
                .stdout
                .read_line(&mut line)
                .with_context(|| "failed to read from OCR bridge")?;
            if read == 0 {
                match self.child.wait() {
                    Ok(status) => anyhow::bail!("OCR bridge exited unexpectedly ({status})"),
                    Err(err) => anyhow::bail!("OCR bridge exited unexpectedly: {err}"),
                }
            }

            let line = line.trim_end();
            match serde_json::from_str::<serde_json::Value>(line) {
                Ok(value @ serde_json::Value::Object(_)) => {
                    return serde_json::from_value(value)
                        .with_context(|| format!("failed to parse OCR bridge reply: {line}"));
                }
                _ => debug!("OCR bridge: {line}"),
            }
        }
    }

    fn request(&mut self, image: &Path) -> Result<BridgeReply> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("OCR bridge stdin already closed"))?;
        let payload = serde_json::to_string(&BridgeRequest { image })?;
        writeln!(stdin, "{payload}").with_context(|| "failed to write to OCR bridge")?;
        stdin.flush()?;
        self.read_reply()
    }

    fn shutdown(mut self) {
        // closing stdin lets a well-behaved worker exit on its own
        drop(self.stdin.take());
        if let Err(err) = self.child.kill() {
            debug!("OCR bridge kill: {err}");
        }
        if let Err(err) = self.child.wait() {
            warn!("failed to reap OCR bridge process: {err}");
        }
    }
}

/// Strategy backed by a Python worker hosting one engine's model.
pub struct BridgeStrategy {
    kind: EngineKind,
    config: BridgeConfig,
    worker: Option<Worker>,
}

impl BridgeStrategy {
    pub fn new(kind: EngineKind, config: BridgeConfig) -> Self {
        Self {
            kind,
            config,
            worker: None,
        }
    }

    fn spawn(&self) -> Result<Worker> {
        let mut child = self
            .config
            .command(self.kind)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| {
                format!(
                    "failed to invoke python OCR bridge {} for {}",
                    self.config.script.display(),
                    self.kind
                )
            })?;

        let stdin = child.stdin.take();
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                anyhow::bail!("OCR bridge stdout not captured");
            }
        };

        Ok(Worker {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl OcrStrategy for BridgeStrategy {
    fn key(&self) -> &str {
        self.kind.key()
    }

    fn load(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        info!("{}: starting OCR bridge on device {}", self.kind, self.config.device);
        let mut worker = self.spawn()?;
        match worker.read_reply() {
            Ok(reply) if reply.ready => {
                self.worker = Some(worker);
                info!("{}: model loaded", self.kind);
                Ok(())
            }
            Ok(reply) => {
                worker.shutdown();
                let reason = reply.error.unwrap_or_else(|| "no ready handshake".to_string());
                anyhow::bail!("OCR bridge for {} failed to start: {reason}", self.kind)
            }
            Err(err) => {
                worker.shutdown();
                Err(err.context(format!("OCR bridge for {} failed to start", self.kind)))
            }
        }
    }

    fn is_loaded(&self) -> bool {
        self.worker.is_some()
    }

    fn recognize(&mut self, image: &Path) -> Result<String> {
        let worker = self
            .worker
            .as_mut()
            .ok_or_else(|| anyhow!("{} model is not loaded", self.kind))?;

        let reply = match worker.request(image) {
            Ok(reply) => reply,
            Err(err) => {
                // the worker is in an unknown state; the next image reloads it
                self.unload();
                return Err(err);
            }
        };

        if let Some(error) = reply.error {
            anyhow::bail!("{error}");
        }
        self.kind
            .decode(reply.text, reply.segments)
            .ok_or_else(|| anyhow!("OCR bridge reply for {} carried no text", image.display()))
    }

    fn unload(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
            debug!("{}: OCR bridge stopped", self.kind);
        }
    }
}

impl Drop for BridgeStrategy {
    fn drop(&mut self) {
        self.unload();
    }
}
