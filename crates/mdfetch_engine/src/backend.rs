use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use mdfetch_logging::{mdfetch_debug, mdfetch_info};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::fetch::HttpFetcher;
use crate::registry::{BackendDescriptor, BackendKind, DUMP_DOM_FLAG};
use crate::{FetchError, FetchTarget, RawContent};

/// Limits applied to every external-program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    pub timeout: Duration,
    /// Virtual time granted to page scripts by browsers that support it.
    pub script_budget_ms: u64,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            script_budget_ms: 5_000,
        }
    }
}

/// A fully resolved external program plus its fixed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub display_name: &'static str,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Invocation {
    pub(crate) fn from_descriptor(
        descriptor: &BackendDescriptor,
        program: PathBuf,
        settings: &CommandSettings,
    ) -> Self {
        let mut args: Vec<String> = descriptor.args.iter().map(|arg| arg.to_string()).collect();
        if let Some(flag) = descriptor.script_budget_flag {
            args.push(format!("{flag}{}", settings.script_budget_ms));
        }
        if descriptor.kind == BackendKind::HeadlessBrowser {
            args.push(DUMP_DOM_FLAG.to_string());
        }
        Self {
            display_name: descriptor.display_name,
            program,
            args,
            timeout: settings.timeout,
        }
    }

    async fn run(&self, target: &str) -> Result<RawContent, FetchError> {
        let started = Instant::now();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return Err(FetchError::fetch_failed(format!(
                    "{} execution error: {err}",
                    self.name()
                )))
            }
            Err(_) => {
                return Err(FetchError::fetch_failed(format!(
                    "{} timed out after {:?}",
                    self.name(),
                    self.timeout
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let mut message = format!("{} execution error: {}", self.name(), output.status);
            if !stderr.is_empty() {
                message.push_str(": ");
                message.push_str(stderr);
            }
            return Err(FetchError::fetch_failed(message));
        }

        mdfetch_debug!(
            "{} finished url={} bytes={} elapsed={:?}",
            self.display_name,
            target,
            output.stdout.len(),
            started.elapsed()
        );
        Ok(RawContent::new(target, output.stdout))
    }

    fn name(&self) -> String {
        self.display_name.to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    External(Invocation),
    Native(HttpFetcher),
}

/// A usable retrieval strategy. Immutable once resolved, so one handle can
/// serve every task of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    HeadlessBrowser(Invocation),
    TextBrowser(Invocation),
    DirectProtocol(Transport),
}

impl Backend {
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::HeadlessBrowser(invocation) | Backend::TextBrowser(invocation) => {
                invocation.display_name
            }
            Backend::DirectProtocol(Transport::External(invocation)) => invocation.display_name,
            Backend::DirectProtocol(Transport::Native(_)) => "HTTP",
        }
    }

    pub fn executable(&self) -> Option<&Path> {
        match self {
            Backend::HeadlessBrowser(invocation)
            | Backend::TextBrowser(invocation)
            | Backend::DirectProtocol(Transport::External(invocation)) => {
                Some(invocation.program.as_path())
            }
            Backend::DirectProtocol(Transport::Native(_)) => None,
        }
    }

    pub fn renders_js(&self) -> bool {
        matches!(self, Backend::HeadlessBrowser(_))
    }

    pub async fn fetch(&self, target: &FetchTarget) -> Result<RawContent, FetchError> {
        mdfetch_info!("fetching {} with {}", target.as_str(), self.display_name());
        match self {
            Backend::HeadlessBrowser(invocation)
            | Backend::TextBrowser(invocation)
            | Backend::DirectProtocol(Transport::External(invocation)) => {
                invocation.run(target.as_str()).await
            }
            Backend::DirectProtocol(Transport::Native(fetcher)) => {
                fetcher.fetch(target.as_str()).await
            }
        }
    }
}

/// Seam through which the pipeline obtains raw content for a target.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    fn name(&self) -> &str;

    async fn retrieve(&self, target: &FetchTarget) -> Result<RawContent, FetchError>;
}

#[async_trait::async_trait]
impl Retriever for Backend {
    fn name(&self) -> &str {
        self.display_name()
    }

    async fn retrieve(&self, target: &FetchTarget) -> Result<RawContent, FetchError> {
        self.fetch(target).await
    }
}
