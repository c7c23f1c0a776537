use std::path::PathBuf;
use std::sync::Arc;

use mdfetch_logging::{mdfetch_debug, mdfetch_info};

use crate::backend::{Backend, CommandSettings, Invocation, Transport};
use crate::fetch::{FetchSettings, HttpFetcher};
use crate::locate::{ExecutableLocator, PathLocator};
use crate::registry::{self, BackendDescriptor, BackendKind, DESCRIPTORS};
use crate::FetchError;

/// Whether a registry entry can currently be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub descriptor: &'static BackendDescriptor,
    pub executable: Option<PathBuf>,
    pub available: bool,
}

/// Turns an optional backend name into a usable [`Backend`].
///
/// Resolution only probes the search path; it never starts a process.
#[derive(Clone)]
pub struct Resolver {
    locator: Arc<dyn ExecutableLocator>,
    priority: Vec<String>,
    command: CommandSettings,
    http: FetchSettings,
}

impl Resolver {
    pub fn new(locator: Arc<dyn ExecutableLocator>, priority: Vec<String>) -> Self {
        Self {
            locator,
            priority,
            command: CommandSettings::default(),
            http: FetchSettings::default(),
        }
    }

    pub fn with_command_settings(mut self, command: CommandSettings) -> Self {
        self.command = command;
        self
    }

    pub fn with_fetch_settings(mut self, http: FetchSettings) -> Self {
        self.http = http;
        self
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn resolve(&self, explicit: Option<&str>) -> Result<Backend, FetchError> {
        match explicit.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self.resolve_named(name),
            None => self.resolve_default(),
        }
    }

    pub fn resolve_named(&self, name: &str) -> Result<Backend, FetchError> {
        let descriptor = registry::lookup(name)
            .ok_or_else(|| FetchError::UnsupportedBackend(name.to_string()))?;
        let backend = self.instantiate(descriptor)?;
        mdfetch_debug!("resolved backend {} to {}", name, backend.display_name());
        Ok(backend)
    }

    fn resolve_default(&self) -> Result<Backend, FetchError> {
        let mut last_err = None;
        for name in &self.priority {
            match self.resolve_named(name) {
                Ok(backend) => {
                    mdfetch_info!("using default backend {}", backend.display_name());
                    return Ok(backend);
                }
                Err(err) => {
                    mdfetch_debug!("default backend {} unusable: {}", name, err);
                    last_err = Some(Box::new(err));
                }
            }
        }
        Err(FetchError::NoBackendAvailable { last: last_err })
    }

    fn instantiate(&self, descriptor: &'static BackendDescriptor) -> Result<Backend, FetchError> {
        if descriptor.is_builtin() {
            return Ok(Backend::DirectProtocol(Transport::Native(HttpFetcher::new(
                self.http.clone(),
            ))));
        }

        let program = self.probe(descriptor).ok_or_else(|| FetchError::BackendUnavailable {
            backend: descriptor.name.to_string(),
            candidates: descriptor.executables.iter().map(|e| e.to_string()).collect(),
        })?;
        let invocation = Invocation::from_descriptor(descriptor, program, &self.command);

        Ok(match descriptor.kind {
            BackendKind::HeadlessBrowser => Backend::HeadlessBrowser(invocation),
            BackendKind::TextBrowser => Backend::TextBrowser(invocation),
            BackendKind::DirectProtocol => Backend::DirectProtocol(Transport::External(invocation)),
        })
    }

    fn probe(&self, descriptor: &BackendDescriptor) -> Option<PathBuf> {
        descriptor
            .executables
            .iter()
            .find_map(|name| self.locator.find(name))
    }

    /// Availability of every registry entry, priority-list entries first.
    pub fn availability(&self) -> Vec<BackendStatus> {
        let mut ordered: Vec<&'static BackendDescriptor> = self
            .priority
            .iter()
            .filter_map(|name| registry::lookup(name))
            .collect();
        for descriptor in DESCRIPTORS {
            if !ordered.iter().any(|seen| seen.name == descriptor.name) {
                ordered.push(descriptor);
            }
        }

        ordered
            .into_iter()
            .map(|descriptor| {
                let executable = self.probe(descriptor);
                BackendStatus {
                    descriptor,
                    available: descriptor.is_builtin() || executable.is_some(),
                    executable,
                }
            })
            .collect()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(
            Arc::new(PathLocator),
            registry::DEFAULT_PRIORITY.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("priority", &self.priority)
            .field("command", &self.command)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}
