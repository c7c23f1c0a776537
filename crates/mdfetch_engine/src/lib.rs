//! md-fetch engine: backend resolution, retrieval, sanitization,
//! classification and the concurrent batch orchestrator.
mod backend;
mod batch;
mod classify;
mod config;
mod convert;
mod decode;
mod fetch;
mod filename;
mod frontmatter;
mod locate;
mod patterns;
mod persist;
mod pipeline;
mod registry;
mod render;
mod resolve;
mod sanitize;
mod target;
mod types;

pub use backend::{Backend, CommandSettings, Invocation, Retriever, Transport};
pub use batch::{fetch_batch, fetch_batch_with};
pub use classify::{classify, SNIFF_LEN};
pub use config::{ConfigError, EngineConfig};
pub use convert::{Converter, Html2MdConverter};
pub use decode::{decode_lossy, decode_text, DecodeError, DecodedText};
pub use fetch::{FetchSettings, HttpFetcher};
pub use filename::deterministic_filename;
pub use frontmatter::build_markdown_document;
pub use locate::{ExecutableLocator, PathLocator};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{validate, Pipeline, Rendered};
pub use registry::{lookup, BackendDescriptor, BackendKind, DEFAULT_PRIORITY, DESCRIPTORS};
pub use render::{pretty_json, render};
pub use resolve::{BackendStatus, Resolver};
pub use sanitize::{clean, clean_str, strip_javascript, CleaningOptions, MAX_DEPTH};
pub use target::FetchTarget;
pub use types::{BatchResponse, ContentKind, FetchError, FetchOutcome, RawContent};
