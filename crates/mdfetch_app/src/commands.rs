use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Utc;
use mdfetch_engine::{AtomicFileWriter, EngineConfig, Pipeline};
use mdfetch_logging::mdfetch_info;
use mdfetch_server::AppState;

/// Single-target fetch. Content goes to stdout; any failure is returned and
/// ends the process.
pub fn fetch(
    config: &EngineConfig,
    url: &str,
    browser: Option<&str>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let pipeline = Pipeline::from_config(config);
    let rendered = runtime.block_on(pipeline.fetch_content(url, browser))?;

    if let Some(dir) = output_dir {
        let fetched_utc = Utc::now().to_rfc3339();
        let path = AtomicFileWriter::new(dir).save_rendered(&rendered, &fetched_utc)?;
        mdfetch_info!("saved {} as {:?}", rendered.url, path);
    }

    println!("{}", rendered.content);
    Ok(())
}

pub fn serve(config: &EngineConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let state = AppState::new(Pipeline::from_config(config));
    runtime.block_on(mdfetch_server::serve(addr, state))
}

/// Prints one line per backend: `*` marks the default priority list.
pub fn backends(config: &EngineConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config);
    let resolver = pipeline.resolver();

    for status in resolver.availability() {
        let descriptor = status.descriptor;
        let marker = if resolver
            .priority()
            .iter()
            .any(|name| descriptor.matches(name))
        {
            '*'
        } else {
            ' '
        };
        let location = match (&status.executable, status.available) {
            (Some(path), _) => path.display().to_string(),
            (None, true) => "built in".to_string(),
            (None, false) => "not found".to_string(),
        };
        println!(
            "{marker} {:<8} {:<16} {location}",
            descriptor.name, descriptor.display_name
        );
    }
    Ok(())
}
