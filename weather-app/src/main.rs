//! Desktop weather lookup window.
//!
//! Launched with no arguments; reads `api_key.txt` and `history.txt` from
//! the working directory. All network work runs on a tokio runtime so the
//! window stays responsive.

use anyhow::Context;

mod app;
mod fetch;
mod panels;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([680.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Weather",
        options,
        Box::new(move |cc| Ok(Box::new(app::WeatherApp::new(cc, handle)))),
    )
    .map_err(|err| anyhow::anyhow!("window error: {err}"))?;

    Ok(())
}
