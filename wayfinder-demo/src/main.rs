//! Chat-client skeleton built on the wayfinder navigation core.

mod app;
mod auth;
mod screens;

use tracing_subscriber::EnvFilter;
use wayfinder::l10n::{self, Catalog};
use wayfinder::Application;

use crate::app::AppCoordinator;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    l10n::install(Catalog::from_json(include_str!("../strings/app.json"))?)?;

    let app = Application::new();
    app.run(|router| Ok(Box::new(AppCoordinator::new(router))))?;
    Ok(())
}
