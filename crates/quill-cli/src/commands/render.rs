//! Headless route rendering

use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::debug;

use quill_core::{BroadcastHub, Config, NoteStore};
use quill_ui::dom::InstantTransitions;
use quill_ui::{App, Window, DEFAULT_ORIGIN};

use crate::output::Output;

/// Mount the app at `path` and print the outlet's markup once it settles
///
/// Must run inside a `LocalSet`.
pub async fn render(path: &str, config: &Config, store: NoteStore, output: &Output) -> Result<()> {
    let html = render_to_string(path, config, store).await?;
    output.print_html(path, &html);
    Ok(())
}

async fn render_to_string(path: &str, config: &Config, store: NoteStore) -> Result<String> {
    let window = Window::with_url(DEFAULT_ORIGIN, path)
        .with_context(|| format!("Invalid path: {}", path))?;
    if config.view_transitions {
        window.set_view_transitions(Some(Rc::new(InstantTransitions)));
    }
    // Nothing to click headlessly; refuse anything that would ask
    window.set_confirm(|_| false);

    let hub = BroadcastHub::new();
    let app = App::mount(&window, config, Rc::new(store), &hub)
        .await
        .context("Failed to mount app")?;
    app.settled().await;

    debug!("Rendered {} as {}", path, app.router().current_pattern().unwrap_or_default());
    Ok(app.outlet_html())
}
