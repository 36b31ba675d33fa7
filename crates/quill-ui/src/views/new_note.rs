//! New note view

use std::rc::Rc;

use chrono::Utc;
use quill_core::{BroadcastEvent, NoteDraft};
use tracing::warn;

use super::components::{
    action_bar, back_button, header, page, primary_button, secondary_button, NoteEditor,
    DEFAULT_PICKER_COLOR,
};
use super::icons;
use crate::app::AppContext;
use crate::builder::{h, Component, Handler, Props};
use crate::children;
use crate::dom::{Event, Node};
use crate::router::{NavigateOptions, Navigator, RouteContext};

pub fn new_note(app: AppContext, ctx: RouteContext) -> Node {
    let navigator = ctx.navigator;
    let editor = NoteEditor::new(None, DEFAULT_PICKER_COLOR, Utc::now());

    let go_home: Handler = {
        let navigator = navigator.clone();
        Rc::new(move |_: &Event| {
            navigator.navigate("/", NavigateOptions::transition());
        })
    };

    let save: Handler = {
        let navigator = navigator.clone();
        let editor = editor.clone();
        Rc::new(move |_: &Event| {
            let (title, content, color) = editor.values();
            let draft = NoteDraft::new(title, content).with_color(color);
            if draft.is_blank() {
                app.toasts
                    .warning("Please add a title or content to your note");
                return;
            }
            tokio::task::spawn_local(create_note(app.clone(), navigator.clone(), draft));
        })
    };

    page(
        "new-note",
        children![
            header(&navigator, None),
            h(
                "main",
                Props::new().class("max-w-4xl mx-auto px-4 py-4"),
                children![
                    h(
                        Component::new(back_button),
                        Props::new().on_handler("click", go_home.clone()),
                        children![],
                    ),
                    &editor.root,
                    action_bar(
                        None,
                        vec![
                            secondary_button("cancel", "Cancel", go_home),
                            primary_button("save", icons::CHECK, "Create Note", save),
                        ],
                    ),
                ],
            ),
        ],
    )
}

async fn create_note(app: AppContext, navigator: Navigator, draft: NoteDraft) {
    match app.store.create(draft).await {
        Ok(note) => {
            app.toasts.success("Note created successfully!");
            app.channel.publish(BroadcastEvent::created(note.id));
            navigator.navigate(
                &format!("/notes/{}", note.id),
                NavigateOptions::transition(),
            );
        }
        Err(e) => {
            warn!("Failed to create note: {}", e);
            app.toasts.error("Failed to create note. Please try again.");
        }
    }
}
