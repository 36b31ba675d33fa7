//! Note detail view and the not-found page

use std::rc::Rc;

use chrono::Utc;
use quill_core::{BroadcastEvent, NoteId, NoteUpdate};
use tracing::{debug, warn};

use super::components::{
    action_bar, back_button, header, page, primary_button, secondary_button, NoteEditor,
};
use super::icons::{self, icon};
use crate::app::AppContext;
use crate::builder::{h, Component, Handler, Props};
use crate::children;
use crate::dom::{Event, Node};
use crate::router::{NavigateOptions, Navigator, RouteContext};

const DELETE_BUTTON: &str = "flex items-center gap-2 px-4 py-2 text-red-600 dark:text-red-400 hover:bg-red-50 dark:hover:bg-red-900/20 rounded-lg transition-all";

/// Confirmation asked before a note is deleted
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this note?";

pub async fn note_detail(app: AppContext, ctx: RouteContext) -> Node {
    let navigator = ctx.navigator.clone();
    let Some(id) = ctx.param("noteId").and_then(|raw| raw.parse::<NoteId>().ok()) else {
        debug!("Invalid note id in {}", ctx.path());
        return not_found(&navigator);
    };

    let note = match app.store.get(id).await {
        Ok(Some(note)) => note,
        Ok(None) => return not_found(&navigator),
        Err(e) => {
            warn!("Failed to load note {}: {}", id, e);
            app.toasts.error("Failed to load note. Please try again.");
            return not_found(&navigator);
        }
    };

    let editor = NoteEditor::new(Some(&note), &note.color, Utc::now());

    let go_home: Handler = {
        let navigator = navigator.clone();
        Rc::new(move |_: &Event| {
            navigator.navigate("/", NavigateOptions::transition());
        })
    };

    let save: Handler = {
        let app = app.clone();
        let navigator = navigator.clone();
        let editor = editor.clone();
        Rc::new(move |_: &Event| {
            let (title, content, color) = editor.values();
            let update = NoteUpdate {
                title: Some(title),
                content: Some(content),
                color: Some(color),
            };
            tokio::task::spawn_local(save_note(app.clone(), navigator.clone(), id, update));
        })
    };

    let delete = {
        let navigator = navigator.clone();
        move |_: &Event| {
            if !navigator.confirm(DELETE_CONFIRMATION) {
                return;
            }
            tokio::task::spawn_local(delete_note(app.clone(), navigator.clone(), id));
        }
    };

    page(
        "note-detail",
        children![
            header(&navigator, None),
            h(
                "main",
                Props::new()
                    .class("max-w-4xl mx-auto px-4 py-4")
                    .attr("data-note-id", id.to_string()),
                children![
                    h(
                        Component::new(back_button),
                        Props::new().on_handler("click", go_home.clone()),
                        children![],
                    ),
                    &editor.root,
                    action_bar(
                        Some(h(
                            "button",
                            Props::new()
                                .attr("data-action", "delete")
                                .class(DELETE_BUTTON)
                                .on("click", delete),
                            children![icon("w-5 h-5", icons::TRASH), "Delete Note"],
                        )),
                        vec![
                            secondary_button("cancel", "Cancel", go_home),
                            primary_button("save", icons::CHECK, "Save Changes", save),
                        ],
                    ),
                ],
            ),
        ],
    )
}

async fn save_note(app: AppContext, navigator: Navigator, id: NoteId, update: NoteUpdate) {
    match app.store.update(id, update).await {
        Ok(Some(note)) => {
            app.toasts.success("Note saved successfully!");
            app.channel.publish(BroadcastEvent::updated(note.id));
            navigator.navigate("/", NavigateOptions::transition());
        }
        Ok(None) => {
            warn!("Note {} disappeared before it was saved", id);
            app.toasts.error("Failed to save note. Please try again.");
        }
        Err(e) => {
            warn!("Failed to save note {}: {}", id, e);
            app.toasts.error("Failed to save note. Please try again.");
        }
    }
}

async fn delete_note(app: AppContext, navigator: Navigator, id: NoteId) {
    if app.store.delete(id).await {
        app.toasts.success("Note deleted successfully!");
        app.channel.publish(BroadcastEvent::deleted(id));
        navigator.navigate("/", NavigateOptions::transition());
    } else {
        app.toasts.error("Failed to delete note. Please try again.");
    }
}

/// Shown for unknown or malformed note ids
pub fn not_found(navigator: &Navigator) -> Node {
    let back = navigator.clone();
    page(
        "not-found",
        children![
            header(navigator, None),
            h(
                "main",
                Props::new().class("max-w-4xl mx-auto px-4 py-16 text-center"),
                children![
                    h(
                        "h2",
                        Props::new().class("text-2xl font-bold text-gray-900 dark:text-white mb-4"),
                        children!["Note not found"],
                    ),
                    h(
                        "p",
                        Props::new().class("text-gray-600 dark:text-gray-400 mb-6"),
                        children!["The note you're looking for doesn't exist."],
                    ),
                    h(
                        "button",
                        Props::new()
                            .attr("data-action", "back")
                            .class("bg-blue-600 hover:bg-blue-700 text-white px-6 py-2 rounded-lg transition-all")
                            .on("click", move |_| {
                                back.navigate("/", NavigateOptions::default());
                            }),
                        children!["Back to Home"],
                    ),
                ],
            ),
        ],
    )
}
