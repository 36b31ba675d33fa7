//! Home view: search, stats and note cards

use std::rc::Rc;

use chrono::Utc;
use quill_core::{Note, NoteStats};
use tracing::warn;

use super::components::{header, note_card, page, stats_cards, SearchBar};
use super::icons::{self, icon};
use crate::app::AppContext;
use crate::builder::{h, Props};
use crate::children;
use crate::dom::window::path_with_query;
use crate::dom::Node;
use crate::router::{NavigateOptions, Navigator, RouteContext};

/// Cards currently on the page and the message shown when none match
struct Filter {
    cards: Vec<(Note, Node)>,
    no_results: Node,
}

impl Filter {
    /// Hide cards that do not match `query`
    fn apply(&self, query: &str) {
        let mut visible = 0;
        for (note, card) in &self.cards {
            if note.matches(query) {
                card.remove_attribute("hidden");
                visible += 1;
            } else {
                card.set_attribute("hidden", "");
            }
        }

        if visible == 0 && !self.cards.is_empty() {
            self.no_results
                .set_text_content(&format!("No notes match \"{}\"", query.trim()));
            self.no_results.remove_attribute("hidden");
        } else {
            self.no_results.set_attribute("hidden", "");
        }
    }
}

pub async fn home(app: AppContext, ctx: RouteContext) -> Node {
    let now = Utc::now();
    let notes = match app.store.list().await {
        Ok(notes) => notes,
        Err(e) => {
            warn!("Failed to load notes: {}", e);
            app.toasts.error("Failed to load notes. Please try again.");
            Vec::new()
        }
    };
    let stats = NoteStats::compute(&notes, now);
    let query = ctx.query_param("q").unwrap_or_default();
    let navigator = ctx.navigator;
    let is_empty = notes.is_empty();

    let filter = Rc::new(Filter {
        cards: notes
            .into_iter()
            .map(|note| {
                let card = note_card(&note, now);
                (note, card)
            })
            .collect(),
        no_results: h(
            "p",
            Props::new()
                .class("mt-6 text-center text-sm text-gray-500 dark:text-gray-400")
                .attr("data-empty", "search")
                .attr("hidden", true),
            children![],
        ),
    });
    filter.apply(&query);

    let on_search = {
        let filter = filter.clone();
        let navigator = navigator.clone();
        move |q: &str| {
            filter.apply(q);
            if q.is_empty() {
                navigator.replace("/");
            } else {
                navigator.replace(&path_with_query("/", "q", q));
            }
        }
    };
    let search = SearchBar::new(&query, on_search);

    let cards: Vec<Node> = filter.cards.iter().map(|(_, card)| card.clone()).collect();

    page(
        "home",
        children![
            header(&navigator, None),
            h(
                "main",
                Props::new().class("max-w-7xl mx-auto px-4 py-3"),
                children![
                    search.root,
                    stats_cards(&stats),
                    h(
                        "div",
                        Props::new(),
                        children![
                            h(
                                "h2",
                                Props::new().class("text-sm font-semibold text-gray-900 dark:text-white mb-2"),
                                children!["Recent Notes"],
                            ),
                            h(
                                "div",
                                Props::new().class("grid grid-cols-2 md:grid-cols-4 gap-3"),
                                children![cards],
                            ),
                            &filter.no_results,
                        ],
                    ),
                    is_empty.then(|| empty_state(&navigator)),
                ],
            ),
        ],
    )
}

fn empty_state(navigator: &Navigator) -> Node {
    let navigator = navigator.clone();
    h(
        "div",
        Props::new().class("mt-8 text-center").attr("data-empty", "notes"),
        children![
            h(
                "div",
                Props::new().class("w-24 h-24 bg-gray-100 dark:bg-gray-800 rounded-full flex items-center justify-center mx-auto mb-6"),
                children![icon("w-12 h-12 text-gray-400", icons::DOCUMENT)],
            ),
            h(
                "h3",
                Props::new().class("text-2xl font-semibold text-gray-900 dark:text-white mb-2"),
                children!["No notes yet"],
            ),
            h(
                "p",
                Props::new().class("text-gray-500 dark:text-gray-400 mb-6"),
                children!["Start capturing your thoughts by creating your first note"],
            ),
            h(
                "button",
                Props::new()
                    .attr("data-action", "new-note")
                    .class("inline-flex items-center gap-2 bg-blue-600 hover:bg-blue-700 text-white px-6 py-3 rounded-xl font-semibold shadow-lg transition-all")
                    .on("click", move |_| {
                        navigator.navigate("/notes/new", NavigateOptions::transition());
                    }),
                children![icon("w-5 h-5", icons::PLUS), "Create Your First Note"],
            ),
        ],
    )
}
