//! Shared view components
//!
//! Components that the caller needs to reach into later return a struct
//! holding the nodes they created, instead of the caller querying the tree
//! after mount.
//!
//! Listeners never hold a strong handle to their own node or one of its
//! ancestors; a replaced view must be freeable once the router detaches it.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use quill_core::models::{char_count, word_count};
use quill_core::{Note, NoteStats};

use super::icons::{self, icon};
use crate::builder::{h, Child, ComponentProps, Handler, Props};
use crate::children;
use crate::dom::{Event, Node, WeakNode};
use crate::router::{NavigateOptions, Navigator, LINK_ATTR};

/// Badge colors offered by the color picker
pub const PALETTE: &[(&str, &str)] = &[
    ("Green", "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300"),
    ("Blue", "bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-300"),
    ("Purple", "bg-purple-100 text-purple-800 dark:bg-purple-900 dark:text-purple-300"),
    ("Pink", "bg-pink-100 text-pink-800 dark:bg-pink-900 dark:text-pink-300"),
    ("Yellow", "bg-yellow-100 text-yellow-800 dark:bg-yellow-900 dark:text-yellow-300"),
    ("Orange", "bg-orange-100 text-orange-800 dark:bg-orange-900 dark:text-orange-300"),
    ("Red", "bg-red-100 text-red-800 dark:bg-red-900 dark:text-red-300"),
    ("Gray", "bg-gray-100 text-gray-800 dark:bg-gray-900 dark:text-gray-300"),
];

/// Color preselected for a new note
pub const DEFAULT_PICKER_COLOR: &str = PALETTE[0].1;

const PAGE_CLASS: &str =
    "min-h-screen bg-gradient-to-br from-gray-50 to-gray-100 dark:from-gray-900 dark:to-gray-800";
const SWATCH_SELECTED: &str = "border-gray-900 dark:border-white scale-110";
const SWATCH_IDLE: &str = "border-transparent hover:border-gray-400";
const PANEL_CLASS: &str =
    "mt-4 bg-white dark:bg-gray-800 rounded-lg border border-gray-200 dark:border-gray-700 p-6";
const PRIMARY_BUTTON: &str =
    "flex items-center gap-2 bg-blue-600 hover:bg-blue-700 text-white px-6 py-2 rounded-lg transition-all";
const SECONDARY_BUTTON: &str = "px-4 py-2 text-gray-700 dark:text-gray-300 hover:bg-gray-100 dark:hover:bg-gray-700 rounded-lg transition-all";

/// Full-height page wrapper, tagged with the view's name
pub fn page(view: &str, children: Vec<Child>) -> Node {
    h(
        "div",
        Props::new().class(PAGE_CLASS).attr("data-view", view),
        children,
    )
}

// ==================== Header ====================

/// App header with the logo link and the "New" button
///
/// `on_new_note` replaces the default navigation to the new-note view.
pub fn header(navigator: &Navigator, on_new_note: Option<Handler>) -> Node {
    let logo_nav = navigator.clone();
    let new_nav = navigator.clone();
    let on_new: Handler = match on_new_note {
        Some(handler) => handler,
        None => Rc::new(move |_: &Event| {
            new_nav.navigate("/notes/new", NavigateOptions::transition());
        }),
    };

    h(
        "header",
        Props::new().class("bg-white/80 dark:bg-gray-900/80 backdrop-blur-sm border-b border-gray-200 dark:border-gray-700"),
        children![h(
            "div",
            Props::new().class("max-w-7xl mx-auto px-4 py-2 flex items-center justify-between"),
            children![
                h(
                    "a",
                    Props::new()
                        .attr("href", "/")
                        .attr(LINK_ATTR, true)
                        .class("flex items-center gap-2 cursor-pointer")
                        .on("click", move |e| {
                            e.prevent_default();
                            logo_nav.navigate("/", NavigateOptions::transition());
                        }),
                    children![
                        h(
                            "div",
                            Props::new().class("w-8 h-8 bg-gradient-to-br from-blue-500 to-purple-600 rounded-lg flex items-center justify-center"),
                            children![icon("w-5 h-5 text-white", icons::PENCIL)],
                        ),
                        h(
                            "h1",
                            Props::new().class("text-lg font-bold text-gray-900 dark:text-white"),
                            children!["Notes"],
                        ),
                    ],
                ),
                h(
                    "button",
                    Props::new()
                        .attr("data-action", "new-note")
                        .class("flex items-center gap-1.5 bg-blue-600 hover:bg-blue-700 text-white px-3 py-1.5 rounded-lg text-sm font-medium transition-all")
                        .on_handler("click", on_new),
                    children![icon("w-4 h-4", icons::PLUS), "New"],
                ),
            ],
        )],
    )
}

// ==================== Buttons ====================

/// "Back to Notes" button; takes its click handler from the props
pub fn back_button(ComponentProps { props, children }: ComponentProps) -> Node {
    let mut button = Props::new()
        .attr("data-action", "back")
        .class("flex items-center gap-2 text-gray-600 dark:text-gray-400 hover:text-gray-900 dark:hover:text-white mb-4 transition-colors");
    if let Some(handler) = props.handler("click") {
        button = button.on_handler("click", handler);
    }

    let label = children.into_vec();
    let label = if label.is_empty() {
        children!["Back to Notes"]
    } else {
        label
    };
    h(
        "button",
        button,
        children![icon("w-5 h-5", icons::CHEVRON_LEFT), label],
    )
}

/// Filled call-to-action button
pub fn primary_button(action: &str, icon_path: &str, label: &str, on_click: Handler) -> Node {
    h(
        "button",
        Props::new()
            .attr("data-action", action)
            .class(PRIMARY_BUTTON)
            .on_handler("click", on_click),
        children![icon("w-5 h-5", icon_path), label],
    )
}

/// Plain text button
pub fn secondary_button(action: &str, label: &str, on_click: Handler) -> Node {
    h(
        "button",
        Props::new()
            .attr("data-action", action)
            .class(SECONDARY_BUTTON)
            .on_handler("click", on_click),
        children![label],
    )
}

/// Bottom bar holding an optional left-side control and the right-side
/// buttons
pub fn action_bar(left: Option<Node>, right: Vec<Node>) -> Node {
    h(
        "div",
        Props::new().class(PANEL_CLASS),
        children![h(
            "div",
            Props::new().class("flex items-center justify-between"),
            children![
                left.unwrap_or_else(|| h("div", Props::new(), children![])),
                h("div", Props::new().class("flex items-center gap-3"), children![right]),
            ],
        )],
    )
}

// ==================== Color picker ====================

struct Swatch {
    value: String,
    input: WeakNode,
    dot: WeakNode,
}

struct PickerState {
    selected: RefCell<String>,
    swatches: RefCell<Vec<Swatch>>,
    on_change: Box<dyn Fn(&str, &str)>,
}

impl PickerState {
    fn select(&self, color: &str) {
        for swatch in self.swatches.borrow().iter() {
            let checked = swatch.value == color;
            if let Some(input) = swatch.input.upgrade() {
                input.set_checked(checked);
            }
            if let Some(dot) = swatch.dot.upgrade() {
                if checked {
                    dot.remove_classes(SWATCH_IDLE);
                    dot.add_classes(SWATCH_SELECTED);
                } else {
                    dot.remove_classes(SWATCH_SELECTED);
                    dot.add_classes(SWATCH_IDLE);
                }
            }
        }

        let old = self.selected.replace(color.to_string());
        if old != color {
            (self.on_change)(&old, color);
        }
    }
}

/// Radio group of badge colors
#[derive(Clone)]
pub struct ColorPicker {
    pub root: Node,
    state: Rc<PickerState>,
}

impl ColorPicker {
    /// `on_change` receives the previous and the new color
    pub fn new(selected: &str, on_change: impl Fn(&str, &str) + 'static) -> Self {
        let state = Rc::new(PickerState {
            selected: RefCell::new(selected.to_string()),
            swatches: RefCell::new(Vec::with_capacity(PALETTE.len())),
            on_change: Box::new(on_change),
        });

        let labels: Vec<Node> = PALETTE
            .iter()
            .map(|(name, value)| {
                let is_selected = *value == selected;
                let listener_state = state.clone();
                let input = h(
                    "input",
                    Props::new()
                        .attr("type", "radio")
                        .attr("name", "note-color")
                        .id(format!("color-{}", name))
                        .attr("value", *value)
                        .default_checked(is_selected)
                        .class("sr-only")
                        .on("change", move |e| {
                            if let Some(color) = e.target().and_then(|t| t.get_attribute("value")) {
                                listener_state.select(&color);
                            }
                        }),
                    children![],
                );
                let dot = h(
                    "div",
                    Props::new().class(format!(
                        "w-6 h-6 rounded-full border-2 transition-all {} {}",
                        value,
                        if is_selected { SWATCH_SELECTED } else { SWATCH_IDLE }
                    )),
                    children![],
                );
                state.swatches.borrow_mut().push(Swatch {
                    value: value.to_string(),
                    input: input.downgrade(),
                    dot: dot.downgrade(),
                });
                h(
                    "label",
                    Props::new().class("cursor-pointer").attr("title", *name),
                    children![input, dot],
                )
            })
            .collect();

        let root = h(
            "div",
            Props::new().class("flex items-center gap-2"),
            children![
                h(
                    "span",
                    Props::new().class("text-sm text-gray-600 dark:text-gray-400"),
                    children!["Color:"],
                ),
                h("div", Props::new().class("flex gap-2"), children![labels]),
            ],
        );

        ColorPicker { root, state }
    }

    /// Currently selected color
    pub fn selected(&self) -> String {
        self.state.selected.borrow().clone()
    }

    /// Select `color` as if its radio had been changed
    pub fn select(&self, color: &str) {
        self.state.select(color);
    }

    /// Radio input for `color`
    pub fn input_for(&self, color: &str) -> Option<Node> {
        self.state
            .swatches
            .borrow()
            .iter()
            .find(|s| s.value == color)
            .and_then(|s| s.input.upgrade())
    }
}

// ==================== Note editor ====================

/// Title, badge, color picker, metadata and content editor
#[derive(Clone)]
pub struct NoteEditor {
    pub root: Node,
    pub title: Node,
    pub content: Node,
    pub badge: Node,
    /// Present only when editing an existing note
    pub char_count: Option<Node>,
    pub word_count: Option<Node>,
    pub picker: ColorPicker,
}

impl NoteEditor {
    pub fn new(note: Option<&Note>, selected_color: &str, now: DateTime<Utc>) -> Self {
        let title = h(
            "input",
            Props::new()
                .attr("type", "text")
                .attr("name", "title")
                .default_value(note.map(|n| n.title.as_str()).unwrap_or_default())
                .attr("placeholder", "Note title...")
                .class("w-full text-2xl font-bold text-gray-900 dark:text-white bg-transparent border-none outline-none focus:ring-0 p-0"),
            children![],
        );

        let badge = h(
            "span",
            Props::new().class(format!(
                "note-badge text-xs px-2 py-1 rounded {}",
                selected_color
            )),
            children![if note.is_some() { "Note" } else { "New Note" }],
        );
        let badge_handle = badge.clone();
        let picker = ColorPicker::new(selected_color, move |old, new| {
            badge_handle.remove_classes(old);
            badge_handle.add_classes(new);
        });

        let counters = note.map(|n| {
            let chars = counter("char-count", char_count(&n.content));
            let words = counter("word-count", word_count(&n.content));
            (n, chars, words)
        });

        let info = counters.as_ref().map(|(n, chars, words)| {
            h(
                "div",
                Props::new().class("px-6 py-4 bg-gray-50 dark:bg-gray-900 border-b border-gray-200 dark:border-gray-700"),
                children![h(
                    "div",
                    Props::new().class("grid grid-cols-2 md:grid-cols-4 gap-4 text-sm"),
                    children![
                        info_item("Created:", text_value(&format_date(n.created_at))),
                        info_item("Modified:", text_value(&format_date(n.updated_at))),
                        info_item("Characters:", chars.clone()),
                        info_item("Words:", words.clone()),
                    ],
                )],
            )
        });

        let (char_node, word_node) = match &counters {
            Some((_, chars, words)) => (Some(chars.clone()), Some(words.clone())),
            None => (None, None),
        };
        let (c, w) = (char_node.clone(), word_node.clone());
        let content = h(
            "textarea",
            Props::new()
                .attr("name", "content")
                .default_value(note.map(|n| n.content.as_str()).unwrap_or_default())
                .attr("placeholder", "Start writing your note...")
                .class("w-full min-h-[400px] text-gray-900 dark:text-gray-100 bg-transparent border-none outline-none focus:ring-0 resize-none font-mono text-sm leading-relaxed")
                .on("input", move |e| {
                    let text = e.target().map(|t| t.value()).unwrap_or_default();
                    if let Some(c) = &c {
                        c.set_text_content(&char_count(&text).to_string());
                    }
                    if let Some(w) = &w {
                        w.set_text_content(&word_count(&text).to_string());
                    }
                }),
            children![],
        );

        let date = note.map(|n| {
            h(
                "span",
                Props::new().class("text-sm text-gray-500 dark:text-gray-400"),
                children![n.relative_date(now)],
            )
        });

        let root = h(
            "div",
            Props::new().class("bg-white dark:bg-gray-800 rounded-xl border border-gray-200 dark:border-gray-700 overflow-hidden"),
            children![
                h(
                    "div",
                    Props::new().class("p-6 border-b border-gray-200 dark:border-gray-700"),
                    children![
                        &title,
                        h(
                            "div",
                            Props::new().class("flex items-center justify-between gap-4 mt-2"),
                            children![
                                h(
                                    "div",
                                    Props::new().class("flex items-center gap-4"),
                                    children![date, &badge],
                                ),
                                &picker.root,
                            ],
                        ),
                    ],
                ),
                info,
                h("div", Props::new().class("p-6"), children![&content]),
            ],
        );

        NoteEditor {
            root,
            title,
            content,
            badge,
            char_count: char_node,
            word_count: word_node,
            picker,
        }
    }

    /// Trimmed title and content, and the selected color
    pub fn values(&self) -> (String, String, String) {
        (
            self.title.value().trim().to_string(),
            self.content.value().trim().to_string(),
            self.picker.selected(),
        )
    }
}

fn counter(id: &str, value: usize) -> Node {
    h(
        "span",
        Props::new()
            .id(id)
            .class("ml-2 text-gray-900 dark:text-white"),
        children![value],
    )
}

fn text_value(text: &str) -> Node {
    h(
        "span",
        Props::new().class("ml-2 text-gray-900 dark:text-white"),
        children![text],
    )
}

fn info_item(label: &str, value: Node) -> Node {
    h(
        "div",
        Props::new(),
        children![
            h(
                "span",
                Props::new().class("text-gray-500 dark:text-gray-400"),
                children![label],
            ),
            value,
        ],
    )
}

/// Calendar date as month/day/year
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y").to_string()
}

// ==================== Home page pieces ====================

/// Total, recent and category counts
pub fn stats_cards(stats: &NoteStats) -> Node {
    let card = |label: &str, value: usize| {
        h(
            "div",
            Props::new()
                .class("bg-white dark:bg-gray-800 rounded-lg p-3 border border-gray-200 dark:border-gray-700")
                .attr("data-stat", label.to_ascii_lowercase()),
            children![
                h(
                    "p",
                    Props::new().class("text-gray-500 dark:text-gray-400 text-xs mb-0.5"),
                    children![label],
                ),
                h(
                    "p",
                    Props::new().class("text-xl font-bold text-gray-900 dark:text-white"),
                    children![value],
                ),
            ],
        )
    };

    h(
        "div",
        Props::new().class("grid grid-cols-3 gap-3 mb-3"),
        children![
            card("Total", stats.total),
            card("Recent", stats.recent),
            card("Categories", stats.categories),
        ],
    )
}

/// Link card for one note
pub fn note_card(note: &Note, now: DateTime<Utc>) -> Node {
    h(
        "a",
        Props::new()
            .attr("href", format!("/notes/{}", note.id))
            .attr(LINK_ATTR, true)
            .attr("data-note-id", note.id.to_string())
            .class(format!(
                "{} block rounded-lg p-3 border border-gray-200 dark:border-gray-700 hover:shadow-md transition-all cursor-pointer group",
                note.color
            )),
        children![
            h(
                "h3",
                Props::new().class("text-sm font-semibold text-gray-900 dark:text-gray-100 mb-1 group-hover:text-blue-600 dark:group-hover:text-blue-400 transition-colors"),
                children![&note.title],
            ),
            h(
                "p",
                Props::new().class("text-gray-600 dark:text-gray-400 text-xs mb-2 line-clamp-1"),
                children![&note.preview],
            ),
            h(
                "span",
                Props::new().class("text-xs text-gray-500 dark:text-gray-500"),
                children![note.relative_date(now)],
            ),
        ],
    )
}

/// Search input
pub struct SearchBar {
    pub root: Node,
    pub input: Node,
}

impl SearchBar {
    /// `on_search` runs with the input's value on every keystroke
    pub fn new(initial: &str, on_search: impl Fn(&str) + 'static) -> Self {
        let input = h(
            "input",
            Props::new()
                .attr("type", "search")
                .attr("name", "q")
                .attr("placeholder", "Search notes...")
                .default_value(initial)
                .class("w-full pl-9 pr-3 py-2 text-sm bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 rounded-lg text-gray-900 dark:text-gray-100 placeholder-gray-400 focus:outline-none focus:ring-2 focus:ring-blue-500 focus:border-transparent")
                .on("input", move |e| {
                    if let Some(target) = e.target() {
                        on_search(&target.value());
                    }
                }),
            children![],
        );

        let root = h(
            "div",
            Props::new().class("mb-3"),
            children![h(
                "div",
                Props::new().class("relative"),
                children![
                    icon("absolute left-3 top-1/2 transform -translate-y-1/2 w-4 h-4 text-gray-400", icons::SEARCH),
                    &input,
                ],
            )],
        );

        SearchBar { root, input }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quill_core::{NoteDraft, NoteId};

    fn note(content: &str) -> Note {
        let now = Utc::now() - Duration::days(1);
        Note::from_draft(NoteId(7), NoteDraft::new("Title", content), now)
    }

    #[test]
    fn test_color_picker_updates_radios_and_reports_change() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = changes.clone();
        let picker = ColorPicker::new(DEFAULT_PICKER_COLOR, move |old, new| {
            c.borrow_mut().push((old.to_string(), new.to_string()))
        });

        let blue = PALETTE[1].1;
        let input = picker.input_for(blue).unwrap();
        input.dispatch("change");

        assert_eq!(picker.selected(), blue);
        assert!(input.checked());
        assert!(!picker.input_for(DEFAULT_PICKER_COLOR).unwrap().checked());
        assert_eq!(
            *changes.borrow(),
            vec![(DEFAULT_PICKER_COLOR.to_string(), blue.to_string())]
        );

        // Selecting the current color is not a change
        picker.select(blue);
        assert_eq!(changes.borrow().len(), 1);
    }

    #[test]
    fn test_editor_badge_follows_color() {
        let editor = NoteEditor::new(None, DEFAULT_PICKER_COLOR, Utc::now());
        assert_eq!(editor.badge.text_content(), "New Note");
        assert!(editor.char_count.is_none());

        editor.picker.select(PALETTE[6].1);
        assert!(editor.badge.has_class("bg-red-100"));
        assert!(!editor.badge.has_class("bg-green-100"));
        assert!(editor.badge.has_class("note-badge"));
    }

    #[test]
    fn test_editor_counts_update_on_input() {
        let n = note("two words");
        let editor = NoteEditor::new(Some(&n), &n.color, Utc::now());
        let chars = editor.char_count.clone().unwrap();
        let words = editor.word_count.clone().unwrap();
        assert_eq!(chars.text_content(), "9");
        assert_eq!(words.text_content(), "2");
        assert_eq!(editor.title.value(), "Title");

        editor.content.input("now three words");
        assert_eq!(chars.text_content(), "15");
        assert_eq!(words.text_content(), "3");
        assert_eq!(editor.values().1, "now three words");
    }

    #[test]
    fn test_note_card_links_to_detail() {
        let n = note("body");
        let card = note_card(&n, Utc::now());
        assert_eq!(card.get_attribute("href").as_deref(), Some("/notes/7"));
        assert!(card.has_attribute(LINK_ATTR));
        assert!(card.text_content().contains("Yesterday"));
    }

    #[test]
    fn test_back_button_uses_click_prop() {
        let clicked = Rc::new(RefCell::new(false));
        let c = clicked.clone();
        let button = h(
            crate::builder::Component::new(back_button),
            Props::new().on("click", move |_| *c.borrow_mut() = true),
            children![],
        );
        assert!(button.text_content().contains("Back to Notes"));
        button.click();
        assert!(*clicked.borrow());
    }

    #[test]
    fn test_search_bar_reports_value() {
        let seen = Rc::new(RefCell::new(String::new()));
        let s = seen.clone();
        let bar = SearchBar::new("", move |q| *s.borrow_mut() = q.to_string());
        bar.input.input("milk");
        assert_eq!(*seen.borrow(), "milk");
    }
}
