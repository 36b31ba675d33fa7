//! Browsing context
//!
//! A [`Window`] owns one document, the current [`Location`] and the session
//! history. Pushing or replacing history entries never fires `popstate`;
//! moving back or forward does.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};
use url::{form_urlencoded, Url};

use super::event::ListenerId;
use super::node::Node;
use super::transition::ViewTransitions;

/// Origin used when none is given
pub const DEFAULT_ORIGIN: &str = "http://localhost";

type PopstateListener = Rc<dyn Fn(&Location)>;
type ConfirmHook = Rc<dyn Fn(&str) -> bool>;

/// Path, query and fragment of the current URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Always starts with `/`
    pub pathname: String,
    /// Empty or starts with `?`
    pub search: String,
    /// Empty or starts with `#`
    pub hash: String,
}

impl Location {
    /// Parse a root-relative URL such as `/notes/5?q=milk#top`
    pub fn parse(url: &str) -> Self {
        match Url::parse(DEFAULT_ORIGIN).and_then(|base| base.join(url)) {
            Ok(resolved) => Self::from_url(&resolved),
            Err(e) => {
                warn!("Unparseable location {:?}: {}", url, e);
                Self::root()
            }
        }
    }

    pub fn from_url(url: &Url) -> Self {
        let search = match url.query() {
            Some(q) if !q.is_empty() => format!("?{}", q),
            _ => String::new(),
        };
        let hash = match url.fragment() {
            Some(f) if !f.is_empty() => format!("#{}", f),
            _ => String::new(),
        };
        Self {
            pathname: url.path().to_string(),
            search,
            hash,
        }
    }

    fn root() -> Self {
        Self {
            pathname: "/".to_string(),
            search: String::new(),
            hash: String::new(),
        }
    }

    /// Path plus query plus fragment
    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }

    /// Decoded value of the first query parameter called `name`
    pub fn query_param(&self, name: &str) -> Option<String> {
        form_urlencoded::parse(self.search.trim_start_matches('?').as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// Root-relative URL carrying one encoded query pair, e.g. `/?q=milk+%26+eggs`
pub fn path_with_query(path: &str, key: &str, value: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    format!("{}?{}", path, query)
}

struct History {
    entries: Vec<Url>,
    index: usize,
}

struct WindowInner {
    document: Node,
    body: Node,
    history: RefCell<History>,
    popstate: RefCell<Vec<(ListenerId, PopstateListener)>>,
    next_listener: Cell<u64>,
    transitions: RefCell<Option<Rc<dyn ViewTransitions>>>,
    confirm: RefCell<ConfirmHook>,
}

/// Handle to a browsing context
#[derive(Clone)]
pub struct Window(Rc<WindowInner>);

impl Window {
    /// A window on `origin` showing `url`
    ///
    /// `url` is resolved against `origin`, so it may be root-relative or
    /// absolute.
    pub fn with_url(origin: &str, url: &str) -> Result<Self, url::ParseError> {
        let current = Url::parse(origin)?.join(url)?;

        let document = Node::document();
        let html = Node::element("html");
        let body = Node::element("body");
        html.append_child(&body);
        document.append_child(&html);

        Ok(Window(Rc::new(WindowInner {
            document,
            body,
            history: RefCell::new(History {
                entries: vec![current],
                index: 0,
            }),
            popstate: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            transitions: RefCell::new(None),
            confirm: RefCell::new(Rc::new(|_| true)),
        })))
    }

    pub fn document(&self) -> &Node {
        &self.0.document
    }

    pub fn body(&self) -> &Node {
        &self.0.body
    }

    /// Serialized origin, e.g. `http://localhost`
    pub fn origin(&self) -> String {
        self.url().origin().ascii_serialization()
    }

    /// Full URL of the current history entry
    pub fn url(&self) -> Url {
        let history = self.0.history.borrow();
        history.entries[history.index].clone()
    }

    /// Current location
    pub fn location(&self) -> Location {
        Location::from_url(&self.url())
    }

    // ==================== History ====================

    /// Add a history entry and make it current
    ///
    /// `url` is resolved against the current entry. Forward entries are
    /// discarded.
    pub fn push_state(&self, url: &str) {
        let Some(resolved) = self.resolve(url) else {
            return;
        };
        let mut history = self.0.history.borrow_mut();
        let next = history.index + 1;
        history.entries.truncate(next);
        history.entries.push(resolved);
        history.index = next;
        trace!("pushState {}", url);
    }

    /// Replace the current history entry
    pub fn replace_state(&self, url: &str) {
        let Some(resolved) = self.resolve(url) else {
            return;
        };
        let mut history = self.0.history.borrow_mut();
        let index = history.index;
        history.entries[index] = resolved;
        trace!("replaceState {}", url);
    }

    fn resolve(&self, url: &str) -> Option<Url> {
        let base = self.url();
        match base.join(url) {
            Ok(resolved) if resolved.origin() == base.origin() => Some(resolved),
            Ok(resolved) => {
                warn!("Refusing history entry on another origin: {}", resolved);
                None
            }
            Err(e) => {
                warn!("Unparseable history URL {:?}: {}", url, e);
                None
            }
        }
    }

    /// Move one entry back and fire `popstate`
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Move one entry forward and fire `popstate`
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    /// Number of session history entries
    pub fn history_len(&self) -> usize {
        self.0.history.borrow().entries.len()
    }

    fn traverse(&self, delta: isize) -> bool {
        let location = {
            let mut history = self.0.history.borrow_mut();
            let Some(target) = history.index.checked_add_signed(delta) else {
                return false;
            };
            if target >= history.entries.len() {
                return false;
            }
            history.index = target;
            Location::from_url(&history.entries[target])
        };

        debug!("popstate {}", location);
        let listeners: Vec<PopstateListener> = self
            .0
            .popstate
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&location);
        }
        true
    }

    /// Register a `popstate` listener
    pub fn on_popstate(&self, listener: impl Fn(&Location) + 'static) -> ListenerId {
        let id = ListenerId(self.0.next_listener.get());
        self.0.next_listener.set(id.0 + 1);
        self.0.popstate.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn remove_popstate_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.0.popstate.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn popstate_listener_count(&self) -> usize {
        self.0.popstate.borrow().len()
    }

    /// Root-relative path for `href` if it stays on this origin
    ///
    /// `href` is resolved against the current entry the way an anchor is.
    pub fn same_origin_path(&self, href: &str) -> Option<String> {
        let base = self.url();
        let joined = base.join(href).ok()?;
        if joined.origin() != base.origin() {
            return None;
        }
        Some(Location::from_url(&joined).href())
    }

    // ==================== Capabilities ====================

    /// Install or remove the view-transition primitive
    pub fn set_view_transitions(&self, transitions: Option<Rc<dyn ViewTransitions>>) {
        *self.0.transitions.borrow_mut() = transitions;
    }

    pub fn view_transitions(&self) -> Option<Rc<dyn ViewTransitions>> {
        self.0.transitions.borrow().clone()
    }

    /// Install the confirm-dialog hook; the default accepts everything
    pub fn set_confirm(&self, hook: impl Fn(&str) -> bool + 'static) {
        *self.0.confirm.borrow_mut() = Rc::new(hook);
    }

    /// Ask the user to confirm `message`
    pub fn confirm(&self, message: &str) -> bool {
        let hook = self.0.confirm.borrow().clone();
        hook(message)
    }
}
