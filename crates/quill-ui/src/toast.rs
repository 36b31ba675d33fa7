//! Transient notifications
//!
//! Every user-visible failure and confirmation goes through [`Toasts`]: a
//! message with a severity, shown in a fixed container and removed after a
//! timeout or when its dismiss button is clicked.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::builder::{h, Props};
use crate::children;
use crate::dom::Node;
use crate::views::icons;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
        }
    }

    fn background(&self) -> &'static str {
        match self {
            ToastKind::Success => "bg-green-50 dark:bg-green-950/50 border-green-200 dark:border-green-800",
            ToastKind::Error => "bg-red-50 dark:bg-red-950/50 border-red-200 dark:border-red-800",
            ToastKind::Warning => {
                "bg-yellow-50 dark:bg-yellow-950/50 border-yellow-200 dark:border-yellow-800"
            }
            ToastKind::Info => "bg-blue-50 dark:bg-blue-950/50 border-blue-200 dark:border-blue-800",
        }
    }

    fn icon(&self) -> Node {
        match self {
            ToastKind::Success => icons::icon("w-5 h-5 text-green-500", icons::CHECK_CIRCLE),
            ToastKind::Error => icons::icon("w-5 h-5 text-red-500", icons::X_CIRCLE),
            ToastKind::Warning => icons::icon("w-5 h-5 text-yellow-500", icons::WARNING),
            ToastKind::Info => icons::icon("w-5 h-5 text-blue-500", icons::INFO),
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a shown notification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToastId(String);

impl ToastId {
    fn generate() -> Self {
        ToastId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct Active {
    id: ToastId,
    kind: ToastKind,
    message: String,
    node: Node,
}

struct ToastsInner {
    container: Node,
    timeout: Duration,
    active: RefCell<Vec<Active>>,
}

/// Notification service shared by every view of one session
#[derive(Clone)]
pub struct Toasts(Rc<ToastsInner>);

impl Toasts {
    pub fn new(timeout: Duration) -> Self {
        let container = h(
            "div",
            Props::new()
                .class("fixed bottom-4 right-4 z-50 flex flex-col gap-2 pointer-events-none")
                .attr("aria-live", "polite"),
            children![],
        );
        Toasts(Rc::new(ToastsInner {
            container,
            timeout,
            active: RefCell::new(Vec::new()),
        }))
    }

    /// Node holding the notifications; mount it once next to the outlet
    pub fn container(&self) -> &Node {
        &self.0.container
    }

    /// Show `message` until the timeout elapses or it is dismissed
    ///
    /// Must be called inside a `LocalSet`.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) -> ToastId {
        let message = message.into();
        let id = ToastId::generate();
        debug!("Toast [{}] {}", kind, message);

        let weak = Rc::downgrade(&self.0);
        let dismiss_id = id.clone();
        let node = h(
            "div",
            Props::new()
                .class(format!(
                    "{} border rounded-lg p-4 shadow-lg backdrop-blur-sm flex items-start gap-3 min-w-[300px] max-w-[400px] animate-slide-in pointer-events-auto",
                    kind.background()
                ))
                .attr("role", "status")
                .attr("data-toast", kind.as_str())
                .attr("data-toast-id", id.as_str()),
            children![
                h("div", Props::new().class("flex-shrink-0"), children![kind.icon()]),
                h(
                    "div",
                    Props::new().class("flex-1"),
                    children![h(
                        "p",
                        Props::new().class("text-sm font-medium text-gray-900 dark:text-gray-100"),
                        children![message.as_str()],
                    )],
                ),
                h(
                    "button",
                    Props::new()
                        .class("flex-shrink-0 text-gray-400 hover:text-gray-600 dark:hover:text-gray-300 transition-colors")
                        .attr("aria-label", "Dismiss")
                        .attr("data-dismiss", true)
                        .on("click", move |_| {
                            if let Some(inner) = weak.upgrade() {
                                Toasts(inner).dismiss(&dismiss_id);
                            }
                        }),
                    children![icons::icon("w-4 h-4", icons::CLOSE)],
                ),
            ],
        );

        self.0.container.append_child(&node);
        self.0.active.borrow_mut().push(Active {
            id: id.clone(),
            kind,
            message,
            node,
        });

        let weak: Weak<ToastsInner> = Rc::downgrade(&self.0);
        let timeout = self.0.timeout;
        let expiring = id.clone();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                if Toasts(inner).dismiss(&expiring) {
                    trace!("Toast {} expired", expiring.as_str());
                }
            }
        });

        id
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Info)
    }

    pub fn warning(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Warning)
    }

    /// Remove a notification, returning whether it was still shown
    pub fn dismiss(&self, id: &ToastId) -> bool {
        let removed = {
            let mut active = self.0.active.borrow_mut();
            let Some(pos) = active.iter().position(|t| t.id == *id) else {
                return false;
            };
            active.remove(pos)
        };
        self.0.container.remove_child(&removed.node);
        true
    }

    /// Currently shown notifications, oldest first
    pub fn visible(&self) -> Vec<(ToastKind, String)> {
        self.0
            .active
            .borrow()
            .iter()
            .map(|t| (t.kind, t.message.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.active.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
