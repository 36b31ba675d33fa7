//! Router and navigation handles
//!
//! The router owns one container node. Every render resolves the current
//! location, invokes the matched view and, once the view's node is ready,
//! clears the container and appends the node in one synchronous step.
//!
//! Each render takes a generation number. When a render finishes after a
//! newer one was requested, its node is discarded, so the most recent
//! navigation always wins no matter which view resolves first.
//!
//! Navigations spawn local tasks: the router must be driven inside a
//! `tokio::task::LocalSet`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use quill_core::RerenderPolicy;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use super::error::{RouterError, RouterResult};
use super::pattern::Params;
use super::route::{resolve, Route, RouteContext};
use crate::dom::{Event, ListenerId, Location, Node, Window};

/// Attribute that marks an anchor as handled by the router
pub const LINK_ATTR: &str = "data-link";

/// Router lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// Waiting for a navigation
    Idle,
    /// A view invocation is in flight
    Rendering,
}

/// Router behaviour chosen at mount time
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// When a navigation to the already rendered route rebuilds the view
    pub policy: RerenderPolicy,
    /// Honour `view_transition` requests when the window supports them
    pub view_transitions: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            policy: RerenderPolicy::Route,
            view_transitions: true,
        }
    }
}

/// Per-navigation options
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigateOptions {
    /// Wrap the swap in the window's view transition, if any
    pub view_transition: bool,
}

impl NavigateOptions {
    pub fn transition() -> Self {
        Self {
            view_transition: true,
        }
    }
}

struct Rendered {
    route: Weak<Route>,
    params: Params,
    location: Location,
}

struct PendingRender {
    generation: u64,
    route: Rc<Route>,
    ctx: RouteContext,
}

struct Listeners {
    click: ListenerId,
    popstate: ListenerId,
}

pub(crate) struct RouterInner {
    window: Window,
    container: Node,
    routes: Vec<Rc<Route>>,
    options: RouterOptions,
    /// Most recently requested render; identity comparison only
    current: RefCell<Option<Rendered>>,
    generation: Cell<u64>,
    in_flight: Cell<usize>,
    renders: Cell<usize>,
    state: watch::Sender<RouterState>,
    listeners: RefCell<Option<Listeners>>,
}

/// Client-side router
#[derive(Clone)]
pub struct Router(Rc<RouterInner>);

impl Router {
    /// Register `routes`, install the link and history listeners, and
    /// render the current location
    ///
    /// The first route doubles as the fallback for unmatched paths.
    pub async fn mount(
        window: &Window,
        container: &Node,
        routes: Vec<Route>,
        options: RouterOptions,
    ) -> RouterResult<Router> {
        if routes.is_empty() {
            return Err(RouterError::NoRoutes);
        }

        let (state, _) = watch::channel(RouterState::Idle);
        let inner = Rc::new(RouterInner {
            window: window.clone(),
            container: container.clone(),
            routes: routes.into_iter().map(Rc::new).collect(),
            options,
            current: RefCell::new(None),
            generation: Cell::new(0),
            in_flight: Cell::new(0),
            renders: Cell::new(0),
            state,
            listeners: RefCell::new(None),
        });

        inner.install_listeners();
        info!(
            "Router mounted with {} routes ({:?})",
            inner.routes.len(),
            options.policy
        );

        if let Some(pending) = inner.prepare(false) {
            inner.begin();
            inner.render(pending, false).await;
            inner.finish();
        }

        Ok(Router(inner))
    }

    /// Push `path` onto the history and render it
    pub fn navigate(&self, path: &str, options: NavigateOptions) -> JoinHandle<()> {
        self.0.navigate(path, options)
    }

    /// Render the current location again, bypassing the skip rule
    pub fn refresh(&self) -> JoinHandle<()> {
        self.0.spawn_render(true, false)
    }

    /// Remove the router's listeners; the container keeps its last view
    pub fn unmount(&self) {
        self.0.remove_listeners();
        info!("Router unmounted");
    }

    /// Weak handle for views
    pub fn navigator(&self) -> Navigator {
        Navigator(Rc::downgrade(&self.0))
    }

    pub fn state(&self) -> RouterState {
        *self.0.state.borrow()
    }

    /// Watch state changes
    pub fn subscribe_state(&self) -> watch::Receiver<RouterState> {
        self.0.state.subscribe()
    }

    /// Wait until no render is in flight
    pub async fn settled(&self) {
        let mut rx = self.0.state.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel
        let _ = rx.wait_for(|state| *state == RouterState::Idle).await;
    }

    /// Number of view invocations so far
    pub fn renders(&self) -> usize {
        self.0.renders.get()
    }

    /// Pattern of the most recently requested route
    pub fn current_pattern(&self) -> Option<String> {
        let current = self.0.current.borrow();
        let route = current.as_ref()?.route.upgrade()?;
        Some(route.pattern().as_str().to_string())
    }

    pub fn container(&self) -> &Node {
        &self.0.container
    }

    pub fn window(&self) -> &Window {
        &self.0.window
    }

    pub fn is_mounted(&self) -> bool {
        self.0.listeners.borrow().is_some()
    }
}

impl RouterInner {
    fn install_listeners(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let click = self
            .window
            .document()
            .add_event_listener("click", move |event| {
                if let Some(inner) = weak.upgrade() {
                    inner.intercept_click(event);
                }
            });

        let weak = Rc::downgrade(self);
        let popstate = self.window.on_popstate(move |location| {
            if let Some(inner) = weak.upgrade() {
                debug!("History moved to {}", location);
                inner.spawn_render(false, false);
            }
        });

        *self.listeners.borrow_mut() = Some(Listeners { click, popstate });
    }

    fn remove_listeners(&self) {
        if let Some(listeners) = self.listeners.borrow_mut().take() {
            self.window.document().remove_event_listener(listeners.click);
            self.window.remove_popstate_listener(listeners.popstate);
        }
    }

    /// Take over clicks on marked same-origin links
    ///
    /// Clicks whose default action a component already cancelled are left
    /// to that component.
    fn intercept_click(self: &Rc<Self>, event: &Event) {
        if event.default_prevented() {
            return;
        }
        let Some(target) = event.target() else {
            return;
        };
        let Some(link) = target.closest(|n| n.has_attribute(LINK_ATTR)) else {
            return;
        };
        let Some(href) = link.get_attribute("href") else {
            return;
        };
        let Some(path) = self.window.same_origin_path(&href) else {
            trace!("Leaving cross-origin link {} to the platform", href);
            return;
        };

        event.prevent_default();
        self.navigate(&path, NavigateOptions::default());
    }

    fn navigate(self: &Rc<Self>, path: &str, options: NavigateOptions) -> JoinHandle<()> {
        debug!("Navigate to {}", path);
        self.window.push_state(path);
        self.spawn_render(false, options.view_transition)
    }

    /// Resolve the current location now and render it on a local task
    ///
    /// A skipped render still returns a handle, to a task with nothing to do.
    fn spawn_render(self: &Rc<Self>, force: bool, transition: bool) -> JoinHandle<()> {
        let Some(pending) = self.prepare(force) else {
            return tokio::task::spawn_local(async {});
        };
        self.begin();
        let inner = self.clone();
        tokio::task::spawn_local(async move {
            inner.render(pending, transition).await;
            inner.finish();
        })
    }

    fn begin(&self) {
        self.in_flight.set(self.in_flight.get() + 1);
        self.state.send_replace(RouterState::Rendering);
    }

    fn finish(&self) {
        let remaining = self.in_flight.get().saturating_sub(1);
        self.in_flight.set(remaining);
        if remaining == 0 {
            self.state.send_replace(RouterState::Idle);
        }
    }

    fn should_skip(&self, route: &Rc<Route>, params: &Params, location: &Location) -> bool {
        let current = self.current.borrow();
        let Some(rendered) = current.as_ref() else {
            return false;
        };
        match self.options.policy {
            RerenderPolicy::Route => {
                rendered
                    .route
                    .upgrade()
                    .is_some_and(|r| Rc::ptr_eq(&r, route))
                    && rendered.params == *params
            }
            RerenderPolicy::Location => {
                rendered.location.pathname == location.pathname
                    && rendered.location.search == location.search
            }
        }
    }

    /// Match the current location and claim the next generation
    ///
    /// Runs synchronously when the navigation is requested, so the route
    /// info the skip rule compares against is always the latest request.
    fn prepare(self: &Rc<Self>, force: bool) -> Option<PendingRender> {
        let location = self.window.location();
        let matched = resolve(&self.routes, &location.pathname)?;

        if !force && self.should_skip(&matched.route, &matched.params, &location) {
            debug!("Skipping render of {}: already showing it", location);
            return None;
        }
        if matched.fallback {
            debug!("No route for {}, using {}", location.pathname, matched.route.pattern());
        }

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        *self.current.borrow_mut() = Some(Rendered {
            route: Rc::downgrade(&matched.route),
            params: matched.params.clone(),
            location: location.clone(),
        });

        Some(PendingRender {
            generation,
            route: matched.route,
            ctx: RouteContext {
                params: matched.params,
                location,
                navigator: Navigator(Rc::downgrade(self)),
            },
        })
    }

    async fn render(self: &Rc<Self>, pending: PendingRender, transition: bool) {
        let PendingRender {
            generation,
            route,
            ctx,
        } = pending;
        let inner = self.clone();
        let update = async move {
            inner.renders.set(inner.renders.get() + 1);
            let node = route.invoke(ctx).await;
            inner.attach(generation, &node);
        };

        let transitions = if transition && self.options.view_transitions {
            self.window.view_transitions()
        } else {
            None
        };
        match transitions {
            Some(transitions) => {
                if let Err(e) = transitions.start(Box::pin(update)).await {
                    debug!("{}", e);
                }
            }
            None => update.await,
        }
    }

    fn attach(&self, generation: u64, node: &Node) {
        if generation != self.generation.get() {
            debug!(
                "Discarding render {} superseded by {}",
                generation,
                self.generation.get()
            );
            return;
        }
        self.container.clear_children();
        self.container.append_child(node);
        trace!("Attached render {}", generation);
    }
}

impl Drop for RouterInner {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}

/// Weak handle to a router, given to views
///
/// Calls on a navigator whose router is gone do nothing.
#[derive(Clone, Default)]
pub struct Navigator(Weak<RouterInner>);

impl Navigator {
    /// A navigator with no router behind it
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn navigate(&self, path: &str, options: NavigateOptions) -> Option<JoinHandle<()>> {
        match self.0.upgrade() {
            Some(inner) => Some(inner.navigate(path, options)),
            None => {
                debug!("Navigation to {} without a router", path);
                None
            }
        }
    }

    /// Re-render the current location
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        self.0.upgrade().map(|inner| inner.spawn_render(true, false))
    }

    /// Location of the window the router is mounted in
    pub fn location(&self) -> Option<Location> {
        self.0.upgrade().map(|inner| inner.window.location())
    }

    /// Ask the window's confirm hook; `false` without a router
    pub fn confirm(&self, message: &str) -> bool {
        self.0
            .upgrade()
            .is_some_and(|inner| inner.window.confirm(message))
    }

    /// Replace the current history entry without rendering
    pub fn replace(&self, path: &str) {
        if let Some(inner) = self.0.upgrade() {
            inner.window.replace_state(path);
        }
    }
}
