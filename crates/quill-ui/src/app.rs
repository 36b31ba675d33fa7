//! Application shell
//!
//! [`App::mount`] wires one session together: it seeds the store when
//! asked to, mounts the outlet and the toast container into the body,
//! registers the three routes and listens for changes made by other
//! sessions on the shared broadcast channel.

use std::rc::Rc;

use quill_core::broadcast::CHANNEL_NAME;
use quill_core::{
    BroadcastChannel, BroadcastEvent, BroadcastHub, ChangeKind, Config, NoteStore, Subscription,
};
use tracing::{debug, info, warn};

use crate::builder::{h, Props};
use crate::children;
use crate::dom::{Node, Window};
use crate::router::{Route, Router, RouterOptions, RouterResult};
use crate::toast::Toasts;
use crate::views;

pub const HOME_ROUTE: &str = "/";
pub const NEW_NOTE_ROUTE: &str = "/notes/new";
pub const NOTE_DETAIL_ROUTE: &str = "/notes/:noteId";

/// Id of the node the router renders into
pub const OUTLET_ID: &str = "router-outlet";

/// Services every view receives
///
/// Holds no window or node handles, so views can keep clones in their
/// listeners without keeping a replaced view alive.
#[derive(Clone)]
pub struct AppContext {
    pub store: Rc<NoteStore>,
    pub toasts: Toasts,
    pub channel: Rc<BroadcastChannel>,
}

/// One mounted session
pub struct App {
    window: Window,
    root: Node,
    outlet: Node,
    router: Router,
    context: AppContext,
    _subscription: Subscription,
}

impl App {
    /// Mount the app into `window`'s body and render the current location
    ///
    /// Must be called inside a `tokio::task::LocalSet`.
    pub async fn mount(
        window: &Window,
        config: &Config,
        store: Rc<NoteStore>,
        hub: &BroadcastHub,
    ) -> RouterResult<App> {
        if config.seed_samples {
            match store.initialize_sample_data().await {
                Ok(0) => {}
                Ok(seeded) => info!("Seeded {} sample notes", seeded),
                Err(e) => warn!("Failed to seed sample notes: {}", e),
            }
        }

        let context = AppContext {
            store,
            toasts: Toasts::new(config.toast_timeout()),
            channel: Rc::new(hub.channel(CHANNEL_NAME)),
        };

        let outlet = h("div", Props::new().id(OUTLET_ID), children![]);
        let root = h(
            "div",
            Props::new().id("app"),
            children![&outlet, context.toasts.container()],
        );
        window.body().append_child(&root);

        let options = RouterOptions {
            policy: config.rerender,
            view_transitions: config.view_transitions,
        };
        let router = Router::mount(window, &outlet, routes(&context), options).await?;

        let listener = router.clone();
        let subscription = context
            .channel
            .subscribe(move |event| on_remote_change(&listener, event));

        info!("App mounted at {}", window.location());
        Ok(App {
            window: window.clone(),
            root,
            outlet,
            router,
            context,
            _subscription: subscription,
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn toasts(&self) -> &Toasts {
        &self.context.toasts
    }

    pub fn outlet(&self) -> &Node {
        &self.outlet
    }

    /// Serialized markup of the current view
    pub fn outlet_html(&self) -> String {
        self.outlet
            .children()
            .iter()
            .map(Node::outer_html)
            .collect()
    }

    /// Wait until every pending render has attached
    pub async fn settled(&self) {
        self.router.settled().await;
    }

    /// Stop routing and remove the app from the body
    pub fn unmount(self) {
        self.router.unmount();
        self.root.detach();
        debug!("App unmounted from {}", self.window.location());
    }
}

fn routes(context: &AppContext) -> Vec<Route> {
    let home = context.clone();
    let new_note = context.clone();
    let detail = context.clone();
    vec![
        Route::new(HOME_ROUTE, move |ctx| views::home(home.clone(), ctx)),
        Route::sync(NEW_NOTE_ROUTE, move |ctx| {
            views::new_note(new_note.clone(), ctx)
        }),
        Route::new(NOTE_DETAIL_ROUTE, move |ctx| {
            views::note_detail(detail.clone(), ctx)
        }),
    ]
}

/// Re-render when another session changed what this one shows
fn on_remote_change(router: &Router, event: BroadcastEvent) {
    let location = router.window().location();
    let stale = match router.current_pattern().as_deref() {
        Some(HOME_ROUTE) => true,
        Some(NOTE_DETAIL_ROUTE) => {
            matches!(event.kind, ChangeKind::Updated | ChangeKind::Deleted)
                && event
                    .note_id
                    .is_some_and(|id| location.pathname == format!("/notes/{}", id))
        }
        _ => false,
    };

    if stale {
        debug!("Refreshing {} after remote {:?}", location, event.kind);
        router.refresh();
    }
}
