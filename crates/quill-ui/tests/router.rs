use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use quill_core::RerenderPolicy;
use quill_ui::children;
use quill_ui::dom::{TransitionError, ViewTransitions};
use quill_ui::router::{
    NavigateOptions, Route, RouteContext, Router, RouterError, RouterOptions, RouterState,
    LINK_ATTR,
};
use quill_ui::{h, Node, Props, Window, DEFAULT_ORIGIN};
use tokio::sync::oneshot;
use tokio::task::LocalSet;

fn label(text: impl Into<String>) -> Node {
    let text: String = text.into();
    h("p", Props::new(), children![text])
}

fn basic_routes() -> Vec<Route> {
    vec![
        Route::sync("/", |_| label("home")),
        Route::sync("/notes/new", |_| label("new")),
        Route::sync("/notes/:noteId", |ctx: RouteContext| {
            label(format!("note {}", ctx.param("noteId").unwrap_or_default()))
        }),
    ]
}

async fn mount_at(path: &str, routes: Vec<Route>, options: RouterOptions) -> (Window, Router) {
    let window = Window::with_url(DEFAULT_ORIGIN, path).unwrap();
    let outlet = h("div", Props::new().id("router-outlet"), children![]);
    window.body().append_child(&outlet);
    let router = Router::mount(&window, &outlet, routes, options)
        .await
        .unwrap();
    (window, router)
}

async fn settle(router: &Router) {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    router.settled().await;
}

#[tokio::test]
async fn test_mount_renders_current_location() {
    LocalSet::new()
        .run_until(async {
            let (_, router) = mount_at("/notes/42", basic_routes(), RouterOptions::default()).await;
            assert_eq!(router.container().text_content(), "note 42");
            assert_eq!(router.current_pattern().as_deref(), Some("/notes/:noteId"));
            assert_eq!(router.renders(), 1);
            assert_eq!(router.state(), RouterState::Idle);
            assert!(router.is_mounted());
        })
        .await;
}

#[tokio::test]
async fn test_static_route_wins_over_param_route() {
    LocalSet::new()
        .run_until(async {
            let (_, router) = mount_at("/notes/new", basic_routes(), RouterOptions::default()).await;
            assert_eq!(router.container().text_content(), "new");
        })
        .await;
}

#[tokio::test]
async fn test_unmatched_path_falls_back_to_first_route() {
    LocalSet::new()
        .run_until(async {
            let (_, router) = mount_at("/nowhere/at/all", basic_routes(), RouterOptions::default()).await;
            assert_eq!(router.container().text_content(), "home");
            assert_eq!(router.current_pattern().as_deref(), Some("/"));
        })
        .await;
}

#[tokio::test]
async fn test_mount_without_routes_fails() {
    LocalSet::new()
        .run_until(async {
            let window = Window::with_url(DEFAULT_ORIGIN, "/").unwrap();
            let outlet = h("div", Props::new(), children![]);
            let result = Router::mount(&window, &outlet, Vec::new(), RouterOptions::default()).await;
            assert!(matches!(result, Err(RouterError::NoRoutes)));
        })
        .await;
}

#[tokio::test]
async fn test_navigate_pushes_history_and_renders() {
    LocalSet::new()
        .run_until(async {
            let (window, router) = mount_at("/", basic_routes(), RouterOptions::default()).await;

            router
                .navigate("/notes/7", NavigateOptions::default())
                .await
                .unwrap();

            assert_eq!(window.location().pathname, "/notes/7");
            assert_eq!(window.history_len(), 2);
            assert_eq!(router.container().text_content(), "note 7");
            assert_eq!(router.container().child_count(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_same_route_and_params_is_not_rerendered() {
    LocalSet::new()
        .run_until(async {
            let (_, router) = mount_at("/notes/5", basic_routes(), RouterOptions::default()).await;
            let first = router.container().first_child().unwrap();

            router
                .navigate("/notes/5", NavigateOptions::default())
                .await
                .unwrap();
            assert_eq!(router.renders(), 1);
            assert!(router.container().first_child().unwrap().ptr_eq(&first));

            router
                .navigate("/notes/6", NavigateOptions::default())
                .await
                .unwrap();
            assert_eq!(router.renders(), 2);
            assert_eq!(router.container().text_content(), "note 6");
        })
        .await;
}

#[tokio::test]
async fn test_route_policy_ignores_query_changes() {
    LocalSet::new()
        .run_until(async {
            let (_, router) = mount_at("/", basic_routes(), RouterOptions::default()).await;
            router
                .navigate("/?q=milk", NavigateOptions::default())
                .await
                .unwrap();
            assert_eq!(router.renders(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_location_policy_rerenders_on_query_change() {
    LocalSet::new()
        .run_until(async {
            let options = RouterOptions {
                policy: RerenderPolicy::Location,
                ..RouterOptions::default()
            };
            let (_, router) = mount_at("/", basic_routes(), options).await;

            router
                .navigate("/?q=milk", NavigateOptions::default())
                .await
                .unwrap();
            assert_eq!(router.renders(), 2);

            router
                .navigate("/?q=milk", NavigateOptions::default())
                .await
                .unwrap();
            assert_eq!(router.renders(), 2);
        })
        .await;
}

#[tokio::test]
async fn test_refresh_bypasses_skip_rule() {
    LocalSet::new()
        .run_until(async {
            let (_, router) = mount_at("/notes/5", basic_routes(), RouterOptions::default()).await;
            router.refresh().await.unwrap();
            router.navigator().refresh().unwrap().await.unwrap();
            assert_eq!(router.renders(), 3);
            assert_eq!(router.container().text_content(), "note 5");
        })
        .await;
}

/// Routes whose views wait for a per-path gate before resolving
fn gated_routes(gates: Rc<RefCell<HashMap<String, oneshot::Receiver<()>>>>) -> Vec<Route> {
    vec![
        Route::sync("/", |_| label("home")),
        Route::new("/slow/:name", move |ctx: RouteContext| {
            let gates = gates.clone();
            async move {
                let name = ctx.param("name").unwrap_or_default().to_string();
                let gate = gates.borrow_mut().remove(&name);
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                label(name)
            }
        }),
    ]
}

fn gate(
    gates: &Rc<RefCell<HashMap<String, oneshot::Receiver<()>>>>,
    name: &str,
) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    gates.borrow_mut().insert(name.to_string(), rx);
    tx
}

#[tokio::test]
async fn test_latest_navigation_wins_when_it_resolves_first() {
    LocalSet::new()
        .run_until(async {
            let gates = Rc::new(RefCell::new(HashMap::new()));
            let release_a = gate(&gates, "a");
            let release_b = gate(&gates, "b");
            let (_, router) = mount_at("/", gated_routes(gates.clone()), RouterOptions::default()).await;

            let a = router.navigate("/slow/a", NavigateOptions::default());
            let b = router.navigate("/slow/b", NavigateOptions::default());
            assert_eq!(router.state(), RouterState::Rendering);

            release_b.send(()).unwrap();
            b.await.unwrap();
            assert_eq!(router.container().text_content(), "b");

            release_a.send(()).unwrap();
            a.await.unwrap();
            assert_eq!(router.container().text_content(), "b");
            assert_eq!(router.renders(), 3);
            assert_eq!(router.state(), RouterState::Idle);
        })
        .await;
}

#[tokio::test]
async fn test_latest_navigation_wins_when_it_resolves_last() {
    LocalSet::new()
        .run_until(async {
            let gates = Rc::new(RefCell::new(HashMap::new()));
            let release_a = gate(&gates, "a");
            let release_b = gate(&gates, "b");
            let (_, router) = mount_at("/", gated_routes(gates.clone()), RouterOptions::default()).await;

            let a = router.navigate("/slow/a", NavigateOptions::default());
            let b = router.navigate("/slow/b", NavigateOptions::default());

            release_a.send(()).unwrap();
            a.await.unwrap();
            // Superseded: the container still shows the previous view
            assert_eq!(router.container().text_content(), "home");

            release_b.send(()).unwrap();
            b.await.unwrap();
            assert_eq!(router.container().text_content(), "b");
        })
        .await;
}

#[tokio::test]
async fn test_data_link_click_is_routed() {
    LocalSet::new()
        .run_until(async {
            let (window, router) = mount_at("/", basic_routes(), RouterOptions::default()).await;
            let inner = h("span", Props::new(), children!["open"]);
            let link = h(
                "a",
                Props::new().attr("href", "/notes/9").attr(LINK_ATTR, true),
                children![&inner],
            );
            window.body().append_child(&link);

            let proceed = inner.click();
            assert!(!proceed);
            settle(&router).await;

            assert_eq!(window.location().pathname, "/notes/9");
            assert_eq!(router.container().text_content(), "note 9");
        })
        .await;
}

fn marked_link(window: &Window, href: &str) -> Node {
    let link = h(
        "a",
        Props::new().attr("href", href).attr(LINK_ATTR, true),
        children![href.to_string()],
    );
    window.body().append_child(&link);
    link
}

#[tokio::test]
async fn test_relative_link_resolves_against_current_page() {
    LocalSet::new()
        .run_until(async {
            let (window, router) =
                mount_at("/notes/5", basic_routes(), RouterOptions::default()).await;
            let link = marked_link(&window, "6");

            assert!(!link.click());
            settle(&router).await;

            assert_eq!(window.location().pathname, "/notes/6");
            assert_eq!(router.container().text_content(), "note 6");
        })
        .await;
}

#[tokio::test]
async fn test_fragment_link_stays_on_current_page() {
    LocalSet::new()
        .run_until(async {
            let (window, router) =
                mount_at("/notes/5", basic_routes(), RouterOptions::default()).await;
            let link = marked_link(&window, "#top");

            assert!(!link.click());
            settle(&router).await;

            assert_eq!(window.location().href(), "/notes/5#top");
            assert_eq!(window.history_len(), 2);
            // Same route and params: nothing to re-render
            assert_eq!(router.renders(), 1);
            assert_eq!(router.container().text_content(), "note 5");
        })
        .await;
}

#[tokio::test]
async fn test_absolute_same_origin_link_is_routed() {
    LocalSet::new()
        .run_until(async {
            let (window, router) =
                mount_at("/notes/5", basic_routes(), RouterOptions::default()).await;
            let link = marked_link(&window, "HTTP://LOCALHOST/notes/new");

            assert!(!link.click());
            settle(&router).await;

            assert_eq!(window.location().pathname, "/notes/new");
            assert_eq!(router.container().text_content(), "new");
        })
        .await;
}

#[tokio::test]
async fn test_unmarked_and_cross_origin_links_are_ignored() {
    LocalSet::new()
        .run_until(async {
            let (window, router) = mount_at("/", basic_routes(), RouterOptions::default()).await;
            let plain = h("a", Props::new().attr("href", "/notes/1"), children!["plain"]);
            let external = h(
                "a",
                Props::new()
                    .attr("href", "https://elsewhere.example/notes/2")
                    .attr(LINK_ATTR, true),
                children!["external"],
            );
            window.body().append_child(&plain);
            window.body().append_child(&external);

            assert!(plain.click());
            assert!(external.click());
            settle(&router).await;

            assert_eq!(window.location().pathname, "/");
            assert_eq!(router.renders(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_cancelled_link_click_is_left_alone() {
    LocalSet::new()
        .run_until(async {
            let (window, router) = mount_at("/", basic_routes(), RouterOptions::default()).await;
            let link = h(
                "a",
                Props::new()
                    .attr("href", "/notes/3")
                    .attr(LINK_ATTR, true)
                    .on("click", |e| e.prevent_default()),
                children!["mine"],
            );
            window.body().append_child(&link);

            link.click();
            settle(&router).await;
            assert_eq!(window.location().pathname, "/");
        })
        .await;
}

#[tokio::test]
async fn test_back_and_forward_render_history() {
    LocalSet::new()
        .run_until(async {
            let (window, router) = mount_at("/", basic_routes(), RouterOptions::default()).await;
            router
                .navigate("/notes/1", NavigateOptions::default())
                .await
                .unwrap();

            assert!(window.back());
            settle(&router).await;
            assert_eq!(router.container().text_content(), "home");

            assert!(window.forward());
            settle(&router).await;
            assert_eq!(router.container().text_content(), "note 1");
        })
        .await;
}

#[tokio::test]
async fn test_unmount_removes_listeners() {
    LocalSet::new()
        .run_until(async {
            let (window, router) = mount_at("/", basic_routes(), RouterOptions::default()).await;
            assert_eq!(window.document().listener_count("click"), 1);
            assert_eq!(window.popstate_listener_count(), 1);

            router.unmount();
            assert!(!router.is_mounted());
            assert_eq!(window.popstate_listener_count(), 0);
            assert_eq!(window.document().listener_count("click"), 0);

            window.push_state("/notes/4");
            assert!(window.back());
            assert!(window.forward());
            settle(&router).await;
            assert_eq!(window.location().pathname, "/notes/4");
            assert_eq!(router.container().text_content(), "home");
        })
        .await;
}

/// Runs the update, then reports the animation as skipped
struct FlakyTransitions;

impl ViewTransitions for FlakyTransitions {
    fn start(
        &self,
        update: LocalBoxFuture<'static, ()>,
    ) -> LocalBoxFuture<'static, Result<(), TransitionError>> {
        Box::pin(async move {
            update.await;
            Err(TransitionError::Skipped)
        })
    }
}

#[tokio::test]
async fn test_failed_transition_still_attaches_view() {
    LocalSet::new()
        .run_until(async {
            let (window, router) = mount_at("/", basic_routes(), RouterOptions::default()).await;
            window.set_view_transitions(Some(Rc::new(FlakyTransitions)));

            router
                .navigate("/notes/8", NavigateOptions::transition())
                .await
                .unwrap();
            assert_eq!(router.container().text_content(), "note 8");
        })
        .await;
}

#[tokio::test]
async fn test_state_watch_reports_rendering() {
    LocalSet::new()
        .run_until(async {
            let gates = Rc::new(RefCell::new(HashMap::new()));
            let release = gate(&gates, "x");
            let (_, router) = mount_at("/", gated_routes(gates.clone()), RouterOptions::default()).await;
            let mut state = router.subscribe_state();

            let pending = router.navigate("/slow/x", NavigateOptions::default());
            state.changed().await.unwrap();
            assert_eq!(*state.borrow_and_update(), RouterState::Rendering);

            release.send(()).unwrap();
            pending.await.unwrap();
            assert_eq!(*state.borrow(), RouterState::Idle);
        })
        .await;
}
