//! Route table entries

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures_util::future::{self, LocalBoxFuture};

use super::navigator::Navigator;
use super::pattern::{Params, RoutePattern};
use crate::dom::{Location, Node};

/// Future produced by an asynchronous view
pub type ViewFuture = LocalBoxFuture<'static, Node>;

/// Function that renders a route
#[derive(Clone)]
pub enum View {
    Sync(Rc<dyn Fn(RouteContext) -> Node>),
    Async(Rc<dyn Fn(RouteContext) -> ViewFuture>),
}

/// What a view is called with
#[derive(Clone)]
pub struct RouteContext {
    pub params: Params,
    pub location: Location,
    pub navigator: Navigator,
}

impl RouteContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.location.query_param(name)
    }

    pub fn path(&self) -> &str {
        &self.location.pathname
    }
}

/// A pattern and the view it renders
pub struct Route {
    pattern: RoutePattern,
    view: View,
}

impl Route {
    /// Route with an asynchronous view
    pub fn new<F, Fut>(pattern: &str, view: F) -> Self
    where
        F: Fn(RouteContext) -> Fut + 'static,
        Fut: Future<Output = Node> + 'static,
    {
        Self {
            pattern: RoutePattern::parse(pattern),
            view: View::Async(Rc::new(move |ctx: RouteContext| -> ViewFuture {
                Box::pin(view(ctx))
            })),
        }
    }

    /// Route with a synchronous view
    pub fn sync(pattern: &str, view: impl Fn(RouteContext) -> Node + 'static) -> Self {
        Self {
            pattern: RoutePattern::parse(pattern),
            view: View::Sync(Rc::new(view)),
        }
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub(crate) fn invoke(&self, ctx: RouteContext) -> ViewFuture {
        match &self.view {
            View::Sync(view) => Box::pin(future::ready(view(ctx))),
            View::Async(view) => view(ctx),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Result of resolving a path
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Rc<Route>,
    pub params: Params,
    /// No pattern matched; this is the first route
    pub fallback: bool,
}

/// First route whose pattern matches `path`
///
/// Falls back to the first registered route with empty parameters. `None`
/// only for an empty table.
pub fn resolve(routes: &[Rc<Route>], path: &str) -> Option<RouteMatch> {
    let found = routes.iter().find_map(|route| {
        route.pattern.matches(path).map(|params| RouteMatch {
            route: route.clone(),
            params,
            fallback: false,
        })
    });

    found.or_else(|| {
        routes.first().map(|route| RouteMatch {
            route: route.clone(),
            params: Params::default(),
            fallback: true,
        })
    })
}
