//! Inline stroke icons

use crate::builder::{h, Props};
use crate::children;
use crate::dom::Node;

pub const PENCIL: &str = "M11 5H6a2 2 0 00-2 2v11a2 2 0 002 2h11a2 2 0 002-2v-5m-1.414-9.414a2 2 0 112.828 2.828L11.828 15H9v-2.828l8.586-8.586z";
pub const PLUS: &str = "M12 4v16m8-8H4";
pub const SEARCH: &str = "M21 21l-6-6m2-5a7 7 0 11-14 0 7 7 0 0114 0z";
pub const CHEVRON_LEFT: &str = "M15 19l-7-7 7-7";
pub const CHECK: &str = "M5 13l4 4L19 7";
pub const TRASH: &str = "M19 7l-.867 12.142A2 2 0 0116.138 21H7.862a2 2 0 01-1.995-1.858L5 7m5 4v6m4-6v6m1-10V4a1 1 0 00-1-1h-4a1 1 0 00-1 1v3M4 7h16";
pub const DOCUMENT: &str = "M9 12h6m-6 4h6m2 5H7a2 2 0 01-2-2V5a2 2 0 012-2h5.586a1 1 0 01.707.293l5.414 5.414a1 1 0 01.293.707V19a2 2 0 01-2 2z";
pub const CLOSE: &str = "M6 18L18 6M6 6l12 12";
pub const CHECK_CIRCLE: &str = "M9 12l2 2 4-4m6 2a9 9 0 11-18 0 9 9 0 0118 0z";
pub const X_CIRCLE: &str = "M10 14l2-2m0 0l2-2m-2 2l-2-2m2 2l2 2m7-2a9 9 0 11-18 0 9 9 0 0118 0z";
pub const WARNING: &str = "M12 9v2m0 4h.01m-6.938 4h13.856c1.54 0 2.502-1.667 1.732-3L13.732 4c-.77-1.333-2.694-1.333-3.464 0L3.34 16c-.77 1.333.192 3 1.732 3z";
pub const INFO: &str = "M13 16h-1v-4h-1m1-4h.01M21 12a9 9 0 11-18 0 9 9 0 0118 0z";

/// 24x24 outline icon drawing `path`
pub fn icon(class: &str, path: &str) -> Node {
    h(
        "svg",
        Props::new()
            .class(class)
            .attr("fill", "none")
            .attr("stroke", "currentColor")
            .attr("viewBox", "0 0 24 24"),
        children![h(
            "path",
            Props::new()
                .attr("stroke-linecap", "round")
                .attr("stroke-linejoin", "round")
                .attr("stroke-width", 2)
                .attr("d", path),
            children![],
        )],
    )
}
