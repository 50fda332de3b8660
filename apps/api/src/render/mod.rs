// Print-ready document preview. Pure presentation: no state, no model calls.

pub mod handlers;
pub mod html;
