//! Pure status presentation and policy engine.
//!
//! Everything in this module is side-effect free: "today" and the theme
//! store are injected by the caller, so the same logic runs identically
//! in handlers and in tests.

mod badge;
mod policy;
mod series;
mod severity;
mod theme;

pub use badge::*;
pub use policy::*;
pub use series::*;
pub use severity::*;
pub use theme::*;
