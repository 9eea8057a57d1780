//! Client-side stores shared by every front-end.
//!
//! DESIGN
//! ======
//! Each store is an owned object that front-ends share through `Arc` from the
//! application root. State is split by domain (`session`, `favorites`) and
//! the two stores never call each other; logout leaves favorites alone.

pub mod favorites;
pub mod nav;
pub mod session;
