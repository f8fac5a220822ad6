//! Mocked animations recording their lifecycle (useful for tests mostly).

mod animation;

pub use animation::{Entry, Event, Journal, MockAnimation};
