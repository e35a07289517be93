//! Session domain: value objects, in-memory aggregates and checkout events.
pub mod aggregates;
pub mod events;
pub mod value_objects;
