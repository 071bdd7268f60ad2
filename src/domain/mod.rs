// Domain layer - Pure types and rules, no I/O
pub mod driver;
pub mod location;
pub mod selection;
pub mod viewport;
