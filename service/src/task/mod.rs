//! Background [`Task`]s definitions.

mod background;
pub mod relay_changes;

pub use common::Handler as Task;

pub use self::{
    background::{Background, Failure},
    relay_changes::RelayChanges,
};
