//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod pending_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::{MailerAdapter, ServerDeps};
pub use pending_store::InMemoryPendingStore;
pub use test_dependencies::{
    MockNotificationSender, MockUserDirectory, SentNotification, SequenceCodeGenerator,
};
pub use traits::*;
