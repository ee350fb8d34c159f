//! Local implementations of the authkit store and confirmation traits.
//!
//! Everything here keeps its state in memory, which makes it suitable for the
//! demo server and for tests. Production deployments supply their own stores.

mod confirm;
mod profiles;
mod users;

pub use confirm::{LinkConfirmer, LogMailer, MailMessage, Mailer};
pub use profiles::InMemoryProfileStore;
pub use users::InMemoryUserStore;
