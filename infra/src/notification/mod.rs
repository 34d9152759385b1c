//! Recipient notification
//!
//! Email delivery is out of scope; [`LogEntryNotifier`] records each
//! notification in the log and, in development, prints the entry link.

mod log_notifier;


pub use log_notifier::LogEntryNotifier;
