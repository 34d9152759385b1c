pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;

pub use r#trait::EntryRepository;

#[cfg(any(test, feature = "mock-repositories"))]
pub mod mock;
#[cfg(any(test, feature = "mock-repositories"))]
pub use mock::MockEntryRepository;

#[cfg(test)]
mod tests;
