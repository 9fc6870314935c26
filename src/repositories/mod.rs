mod link;
#[cfg(test)]
pub mod memory;

pub use link::{LinkRepository, LinkRepositoryTrait};
#[cfg(test)]
pub use link::MockLinkRepositoryTrait;
