//! Public traits at the resolution seam.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
