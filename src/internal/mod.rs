//! Internal implementation details.

mod cache;

pub(crate) use cache::InstanceCache;
