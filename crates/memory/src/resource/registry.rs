//! Process-wide default resource
//!
//! Strategies constructed without an explicit upstream read the default at
//! construction time. The slot is an [`ArcSwap`], so reads are lock-free and
//! replacement is a single atomic swap. A replaced resource stays alive for
//! as long as any strategy still holds it.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

#[cfg(feature = "logging")]
use tracing::debug;

use super::{SharedResource, system_resource};

static DEFAULT_RESOURCE: LazyLock<ArcSwap<SharedResource>> =
    LazyLock::new(|| ArcSwap::from_pointee(system_resource()));

/// Current default resource
///
/// The system resource unless [`set_default_resource`] installed another one.
#[inline]
#[must_use]
pub fn get_default_resource() -> SharedResource {
    let guard = DEFAULT_RESOURCE.load();
    (**guard).clone()
}

/// Installs `resource` as the default and returns the previous default
///
/// `None` restores the system resource.
pub fn set_default_resource(resource: Option<SharedResource>) -> SharedResource {
    let next = resource.unwrap_or_else(system_resource);
    let previous = DEFAULT_RESOURCE.swap(Arc::new(next));

    #[cfg(feature = "logging")]
    debug!("default memory resource replaced");

    Arc::unwrap_or_clone(previous)
}

/// Installs `resource` until the returned guard is dropped
pub fn scoped_default_resource(resource: SharedResource) -> DefaultResourceGuard {
    DefaultResourceGuard {
        previous: Some(set_default_resource(Some(resource))),
    }
}

/// Restores the previous default resource on drop
#[must_use = "the previous default is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct DefaultResourceGuard {
    previous: Option<SharedResource>,
}

impl DefaultResourceGuard {
    /// Default that will be restored
    #[must_use]
    pub fn previous(&self) -> Option<&SharedResource> {
        self.previous.as_ref()
    }
}

impl Drop for DefaultResourceGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            set_default_resource(Some(previous));
        }
    }
}
