use std::sync::Arc;

/// Change notification delivered to registered handlers. Per key, the
/// delivery order follows the watch source's emission order.
#[derive(Debug)]
pub enum ResourceEvent<T> {
    Added(Arc<T>),
    Updated { old: Arc<T>, new: Arc<T> },
    Deleted(Arc<T>),
}

impl<T> Clone for ResourceEvent<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Added(object) => Self::Added(object.clone()),
            Self::Updated { old, new } => Self::Updated {
                old: old.clone(),
                new: new.clone(),
            },
            Self::Deleted(object) => Self::Deleted(object.clone()),
        }
    }
}

/// Callback set invoked on add/update/delete events for a watched object.
///
/// Handlers run on the watch source's delivery path and must not block.
pub trait EventHandler<T>: Send + Sync + 'static {
    fn handle(
        &self,
        event: ResourceEvent<T>,
    );
}

impl<T, F> EventHandler<T> for F
where
    T: Send + Sync + 'static,
    F: Fn(ResourceEvent<T>) + Send + Sync + 'static,
{
    fn handle(
        &self,
        event: ResourceEvent<T>,
    ) {
        self(event)
    }
}
