use crate::{Reconciler, RoutingResolver, StatusStore};
use futures::prelude::*;
use tracing::{info_span, trace, warn, Instrument};
use vamp_router_controller_core::RouterApi;
use vamp_router_controller_k8s_api::{watcher, BackendObject, Event};

/// Feeds a watch through a reconciler until the watch ends.
///
/// Events are handled strictly in order; an event is not read until the
/// previous one has been handled.
pub async fn run<K, R, P, S>(
    reconciler: Reconciler<R, P, S>,
    events: impl Stream<Item = watcher::Event<K>>,
) where
    K: Into<BackendObject>,
    R: RoutingResolver,
    P: RouterApi + Send + Sync,
    S: StatusStore + Send + Sync,
{
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        if let Some(event) = Event::from_watcher(event) {
            handle(&reconciler, event).await;
        }
    }
    trace!("Watch ended");
}

/// Handles a single event. Failures are logged and do not propagate.
pub async fn handle<R, P, S>(reconciler: &Reconciler<R, P, S>, event: Event)
where
    R: RoutingResolver,
    P: RouterApi + Send + Sync,
    S: StatusStore + Send + Sync,
{
    if !reconciler.should_handle(event.object()) {
        return;
    }

    match event {
        Event::Added(mut object) | Event::Modified(mut object) => {
            let span = info_span!(
                "reconcile",
                kind = object.kind(),
                namespace = object.namespace().unwrap_or_default(),
                name = object.name(),
            );
            if let Err(error) = reconciler.reconcile(&mut object).instrument(span).await {
                warn!(
                    kind = object.kind(),
                    namespace = object.namespace().unwrap_or_default(),
                    name = object.name(),
                    %error,
                    "Failed to reconcile routing"
                );
            }
        }
        Event::Deleted(object) => reconciler.remove_routing(&object),
    }
}
