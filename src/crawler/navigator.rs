//! Navigation collaborator seam
//!
//! A [`Navigator`] loads one page at a time and publishes what happens during
//! the load as [`PageEvent`]s. Listeners receive events through a
//! [`Subscription`], which deregisters itself when dropped, so listeners never
//! outlive the visit that created them, even when navigation fails.

use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A network response observed while a page was loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedResponse {
    /// Final URL of the response
    pub url: String,
    /// Raw `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Response payload
    pub body: Vec<u8>,
}

/// Notification published during a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The page's DOM is available for queries
    ContentReady,
    /// A network response arrived
    Response(InterceptedResponse),
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    subscribers: HashMap<u64, UnboundedSender<PageEvent>>,
}

/// Registry of live event subscriptions
///
/// Cloning the hub yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new listener
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.insert(id, sender);

        Subscription {
            id,
            hub: self.clone(),
            receiver,
        }
    }

    /// Delivers an event to every live subscription
    pub fn publish(&self, event: PageEvent) {
        let mut inner = self.lock();
        inner
            .subscribers
            .retain(|_, sender| sender.send(event.clone()).is_ok());
    }

    /// Number of registered subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn unsubscribe(&self, id: u64) {
        self.lock().subscribers.remove(&id);
    }
}

/// Scoped registration with an [`EventHub`]
///
/// Events published while the subscription is alive are buffered until
/// drained. Dropping the subscription deregisters it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    hub: EventHub,
    receiver: UnboundedReceiver<PageEvent>,
}

impl Subscription {
    /// Takes every event received so far, in publish order
    pub fn drain(&mut self) -> Vec<PageEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}

/// A single reusable navigation context
///
/// `navigate` returns once the page load is quiescent: every event the load
/// produces has been published by then. DOM queries always refer to the most
/// recently loaded page.
#[async_trait]
pub trait Navigator: Send {
    /// The hub this navigator publishes to
    fn events(&self) -> &EventHub;

    /// Registers a listener for the next navigations
    fn subscribe(&self) -> Subscription {
        self.events().subscribe()
    }

    /// Loads `url` and waits until the load settles
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Inner HTML of the first element matching `selector`
    async fn main_content_html(&mut self, selector: &str) -> Result<Option<String>>;

    /// Resolved `href` of every anchor on the page, `""` for anchors without one
    async fn anchor_hrefs(&mut self) -> Result<Vec<String>>;

    /// Releases whatever the navigator holds once the crawl is over
    async fn shutdown(&mut self) {}
}
