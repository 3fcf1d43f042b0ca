//! Bridge from `std::sync::mpsc` channels to iced subscriptions
//!
//! Background workers (the thumbnail generator) report through plain mpsc
//! channels. The app turns a shared receiver into a subscription:
//!
//! ```ignore
//! fn subscription(&self) -> Subscription<Message> {
//!     mpsc_subscription(self.thumbnails.result_receiver()).map(Message::ThumbnailReady)
//! }
//! ```

use std::any::TypeId;
use std::hash::Hash;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use iced::advanced::subscription::{self, EventStream, Hasher, Recipe};
use iced::futures::stream::BoxStream;
use iced::Subscription;

/// Delay between polls of an empty channel
const POLL_INTERVAL: Duration = Duration::from_millis(5);

struct MpscRecipe<T> {
    /// Receiver address, so two receivers give two subscriptions
    id: usize,
    receiver: Arc<Mutex<Receiver<T>>>,
}

impl<T: Send + 'static> Recipe for MpscRecipe<T> {
    type Output = T;

    fn hash(&self, state: &mut Hasher) {
        TypeId::of::<Self>().hash(state);
        self.id.hash(state);
    }

    fn stream(self: Box<Self>, _input: EventStream) -> BoxStream<'static, Self::Output> {
        Box::pin(iced::futures::stream::unfold(self.receiver, |rx| async move {
            loop {
                if let Some(item) = try_next(&rx) {
                    return Some((item, rx));
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }))
    }
}

/// Non-blocking receive through the shared lock
fn try_next<T>(receiver: &Mutex<Receiver<T>>) -> Option<T> {
    receiver.lock().ok()?.try_recv().ok()
}

/// Subscription yielding every item sent on `receiver`
///
/// Subscription identity is the receiver's address, so calling this on every
/// `subscription()` pass keeps the same stream alive.
pub fn mpsc_subscription<T>(receiver: Arc<Mutex<Receiver<T>>>) -> Subscription<T>
where
    T: Send + 'static,
{
    let id = Arc::as_ptr(&receiver) as usize;
    subscription::from_recipe(MpscRecipe { id, receiver })
}
