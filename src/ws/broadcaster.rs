use crate::ws::models::Broadcast;
use tokio::sync::broadcast;

/// Capacity of the shared fan-out channel. Clients that fall more than this
/// many events behind are disconnected.
const EVENT_BUFFER: usize = 256;

pub fn create_event_broadcaster() -> broadcast::Sender<Broadcast> {
    let (tx, _rx) = broadcast::channel(EVENT_BUFFER);
    tx
}
