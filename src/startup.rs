use crate::config::Config;
use crate::db::DbPool;
use crate::ws::models::{Broadcast, EventSender, ServerEvent};
use tokio::time::{Duration, interval};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub events: EventSender,
    pub public_url: String,
}

impl AppState {
    pub fn new(db: DbPool, config: &Config) -> Self {
        let events = crate::ws::create_event_broadcaster();

        let db_clone = db.clone();
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                match db_clone.acquire().await {
                    Ok(conn) => {
                        drop(conn);
                    }
                    Err(e) => {
                        error!("Database connection health check failed: {e}");
                    }
                }
            }
        });

        AppState {
            db,
            events,
            public_url: config.public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Push a server event to every connected WebSocket client.
    pub fn broadcast(&self, event: ServerEvent) {
        if self.events.send(Broadcast { origin: None, event }).is_err() {
            debug!("no websocket clients connected, event dropped");
        }
    }
}
