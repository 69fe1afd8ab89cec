use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// MemoryPublisher retains published events in arrival order so tests and
// diagnostics can read the transition history back.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    events: RwLock<Vec<DomainEvent>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(vec![]),
        }
    }

    pub async fn published(&self) -> Vec<String> {
        let events = self.events.read().await;
        events.iter().map(|event| event.name.to_string()).collect()
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        // round-trip through json keeps the stored copy detached from the caller
        let json = serde_json::to_string(event)?;
        let copy: DomainEvent = serde_json::from_str(json.as_str())?;
        let mut events = self.events.write().await;
        events.push(copy);
        Ok(())
    }
}
