use std::sync::Arc;

use crate::gateway::GatewayPublisherVia;
use crate::gateway::events::EventPublisher;
use crate::gateway::logs::publisher::LogPublisher;
use crate::gateway::memory::publisher::MemoryPublisher;

pub fn create_publisher(via: GatewayPublisherVia) -> Arc<dyn EventPublisher> {
    match via {
        GatewayPublisherVia::Logs => {
            Arc::new(LogPublisher::new())
        }
        GatewayPublisherVia::Memory => {
            Arc::new(MemoryPublisher::new())
        }
    }
}
