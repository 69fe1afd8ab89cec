pub mod events;
pub mod factory;
pub mod logs;
pub mod memory;

#[derive(Debug, PartialEq)]
pub enum GatewayPublisherVia {
    Logs,
    Memory,
}

#[cfg(test)]
mod tests {
    use crate::gateway::GatewayPublisherVia;

    #[tokio::test]
    async fn test_should_create_publisher_via() {
        let _ = GatewayPublisherVia::Logs;
        let _ = GatewayPublisherVia::Memory;
    }
}
