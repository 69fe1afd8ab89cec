// Configures the global tracing subscriber for embeddings that want the
// library's transition logs on stdout. Safe to call more than once.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .with_ansi(false)
        .json()
        .try_init();
}

#[cfg(test)]
mod tests {
    use crate::utils::logs::setup_tracing;

    #[tokio::test]
    async fn test_should_setup_tracing_repeatedly() {
        setup_tracing();
        setup_tracing();
    }
}
