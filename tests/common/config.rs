//! Test configuration helpers

use deckgen::Config;
use std::time::Duration;

/// API key every mock expects as the bearer token
pub const TEST_API_KEY: &str = "test-api-key";

/// Configuration pointed at a mock server with millisecond polling
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::new(base_url, TEST_API_KEY);
    config.polling.deck_interval = Duration::from_millis(20);
    config.polling.export_interval = Duration::from_millis(20);
    config.polling.timeout = Duration::from_secs(10);
    config.request_timeout = Duration::from_secs(5);
    config
}
