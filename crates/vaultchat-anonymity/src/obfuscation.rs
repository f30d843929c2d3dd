//! Traffic obfuscation for preventing traffic analysis
//!
//! Applies the configured envelope padding and random send delay to
//! already-sealed blobs.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::trace;

use crate::config::ObfuscationConfig;
use crate::envelope::{self, PayloadShape};
use crate::error::Result;

/// How relay traffic leaves the client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportType {
    /// Direct connection (or in-process relay)
    Direct,
    /// Routed through a Tor SOCKS proxy
    Tor,
}

/// Traffic obfuscator
#[derive(Clone, Debug)]
pub struct TrafficObfuscator {
    config: ObfuscationConfig,
}

impl TrafficObfuscator {
    /// Create a new traffic obfuscator from a validated config
    pub fn new(config: ObfuscationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &ObfuscationConfig {
        &self.config
    }

    /// Pad a sealed blob into a fixed envelope, if padding is enabled
    pub fn wrap(&self, sealed: Vec<u8>) -> Result<Vec<u8>> {
        if !self.config.padding_enabled {
            return Ok(sealed);
        }
        envelope::encode(&sealed, self.config.envelope_size)
    }

    /// Classify a received blob against the fixed envelope size
    pub fn classify<'a>(&self, blob: &'a [u8]) -> PayloadShape<'a> {
        PayloadShape::classify(blob, self.config.envelope_size)
    }

    /// Draw a delay uniformly from `[min_delay, max_delay]`
    pub fn random_delay(&self) -> Duration {
        let mut rng = rand::thread_rng();
        let delay_ms = rng.gen_range(self.config.min_delay_ms..=self.config.max_delay_ms);
        Duration::from_millis(delay_ms)
    }

    /// Sleep for a random delay, if delays are enabled
    pub async fn delay(&self) {
        if !self.config.delays_enabled {
            return;
        }

        let delay = self.random_delay();
        trace!("Delaying send by {:?}", delay);
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnonymityError;

    fn small_envelopes() -> ObfuscationConfig {
        ObfuscationConfig {
            envelope_size: 128,
            ..Default::default()
        }
    }

    #[test]
    fn test_wrap_pads_to_fixed_size() {
        let obfuscator = TrafficObfuscator::new(small_envelopes()).unwrap();

        let short = obfuscator.wrap(b"short".to_vec()).unwrap();
        let long = obfuscator.wrap(vec![7u8; 100]).unwrap();

        assert_eq!(short.len(), 128);
        assert_eq!(long.len(), 128);
        assert_eq!(obfuscator.classify(&short).into_payload().unwrap(), b"short");
    }

    #[test]
    fn test_wrap_disabled_passes_through() {
        let obfuscator = TrafficObfuscator::new(ObfuscationConfig::disabled()).unwrap();

        let blob = obfuscator.wrap(b"raw".to_vec()).unwrap();
        assert_eq!(blob, b"raw");
        assert_eq!(obfuscator.classify(&blob), PayloadShape::RawBlob(b"raw"));
    }

    #[test]
    fn test_wrap_oversize() {
        let obfuscator = TrafficObfuscator::new(small_envelopes()).unwrap();
        let result = obfuscator.wrap(vec![0u8; 125]);
        assert!(matches!(result, Err(AnonymityError::Oversize { .. })));
    }

    #[test]
    fn test_new_rejects_inverted_delay_range() {
        let result = TrafficObfuscator::new(ObfuscationConfig {
            min_delay_ms: 2000,
            max_delay_ms: 100,
            ..Default::default()
        });
        assert!(matches!(result, Err(AnonymityError::Configuration(_))));
    }

    #[test]
    fn test_random_delay_in_range() {
        let obfuscator = TrafficObfuscator::new(ObfuscationConfig {
            min_delay_ms: 10,
            max_delay_ms: 20,
            ..Default::default()
        })
        .unwrap();

        for _ in 0..100 {
            let delay = obfuscator.random_delay();
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_millis(20));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_sleeps_within_range() {
        let obfuscator = TrafficObfuscator::new(ObfuscationConfig {
            min_delay_ms: 500,
            max_delay_ms: 800,
            ..Default::default()
        })
        .unwrap();

        let start = tokio::time::Instant::now();
        obfuscator.delay().await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_disabled() {
        let obfuscator = TrafficObfuscator::new(ObfuscationConfig::disabled()).unwrap();

        let start = tokio::time::Instant::now();
        obfuscator.delay().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
