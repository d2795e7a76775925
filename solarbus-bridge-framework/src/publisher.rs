//! Publish capability and its Zenoh implementation.

use std::future::Future;
use std::sync::Arc;

use crate::error::{BridgeError, Result};

/// Something bridges can hand an encoded payload to.
///
/// A failed publish is a transport problem: implementations report it and
/// leave retry or reconnect policy to whoever owns the session.
pub trait Publish {
    /// Publish `payload` on the key expression `key`.
    fn publish(&self, key: &str, payload: Vec<u8>) -> impl Future<Output = Result<()>> + Send;
}

impl<P: Publish + ?Sized> Publish for &P {
    fn publish(&self, key: &str, payload: Vec<u8>) -> impl Future<Output = Result<()>> + Send {
        (**self).publish(key, payload)
    }
}

/// Publisher for sending payloads to Zenoh.
#[derive(Clone, Debug)]
pub struct Publisher {
    session: Arc<zenoh::Session>,
    key_prefix: String,
}

impl Publisher {
    /// Create a new publisher.
    pub fn new(session: Arc<zenoh::Session>, key_prefix: impl Into<String>) -> Self {
        Self {
            session,
            key_prefix: key_prefix.into(),
        }
    }

    /// Get the key prefix.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }
}

impl Publish for Publisher {
    async fn publish(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        self.session
            .put(key, payload)
            .await
            .map_err(|e| BridgeError::publish(key, e))?;

        tracing::trace!(key = %key, "Published");
        Ok(())
    }
}

/// Join a key prefix and a suffix with `/`.
pub(crate) fn build_key(prefix: &str, suffix: &str) -> String {
    match (prefix.is_empty(), suffix.is_empty()) {
        (_, true) => prefix.to_string(),
        (true, false) => suffix.to_string(),
        (false, false) => format!("{}/{}", prefix.trim_end_matches('/'), suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_build_key() {
        assert_eq!(build_key("solar/modules", "26"), "solar/modules/26");
        assert_eq!(build_key("solar/modules/", "26"), "solar/modules/26");
        assert_eq!(build_key("solar/modules", ""), "solar/modules");
        assert_eq!(build_key("", "26"), "26");
    }

    #[derive(Default)]
    struct Recorder {
        keys: Mutex<Vec<String>>,
    }

    impl Publish for Recorder {
        async fn publish(&self, key: &str, _payload: Vec<u8>) -> Result<()> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_publish_through_reference() {
        let recorder = Recorder::default();

        async fn send<P: Publish>(publisher: P) -> Result<()> {
            publisher.publish("solar/modules/1", b"{}".to_vec()).await
        }

        tokio_test::block_on(send(&recorder)).unwrap();
        assert_eq!(*recorder.keys.lock().unwrap(), vec!["solar/modules/1"]);
    }
}
