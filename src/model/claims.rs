use ahash::AHashMap;
use async_trait::async_trait;

/// What the identity collaborator tells us about a submitting device.
#[derive(Clone, Debug)]
pub struct Claims {
    pub recorded_by: String,
    pub is_official: bool,
}

#[async_trait]
pub trait ClaimsResolver: Send + Sync {
    async fn resolve(&self, device_id: &str) -> Claims;
}

/// Claims backed by the seed file's official-device roster. Anything not on
/// the roster is a self-reported player device.
#[derive(Default)]
pub struct SeededClaims {
    officials: AHashMap<String, String>,
}

impl SeededClaims {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_official(&mut self, device_id: impl Into<String>, name: impl Into<String>) {
        self.officials.insert(device_id.into(), name.into());
    }
}

#[async_trait]
impl ClaimsResolver for SeededClaims {
    async fn resolve(&self, device_id: &str) -> Claims {
        match self.officials.get(device_id) {
            Some(name) => Claims {
                recorded_by: name.clone(),
                is_official: true,
            },
            None => Claims {
                recorded_by: device_id.to_string(),
                is_official: false,
            },
        }
    }
}
