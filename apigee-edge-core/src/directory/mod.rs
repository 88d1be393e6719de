//! Lookup of the Edge developer behind a local user

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Maps local user ids to Edge developer emails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeveloperDirectory: Send + Sync {
    /// Email of the developer account of `uid`, if the user has one.
    async fn developer_email(&self, uid: u64) -> Result<Option<String>>;
}

/// Directory backed by a fixed map, loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeveloperDirectory {
    developers: HashMap<u64, String>,
}

impl InMemoryDeveloperDirectory {
    pub fn new(developers: HashMap<u64, String>) -> Self {
        Self { developers }
    }

    pub fn len(&self) -> usize {
        self.developers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.developers.is_empty()
    }
}

#[async_trait]
impl DeveloperDirectory for InMemoryDeveloperDirectory {
    async fn developer_email(&self, uid: u64) -> Result<Option<String>> {
        Ok(self.developers.get(&uid).cloned())
    }
}
