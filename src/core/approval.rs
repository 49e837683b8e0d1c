//! Per-run approval of conditional columns

use async_trait::async_trait;
use std::collections::HashSet;
use std::future::Future;

/// Decides, once per export run, whether a conditional column is emitted
#[async_trait]
pub trait ColumnApproval: Send + Sync {
    async fn approve(&self, field_name: &str) -> bool;
}

#[async_trait]
impl<F, Fut> ColumnApproval for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn approve(&self, field_name: &str) -> bool {
        self(field_name.to_string()).await
    }
}

/// Approves a fixed set of field names
#[derive(Debug, Clone, Default)]
pub struct ApprovedFields(HashSet<String>);

impl ApprovedFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ColumnApproval for ApprovedFields {
    async fn approve(&self, field_name: &str) -> bool {
        self.0.contains(field_name)
    }
}
