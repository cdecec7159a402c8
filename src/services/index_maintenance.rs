//! Vector index maintenance.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{FailurePolicy, VectorIndexSpec};
use crate::domain::ports::GraphStore;

/// Drops and recreates the vector index over method embeddings.
///
/// The drop and the create are separate steps. Under
/// [`FailurePolicy::BestEffort`] a failed drop is logged and the create is
/// still attempted; under [`FailurePolicy::Strict`] either failure is
/// returned.
pub struct IndexMaintenance {
    store: Arc<dyn GraphStore>,
    index: VectorIndexSpec,
    policy: FailurePolicy,
}

impl IndexMaintenance {
    pub fn new(store: Arc<dyn GraphStore>, index: VectorIndexSpec, policy: FailurePolicy) -> Self {
        Self {
            store,
            index,
            policy,
        }
    }

    pub const fn index(&self) -> &VectorIndexSpec {
        &self.index
    }

    /// Returns whether the create step succeeded.
    #[instrument(skip(self), fields(index = %self.index.name))]
    pub async fn rebuild(&self) -> DomainResult<bool> {
        if let Err(err) = self.store.drop_index_if_exists(&self.index.name).await {
            if self.policy == FailurePolicy::Strict {
                error!(error = %err, "Dropping vector index failed");
                return Err(err);
            }
            warn!(error = %err, "Dropping vector index failed; creating anyway");
        }

        match self.store.create_vector_index(&self.index).await {
            Ok(()) => {
                info!(
                    dimensions = self.index.dimensions,
                    similarity = %self.index.similarity,
                    "Vector index rebuilt"
                );
                Ok(true)
            }
            Err(err) if self.policy == FailurePolicy::Strict => {
                error!(error = %err, "Creating vector index failed");
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "Creating vector index failed; continuing without it");
                Ok(false)
            }
        }
    }
}
