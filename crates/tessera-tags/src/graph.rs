//! Collection nesting cycle guard.
//!
//! Collections of one organization form a directed graph through their
//! `nests` edges. Every proposed edge is vetted here against the graph
//! as currently persisted, before anything is written: an edge `parent
//! -> child` is rejected when `parent` is already reachable from
//! `child`, or when it is a self-loop.

use std::collections::HashSet;

use tessera_core::error::TesseraResult;
use tessera_core::repository::CollectionRepository;
use uuid::Uuid;

use crate::error::TagEngineError;

/// Adjacency view of the nesting graph. The guard only ever needs one
/// query: the direct children of a collection.
pub trait SubcollectionGraph: Send + Sync {
    fn children(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Uuid>>> + Send;
}

impl<R: CollectionRepository> SubcollectionGraph for R {
    async fn children(&self, org_id: Uuid, collection_id: Uuid) -> TesseraResult<Vec<Uuid>> {
        self.subcollection_ids(org_id, collection_id).await
    }
}

/// Whether nesting `child_id` under `parent_id` would close a cycle.
///
/// Walks downward from the candidate child through the persisted
/// nesting edges. If the walk reaches `parent_id`, the proposed edge
/// would complete a cycle. `max_nodes` bounds the traversal so a
/// corrupted graph cannot stall the caller.
pub async fn would_create_cycle<G: SubcollectionGraph>(
    graph: &G,
    org_id: Uuid,
    parent_id: Uuid,
    child_id: Uuid,
    max_nodes: usize,
) -> TesseraResult<bool> {
    if parent_id == child_id {
        return Ok(true);
    }

    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut stack = vec![child_id];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        if visited.len() > max_nodes {
            return Err(TagEngineError::GraphLimitExceeded { limit: max_nodes }.into());
        }

        for next in graph.children(org_id, current).await? {
            if next == parent_id {
                return Ok(true);
            }
            if !visited.contains(&next) {
                stack.push(next);
            }
        }
    }

    Ok(false)
}
