//! Tag engine configuration.

/// Configuration for the tag engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of collections the cycle guard will visit while
    /// traversing one nesting graph (default: 10_000). Exceeding the
    /// bound aborts the write rather than looping on a corrupt graph.
    pub max_graph_nodes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_graph_nodes: 10_000,
        }
    }
}
