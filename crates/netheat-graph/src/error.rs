use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(uuid::Uuid),

    #[error("duplicate node id: {0}")]
    DuplicateNode(uuid::Uuid),
}
