use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("GraphQL error: {}", .0.join("; "))]
    Graphql(Vec<String>),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Unexpected data shape: {0}")]
    UnexpectedShape(String),
}
