use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("invalid policy model ({origin}): {source}")]
    Model {
        origin: String,
        #[source]
        source: casbin::Error,
    },
    #[error("{step} failed: {source}")]
    Casbin {
        step: &'static str,
        #[source]
        source: casbin::Error,
    },
    #[error("invalid rule: {0}")]
    InvalidRule(String),
}

pub type AuthzResult<T> = Result<T, AuthzError>;

/// Map a Casbin error into [`AuthzError::Casbin`] tagged with `step`.
pub(crate) fn at(step: &'static str) -> impl FnOnce(casbin::Error) -> AuthzError {
    move |source| AuthzError::Casbin { step, source }
}
