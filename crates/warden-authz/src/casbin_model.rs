use crate::errors::{AuthzError, AuthzResult};
use casbin::DefaultModel;
use std::path::Path;

/// Default policy model, used when no model file is configured.
pub const MODEL_CONF: &str = include_str!("model.conf");

/// Load the policy model from `path`, or the embedded [`MODEL_CONF`] when no
/// path is given.
pub async fn load_model(path: Option<&Path>) -> AuthzResult<DefaultModel> {
    match path {
        Some(path) => DefaultModel::from_file(path)
            .await
            .map_err(|source| AuthzError::Model {
                origin: path.display().to_string(),
                source,
            }),
        None => DefaultModel::from_str(MODEL_CONF)
            .await
            .map_err(|source| AuthzError::Model {
                origin: "embedded".to_string(),
                source,
            }),
    }
}
