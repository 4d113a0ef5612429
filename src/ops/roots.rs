use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedDirectoriesResponse {
    pub directories: Vec<PathBuf>,
}

pub fn list_allowed_directories(ctx: &Context) -> AllowedDirectoriesResponse {
    AllowedDirectoriesResponse {
        directories: ctx.allowed_roots().as_slice().to_vec(),
    }
}
