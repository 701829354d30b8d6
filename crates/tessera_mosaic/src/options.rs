//! Director options.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tessera_tile::ExpressOptions;

/// Director options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectorOptions {
    /// Directory searched for `.part` / `.md` files of unregistered tags.
    /// Without it only registered tags resolve.
    pub base: Option<PathBuf>,

    /// Expression pass options used at render time
    pub express: ExpressOptions,
}

impl DirectorOptions {
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }
}
