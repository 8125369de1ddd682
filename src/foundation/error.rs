/// Convenience result type used across reelsmith.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by the timeline core and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// A phase schedule or media duration that cannot be laid out.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// A required asset is missing or could not be produced.
    #[error("asset unavailable: {0}")]
    AssetUnavailable(String),

    /// Impossible configuration parameters, detected before or while building.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// One content item failed to build.
    #[error(transparent)]
    ItemBuild(Box<ItemBuildError>),

    /// Every content item failed; there is nothing to render.
    #[error("no content: all {attempted} items failed")]
    NoContent {
        /// Number of items that were attempted.
        attempted: usize,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors raised by the media encoder at the render boundary.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::InvalidDuration`] value.
    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    /// Build a [`ReelError::AssetUnavailable`] value.
    pub fn asset_unavailable(msg: impl Into<String>) -> Self {
        Self::AssetUnavailable(msg.into())
    }

    /// Build a [`ReelError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// `true` for errors that must abort a whole run instead of skipping one item.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::ItemBuild(e) => e.cause.is_configuration(),
            _ => false,
        }
    }
}

/// Failure of a single content item, carrying the upstream cause.
#[derive(thiserror::Error, Debug)]
#[error("item {index} failed: {cause}")]
pub struct ItemBuildError {
    /// Zero-based position of the item in the script.
    pub index: usize,
    /// Whichever upstream step failed.
    #[source]
    pub cause: Box<ReelError>,
}

impl ItemBuildError {
    /// Wrap `cause` as the failure of item `index`.
    pub fn new(index: usize, cause: ReelError) -> Self {
        Self {
            index,
            cause: Box::new(cause),
        }
    }
}

impl From<ItemBuildError> for ReelError {
    fn from(e: ItemBuildError) -> Self {
        Self::ItemBuild(Box::new(e))
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
