pub(crate) mod composer;
pub(crate) mod crossfade;
pub(crate) mod layer;
