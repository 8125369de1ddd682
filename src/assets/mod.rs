pub(crate) mod media;
pub(crate) mod provider;
