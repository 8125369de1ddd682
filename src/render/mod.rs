pub(crate) mod boundary;
pub(crate) mod ffmpeg;
