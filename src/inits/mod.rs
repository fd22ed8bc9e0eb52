pub(crate) mod boundingbox;
pub(crate) mod precomputed;
