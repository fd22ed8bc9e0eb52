mod lloyd;
mod parallel;

pub(crate) use lloyd::Lloyd;
pub(crate) use parallel::ParallelLloyd;
