//! Pure conversions from backend objects and derived results to the JSON
//! resources in `models`. Every link is absolute and built by [`Urls`].

pub mod plumbing;
pub mod porcelain;
pub mod urls;

pub use plumbing::*;
pub use porcelain::*;
pub use urls::Urls;
