pub mod archive;
pub mod backend;
pub mod blame;
pub mod diff;
pub mod history;
pub mod repository;
pub mod resolve;
pub mod sandbox;
pub mod tree;

pub use backend::Backend;
pub use repository::GitRepository;
pub use sandbox::RepoKey;
