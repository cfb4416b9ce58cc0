//! JSON resource shapes served by the API.
//!
//! - `commit`: plumbing and porcelain commits, people, links
//! - `tree`: trees, tree entries, blobs
//! - `refs`: refs and annotated tags
//! - `repo`: repositories, branches, tag summaries, contributors
//! - `diff`: per-file change records and stats of porcelain commits
//! - `blame`: annotated lines plus the commits they reference
//! - `contents`: file and directory contents

pub mod blame;
pub mod commit;
pub mod contents;
pub mod diff;
pub mod refs;
pub mod repo;
pub mod tree;

pub use blame::*;
pub use commit::*;
pub use contents::*;
pub use diff::*;
pub use refs::*;
pub use repo::*;
pub use tree::*;
