//! Git collaborator: every operation is one `git` subprocess invocation
//! whose exit status decides success, plus a filesystem walk that discovers
//! repositories under a root directory.

mod cli;
mod discover;

pub use cli::GitCli;
pub use discover::find_repos;
