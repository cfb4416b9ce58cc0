//! Absolute resource URLs for one repository.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::git::backend::ObjectKind;
use crate::git::sandbox::RepoKey;

/// Characters escaped inside a multi-segment path.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path characters plus `/`, for names that must stay one segment.
const SEGMENT: &AsciiSet = &PATH.add(b'/');

const QUERY_VALUE: &AsciiSet = &SEGMENT.add(b'&').add(b'=').add(b'+');

fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

fn path(value: &str) -> String {
    utf8_percent_encode(value, PATH).to_string()
}

/// URL builder rooted at `<base>/repos/<encoded key>/`.
#[derive(Debug, Clone)]
pub struct Urls {
    repo: String,
}

impl Urls {
    pub fn new(base: &str, key: &RepoKey) -> Self {
        Urls {
            repo: format!("{}/repos/{}/", base.trim_end_matches('/'), segment(&key.encode())),
        }
    }

    pub fn repo(&self) -> String {
        self.repo.clone()
    }

    pub fn git_commit(&self, sha: &str) -> String {
        format!("{}git/commits/{}/", self.repo, sha)
    }

    pub fn commit(&self, refspec: &str) -> String {
        format!("{}commits/{}/", self.repo, segment(refspec))
    }

    pub fn tree(&self, sha: &str) -> String {
        format!("{}git/trees/{}/", self.repo, sha)
    }

    pub fn blob(&self, sha: &str) -> String {
        format!("{}git/blobs/{}/", self.repo, sha)
    }

    pub fn tag(&self, sha: &str) -> String {
        format!("{}git/tags/{}/", self.repo, sha)
    }

    pub fn object(&self, kind: ObjectKind, sha: &str) -> String {
        match kind {
            ObjectKind::Commit => self.git_commit(sha),
            ObjectKind::Tree => self.tree(sha),
            ObjectKind::Blob => self.blob(sha),
            ObjectKind::Tag => self.tag(sha),
        }
    }

    /// `name` is a full ref name; the redundant `refs/` is dropped.
    pub fn git_ref(&self, name: &str) -> String {
        let short = name.strip_prefix("refs/").unwrap_or(name);
        format!("{}git/refs/{}", self.repo, path(short))
    }

    pub fn branch(&self, name: &str) -> String {
        format!("{}branches/{}/", self.repo, segment(name))
    }

    pub fn tags(&self) -> String {
        format!("{}tags/", self.repo)
    }

    pub fn named_tag(&self, name: &str) -> String {
        format!("{}tags/{}/", self.repo, segment(name))
    }

    pub fn raw(&self, refspec: &str, file_path: &str) -> String {
        format!("{}raw/{}/{}", self.repo, segment(refspec), path(file_path))
    }

    pub fn contents(&self, file_path: &str, refspec: &str) -> String {
        format!(
            "{}contents/{}?ref={}",
            self.repo,
            path(file_path),
            utf8_percent_encode(refspec, QUERY_VALUE)
        )
    }

    /// `<prefix>{/<placeholder>}`, the URI-template form used in repository
    /// resources.
    pub fn template(&self, prefix: &str, placeholder: &str) -> String {
        format!("{}{}{{/{}}}", self.repo, prefix.trim_end_matches('/'), placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> Urls {
        Urls::new("http://localhost:3001/", &RepoKey::new("team/tool"))
    }

    #[test]
    fn repo_key_is_one_segment() {
        assert_eq!(urls().repo(), "http://localhost:3001/repos/team;tool/");
    }

    #[test]
    fn object_templates() {
        let urls = urls();
        assert_eq!(urls.git_commit("abc"), "http://localhost:3001/repos/team;tool/git/commits/abc/");
        assert_eq!(urls.commit("abc"), "http://localhost:3001/repos/team;tool/commits/abc/");
        assert_eq!(urls.object(ObjectKind::Blob, "f00"), "http://localhost:3001/repos/team;tool/git/blobs/f00/");
        assert_eq!(urls.git_ref("refs/heads/master"), "http://localhost:3001/repos/team;tool/git/refs/heads/master");
    }

    #[test]
    fn names_with_slashes_stay_in_their_segment() {
        let urls = urls();
        assert_eq!(urls.branch("feature/x"), "http://localhost:3001/repos/team;tool/branches/feature%2Fx/");
        assert_eq!(urls.raw("abc", "src/a b.rs"), "http://localhost:3001/repos/team;tool/raw/abc/src/a%20b.rs");
        assert_eq!(
            urls.contents("docs/", "release/1.0"),
            "http://localhost:3001/repos/team;tool/contents/docs/?ref=release%2F1.0"
        );
    }

    #[test]
    fn uri_templates() {
        assert_eq!(urls().template("git/trees/", "sha"), "http://localhost:3001/repos/team;tool/git/trees{/sha}");
    }
}
