//! Model reference parsing.
//!
//! A model reference names a file in a remote registry repository. Accepted
//! forms:
//!
//! 1. Full URL: `https://huggingface.co/namespace/repo/resolve/main/file.gguf`
//! 2. Repo with file: `namespace/repo:file.gguf`
//! 3. Repo with pattern: `namespace/repo:Q4_K_M` (matched against remote files)
//! 4. Simple repo: `namespace/repo` (first GGUF file is auto-detected)
//! 5. Bare repo: `repo` (default namespace applied)
//!
//! A `:suffix` ending in `.gguf` is an explicit filename; any other
//! non-empty suffix is a selection pattern. A reference never carries both.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use url::Url;

use crate::error::HfError;

/// Default registry host.
pub const DEFAULT_HOST: &str = "huggingface.co";
/// Default branch.
pub const DEFAULT_BRANCH: &str = "main";
/// Default namespace applied to bare repo names.
pub const DEFAULT_NAMESPACE: &str = "ggserve";

/// A parsed model reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    /// Registry host.
    pub host: String,
    /// User or organization name.
    pub namespace: String,
    /// Repository name.
    pub repo: String,
    /// Git branch or tag.
    pub branch: String,
    /// Explicit file to download; resolved from `pattern` or auto-detected
    /// when absent.
    pub filename: Option<String>,
    /// Selection pattern used when no filename was given.
    pub pattern: Option<String>,
}

impl ModelRef {
    fn defaults() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            repo: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            filename: None,
            pattern: None,
        }
    }

    /// Build a reference from namespace and repo with all defaults.
    pub fn new(namespace: &str, repo: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            repo: repo.to_string(),
            ..Self::defaults()
        }
    }

    /// Whether the reference names a repository completely.
    pub fn is_valid(&self) -> bool {
        !self.host.is_empty() && !self.namespace.is_empty() && !self.repo.is_empty()
    }

    /// Full download URL; `None` until a filename is known.
    pub fn download_url(&self) -> Option<Url> {
        let filename = self.filename.as_deref()?;
        Url::parse(&format!(
            "https://{}/{}/{}/resolve/{}/{}",
            self.host, self.namespace, self.repo, self.branch, filename
        ))
        .ok()
    }

    /// URL of the repository page.
    pub fn repo_url(&self) -> String {
        format!("https://{}/{}/{}", self.host, self.namespace, self.repo)
    }

    /// Registry API URL listing the repository tree.
    pub fn api_url(&self) -> String {
        format!(
            "https://{}/api/models/{}/{}/tree/{}",
            self.host, self.namespace, self.repo, self.branch
        )
    }

    /// File name to use when saving locally (base name of `filename`).
    pub fn local_filename(&self) -> Option<String> {
        let filename = self.filename.as_deref()?;
        Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .map(ToString::to_string)
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(filename) = &self.filename {
            write!(f, "{}/{}:{}", self.namespace, self.repo, filename)
        } else if let Some(pattern) = &self.pattern {
            write!(f, "{}/{}:{}", self.namespace, self.repo, pattern)
        } else {
            write!(f, "{}/{}", self.namespace, self.repo)
        }
    }
}

impl FromStr for ModelRef {
    type Err = HfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            return parse_url(s);
        }

        let mut reference = Self::defaults();

        // Short format: namespace/repo[:file-or-pattern]
        let (repo_path, suffix) = match s.split_once(':') {
            Some((path, suffix)) => (path, Some(suffix)),
            None => (s, None),
        };

        let mut parts = repo_path.split('/').filter(|p| !p.is_empty());
        match (parts.next(), parts.next()) {
            (Some(first), Some(second)) => {
                reference.namespace = first.to_string();
                reference.repo = second.to_string();
            }
            (Some(only), None) => {
                // Bare repo name; default namespace applies.
                reference.repo = only.to_string();
            }
            _ => {
                return Err(HfError::InvalidReference(format!("got '{repo_path}'")));
            }
        }

        if let Some(suffix) = suffix
            && !suffix.is_empty()
        {
            if suffix.ends_with(".gguf") {
                reference.filename = Some(suffix.to_string());
            } else {
                reference.pattern = Some(suffix.to_string());
            }
        }

        Ok(reference)
    }
}

/// Parse a full registry URL of the form
/// `scheme://host/namespace/repo[/resolve/branch[/path/to/file]]`.
fn parse_url(s: &str) -> Result<ModelRef, HfError> {
    let url = Url::parse(s).map_err(|e| HfError::InvalidReference(e.to_string()))?;

    let mut reference = ModelRef {
        host: url.host_str().unwrap_or(DEFAULT_HOST).to_string(),
        ..ModelRef::defaults()
    };

    let path = url.path().trim_matches('/');
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return Err(HfError::InvalidReference(
            "expected at least namespace/repo in URL path".to_string(),
        ));
    }

    reference.namespace = parts[0].to_string();
    reference.repo = parts[1].to_string();

    if parts.len() >= 4 && parts[2] == "resolve" {
        reference.branch = parts[3].to_string();
        if parts.len() > 4 {
            reference.filename = Some(parts[4..].join("/"));
        }
    } else if parts.len() > 2 {
        // Direct file reference: namespace/repo/file.gguf
        reference.filename = Some(parts[2..].join("/"));
    }

    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_repo() {
        let r: ModelRef = "unsloth/llama-3-8b".parse().unwrap();
        assert_eq!(r.namespace, "unsloth");
        assert_eq!(r.repo, "llama-3-8b");
        assert_eq!(r.branch, "main");
        assert_eq!(r.filename, None);
        assert_eq!(r.pattern, None);
    }

    #[test]
    fn parses_repo_with_file() {
        let r: ModelRef = "unsloth/llama-3-8b:llama-3-8b-Q4_K_M.gguf".parse().unwrap();
        assert_eq!(r.namespace, "unsloth");
        assert_eq!(r.repo, "llama-3-8b");
        assert_eq!(r.filename.as_deref(), Some("llama-3-8b-Q4_K_M.gguf"));
        assert_eq!(r.pattern, None);
    }

    #[test]
    fn parses_repo_with_pattern() {
        let r: ModelRef = "unsloth/llama-3-8b:Q4_K_M".parse().unwrap();
        assert_eq!(r.namespace, "unsloth");
        assert_eq!(r.repo, "llama-3-8b");
        assert_eq!(r.filename, None);
        assert_eq!(r.pattern.as_deref(), Some("Q4_K_M"));
    }

    #[test]
    fn parses_bare_repo_with_default_namespace() {
        let r: ModelRef = "llama-3-8b".parse().unwrap();
        assert_eq!(r.namespace, DEFAULT_NAMESPACE);
        assert_eq!(r.repo, "llama-3-8b");
    }

    #[test]
    fn empty_reference_is_an_error() {
        assert!("".parse::<ModelRef>().is_err());
        assert!("/".parse::<ModelRef>().is_err());
        assert!(":Q4_K_M".parse::<ModelRef>().is_err());
    }

    #[test]
    fn parses_full_url_with_resolve() {
        let r: ModelRef = "https://huggingface.co/unsloth/llama-3-8b/resolve/main/llama-3-8b-Q4_K_M.gguf"
            .parse()
            .unwrap();
        assert_eq!(r.host, "huggingface.co");
        assert_eq!(r.namespace, "unsloth");
        assert_eq!(r.repo, "llama-3-8b");
        assert_eq!(r.branch, "main");
        assert_eq!(r.filename.as_deref(), Some("llama-3-8b-Q4_K_M.gguf"));
    }

    #[test]
    fn parses_full_url_with_other_branch() {
        let r: ModelRef = "https://huggingface.co/microsoft/phi-2/resolve/v1.0/phi-2.gguf"
            .parse()
            .unwrap();
        assert_eq!(r.branch, "v1.0");
        assert_eq!(r.filename.as_deref(), Some("phi-2.gguf"));
    }

    #[test]
    fn parses_url_with_direct_file_path() {
        let r: ModelRef = "https://huggingface.co/microsoft/phi-2/gguf/phi-2.gguf"
            .parse()
            .unwrap();
        assert_eq!(r.branch, "main");
        assert_eq!(r.filename.as_deref(), Some("gguf/phi-2.gguf"));
    }

    #[test]
    fn url_without_repo_is_an_error() {
        assert!("https://huggingface.co/onlynamespace".parse::<ModelRef>().is_err());
    }

    #[test]
    fn string_form_round_trips() {
        for input in [
            "unsloth/llama-3-8b",
            "unsloth/llama-3-8b:llama-3-8b-Q4_K_M.gguf",
            "unsloth/llama-3-8b:Q4_K_M",
        ] {
            let r: ModelRef = input.parse().unwrap();
            assert_eq!(r.to_string(), input);
            let again: ModelRef = r.to_string().parse().unwrap();
            assert_eq!(again, r);
        }
    }

    #[test]
    fn download_url_requires_filename() {
        let r = ModelRef::new("unsloth", "llama-3-8b");
        assert!(r.download_url().is_none());

        let r = ModelRef {
            filename: Some("llama-3-8b-Q4_K_M.gguf".to_string()),
            ..ModelRef::new("unsloth", "llama-3-8b")
        };
        assert_eq!(
            r.download_url().unwrap().as_str(),
            "https://huggingface.co/unsloth/llama-3-8b/resolve/main/llama-3-8b-Q4_K_M.gguf"
        );
    }

    #[test]
    fn download_url_keeps_subdirectories() {
        let r = ModelRef {
            filename: Some("gguf/phi-2-Q4_K_M.gguf".to_string()),
            ..ModelRef::new("microsoft", "phi-2")
        };
        assert_eq!(
            r.download_url().unwrap().as_str(),
            "https://huggingface.co/microsoft/phi-2/resolve/main/gguf/phi-2-Q4_K_M.gguf"
        );
    }

    #[test]
    fn api_url_points_at_tree_endpoint() {
        let r = ModelRef::new("unsloth", "llama-3-8b");
        assert_eq!(
            r.api_url(),
            "https://huggingface.co/api/models/unsloth/llama-3-8b/tree/main"
        );
    }

    #[test]
    fn local_filename_strips_directories() {
        let r = ModelRef {
            filename: Some("gguf/sub/model-Q4_K_M.gguf".to_string()),
            ..ModelRef::new("a", "b")
        };
        assert_eq!(r.local_filename().as_deref(), Some("model-Q4_K_M.gguf"));

        let r = ModelRef::new("a", "b");
        assert_eq!(r.local_filename(), None);
    }

    #[test]
    fn is_valid_requires_all_parts() {
        assert!(ModelRef::new("unsloth", "llama-3-8b").is_valid());
        assert!(!ModelRef::new("", "llama-3-8b").is_valid());
        assert!(!ModelRef::new("unsloth", "").is_valid());
    }
}
