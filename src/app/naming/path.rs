//! Candidate download paths
//!
//! A path is an ordered list of directory segments closed by exactly one
//! file segment. `PathBuilder::file` consumes the builder, so nothing can be
//! appended after the file name.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{PathError, PathResult};

/// Role of a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Directory,
    File,
}

/// One component of a candidate path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub name: String,
    pub kind: SegmentKind,
}

/// Computed, not yet verified, relative download path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePath {
    relative_path: String,
    segments: Vec<PathSegment>,
}

impl CandidatePath {
    /// Start building a path
    pub fn builder() -> PathBuilder {
        PathBuilder::default()
    }

    /// Path relative to the product base URL
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Final (file) segment
    pub fn file_name(&self) -> &str {
        self.segments
            .last()
            .map(|s| s.name.as_str())
            .unwrap_or_default()
    }

    /// Directory segments joined with `/`
    pub fn directory(&self) -> String {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Directory)
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Absolute URL of this path under `base`
    pub fn resolve(&self, base: &Url) -> PathResult<Url> {
        base.join(&self.relative_path)
            .map_err(|e| PathError::Malformed {
                path: self.relative_path.clone(),
                error: e.to_string(),
            })
    }
}

/// Builder collecting directory segments until the file is added
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,
}

impl PathBuilder {
    /// Append one directory segment
    pub fn dir(mut self, name: &str) -> PathResult<Self> {
        self.segments.push(segment(name, SegmentKind::Directory)?);
        Ok(self)
    }

    /// Append every `/`-separated component of `path` as a directory
    pub fn dirs(self, path: &str) -> PathResult<Self> {
        path.split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self, |builder, part| builder.dir(part))
    }

    /// Close the path with its file segment
    pub fn file(mut self, name: &str) -> PathResult<CandidatePath> {
        self.segments.push(segment(name, SegmentKind::File)?);
        let relative_path = self
            .segments
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join("/");
        Ok(CandidatePath {
            relative_path,
            segments: self.segments,
        })
    }

    /// Split a rendered `dir/dir/file` string into directories and file
    pub fn from_rendered(path: &str) -> PathResult<CandidatePath> {
        let (directory, file) = match path.rsplit_once('/') {
            Some((directory, file)) => (directory, file),
            None => ("", path),
        };
        Self::default().dirs(directory)?.file(file)
    }
}

fn segment(name: &str, kind: SegmentKind) -> PathResult<PathSegment> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(PathError::InvalidSegment {
            segment: name.to_string(),
        });
    }
    Ok(PathSegment {
        name: name.to_string(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_joins_segments() {
        let path = CandidatePath::builder()
            .dirs("enroute/10-05-2023")
            .unwrap()
            .file("enr_l01.zip")
            .unwrap();

        assert_eq!(path.relative_path(), "enroute/10-05-2023/enr_l01.zip");
        assert_eq!(path.file_name(), "enr_l01.zip");
        assert_eq!(path.directory(), "enroute/10-05-2023");
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.segments()[2].kind, SegmentKind::File);
        assert!(path.segments()[..2]
            .iter()
            .all(|s| s.kind == SegmentKind::Directory));
    }

    #[test]
    fn test_rejects_bad_segments() {
        assert!(CandidatePath::builder().dir("..").is_err());
        assert!(CandidatePath::builder().file("").is_err());
        assert!(CandidatePath::builder().file("a/b.zip").is_err());
    }

    #[test]
    fn test_from_rendered() {
        let path = PathBuilder::from_rendered("visual/10-05-2023/sectional-files/Seattle.zip").unwrap();
        assert_eq!(path.file_name(), "Seattle.zip");
        assert_eq!(path.directory(), "visual/10-05-2023/sectional-files");

        let bare = PathBuilder::from_rendered("CIFP_231005.zip").unwrap();
        assert_eq!(bare.segments().len(), 1);
        assert!(PathBuilder::from_rendered("visual/").is_err());
    }

    #[test]
    fn test_resolve_against_base() {
        let base = Url::parse("https://aeronav.faa.gov/").unwrap();
        let path = PathBuilder::from_rendered("visual/10-05-2023/tac-files/Puerto_Rico-VI_TAC.zip").unwrap();
        let url = path.resolve(&base).unwrap();
        assert_eq!(
            url.as_str(),
            "https://aeronav.faa.gov/visual/10-05-2023/tac-files/Puerto_Rico-VI_TAC.zip"
        );
    }
}
