//! Result paths: where a field's value lands in the response tree.

use std::fmt;

use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Path of a field in the response, e.g. `/person/books[0]/title`.
///
/// Most queries nest a handful of levels deep, so segments live inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResultPath {
    segments: SmallVec<[PathSegment; 8]>,
}

impl ResultPath {
    /// The response root, displayed as `/`.
    pub fn root() -> Self {
        ResultPath::default()
    }

    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Field(key.to_owned()));
        path
    }

    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Index(index));
        path
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for ResultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => write!(f, "/{name}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}
