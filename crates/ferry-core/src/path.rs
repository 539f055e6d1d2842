//! Remote path joining

use crate::{Error, Result};
use tracing::warn;

/// Join a filename onto the remote base directory
///
/// Both parts are normalised POSIX-style: empty and `.` segments are dropped
/// and `..` removes the previous segment. An absolute base stays absolute;
/// a relative one keeps any `..` it starts with.
///
/// # Errors
/// Returns [`Error::InvalidFilename`] if the filename names nothing below
/// the base, either because it is empty or because it climbs out of it.
pub fn remote_path(base: &str, filename: &str) -> Result<String> {
    let mut segments = normalize(base);
    let floor = segments.len();

    for segment in filename.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.len() == floor {
                    warn!(base, filename, "Filename escapes remote base path");
                    return Err(Error::InvalidFilename(filename.to_string()));
                }
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    if segments.len() == floor {
        return Err(Error::InvalidFilename(filename.to_string()));
    }

    let joined = segments.join("/");
    if base.starts_with('/') {
        Ok(format!("/{}", joined))
    } else {
        Ok(joined)
    }
}

/// Leading `..` segments survive in a relative path; above `/` they vanish
fn normalize(path: &str) -> Vec<&str> {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if !absolute => segments.push(".."),
                _ => {}
            },
            name => segments.push(name),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_under_root() {
        assert_eq!(remote_path("/", "a.txt").unwrap(), "/a.txt");
    }

    #[test]
    fn test_join_under_base() {
        assert_eq!(remote_path("/uploads", "a.txt").unwrap(), "/uploads/a.txt");
        assert_eq!(remote_path("/uploads/", "/a.txt").unwrap(), "/uploads/a.txt");
        assert_eq!(remote_path("//uploads//", "dir//a.txt").unwrap(), "/uploads/dir/a.txt");
    }

    #[test]
    fn test_relative_base() {
        assert_eq!(remote_path("uploads", "a.txt").unwrap(), "uploads/a.txt");
        assert_eq!(remote_path("", "a.txt").unwrap(), "a.txt");
    }

    #[test]
    fn test_relative_base_keeps_parent_segments() {
        assert_eq!(remote_path("../data", "a").unwrap(), "../data/a");
        assert_eq!(remote_path("..", "a").unwrap(), "../a");
        assert_eq!(remote_path("x/../../data", "a").unwrap(), "../data/a");
        assert!(remote_path("../data", "../a").is_err());
    }

    #[test]
    fn test_parent_of_root_is_root() {
        assert_eq!(remote_path("/../uploads", "a").unwrap(), "/uploads/a");
    }

    #[test]
    fn test_dot_segments() {
        assert_eq!(remote_path("/uploads/./x/..", "./a.txt").unwrap(), "/uploads/a.txt");
        assert_eq!(remote_path("/uploads", "dir/../a.txt").unwrap(), "/uploads/a.txt");
    }

    #[test]
    fn test_escape_rejected() {
        assert!(matches!(
            remote_path("/uploads", "../etc/passwd"),
            Err(Error::InvalidFilename(_))
        ));
        assert!(remote_path("/uploads", "a/../../b").is_err());
    }

    #[test]
    fn test_empty_filename_rejected() {
        assert!(remote_path("/uploads", "").is_err());
        assert!(remote_path("/uploads", "./").is_err());
        assert!(remote_path("/uploads", "a/..").is_err());
    }

    #[test]
    fn test_reserved_characters_kept() {
        assert_eq!(remote_path("/", "a b?#.txt").unwrap(), "/a b?#.txt");
    }
}
