//! Public locator URLs for stored files

use crate::config::HttpSettings;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in a filename segment: everything outside
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Render the public URL of `filename`
///
/// The filename is encoded as a single path segment, so `/` and `?` inside
/// it are escaped too. The port is left out when it is exactly 80.
pub fn file_location(http: &HttpSettings, filename: &str) -> String {
    let encoded = utf8_percent_encode(filename, SEGMENT);

    let (scheme, host) = match http.host.split_once("://") {
        Some((scheme, host)) => (scheme, host),
        None => ("http", http.host.as_str()),
    };
    let host = host.trim_end_matches('/');

    let authority = if http.port == 80 {
        host.to_string()
    } else {
        format!("{}:{}", host, http.port)
    };

    format!("{}://{}{}/{}", scheme, authority, base_path(&http.path), encoded)
}

/// Collapse duplicate slashes and strip the trailing one; `/` becomes empty
fn base_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(String::new(), |mut acc, segment| {
            acc.push('/');
            acc.push_str(segment);
            acc
        })
}
