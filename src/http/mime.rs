//! MIME type detection module
//!
//! Returns the Content-Type for a file based on its extension.

use std::path::Path;

/// Charset suffix appended to every file Content-Type, binary types included
pub const CHARSET_SUFFIX: &str = ";charset=utf8";

/// Content-Type for a served file: guessed MIME type plus `;charset=utf8`
///
/// # Examples
/// ```
/// use std::path::Path;
/// use static_server::http::mime::get_content_type;
/// assert_eq!(get_content_type(Path::new("a.html")), "text/html;charset=utf8");
/// assert_eq!(get_content_type(Path::new("clip.mp4")), "video/mp4;charset=utf8");
/// assert_eq!(get_content_type(Path::new("blob")), "application/octet-stream;charset=utf8");
/// ```
pub fn get_content_type(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    format!("{}{CHARSET_SUFFIX}", mime.essence_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Path::new("index.html")), "text/html;charset=utf8");
        assert_eq!(get_content_type(Path::new("style.css")), "text/css;charset=utf8");
        assert_eq!(get_content_type(Path::new("data.json")), "application/json;charset=utf8");
        assert_eq!(get_content_type(Path::new("logo.png")), "image/png;charset=utf8");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(
            get_content_type(Path::new("file.zzzunknown")),
            "application/octet-stream;charset=utf8"
        );
        assert_eq!(
            get_content_type(Path::new("Makefile")),
            "application/octet-stream;charset=utf8"
        );
    }
}
