//! Utility functions for common operations.
//!
//! - **URL validation**: gatekeeping for URLs handed to the system browser
//! - **Text processing**: sanitizing and width-aware truncation of untrusted text
//!
//! # Examples
//!
//! ```
//! use cognos::util::{single_line, truncate_to_width, validate_url_for_open};
//!
//! let url = validate_url_for_open("https://example.com/story").unwrap();
//! assert_eq!(url.host_str(), Some("example.com"));
//!
//! let title = single_line("Breaking:\nnews");
//! assert_eq!(truncate_to_width(&title, 10), "Breaking:…");
//! ```

mod text;
mod url_validator;

pub use text::{single_line, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};
