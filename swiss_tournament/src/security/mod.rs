//! Security module providing input sanitization at the registration boundary.
//!
//! Player names are caller-supplied text that ends up in the store and, from
//! there, in any view rendering standings or pairings. Names are trimmed,
//! markup-escaped and length-checked before they are written.
//!
//! ## Example
//!
//! ```
//! use swiss_tournament::security::sanitize_name;
//!
//! assert_eq!(sanitize_name(" <i>Ann</i> ").unwrap(), "&lt;i&gt;Ann&lt;/i&gt;");
//! ```

pub mod sanitize;

pub use sanitize::{MAX_NAME_LEN, escape_markup, sanitize_name};
