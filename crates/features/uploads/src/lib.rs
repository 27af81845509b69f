//! Uploads feature slice.
//!
//! Accepts multipart uploads for every [`Category`](depot_domain::category::Category), validates
//! them against the configured policy, stores them under `<category>/<sub-category>/<name>`, and
//! serves them back through a gateway that never leaves the storage root.
//!
//! | Route                                 | Purpose                                   |
//! |---------------------------------------|-------------------------------------------|
//! | `POST /api/uploads/{category}`        | store a file                              |
//! | `GET /api/files?path=`                | stream any stored file                    |
//! | `GET /api/files/image?path=`          | stream a stored image                     |
//! | `GET /api/files/list?type=`           | list a category, newest first (admin)     |
//! | `GET /<public_prefix>/{*path}`        | public URL of a stored file               |

mod error;
pub mod form;
pub mod gateway;
mod handlers;
pub mod layout;
pub mod model;
pub mod naming;
mod router;
pub mod service;
pub mod validator;

pub use crate::error::{UploadError, UploadErrorExt};
pub use crate::model::{FileEntry, ListResponse, UploadResponse};
pub use crate::router::{body_limit, uploads_router};
