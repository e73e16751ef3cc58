//! Request handlers.
//!
//! Handlers delegate to [`folio_core::gallery::GalleryService`] and map
//! errors via [`crate::error::AppError`].

pub mod photo;
