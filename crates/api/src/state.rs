use folio_core::gallery::GalleryService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the gateways behind the service are `Arc`s).
#[derive(Clone)]
pub struct AppState {
    /// Gallery operations over the injected record and object gateways.
    pub gallery: GalleryService,
}
