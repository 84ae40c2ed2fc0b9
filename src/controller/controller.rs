// HTTP controller trait for route registration.

use axum::Router;

/// Trait for adding routes to the admin HTTP server.
pub trait Controller: Send + Sync {
    /// Adds routes to the router.
    ///
    /// ```rust
    /// # use axum::{Router, routing::get};
    /// # async fn handler() -> &'static str { "normal" }
    /// let router: Router<()> = Router::new().route("/router/regime", get(handler));
    /// # let _ = router;
    /// ```
    fn add_route(&self, router: Router) -> Router;
}
