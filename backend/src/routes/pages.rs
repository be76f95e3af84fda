//! Static page routes for the browser UI.
//!
//! Serving only: no templating and no session handling happen here.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

/// Named views served by the UI, relative to the UI directory.
const VIEWS: [(&str, &str); 7] = [
    ("/", "index.html"),
    ("/camera", "camera.html"),
    ("/mood", "mood.html"),
    ("/stress", "stress.html"),
    ("/migrate-data", "migrate-data.html"),
    ("/login", "login.html"),
    ("/register", "register.html"),
];

pub fn router(ui_dir: &str) -> Router {
    let dir = Path::new(ui_dir);
    let mut router = Router::new();
    for (route, file) in VIEWS {
        router = router.route_service(route, ServeFile::new(dir.join(file)));
    }
    // Everything else (scripts, styles, images) comes straight off disk.
    router.fallback_service(ServeDir::new(dir))
}
