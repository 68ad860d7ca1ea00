//! Route Binder
//!
//! One module per resource. Each returns a `Router<AppState>` declaring the method and path
//! of every handler. Access control is evaluated inside the handlers from `AppConfig::policies`.

/// `/api/surveys` collection and item routes.
pub mod surveys;

/// `/api/locations` collection and item routes, plus the surveys-of-a-location listing.
pub mod locations;
