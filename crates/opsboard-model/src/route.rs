//! Client-side screens consumers map URL paths to

use crate::stage::Lane;
use serde::{Deserialize, Serialize};

/// Dashboard screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// `/` - kanban board
    Board,
    /// `/backend` - fulfilled requests and archived joiners
    Backend,
    /// `/tables` - tabular view
    Tables,
    /// `/news` - news admin
    News,
    /// Anything else
    NotFound,
}

impl Route {
    /// Resolve a URL path; trailing slashes and query strings are ignored
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Board,
            "/backend" => Route::Backend,
            "/tables" => Route::Tables,
            "/news" => Route::News,
            _ => Route::NotFound,
        }
    }

    /// Canonical path, `None` for the not-found screen
    #[must_use]
    pub fn path(self) -> Option<&'static str> {
        match self {
            Route::Board => Some("/"),
            Route::Backend => Some("/backend"),
            Route::Tables => Some("/tables"),
            Route::News => Some("/news"),
            Route::NotFound => None,
        }
    }

    /// Lanes rendered on this screen
    #[must_use]
    pub fn lanes(self) -> &'static [Lane] {
        match self {
            Route::Board => &[
                Lane::NewRequests,
                Lane::RequestsInProcess,
                Lane::MotiusAsks,
                Lane::FulfillRequests,
                Lane::NewJoiners,
                Lane::Nominations,
                Lane::Onboarding,
                Lane::CustomSection,
                Lane::PriorityNudging,
            ],
            Route::Backend | Route::Tables => &[Lane::FulfilledRequests, Lane::RecentJoiners],
            Route::News => &[Lane::News],
            Route::NotFound => &[],
        }
    }
}
