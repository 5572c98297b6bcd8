//! Canonical REST paths of the ServiceDue backend.
//!
//! Every URL the SDK requests is built through [`ApiRoutes`] so the path
//! layout is defined in exactly one place.
//!
//! # Route layout
//!
//! ```text
//! POST {base}/api/auth/signin
//! POST {base}/api/auth/signup
//! POST {base}/api/auth/reset-password
//! GET  {base}/api/customers/{slug}?page={page}&limit={limit}
//! POST {base}/api/campaigns/launch
//! ```

use servicedue_models::{PageRequest, Segment};

/// Path prefix shared by every endpoint.
const PREFIX: &str = "/api";

/// Builds absolute endpoint URLs from a base URL.
///
/// # Examples
///
/// ```
/// use servicedue_models::{PageRequest, Segment};
/// use servicedue_sdk::ApiRoutes;
///
/// let routes = ApiRoutes::new("http://localhost:8000/");
/// assert_eq!(routes.sign_in(), "http://localhost:8000/api/auth/signin");
/// assert_eq!(
///     routes.customers(Segment::Winback, PageRequest::first(50)),
///     "http://localhost:8000/api/customers/winback?page=1&limit=50",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoutes {
    base: String,
}

impl ApiRoutes {
    /// Routes under `base`; a trailing slash is ignored.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    pub fn sign_in(&self) -> String {
        format!("{}{PREFIX}/auth/signin", self.base)
    }

    pub fn sign_up(&self) -> String {
        format!("{}{PREFIX}/auth/signup", self.base)
    }

    pub fn reset_password(&self) -> String {
        format!("{}{PREFIX}/auth/reset-password", self.base)
    }

    // ------------------------------------------------------------------
    // Customers & campaigns
    // ------------------------------------------------------------------

    /// Customer list of one segment, addressed by its slug.
    pub fn customers(&self, segment: Segment, page: PageRequest) -> String {
        format!(
            "{}{PREFIX}/customers/{}?page={}&limit={}",
            self.base,
            segment.slug(),
            page.page,
            page.limit
        )
    }

    pub fn launch_campaign(&self) -> String {
        format!("{}{PREFIX}/campaigns/launch", self.base)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_routes() {
        let routes = ApiRoutes::new("https://api.servicedue.in");
        assert_eq!(routes.sign_up(), "https://api.servicedue.in/api/auth/signup");
        assert_eq!(
            routes.reset_password(),
            "https://api.servicedue.in/api/auth/reset-password"
        );
    }

    #[test]
    fn customer_route_uses_slug_and_paging() {
        let routes = ApiRoutes::new("http://h");
        let page = PageRequest::first(20).next();
        assert_eq!(
            routes.customers(Segment::Warranty, page),
            "http://h/api/customers/warranty?page=2&limit=20"
        );
        assert_eq!(
            routes.customers(Segment::Routine, PageRequest::default()),
            "http://h/api/customers/routine?page=1&limit=50"
        );
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let routes = ApiRoutes::new("http://h//");
        assert_eq!(routes.base(), "http://h");
        assert_eq!(routes.launch_campaign(), "http://h/api/campaigns/launch");
    }
}
