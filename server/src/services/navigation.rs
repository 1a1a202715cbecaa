//! Site views and the paths that address them.
//!
//! The URL is only a serialization of view state: `View::parse` reads a path
//! (with optional query) into a typed view and `View::href` writes it back.

use serde::Serialize;
use url::{form_urlencoded, Url};

use crate::services::catalog::{CatalogError, FilterCriteria};

const BASE: &str = "http://marquee.local/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    Events(FilterCriteria),
    EventDetails(String),
    Checkout(String),
    Bookings,
    OrganizerDashboard,
    CreateEvent,
    EditEvent(String),
    Login { redirect: Option<String> },
    About,
    Help,
    Contact,
    Privacy,
    Terms,
    Cookies,
    NotFound(String),
}

impl View {
    /// Resolves a site-relative path such as `/events?location=Austin`.
    ///
    /// Unknown paths resolve to `NotFound`; malformed filter parameters on the
    /// events view are an error.
    pub fn parse(path: &str) -> Result<View, CatalogError> {
        let trimmed = path.trim();
        let relative = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };

        let base = Url::parse(BASE).map_err(|e| CatalogError::InvalidQuery(e.to_string()))?;
        let url = match base.join(&relative) {
            // `//host/...` would escape the site.
            Ok(url) if url.origin() == base.origin() => url,
            _ => return Ok(View::NotFound(relative)),
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let query = url.query().unwrap_or("");

        let view = match segments.as_slice() {
            [] => View::Home,
            ["events"] => View::Events(FilterCriteria::from_query_string(query)?),
            ["events", id] => View::EventDetails(id.to_string()),
            ["checkout", id] => View::Checkout(id.to_string()),
            ["bookings"] => View::Bookings,
            ["organizer"] => View::OrganizerDashboard,
            ["organizer", "events", "create"] => View::CreateEvent,
            ["organizer", "events", id, "edit"] => View::EditEvent(id.to_string()),
            ["login"] => View::Login {
                redirect: form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == "redirect")
                    .map(|(_, value)| value.into_owned())
                    .filter(|value| is_local_target(&base, value)),
            },
            ["about"] => View::About,
            ["help"] => View::Help,
            ["contact"] => View::Contact,
            ["privacy"] => View::Privacy,
            ["terms"] => View::Terms,
            ["cookies"] => View::Cookies,
            _ => View::NotFound(url.path().to_string()),
        };
        Ok(view)
    }

    pub fn href(&self) -> String {
        match self {
            View::Home => "/".to_string(),
            View::Events(criteria) => match criteria.to_query_string() {
                query if query.is_empty() => "/events".to_string(),
                query => format!("/events?{query}"),
            },
            View::EventDetails(id) => format!("/events/{id}"),
            View::Checkout(id) => format!("/checkout/{id}"),
            View::Bookings => "/bookings".to_string(),
            View::OrganizerDashboard => "/organizer".to_string(),
            View::CreateEvent => "/organizer/events/create".to_string(),
            View::EditEvent(id) => format!("/organizer/events/{id}/edit"),
            View::Login { redirect: None } => "/login".to_string(),
            View::Login {
                redirect: Some(target),
            } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("redirect", target)
                    .finish();
                format!("/login?{query}")
            }
            View::About => "/about".to_string(),
            View::Help => "/help".to_string(),
            View::Contact => "/contact".to_string(),
            View::Privacy => "/privacy".to_string(),
            View::Terms => "/terms".to_string(),
            View::Cookies => "/cookies".to_string(),
            View::NotFound(path) => path.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Events(_) => "events",
            View::EventDetails(_) => "event_details",
            View::Checkout(_) => "checkout",
            View::Bookings => "bookings",
            View::OrganizerDashboard => "organizer_dashboard",
            View::CreateEvent => "create_event",
            View::EditEvent(_) => "edit_event",
            View::Login { .. } => "login",
            View::About => "about",
            View::Help => "help",
            View::Contact => "contact",
            View::Privacy => "privacy",
            View::Terms => "terms",
            View::Cookies => "cookies",
            View::NotFound(_) => "not_found",
        }
    }

    /// The event a view is about, if any.
    pub fn event_id(&self) -> Option<&str> {
        match self {
            View::EventDetails(id) | View::Checkout(id) | View::EditEvent(id) => Some(id),
            _ => None,
        }
    }
}

/// A redirect target must be a path on this site. Joining against the base
/// catches `//host` and `/\host`, which browsers treat as another origin.
fn is_local_target(base: &Url, target: &str) -> bool {
    target.starts_with('/')
        && base
            .join(target)
            .map_or(false, |url| url.origin() == base.origin())
}

/// Wire form of a resolved view.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedView {
    pub view: &'static str,
    pub href: String,
    pub event_id: Option<String>,
    pub active_filters: Option<usize>,
}

impl From<&View> for ResolvedView {
    fn from(view: &View) -> Self {
        Self {
            view: view.name(),
            href: view.href(),
            event_id: view.event_id().map(str::to_string),
            active_filters: match view {
                View::Events(criteria) => Some(criteria.active_filter_count()),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::{Selection, SortKey};

    #[test]
    fn test_static_pages_resolve() {
        assert_eq!(View::parse("/").unwrap(), View::Home);
        assert_eq!(View::parse("").unwrap(), View::Home);
        assert_eq!(View::parse("/bookings/").unwrap(), View::Bookings);
        assert_eq!(View::parse("/organizer").unwrap(), View::OrganizerDashboard);
        assert_eq!(View::parse("/cookies").unwrap(), View::Cookies);
        assert_eq!(View::parse("terms").unwrap(), View::Terms);
    }

    #[test]
    fn test_parameterized_views() {
        assert_eq!(
            View::parse("/events/3").unwrap(),
            View::EventDetails("3".into())
        );
        assert_eq!(View::parse("/checkout/1").unwrap(), View::Checkout("1".into()));
        assert_eq!(View::parse("/organizer/events/create").unwrap(), View::CreateEvent);
        assert_eq!(
            View::parse("/organizer/events/4/edit").unwrap(),
            View::EditEvent("4".into())
        );
    }

    #[test]
    fn test_events_view_carries_criteria() {
        let view = View::parse("/events?location=Austin&sort=popular").unwrap();
        let View::Events(criteria) = &view else {
            panic!("expected events view, got {view:?}");
        };
        assert_eq!(criteria.city, Selection::Only("Austin".into()));
        assert_eq!(criteria.sort, SortKey::Popularity);
        assert_eq!(view.href(), "/events?location=Austin&sort=popularity");
    }

    #[test]
    fn test_bad_criteria_is_an_error() {
        assert!(View::parse("/events?date=tomorrow").is_err());
    }

    #[test]
    fn test_unknown_and_foreign_paths_are_not_found() {
        assert_eq!(
            View::parse("/admin").unwrap(),
            View::NotFound("/admin".into())
        );
        assert!(matches!(
            View::parse("//evil.example/phish").unwrap(),
            View::NotFound(_)
        ));
        assert!(matches!(
            View::parse("/events/1/extra").unwrap(),
            View::NotFound(_)
        ));
    }

    #[test]
    fn test_login_redirect_must_be_local() {
        let view = View::parse("/login?redirect=%2Fbookings").unwrap();
        assert_eq!(
            view,
            View::Login {
                redirect: Some("/bookings".into())
            }
        );
        assert_eq!(view.href(), "/login?redirect=%2Fbookings");

        for target in [
            "https://evil.example",
            "%2F%2Fevil.example",
            "%2F%5Cevil.example",
            "evil.example",
        ] {
            let view = View::parse(&format!("/login?redirect={target}")).unwrap();
            assert_eq!(view, View::Login { redirect: None }, "accepted {target}");
        }
    }

    #[test]
    fn test_resolved_view_wire_form() {
        let view = View::parse("/events?category=Technology").unwrap();
        let resolved = ResolvedView::from(&view);
        assert_eq!(resolved.view, "events");
        assert_eq!(resolved.active_filters, Some(1));
        assert!(resolved.event_id.is_none());
    }
}
