//! Actor attribution from request headers.
//!
//! Authentication is external; requests may carry `x-actor-id` and
//! `x-actor-email` headers identifying who made the change. Missing or
//! unparseable headers mean an unattributed entry, never a rejected
//! request.

use axum::http::HeaderMap;

use qal_core::entities::ActorRef;

pub(crate) const ACTOR_ID_HEADER: &str = "x-actor-id";
pub(crate) const ACTOR_EMAIL_HEADER: &str = "x-actor-email";

pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Option<ActorRef> {
    let id = headers
        .get(ACTOR_ID_HEADER)?
        .to_str()
        .ok()?
        .parse::<i64>()
        .ok()?;
    let email = headers
        .get(ACTOR_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    Some(ActorRef { id, email })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn both_headers_present() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_ID_HEADER, HeaderValue::from_static("7"));
        headers.insert(
            ACTOR_EMAIL_HEADER,
            HeaderValue::from_static("qa-lead@example.com"),
        );

        let actor = actor_from_headers(&headers).unwrap();
        assert_eq!(actor.id, 7);
        assert_eq!(actor.email.as_deref(), Some("qa-lead@example.com"));
    }

    #[test]
    fn id_alone_is_enough() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_ID_HEADER, HeaderValue::from_static("12"));

        let actor = actor_from_headers(&headers).unwrap();
        assert_eq!(actor.id, 12);
        assert_eq!(actor.email, None);
    }

    #[test]
    fn email_without_id_is_unattributed() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_EMAIL_HEADER, HeaderValue::from_static("qa@example.com"));
        assert!(actor_from_headers(&headers).is_none());
    }

    #[test]
    fn garbage_id_is_unattributed() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_ID_HEADER, HeaderValue::from_static("not-a-number"));
        assert!(actor_from_headers(&headers).is_none());
    }
}
