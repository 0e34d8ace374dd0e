//! Repeat-vote gating.
//!
//! The marker lives in the voter's cookie jar, so this is advisory: a voter
//! who clears cookies, switches browser, or scripts requests without the
//! cookie can vote again. Signing only stops a client from minting markers
//! with arbitrary expiries; it does not give the server any memory of who
//! voted.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    auth,
    error::{AppError, Result},
    models::{VoteKind, VoteMarker},
};

pub const MARKER_COOKIE_PREFIX: &str = "lob_voted_";

pub fn marker_cookie_name(item_id: i64) -> String {
    format!("{}{}", MARKER_COOKIE_PREFIX, item_id)
}

#[derive(Debug, Serialize, Deserialize)]
struct MarkerClaims {
    item_id: i64,
    kind: VoteKind,
    exp: i64,
}

#[derive(Clone)]
pub struct VoteGuard {
    secret: String,
}

impl VoteGuard {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    pub fn issue(
        &self,
        item_id: i64,
        kind: VoteKind,
        now: DateTime<Utc>,
        days: u32,
    ) -> Result<(String, VoteMarker)> {
        let expires_at = Duration::try_days(days as i64)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| {
                AppError::Internal(format!("Marker expiry out of range for {} days", days))
            })?;
        let claims = MarkerClaims {
            item_id,
            kind,
            exp: expires_at.timestamp(),
        };
        let token = auth::sign(&claims, &self.secret)?;

        Ok((
            token,
            VoteMarker {
                item_id,
                kind,
                expires_at,
            },
        ))
    }

    /// Decodes a marker cookie value. Tampered or foreign values yield `None`.
    pub fn parse(&self, raw: &str) -> Option<VoteMarker> {
        let claims = auth::verify_signature::<MarkerClaims>(raw, &self.secret)?;
        let expires_at = Utc.timestamp_opt(claims.exp, 0).single()?;

        Some(VoteMarker {
            item_id: claims.item_id,
            kind: claims.kind,
            expires_at,
        })
    }

    /// The marker that blocks voting on `item_id`, if any.
    pub fn active_marker(
        &self,
        item_id: i64,
        raw: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<VoteMarker> {
        let raw = raw?;
        let Some(marker) = self.parse(raw) else {
            tracing::debug!("Ignoring unverifiable vote marker for item {}", item_id);
            return None;
        };

        (marker.item_id == item_id && marker.expires_at > now).then_some(marker)
    }

    pub fn can_vote(&self, item_id: i64, raw: Option<&str>, now: DateTime<Utc>) -> bool {
        self.active_marker(item_id, raw, now).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> VoteGuard {
        VoteGuard::new("marker-secret")
    }

    #[test]
    fn no_marker_allows_vote() {
        assert!(guard().can_vote(42, None, Utc::now()));
    }

    #[test]
    fn fresh_marker_blocks_until_expiry() {
        let guard = guard();
        let now = Utc::now();
        let (token, marker) = guard.issue(42, VoteKind::Bad, now, 7).unwrap();

        assert_eq!(marker.expires_at, now + Duration::days(7));
        assert!(!guard.can_vote(42, Some(token.as_str()), now));
        assert!(!guard.can_vote(42, Some(token.as_str()), now + Duration::days(6)));
        assert!(guard.can_vote(42, Some(token.as_str()), now + Duration::days(7) + Duration::seconds(1)));
    }

    #[test]
    fn marker_only_covers_its_own_item() {
        let guard = guard();
        let now = Utc::now();
        let (token, _) = guard.issue(42, VoteKind::Like, now, 7).unwrap();

        assert!(guard.can_vote(43, Some(token.as_str()), now));
    }

    #[test]
    fn garbage_marker_is_ignored() {
        let guard = guard();
        assert!(guard.can_vote(42, Some("like"), Utc::now()));
        assert!(guard.parse("like").is_none());
    }

    #[test]
    fn parse_recovers_kind() {
        let guard = guard();
        let (token, _) = guard.issue(5, VoteKind::Like, Utc::now(), 1).unwrap();
        assert_eq!(guard.parse(&token).map(|m| m.kind), Some(VoteKind::Like));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let err = guard()
            .issue(42, VoteKind::Like, DateTime::<Utc>::MAX_UTC, 1)
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn cookie_name_is_per_item() {
        assert_eq!(marker_cookie_name(42), "lob_voted_42");
    }
}
