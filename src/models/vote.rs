use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Bad,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Like => "like",
            VoteKind::Bad => "bad",
        }
    }
}

impl FromStr for VoteKind {
    type Err = String;

    // Exact match only; "Like" or " like" are not votes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(VoteKind::Like),
            "bad" => Ok(VoteKind::Bad),
            _ => Err(format!("Unknown vote kind: {}", s)),
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounters {
    pub like: u64,
    pub bad: u64,
}

impl VoteCounters {
    pub fn new(like: u64, bad: u64) -> Self {
        Self { like, bad }
    }

    pub fn count(&self, kind: VoteKind) -> u64 {
        match kind {
            VoteKind::Like => self.like,
            VoteKind::Bad => self.bad,
        }
    }

    pub fn incremented(mut self, kind: VoteKind) -> Self {
        match kind {
            VoteKind::Like => self.like += 1,
            VoteKind::Bad => self.bad += 1,
        }
        self
    }
}

/// Client-held record of a vote. Lives in a cookie, never on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteMarker {
    pub item_id: i64,
    pub kind: VoteKind,
    pub expires_at: DateTime<Utc>,
}

// Vote request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub item_id: i64,
    pub kind: String,
    #[serde(default, alias = "nonce")]
    pub anti_forgery_token: String,
}

// Vote response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub data: VoteCounters,
}

impl From<VoteCounters> for VoteResponse {
    fn from(data: VoteCounters) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_is_exact() {
        assert_eq!("like".parse::<VoteKind>(), Ok(VoteKind::Like));
        assert_eq!("bad".parse::<VoteKind>(), Ok(VoteKind::Bad));
        assert!("neutral".parse::<VoteKind>().is_err());
        assert!("Like".parse::<VoteKind>().is_err());
        assert!("".parse::<VoteKind>().is_err());
    }

    #[test]
    fn increment_touches_only_the_named_counter() {
        let counters = VoteCounters::new(3, 1).incremented(VoteKind::Bad);
        assert_eq!(counters, VoteCounters::new(3, 2));
        assert_eq!(counters.count(VoteKind::Like), 3);
    }

    #[test]
    fn request_accepts_nonce_alias() {
        let request: VoteRequest =
            serde_json::from_str(r#"{"itemId":42,"kind":"like","nonce":"abc"}"#).unwrap();
        assert_eq!(request.item_id, 42);
        assert_eq!(request.anti_forgery_token, "abc");
    }
}
