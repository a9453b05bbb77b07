//! Member records and the registration boundary.

mod service;
mod store;

pub use service::{RegisterError, RegistrationService};
pub use store::{MemoryUserStore, PgUserStore, StoreError, UserStore};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Registration payload: a username plus whatever profile fields the client
/// sends. Profile fields are opaque here and persisted verbatim.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Member {
    pub username: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub profile: Map<String, Value>,
}

/// Read-only projection returned by the user-info lookup.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub username: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub profile: Map<String, Value>,
}

impl From<Member> for UserSummary {
    fn from(member: Member) -> Self {
        Self {
            username: member.username,
            profile: member.profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_keeps_unknown_profile_fields() {
        let member: Member = serde_json::from_value(json!({
            "username": "maria",
            "city": "Manila",
            "languages": ["en", "tl"],
        }))
        .unwrap();

        assert_eq!(member.username, "maria");
        assert_eq!(member.profile.get("city"), Some(&json!("Manila")));

        let round_trip = serde_json::to_value(&member).unwrap();
        assert_eq!(round_trip.get("languages"), Some(&json!(["en", "tl"])));
    }

    #[test]
    fn summary_mirrors_member_fields() {
        let member: Member = serde_json::from_value(json!({
            "username": "maria",
            "city": "Manila",
        }))
        .unwrap();

        let summary = UserSummary::from(member.clone());
        assert_eq!(summary.username, member.username);
        assert_eq!(summary.profile, member.profile);
    }
}
