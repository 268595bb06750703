use mongodb::bson::{oid::ObjectId, Bson, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Document in the "sessions" collection: one logged meditation
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MeditationSession {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    // Empty for sessions logged before sign-in existed
    #[serde(default)]
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_email: Option<String>,
    pub date: String, // YYYY-MM-DD
    #[serde(deserialize_with = "deserialize_minutes")]
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<BsonDateTime>,
}

// Older documents were written from JS and may hold the duration as a double
fn deserialize_minutes<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Bson::deserialize(deserializer)? {
        Bson::Int32(n) => Ok(n as i64),
        Bson::Int64(n) => Ok(n),
        Bson::Double(n) if n.is_finite() => Ok(n.round() as i64),
        Bson::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom("Expected numeric duration")),
        _ => Err(serde::de::Error::custom("Expected numeric duration")),
    }
}

/// Session record as returned by the API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub date: String,
    pub duration: i64,
    pub created_at: Option<String>,
}

impl From<MeditationSession> for SessionRecord {
    fn from(session: MeditationSession) -> Self {
        Self {
            id: session.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: session.user_id,
            user_name: session.user_name,
            user_email: session.user_email,
            date: session.date,
            duration: session.duration,
            created_at: session
                .created_at
                .and_then(|dt| dt.try_to_rfc3339_string().ok()),
        }
    }
}

/// Filters for listing sessions, all optional
#[derive(Debug, Deserialize, Clone, Default, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SessionQuery {
    pub user_id: Option<String>,
    /// First day included, YYYY-MM-DD
    pub from: Option<String>,
    /// Last day included, YYYY-MM-DD
    pub to: Option<String>,
}

impl SessionQuery {
    pub fn matches(&self, session: &MeditationSession) -> bool {
        if let Some(user_id) = &self.user_id {
            if &session.user_id != user_id {
                return false;
            }
        }
        // ISO days compare correctly as strings
        if let Some(from) = &self.from {
            if session.date.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if session.date.as_str() > to.as_str() {
                return false;
            }
        }
        true
    }
}
