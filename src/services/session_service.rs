use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    database::MeditationStore,
    models::{MeditationSession, SessionQuery, SessionRecord},
    services::auth_service::Claims,
    services::aggregation::{self, UserDay, UserSessions, UserStats},
    utils::{parse_day, validate_duration, AppError},
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct NewSessionRequest {
    /// Day of the session, YYYY-MM-DD
    pub date: Option<String>,
    /// Minutes meditated
    pub duration: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertAcknowledgement {
    pub success: bool,
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SummaryResponse {
    pub success: bool,
    pub users: BTreeMap<String, UserSessions>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DailyResponse {
    pub success: bool,
    pub date: String,
    pub users: Vec<UserDay>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: Vec<UserStats>,
}

fn validate_query(query: &SessionQuery) -> Result<(), AppError> {
    if let Some(from) = &query.from {
        parse_day(from)?;
    }
    if let Some(to) = &query.to {
        parse_day(to)?;
    }
    Ok(())
}

pub async fn list_sessions(
    store: &dyn MeditationStore,
    query: &SessionQuery,
) -> Result<Vec<SessionRecord>, AppError> {
    validate_query(query)?;

    let sessions = store.list_sessions(query).await.map_err(|e| {
        log::error!("❌ Failed to list sessions: {}", e);
        AppError::DatabaseError("Failed to fetch sessions".to_string())
    })?;

    Ok(sessions.into_iter().map(SessionRecord::from).collect())
}

/// Logs a session for the authenticated user. Name and email are copied
/// from the user document at write time.
pub async fn create_session(
    store: &dyn MeditationStore,
    claims: &Claims,
    request: &NewSessionRequest,
) -> Result<InsertAcknowledgement, AppError> {
    let date = request
        .date
        .as_deref()
        .ok_or_else(|| AppError::InvalidRequest("Missing required fields".to_string()))
        .and_then(parse_day)?;
    let duration = request
        .duration
        .ok_or_else(|| AppError::InvalidRequest("Missing required fields".to_string()))
        .and_then(validate_duration)?;

    let user = store
        .find_user_by_id(&claims.sub)
        .await
        .map_err(|e| {
            log::error!("❌ User lookup failed: {}", e);
            AppError::DatabaseError("Failed to add session".to_string())
        })?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let session = MeditationSession {
        id: None,
        user_id: user.user_id(),
        user_name: Some(user.name.clone()),
        user_email: Some(user.email.clone()),
        date: date.format("%Y-%m-%d").to_string(),
        duration,
        created_at: Some(mongodb::bson::DateTime::now()),
    };

    let inserted_id = store.insert_session(session).await.map_err(|e| {
        log::error!("❌ Failed to insert session: {}", e);
        AppError::DatabaseError("Failed to add session".to_string())
    })?;

    Ok(InsertAcknowledgement {
        success: true,
        acknowledged: true,
        inserted_id,
    })
}

pub async fn summary(store: &dyn MeditationStore) -> Result<SummaryResponse, AppError> {
    let records = list_sessions(store, &SessionQuery::default()).await?;

    Ok(SummaryResponse {
        success: true,
        users: aggregation::group_by_user_and_date(&records),
    })
}

pub async fn daily(store: &dyn MeditationStore, date: &str) -> Result<DailyResponse, AppError> {
    let day = parse_day(date)?.format("%Y-%m-%d").to_string();
    let records = list_sessions(store, &SessionQuery::default()).await?;
    let summary = aggregation::group_by_user_and_date(&records);

    Ok(DailyResponse {
        success: true,
        users: aggregation::daily_breakdown(&summary, &day),
        date: day,
    })
}

pub async fn stats(store: &dyn MeditationStore) -> Result<StatsResponse, AppError> {
    let records = list_sessions(store, &SessionQuery::default()).await?;
    let summary = aggregation::group_by_user_and_date(&records);

    Ok(StatsResponse {
        success: true,
        stats: aggregation::user_statistics(&summary),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::User;

    async fn seeded_user(store: &MemoryStore) -> Claims {
        let id = store
            .insert_user(User::new("ana@example.com".into(), "hash".into(), "Ana".into()))
            .await
            .unwrap();
        Claims {
            sub: id,
            email: "ana@example.com".into(),
            name: Some("Ana".into()),
            iat: 0,
            exp: usize::MAX,
            jti: "test".into(),
            aud: "meditation-app".into(),
            iss: "meditation-service".into(),
        }
    }

    fn request(date: &str, duration: i64) -> NewSessionRequest {
        NewSessionRequest {
            date: Some(date.to_string()),
            duration: Some(duration),
        }
    }

    #[tokio::test]
    async fn test_create_session_attributed_to_caller() {
        let store = MemoryStore::new();
        let claims = seeded_user(&store).await;

        let ack = create_session(&store, &claims, &request("2024-05-01", 20)).await.unwrap();
        assert!(ack.acknowledged);

        let sessions = list_sessions(&store, &SessionQuery::default()).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, ack.inserted_id);
        assert_eq!(sessions[0].user_id, claims.sub);
        assert_eq!(sessions[0].user_name.as_deref(), Some("Ana"));
        assert_eq!(sessions[0].user_email.as_deref(), Some("ana@example.com"));
        assert_eq!(sessions[0].duration, 20);
    }

    #[tokio::test]
    async fn test_create_session_validation() {
        let store = MemoryStore::new();
        let claims = seeded_user(&store).await;

        for bad in [request("2024-02-30", 10), request("tomorrow", 10), request("2024-05-01", 0)] {
            let result = create_session(&store, &claims, &bad).await;
            assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        }

        let missing = NewSessionRequest { date: None, duration: Some(5) };
        assert!(matches!(
            create_session(&store, &claims, &missing).await,
            Err(AppError::InvalidRequest(_))
        ));

        assert!(list_sessions(&store, &SessionQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_session_for_unknown_user() {
        let store = MemoryStore::new();
        let mut claims = seeded_user(&store).await;
        claims.sub = mongodb::bson::oid::ObjectId::new().to_hex();

        let result = create_session(&store, &claims, &request("2024-05-01", 10)).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_list_rejects_malformed_range() {
        let store = MemoryStore::new();
        let query = SessionQuery {
            from: Some("last week".into()),
            ..Default::default()
        };
        assert!(matches!(
            list_sessions(&store, &query).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_daily_and_stats() {
        let store = MemoryStore::new();
        let claims = seeded_user(&store).await;
        create_session(&store, &claims, &request("2024-05-01", 10)).await.unwrap();
        create_session(&store, &claims, &request("2024-05-01", 25)).await.unwrap();

        let day = daily(&store, "2024-05-01").await.unwrap();
        assert_eq!(day.users.len(), 1);
        assert_eq!((day.users[0].count, day.users[0].duration), (2, 35));

        let idle = daily(&store, "2024-05-02").await.unwrap();
        assert_eq!((idle.users[0].count, idle.users[0].duration), (0, 0));

        let stats = stats(&store).await.unwrap();
        assert_eq!(stats.stats[0].total_sessions, 2);
        assert_eq!(stats.stats[0].average_minutes, 18);

        assert!(daily(&store, "05/01/2024").await.is_err());
    }
}
