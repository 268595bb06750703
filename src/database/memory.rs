use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use tokio::sync::RwLock;

use super::MeditationStore;
use crate::models::{MeditationSession, SessionQuery, User};
use crate::utils::AppError;

/// In-process store with the same semantics as the MongoDB collections.
/// Data lives as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    sessions: RwLock<Vec<MeditationSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeditationStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user_id() == user_id).cloned())
    }

    async fn insert_user(&self, mut user: User) -> Result<String, AppError> {
        let id = ObjectId::new();
        user.id = Some(id);
        if user.created_at.is_none() {
            user.created_at = Some(BsonDateTime::now());
        }

        self.users.write().await.push(user);
        Ok(id.to_hex())
    }

    async fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<MeditationSession>, AppError> {
        let sessions = self.sessions.read().await;

        let mut matching: Vec<MeditationSession> = sessions
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();

        matching.sort_by(|a, b| (&a.date, a.created_at).cmp(&(&b.date, b.created_at)));
        Ok(matching)
    }

    async fn insert_session(&self, mut session: MeditationSession) -> Result<String, AppError> {
        let id = ObjectId::new();
        session.id = Some(id);
        if session.created_at.is_none() {
            session.created_at = Some(BsonDateTime::now());
        }

        self.sessions.write().await.push(session);
        Ok(id.to_hex())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: &str, date: &str, duration: i64) -> MeditationSession {
        MeditationSession {
            id: None,
            user_id: user_id.to_string(),
            user_name: Some("Ana".to_string()),
            user_email: None,
            date: date.to_string(),
            duration,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_user_roundtrip_by_email_and_id() {
        let store = MemoryStore::new();
        let id = store
            .insert_user(User::new("ana@example.com".into(), "hash".into(), "Ana".into()))
            .await
            .unwrap();

        let by_email = store.find_user_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.user_id(), id);

        let by_id = store.find_user_by_id(&id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ana@example.com");

        assert!(store.find_user_by_email("bob@example.com").await.unwrap().is_none());
        assert!(store.find_user_by_id("not-an-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_sorted_and_filtered() {
        let store = MemoryStore::new();
        store.insert_session(session("u1", "2024-01-03", 10)).await.unwrap();
        store.insert_session(session("u2", "2024-01-01", 20)).await.unwrap();
        store.insert_session(session("u1", "2024-01-02", 30)).await.unwrap();

        let all = store.list_sessions(&SessionQuery::default()).await.unwrap();
        let dates: Vec<&str> = all.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert!(all.iter().all(|s| s.id.is_some() && s.created_at.is_some()));

        let query = SessionQuery {
            user_id: Some("u1".into()),
            ..Default::default()
        };
        let mine = store.list_sessions(&query).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|s| s.user_id == "u1"));
    }
}
