use async_trait::async_trait;
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::ErrorKind;

use super::{MongoDB, SESSIONS, USERS};
use crate::models::{MeditationSession, SessionQuery, User};
use crate::utils::AppError;

/// Persistence operations the handlers need. Implemented by MongoDB and
/// by the in-process `MemoryStore`.
#[async_trait]
pub trait MeditationStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Inserts the user and returns its new id (hex)
    async fn insert_user(&self, user: User) -> Result<String, AppError>;

    /// Sessions matching the query, ordered by date then creation time
    async fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<MeditationSession>, AppError>;

    /// Inserts the session and returns its new id (hex)
    async fn insert_session(&self, session: MeditationSession) -> Result<String, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

fn inserted_hex(inserted_id: Bson) -> Result<String, AppError> {
    match inserted_id {
        Bson::ObjectId(oid) => Ok(oid.to_hex()),
        Bson::String(s) => Ok(s),
        other => Err(AppError::DatabaseError(format!("Unexpected inserted id: {}", other))),
    }
}

/// Undecodable documents are logged and skipped; any other cursor error aborts the read.
fn skip_unreadable(error: mongodb::error::Error) -> Result<(), AppError> {
    if matches!(*error.kind, ErrorKind::BsonDeserialization(_)) {
        log::warn!("⚠️  Skipping unreadable session: {}", error);
        return Ok(());
    }
    log::error!("❌ Session cursor failed: {}", error);
    Err(error.into())
}

pub(crate) fn session_filter(query: &SessionQuery) -> Document {
    let mut filter = Document::new();

    if let Some(user_id) = &query.user_id {
        filter.insert("userId", user_id.as_str());
    }

    let mut date_range = Document::new();
    if let Some(from) = &query.from {
        date_range.insert("$gte", from.as_str());
    }
    if let Some(to) = &query.to {
        date_range.insert("$lte", to.as_str());
    }
    if !date_range.is_empty() {
        filter.insert("date", date_range);
    }

    filter
}

#[async_trait]
impl MeditationStore for MongoDB {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let collection = self.collection::<User>(USERS);
        Ok(collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        // Tokens from another deployment may carry ids that are not ObjectIds
        let oid = match ObjectId::parse_str(user_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let collection = self.collection::<User>(USERS);
        Ok(collection.find_one(doc! { "_id": oid }).await?)
    }

    async fn insert_user(&self, user: User) -> Result<String, AppError> {
        let collection = self.collection::<User>(USERS);
        let result = collection.insert_one(&user).await?;
        inserted_hex(result.inserted_id)
    }

    async fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<MeditationSession>, AppError> {
        let collection = self.collection::<MeditationSession>(SESSIONS);

        let options = mongodb::options::FindOptions::builder()
            .sort(doc! { "date": 1, "createdAt": 1 })
            .build();

        let mut cursor = collection
            .find(session_filter(query))
            .with_options(options)
            .await?;

        let mut sessions = Vec::new();

        while let Some(result) = cursor.next().await {
            match result {
                Ok(session) => sessions.push(session),
                Err(e) => skip_unreadable(e)?,
            }
        }

        Ok(sessions)
    }

    async fn insert_session(&self, session: MeditationSession) -> Result<String, AppError> {
        let collection = self.collection::<MeditationSession>(SESSIONS);
        let result = collection.insert_one(&session).await?;
        inserted_hex(result.inserted_id)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
