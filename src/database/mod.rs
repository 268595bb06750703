pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::MeditationStore;

use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        let db_name = database_name(uri);
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;
        log::info!("✅ Connected to MongoDB database: {}", db_name);

        let mongodb = Self { db };
        mongodb.ensure_indexes().await;

        Ok(mongodb)
    }

    /// Index failures are logged and ignored, queries still work without them
    async fn ensure_indexes(&self) {
        use mongodb::bson::{doc, Document};
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // Login and registration look users up by email
        let users = self.collection::<Document>(USERS);
        let email_index = IndexModel::builder().keys(doc! { "email": 1 }).build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email)"),
            Err(e) => log::debug!("   ℹ️  Index not created: {}", e),
        }

        let sessions = self.collection::<Document>(SESSIONS);
        let sessions_index = IndexModel::builder()
            .keys(doc! { "userId": 1, "date": 1 })
            .build();

        match sessions.create_index(sessions_index).await {
            Ok(_) => log::info!("   ✅ Index created: sessions(userId, date)"),
            Err(e) => log::debug!("   ℹ️  Index not created: {}", e),
        }

        log::info!("✅ Database indexes ready");
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Database name from the URI path, "meditation" when the URI has none
pub fn database_name(uri: &str) -> String {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or("meditation")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name("mongodb://localhost:27017/meditation"), "meditation");
        assert_eq!(database_name("mongodb://localhost:27017/zen?retryWrites=true"), "zen");
        assert_eq!(database_name("mongodb://localhost:27017"), "meditation");
        assert_eq!(database_name("mongodb://localhost:27017/"), "meditation");
        assert_eq!(
            database_name("mongodb+srv://user:pw@cluster.example.net/calm?w=majority"),
            "calm"
        );
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| crate::config::DEFAULT_MONGODB_URI.to_string());

        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
        assert!(db.unwrap().ping().await.is_ok());
    }
}
