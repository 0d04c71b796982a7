use crate::models::{Sequence, Street, StreetStatus, User, STREETS_SEQUENCE_ID};
use crate::services::store::{StoreError, StoreResult, StreetStore};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for street-service");

        // One street per namespaced id within a namespace; the anonymous
        // namespace is `creator_id: null`.
        let namespace_index = IndexModel::builder()
            .keys(doc! { "creator_id": 1, "namespaced_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("namespace_lookup".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        let listing_index = IndexModel::builder()
            .keys(doc! { "status": 1, "updated_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("active_by_recency".to_string())
                    .build(),
            )
            .build();

        self.streets()
            .create_indexes([namespace_index, listing_index], None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create indexes on streets collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created indexes on streets");

        let token_index = IndexModel::builder()
            .keys(doc! { "login_tokens": 1 })
            .options(
                IndexOptions::builder()
                    .name("login_token_lookup".to_string())
                    .build(),
            )
            .build();

        self.users()
            .create_index(token_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create login_tokens index on users collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on users.login_tokens");

        Ok(())
    }

    pub fn streets(&self) -> Collection<Street> {
        self.db.collection("streets")
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn sequences(&self) -> Collection<Sequence> {
        self.db.collection("sequences")
    }

    fn increment_options() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build()
    }
}

#[async_trait]
impl StreetStore for MongoDb {
    async fn find_street(&self, id: &str) -> StoreResult<Option<Street>> {
        Ok(self.streets().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert_street(&self, street: &Street) -> StoreResult<()> {
        self.streets().insert_one(street, None).await?;
        Ok(())
    }

    async fn replace_street(&self, street: &Street) -> StoreResult<()> {
        let result = self
            .streets()
            .replace_one(doc! { "_id": &street.id }, street, None)
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound(format!("street {}", street.id)));
        }
        Ok(())
    }

    async fn find_street_by_namespaced_id(
        &self,
        creator_id: Option<&str>,
        namespaced_id: i64,
    ) -> StoreResult<Option<Street>> {
        let filter = doc! { "namespaced_id": namespaced_id, "creator_id": creator_id };
        Ok(self.streets().find_one(filter, None).await?)
    }

    async fn count_active_streets(&self) -> StoreResult<u64> {
        let status = bson::to_bson(&StreetStatus::Active)?;
        Ok(self
            .streets()
            .count_documents(doc! { "status": status }, None)
            .await?)
    }

    async fn list_active_streets(&self, start: u64, count: u64) -> StoreResult<Vec<Street>> {
        let status = bson::to_bson(&StreetStatus::Active)?;
        let options = FindOptions::builder()
            .sort(doc! { "updated_at": -1 })
            .skip(start)
            .limit(count as i64)
            .build();

        let cursor = self
            .streets()
            .find(doc! { "status": status }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_user_by_login_token(&self, token: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users()
            .find_one(doc! { "login_tokens": { "$in": [token] } }, None)
            .await?)
    }

    async fn remove_login_token(&self, user_id: &str, token: &str) -> StoreResult<bool> {
        let result = self
            .users()
            .update_one(
                doc! { "_id": user_id, "login_tokens": token },
                doc! {
                    "$pull": { "login_tokens": token },
                    "$set": { "updated_at": bson::DateTime::now() }
                },
                None,
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn next_user_street_id(&self, user_id: &str) -> StoreResult<i64> {
        let user = self
            .users()
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! { "$inc": { "last_street_id": 1_i64 } },
                Self::increment_options(),
            )
            .await?;

        user.map(|u| u.last_street_id)
            .filter(|id| *id > 0)
            .ok_or_else(|| StoreError::Unexpected(anyhow::anyhow!("Could not create new street ID.")))
    }

    async fn next_global_street_id(&self) -> StoreResult<i64> {
        let sequence = self
            .sequences()
            .find_one_and_update(
                doc! { "_id": STREETS_SEQUENCE_ID },
                doc! { "$inc": { "seq": 1_i64 } },
                Self::increment_options(),
            )
            .await?;

        sequence
            .map(|s| s.seq)
            .filter(|id| *id > 0)
            .ok_or_else(|| StoreError::Unexpected(anyhow::anyhow!("Could not create new street ID.")))
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
