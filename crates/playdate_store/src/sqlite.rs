//! SQLite-backed document store.
//!
//! Documents are stored as JSON in a `data` column next to the columns the
//! store itself needs: the version stamp for conditional writes and, for
//! playdates, the date in milliseconds so range queries can use an index.

use async_trait::async_trait;
use chrono::Utc;
use entities::{NewPlaydate, Participant, Playdate, User};
use sqlx::{sqlite::SqlitePoolOptions, FromRow, Pool, Sqlite};
use uuid::Uuid;

use crate::{PlaydateFilter, PlaydateStore, SortOrder, StoreError, StoreResult};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    version INTEGER NOT NULL,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS playdates (
    id TEXT PRIMARY KEY,
    date_ms INTEGER NOT NULL,
    created_ms INTEGER NOT NULL,
    version INTEGER NOT NULL,
    data TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_playdates_date ON playdates (date_ms);
"#;

/// Database row holding one JSON document
#[derive(Debug, FromRow)]
struct DocumentRow {
    data: String,
    version: i64,
}

impl DocumentRow {
    fn into_user(self) -> StoreResult<User> {
        let mut user: User = serde_json::from_str(&self.data)?;
        user.version = self.version as u64;
        Ok(user)
    }

    fn into_playdate(self) -> StoreResult<Playdate> {
        let mut playdate: Playdate = serde_json::from_str(&self.data)?;
        playdate.version = self.version as u64;
        Ok(playdate)
    }
}

fn map_insert_error(e: sqlx::Error, entity_type: &'static str, id: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::already_exists(entity_type, id)
        }
        _ => e.into(),
    }
}

/// SQLite document store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connects to a database URL such as `sqlite:playdates.db?mode=rwc`
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` sees its own database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::debug!("SQLite schema ready");
        Ok(())
    }

    async fn user_version(&self, id: &str) -> StoreResult<Option<u64>> {
        let version: Option<i64> = sqlx::query_scalar("SELECT version FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(version.map(|v| v as u64))
    }

    async fn playdate_version(&self, id: Uuid) -> StoreResult<Option<u64>> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM playdates WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        Ok(version.map(|v| v as u64))
    }
}

#[async_trait]
impl PlaydateStore for SqliteStore {
    // ========== User Operations ==========

    async fn create_user(&self, mut user: User) -> StoreResult<User> {
        user.version = 1;
        let data = serde_json::to_string(&user)?;

        sqlx::query("INSERT INTO users (id, email, version, data) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(user.version as i64)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, "User", &user.id))?;

        Ok(user)
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT data, version FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(DocumentRow::into_user).transpose()
    }

    async fn update_user(&self, mut user: User) -> StoreResult<User> {
        let expected = user.version;
        user.version = expected + 1;
        user.updated_at = Utc::now();
        let data = serde_json::to_string(&user)?;

        let result = sqlx::query("UPDATE users SET data = ?, version = ? WHERE id = ? AND version = ?")
            .bind(data)
            .bind(user.version as i64)
            .bind(&user.id)
            .bind(expected as i64)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return match self.user_version(&user.id).await? {
                Some(actual) => Err(StoreError::version_mismatch("User", user.id, expected, actual)),
                None => Err(StoreError::not_found("User", user.id)),
            };
        }

        Ok(user)
    }

    // ========== Playdate Operations ==========

    async fn create_playdate(&self, playdate: NewPlaydate) -> StoreResult<Playdate> {
        let playdate = Playdate::from_new(Uuid::new_v4(), playdate);
        let data = serde_json::to_string(&playdate)?;
        let id = playdate.id.to_string();

        sqlx::query(
            "INSERT INTO playdates (id, date_ms, created_ms, version, data) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(playdate.date.timestamp_millis())
        .bind(playdate.created_at.timestamp_millis())
        .bind(playdate.version as i64)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "Playdate", &id))?;

        Ok(playdate)
    }

    async fn get_playdate(&self, id: Uuid) -> StoreResult<Option<Playdate>> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT data, version FROM playdates WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(DocumentRow::into_playdate).transpose()
    }

    async fn list_playdates(&self, filter: &PlaydateFilter) -> StoreResult<Vec<Playdate>> {
        let direction = match filter.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let where_clause = if filter.date_range.is_some() {
            "WHERE date_ms >= ? AND date_ms < ?"
        } else {
            ""
        };
        let sql = format!(
            "SELECT data, version FROM playdates {where_clause} \
             ORDER BY date_ms {direction}, created_ms {direction}, id {direction}"
        );

        let mut query = sqlx::query_as::<_, DocumentRow>(&sql);
        if let Some(range) = &filter.date_range {
            query = query
                .bind(range.start.timestamp_millis())
                .bind(range.end.timestamp_millis());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(DocumentRow::into_playdate).collect()
    }

    async fn update_playdate(&self, mut playdate: Playdate) -> StoreResult<Playdate> {
        let expected = playdate.version;
        playdate.version = expected + 1;
        playdate.updated_at = Utc::now();
        let data = serde_json::to_string(&playdate)?;

        let result = sqlx::query(
            "UPDATE playdates SET data = ?, date_ms = ?, version = ? WHERE id = ? AND version = ?",
        )
        .bind(data)
        .bind(playdate.date.timestamp_millis())
        .bind(playdate.version as i64)
        .bind(playdate.id.to_string())
        .bind(expected as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let id = playdate.id.to_string();
            return match self.playdate_version(playdate.id).await? {
                Some(actual) => Err(StoreError::version_mismatch("Playdate", id, expected, actual)),
                None => Err(StoreError::not_found("Playdate", id)),
            };
        }

        Ok(playdate)
    }

    async fn replace_participants(
        &self,
        id: Uuid,
        expected_version: u64,
        participants: Vec<Participant>,
    ) -> StoreResult<Playdate> {
        let mut playdate = self
            .get_playdate(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Playdate", id.to_string()))?;
        if playdate.version != expected_version {
            return Err(StoreError::version_mismatch(
                "Playdate",
                id.to_string(),
                expected_version,
                playdate.version,
            ));
        }

        // The UPDATE is itself conditioned on the version, so a writer that
        // slips in between the read above and this write still loses.
        playdate.participants = participants;
        self.update_playdate(playdate).await
    }

    async fn delete_playdate(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM playdates WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Playdate", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone};
    use entities::{AgeRange, Coordinates, Location, UserSnapshot};

    use super::*;
    use crate::DateRange;

    fn new_playdate(title: &str, date: DateTime<Utc>) -> NewPlaydate {
        NewPlaydate {
            title: title.to_string(),
            description: Some("Bring a shovel".to_string()),
            organizer_id: "organizer".to_string(),
            organizer: UserSnapshot::new("organizer", "org@example.com", "Olli"),
            location: Location::new("Park", "Street 1", Coordinates::new(60.17, 24.94)),
            date,
            start_time: "14:00".to_string(),
            end_time: "16:00".to_string(),
            participants: Vec::new(),
            max_participants: Some(6),
            age_range: AgeRange::new(2, 5),
        }
    }

    #[tokio::test]
    async fn test_sqlite_user_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();

        let created = store
            .create_user(User::new("user-1", "anna@example.com", "Anna"))
            .await
            .unwrap();
        assert_eq!(created.version, 1);

        let duplicate = store
            .create_user(User::new("user-1", "other@example.com", "Other"))
            .await;
        assert!(matches!(duplicate, Err(StoreError::AlreadyExists { .. })));

        let mut fetched = store.get_user("user-1").await.unwrap().unwrap();
        assert_eq!(fetched, created);

        fetched.phone_number = Some("040 123".to_string());
        let updated = store.update_user(fetched).await.unwrap();
        assert_eq!(updated.version, 2);

        let reread = store.get_user("user-1").await.unwrap().unwrap();
        assert_eq!(reread.phone_number.as_deref(), Some("040 123"));
        assert_eq!(reread.version, 2);
    }

    #[tokio::test]
    async fn test_sqlite_stale_user_update() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store
            .create_user(User::new("user-1", "anna@example.com", "Anna"))
            .await
            .unwrap();

        store.update_user(user.clone()).await.unwrap();
        let err = store.update_user(user).await.unwrap_err();
        assert!(err.is_version_mismatch());

        let missing = store
            .update_user(User::new("ghost", "ghost@example.com", "Ghost"))
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_sqlite_playdate_lifecycle() {
        let store = SqliteStore::in_memory().await.unwrap();
        let date = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

        let created = store
            .create_playdate(new_playdate("Sandbox", date))
            .await
            .unwrap();
        let fetched = store.get_playdate(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Sandbox");
        assert_eq!(fetched.age_range, AgeRange::new(2, 5));
        assert_eq!(fetched.max_participants, Some(6));

        let participant = Participant::new(
            "user-1",
            UserSnapshot::new("user-1", "a@example.com", "A"),
            2,
        );
        let joined = store
            .replace_participants(created.id, fetched.version, vec![participant])
            .await
            .unwrap();
        assert_eq!(joined.version, 2);

        let stale = store
            .replace_participants(created.id, fetched.version, vec![])
            .await
            .unwrap_err();
        assert!(stale.is_version_mismatch());

        let stored = store.get_playdate(created.id).await.unwrap().unwrap();
        assert_eq!(stored.participants.len(), 1);
        assert_eq!(stored.participants[0].children_count, 2);

        store.delete_playdate(created.id).await.unwrap();
        assert!(store.get_playdate(created.id).await.unwrap().is_none());
        assert!(store.delete_playdate(created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_sqlite_list_by_date_range() {
        let store = SqliteStore::in_memory().await.unwrap();
        let day = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();

        for (title, offset) in [
            ("Late", Duration::hours(18)),
            ("Early", Duration::hours(8)),
            ("Next day", Duration::days(1)),
            ("Midnight", Duration::zero()),
        ] {
            store
                .create_playdate(new_playdate(title, day + offset))
                .await
                .unwrap();
        }

        let filter =
            PlaydateFilter::new().with_date_range(DateRange::new(day, day + Duration::days(1)));
        let titles: Vec<String> = store
            .list_playdates(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Midnight", "Early", "Late"]);

        let descending = store
            .list_playdates(&PlaydateFilter::new().with_order(SortOrder::Descending))
            .await
            .unwrap();
        assert_eq!(descending.first().map(|p| p.title.as_str()), Some("Next day"));
    }
}
