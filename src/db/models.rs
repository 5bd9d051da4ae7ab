use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

/// A classification event that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewClassification {
    pub filename: String,
    pub filepath: String,
    pub prediction: String,
    pub created_at: String,
}

impl NewClassification {
    pub fn new(
        filename: String,
        filepath: String,
        prediction: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            filename,
            filepath,
            prediction,
            created_at: created_at.to_rfc3339(),
        }
    }
}

/// One persisted upload-and-predict event. Rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationRecord {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub prediction: String,
    pub created_at: String,
}

impl ClassificationRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            filename: row.try_get("filename")?,
            filepath: row.try_get("filepath")?,
            prediction: row.try_get("prediction")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema = include_str!("schema.sql");
    sqlx::raw_sql(schema).execute(pool).await?;
    Ok(())
}

pub async fn insert_record(
    pool: &SqlitePool,
    record: &NewClassification,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO classifications (filename, filepath, prediction, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&record.filename)
    .bind(&record.filepath)
    .bind(&record.prediction)
    .bind(&record.created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// All rows in storage order.
pub async fn get_all_records(pool: &SqlitePool) -> Result<Vec<ClassificationRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, filename, filepath, prediction, created_at
        FROM classifications
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(ClassificationRecord::from_row).collect()
}

/// Newest rows first.
pub async fn get_recent_records(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<ClassificationRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, filename, filepath, prediction, created_at
        FROM classifications
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(ClassificationRecord::from_row).collect()
}

pub async fn count_records(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS total FROM classifications")
        .fetch_one(pool)
        .await?;
    row.try_get("total")
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_db(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(filename: &str, prediction: &str) -> NewClassification {
        NewClassification::new(
            filename.to_string(),
            format!("./image/{}", filename),
            prediction.to_string(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let pool = test_pool().await;

        let first = insert_record(&pool, &new_record("111111.jpg", "tabby (87.31%)")).await.unwrap();
        let second = insert_record(&pool, &new_record("222222.png", "tench (12.00%)")).await.unwrap();

        assert!(second > first);
        assert_eq!(count_records(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_all_in_storage_order() {
        let pool = test_pool().await;
        for (name, prediction) in [("a.jpg", "a (1.00%)"), ("b.jpg", "b (2.00%)"), ("c.jpg", "c (3.00%)")] {
            insert_record(&pool, &new_record(name, prediction)).await.unwrap();
        }

        let records = get_all_records(&pool).await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(records[1].filepath, "./image/b.jpg");
        assert_eq!(records[1].prediction, "b (2.00%)");
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let pool = test_pool().await;
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            insert_record(&pool, &new_record(name, "x (50.00%)")).await.unwrap();
        }

        let recent = get_recent_records(&pool, 2).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["c.jpg", "b.jpg"]);
    }

    #[tokio::test]
    async fn test_duplicate_filenames_are_kept_as_separate_rows() {
        let pool = test_pool().await;
        insert_record(&pool, &new_record("424242.jpg", "tabby (80.00%)")).await.unwrap();
        insert_record(&pool, &new_record("424242.jpg", "tench (60.00%)")).await.unwrap();

        let records = get_all_records(&pool).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.filename == "424242.jpg"));
    }
}
