//! Item CRUD for SQL backends.

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::merge_fields;
use crate::entity::{CollectionScope, Fields, ItemId, NewRecord, Position, Record};

use super::{SqlxBackend, SqlxResultExt};

type ItemRow = (String, String, String, i64, String, i64, i64);

const SELECT_COLUMNS: &str =
    "SELECT id, kind, parent_id, position, fields_json, created_at, updated_at FROM items";

fn parent_column(scope: &CollectionScope) -> String {
    scope.parent().map(|p| p.to_string()).unwrap_or_default()
}

fn row_to_record(row: ItemRow) -> Result<Record> {
    let (id, kind, parent_id, position, fields_json, created_at, updated_at) = row;
    let corrupt = |reason: String| BackendError::CorruptItem {
        id: id.clone(),
        reason,
    };

    let parent = (!parent_id.is_empty()).then_some(parent_id.as_str());
    let scope = CollectionScope::parse(&kind, parent).map_err(|e| corrupt(e.to_string()))?;
    let position = u32::try_from(position)
        .map(Position::new)
        .map_err(|_| corrupt(format!("position {position} out of range")))?;
    let fields: Fields = serde_json::from_str(&fields_json)
        .map_err(|source| BackendError::DeserializationFailed { source })?;

    Ok(Record {
        id: ItemId::from(id),
        scope,
        position,
        fields,
        created_at: u64::try_from(created_at).unwrap_or_default(),
        updated_at: u64::try_from(updated_at).unwrap_or_default(),
    })
}

pub async fn fetch_collection(backend: &SqlxBackend, scope: &CollectionScope) -> Result<Vec<Record>> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE kind = $1 AND parent_id = $2 ORDER BY position ASC, created_at ASC, id ASC"
    );
    let rows: Vec<ItemRow> = sqlx::query_as(&sql)
        .bind(scope.kind().to_string())
        .bind(parent_column(scope))
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to fetch collection")?;

    tracing::debug!(%scope, count = rows.len(), "Fetched collection");
    rows.into_iter().map(row_to_record).collect()
}

pub async fn get_item(backend: &SqlxBackend, id: &ItemId) -> Result<Record> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
    let row: Option<ItemRow> = sqlx::query_as(&sql)
        .bind(id.to_string())
        .fetch_optional(backend.pool())
        .await
        .sql_context("Failed to get item")?;

    match row {
        Some(row) => row_to_record(row),
        None => Err(BackendError::ItemNotFound { id: id.clone() }.into()),
    }
}

pub async fn create_item(backend: &SqlxBackend, new: NewRecord) -> Result<Record> {
    let now = backend.now_millis();
    let id = ItemId::generate();
    let fields_json = serde_json::to_string(&new.fields)
        .map_err(|source| BackendError::SerializationFailed { source })?;

    sqlx::query(
        "INSERT INTO items (id, kind, parent_id, position, fields_json, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id.to_string())
    .bind(new.scope.kind().to_string())
    .bind(parent_column(&new.scope))
    .bind(i64::from(new.position.get()))
    .bind(&fields_json)
    .bind(now)
    .bind(now)
    .execute(backend.pool())
    .await
    .sql_context("Failed to insert item")?;

    tracing::info!(%id, scope = %new.scope, position = %new.position, "Created item");

    let stamp = u64::try_from(now).unwrap_or_default();
    Ok(Record {
        id,
        scope: new.scope,
        position: new.position,
        fields: new.fields,
        created_at: stamp,
        updated_at: stamp,
    })
}

pub async fn write_position(backend: &SqlxBackend, id: &ItemId, position: Position) -> Result<()> {
    let result = sqlx::query("UPDATE items SET position = $1, updated_at = $2 WHERE id = $3")
        .bind(i64::from(position.get()))
        .bind(backend.now_millis())
        .bind(id.to_string())
        .execute(backend.pool())
        .await
        .sql_context("Failed to write position")?;

    if result.rows_affected() == 0 {
        return Err(BackendError::ItemNotFound { id: id.clone() }.into());
    }
    Ok(())
}

pub async fn update_fields(backend: &SqlxBackend, id: &ItemId, update: Fields) -> Result<Record> {
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
    let row: Option<ItemRow> = sqlx::query_as(&sql)
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .sql_context("Failed to read item for update")?;
    let mut record = match row {
        Some(row) => row_to_record(row)?,
        None => return Err(BackendError::ItemNotFound { id: id.clone() }.into()),
    };

    merge_fields(&mut record.fields, update);
    let now = backend.now_millis();
    let fields_json = serde_json::to_string(&record.fields)
        .map_err(|source| BackendError::SerializationFailed { source })?;

    sqlx::query("UPDATE items SET fields_json = $1, updated_at = $2 WHERE id = $3")
        .bind(&fields_json)
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .sql_context("Failed to update fields")?;

    tx.commit().await.sql_context("Failed to commit update")?;

    record.updated_at = u64::try_from(now).unwrap_or_default();
    Ok(record)
}

pub async fn delete_item(backend: &SqlxBackend, id: &ItemId) -> Result<()> {
    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(id.to_string())
        .execute(backend.pool())
        .await
        .sql_context("Failed to delete item")?;

    if result.rows_affected() == 0 {
        return Err(BackendError::ItemNotFound { id: id.clone() }.into());
    }
    tracing::info!(%id, "Deleted item");
    Ok(())
}

pub async fn count(backend: &SqlxBackend, scope: &CollectionScope) -> Result<usize> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM items WHERE kind = $1 AND parent_id = $2")
            .bind(scope.kind().to_string())
            .bind(parent_column(scope))
            .fetch_one(backend.pool())
            .await
            .sql_context("Failed to count items")?;
    Ok(usize::try_from(count).unwrap_or_default())
}
