#![forbid(unsafe_code)]

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, MySql, QueryBuilder, Row};

use crate::utils::db_init::{connect, release};
use crate::utils::db_statements::{DELETE_SHOE, GET_SHOE, GET_SHOE_FOR_UPDATE, INSERT_SHOE, LIST_SHOES,
                                  SEARCH_SHOES_ORDER, SEARCH_SHOES_PREFIX, UPDATE_SHOE_PREFIX};
use crate::utils::db_types::{NewShoe, Shoe, ShoeChanges, ShoeFilter};
use crate::utils::errors::{DriverErrorCode, StoreError};

// ***************************************************************************
//                            Repository Trait
// ***************************************************************************
/// Storage operations on shoe records.  Every call is independent: the
/// MySQL implementation acquires a connection at the start of each call and
/// releases it before returning.
#[async_trait]
pub trait ShoeRepository: Send + Sync {
    /// All records ordered by id.
    async fn list(&self) -> Result<Vec<Shoe>, StoreError>;

    /// Records satisfying every supplied filter, ordered by id.
    async fn search(&self, filter: &ShoeFilter) -> Result<Vec<Shoe>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Shoe>, StoreError>;

    /// Insert a record and return its assigned id.
    async fn create(&self, shoe: &NewShoe) -> Result<i32, StoreError>;

    /// Apply a partial update.  Returns false if no record has the id.
    async fn update(&self, id: i32, changes: &ShoeChanges) -> Result<bool, StoreError>;

    /// Remove a record.  Returns false if no record has the id.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}

/// The handle injected into every endpoint.
pub type SharedRepository = Arc<dyn ShoeRepository>;

// ***************************************************************************
//                           Statement Builders
// ***************************************************************************
// ---------------------------------------------------------------------------
// build_search:
// ---------------------------------------------------------------------------
/** Build the search statement with one placeholder clause per supplied
 * filter.  The name filter is a case-insensitive substring match.
 */
pub fn build_search(filter: &ShoeFilter) -> QueryBuilder<'static, MySql> {
    let mut qb = QueryBuilder::new(SEARCH_SHOES_PREFIX);
    if let Some(nome) = &filter.nome {
        qb.push(" AND LOWER(nome) LIKE ");
        qb.push_bind(like_pattern(nome));
    }
    if let Some(preco) = filter.preco {
        qb.push(" AND preco = ");
        qb.push_bind(preco);
    }
    qb.push(SEARCH_SHOES_ORDER);
    qb
}

// ---------------------------------------------------------------------------
// build_update:
// ---------------------------------------------------------------------------
/** Build the update statement with a SET clause for each supplied field
 * only.  Callers must not pass empty changes.
 */
pub fn build_update(id: i32, changes: &ShoeChanges) -> QueryBuilder<'static, MySql> {
    let mut qb = QueryBuilder::new(UPDATE_SHOE_PREFIX);
    {
        let mut set = qb.separated(", ");
        if let Some(nome) = &changes.nome {
            set.push("nome = ");
            set.push_bind_unseparated(nome.clone());
        }
        if let Some(preco) = changes.preco {
            set.push("preco = ");
            set.push_bind_unseparated(preco);
        }
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb
}

// ---------------------------------------------------------------------------
// like_pattern:
// ---------------------------------------------------------------------------
/** Wrap the lower-cased term in wildcards, escaping LIKE metacharacters so
 * the term itself matches literally.
 */
fn like_pattern(term: &str) -> String {
    let mut s = String::with_capacity(term.len() + 2);
    s.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            s.push('\\');
        }
        s.push(c);
    }
    s.push('%');
    s
}

// ***************************************************************************
//                          MySQL Repository
// ***************************************************************************
pub struct MySqlShoeRepository {
    options: MySqlConnectOptions,
}

impl MySqlShoeRepository {
    pub fn new(options: MySqlConnectOptions) -> Self {
        Self { options }
    }
}

// Each method opens a connection, runs the work against it and releases it
// whatever the work's outcome.
#[async_trait]
impl ShoeRepository for MySqlShoeRepository {
    async fn list(&self) -> Result<Vec<Shoe>, StoreError> {
        let mut conn = connect(&self.options).await?;
        let result = list_shoes(&mut conn).await;
        release(conn).await;
        result
    }

    async fn search(&self, filter: &ShoeFilter) -> Result<Vec<Shoe>, StoreError> {
        let mut conn = connect(&self.options).await?;
        let result = search_shoes(&mut conn, filter).await;
        release(conn).await;
        result
    }

    async fn get(&self, id: i32) -> Result<Option<Shoe>, StoreError> {
        let mut conn = connect(&self.options).await?;
        let result = get_shoe(&mut conn, id).await;
        release(conn).await;
        result
    }

    async fn create(&self, shoe: &NewShoe) -> Result<i32, StoreError> {
        let mut conn = connect(&self.options).await?;
        let result = insert_shoe(&mut conn, shoe).await;
        release(conn).await;
        result
    }

    async fn update(&self, id: i32, changes: &ShoeChanges) -> Result<bool, StoreError> {
        let mut conn = connect(&self.options).await?;
        let result = update_shoe(&mut conn, id, changes).await;
        release(conn).await;
        result
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut conn = connect(&self.options).await?;
        let result = delete_shoe(&mut conn, id).await;
        release(conn).await;
        result
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
fn shoe_from_row(row: &MySqlRow) -> Result<Shoe, StoreError> {
    Ok(Shoe::new(row.try_get(0)?, row.try_get(1)?, row.try_get(2)?))
}

// ---------------------------------------------------------------------------
// list_shoes:
// ---------------------------------------------------------------------------
async fn list_shoes(conn: &mut MySqlConnection) -> Result<Vec<Shoe>, StoreError> {
    let rows = sqlx::query(LIST_SHOES)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(shoe_from_row).collect()
}

// ---------------------------------------------------------------------------
// search_shoes:
// ---------------------------------------------------------------------------
async fn search_shoes(conn: &mut MySqlConnection, filter: &ShoeFilter) -> Result<Vec<Shoe>, StoreError> {
    let mut qb = build_search(filter);
    debug!("search statement: {}", qb.sql());
    let rows = qb.build()
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(shoe_from_row).collect()
}

// ---------------------------------------------------------------------------
// get_shoe:
// ---------------------------------------------------------------------------
async fn get_shoe(conn: &mut MySqlConnection, id: i32) -> Result<Option<Shoe>, StoreError> {
    let row = sqlx::query(GET_SHOE)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(shoe_from_row).transpose()
}

// ---------------------------------------------------------------------------
// insert_shoe:
// ---------------------------------------------------------------------------
async fn insert_shoe(conn: &mut MySqlConnection, shoe: &NewShoe) -> Result<i32, StoreError> {
    let result = sqlx::query(INSERT_SHOE)
        .bind(shoe.nome.as_str())
        .bind(shoe.preco)
        .execute(&mut *conn)
        .await?;

    let id = result.last_insert_id();
    i32::try_from(id).map_err(|_| {
        StoreError::new(DriverErrorCode::Unclassified("ID_OUT_OF_RANGE".to_string()),
                        format!("assigned id {} does not fit the record id type", id))
    })
}

// ---------------------------------------------------------------------------
// update_shoe:
// ---------------------------------------------------------------------------
/** The existence check locks the row and the write happens in the same
 * transaction, so a concurrent delete can't slip between them.
 */
async fn update_shoe(conn: &mut MySqlConnection, id: i32, changes: &ShoeChanges) -> Result<bool, StoreError> {
    let mut tx = conn.begin().await?;

    let existing = sqlx::query(GET_SHOE_FOR_UPDATE)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_none() {
        tx.rollback().await?;
        return Ok(false);
    }

    if !changes.is_empty() {
        let mut qb = build_update(id, changes);
        debug!("update statement: {}", qb.sql());
        qb.build()
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// delete_shoe:
// ---------------------------------------------------------------------------
async fn delete_shoe(conn: &mut MySqlConnection, id: i32) -> Result<bool, StoreError> {
    let mut tx = conn.begin().await?;

    let existing = sqlx::query(GET_SHOE_FOR_UPDATE)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_none() {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query(DELETE_SHOE)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
