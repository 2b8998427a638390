use postgres::Connection;

use crate::error::Result;
use crate::models::Entity;
use crate::pagination::{Page, PageRequest};

pub fn count<E: Entity>(db: &Connection) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE_NAME);
    let rows = db.query(&sql, &[])?;
    Ok(rows.get(0).get_opt(0).unwrap_or(Ok(0))?)
}

pub fn fetch_page<E: Entity>(db: &Connection, request: PageRequest) -> Result<Vec<E>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
        E::COLUMNS,
        E::TABLE_NAME,
        E::PRIMARY_KEY
    );
    let rows = db.query(&sql, &[&request.limit(), &request.offset()])?;
    rows.iter().map(|row| E::from_row(&row)).collect()
}

pub fn fetch_by_id<E: Entity>(db: &Connection, id: i32) -> Result<Option<E>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        E::COLUMNS,
        E::TABLE_NAME,
        E::PRIMARY_KEY
    );
    let rows = db.query(&sql, &[&id])?;
    match rows.iter().next() {
        Some(row) => E::from_row(&row).map(Some),
        None => Ok(None),
    }
}

/// Loads and serializes one page of `E`, along with the table's row count.
pub fn serialize_page<E, T, F>(db: &Connection, request: PageRequest, serialize: F) -> Result<Page<T>>
where
    E: Entity,
    F: Fn(&E) -> Result<T>,
{
    let num_results = count::<E>(db)?;
    let objects = fetch_page::<E>(db, request)?
        .iter()
        .map(serialize)
        .collect::<Result<Vec<_>>>()?;
    log::debug!(
        "Serialized {} of {} {} rows for page {}",
        objects.len(),
        num_results,
        E::TABLE_NAME,
        request.page
    );
    Ok(Page::new(request, num_results, objects))
}
