// Contact ledger operations
//
// Every write is a single statement, so it either commits or leaves the
// store untouched and returns the error.

use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::schema::{Contact, ContactEdit, NewContact};
use crate::error::{Error, Result};

const CONTACT_COLUMNS: &str =
    "id, callsign, name, qualifier, date_time, frequency, band, grid, opname";

fn row_to_contact(row: &SqliteRow) -> Contact {
    Contact {
        id: row.get("id"),
        callsign: row.get("callsign"),
        name: row.get("name"),
        qualifier: row.get("qualifier"),
        date_time: row.get("date_time"),
        frequency: row.get("frequency"),
        band: row.get("band"),
        grid: row.get("grid"),
        opname: row.get("opname"),
    }
}

/// Insert a contact, stamping it with the current UTC time. Returns the new id.
pub async fn insert(pool: &Pool<Sqlite>, contact: &NewContact) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO contacts (callsign, name, qualifier, date_time, frequency, band, grid, opname)
        VALUES (?, ?, ?, datetime('now'), ?, ?, ?, ?)
        "#,
    )
    .bind(&contact.callsign)
    .bind(&contact.name)
    .bind(&contact.qualifier)
    .bind(&contact.frequency)
    .bind(&contact.band)
    .bind(&contact.grid)
    .bind(&contact.opname)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    log::info!("Logged contact {}: {} on {}", id, contact.callsign, contact.band);
    Ok(id)
}

pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Contact> {
    let sql = format!("SELECT {} FROM contacts WHERE id = ?", CONTACT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound(id))?;
    Ok(row_to_contact(&row))
}

/// Replace the correctable fields of a contact. `id` is never changed.
pub async fn update(pool: &Pool<Sqlite>, id: i64, edit: &ContactEdit) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE contacts
        SET callsign = ?, name = ?, qualifier = ?, date_time = ?, band = ?
        WHERE id = ?
        "#,
    )
    .bind(&edit.callsign)
    .bind(&edit.name)
    .bind(&edit.qualifier)
    .bind(&edit.date_time)
    .bind(&edit.band)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(id));
    }

    log::info!("Updated contact {}: {} {} {} {}", id, edit.callsign, edit.name, edit.qualifier, edit.band);
    Ok(())
}

/// Permanently remove a contact
pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(id));
    }

    log::info!("Deleted contact {}", id);
    Ok(())
}

/// All contacts, oldest first (score and export order)
pub async fn all(pool: &Pool<Sqlite>) -> Result<Vec<Contact>> {
    let sql = format!(
        "SELECT {} FROM contacts ORDER BY date_time ASC, id ASC",
        CONTACT_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_contact).collect())
}

/// All contacts, newest first (on-screen log order)
pub async fn all_newest_first(pool: &Pool<Sqlite>) -> Result<Vec<Contact>> {
    let sql = format!(
        "SELECT {} FROM contacts ORDER BY date_time DESC, id DESC",
        CONTACT_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_contact).collect())
}

/// Previous contacts with exactly this callsign, newest first
pub async fn by_callsign(pool: &Pool<Sqlite>, callsign: &str) -> Result<Vec<Contact>> {
    let sql = format!(
        "SELECT {} FROM contacts WHERE callsign = ? ORDER BY date_time DESC, id DESC",
        CONTACT_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(callsign).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_contact).collect())
}

/// Bands present in the log, in the order they were first worked
pub async fn distinct_bands(pool: &Pool<Sqlite>) -> Result<Vec<String>> {
    let bands = sqlx::query_scalar::<_, String>(
        "SELECT band FROM contacts GROUP BY band ORDER BY MIN(id)",
    )
    .fetch_all(pool)
    .await?;
    Ok(bands)
}

/// Raw per-band counts: (QSOs, distinct non-DX qualifiers, DX QSOs)
pub async fn band_counts(pool: &Pool<Sqlite>, band: &str) -> Result<(i64, i64, i64)> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS qsos,
            COUNT(DISTINCT CASE WHEN qualifier <> 'DX' THEN qualifier END) AS domestic,
            COALESCE(SUM(CASE WHEN qualifier = 'DX' THEN 1 ELSE 0 END), 0) AS dx
        FROM contacts
        WHERE band = ?
        "#,
    )
    .bind(band)
    .fetch_one(pool)
    .await?;

    Ok((row.get("qsos"), row.get("domestic"), row.get("dx")))
}

pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contacts")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
