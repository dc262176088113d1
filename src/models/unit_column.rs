//! SQLite column mapping for `Unit`
//!
//! Units are stored as their boundary tags. An unknown tag read back from
//! the database is a conversion failure, not a silent default.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::pricing::Unit;

impl ToSql for Unit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_tag()))
    }
}

impl FromSql for Unit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<Unit>()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::*;

    #[test]
    fn test_unit_round_trips_through_sqlite() {
        let conn = Connection::open_in_memory().unwrap();
        let unit: Unit = conn
            .query_row("SELECT ?1", [Unit::Gram], |row| row.get(0))
            .unwrap();
        assert_eq!(unit, Unit::Gram);
    }

    #[test]
    fn test_unknown_tag_fails_conversion() {
        let conn = Connection::open_in_memory().unwrap();
        let result: rusqlite::Result<Unit> = conn.query_row("SELECT 'oz'", [], |row| row.get(0));
        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(..))
        ));
    }
}
