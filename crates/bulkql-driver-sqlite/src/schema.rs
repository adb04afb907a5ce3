//! SQLite schema introspection

use crate::connection::{SqliteConnection, map_sqlite_error};
use async_trait::async_trait;
use bulkql_core::{ColumnInfo, PrimaryKeyInfo, Result, SchemaIntrospection};

#[async_trait]
impl SchemaIntrospection for SqliteConnection {
    #[tracing::instrument(skip(self))]
    async fn get_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>> {
        tracing::trace!(table = %table, "fetching column information");
        let conn = self.conn.lock();
        let schema = schema.unwrap_or("main");
        let mut stmt = conn
            .prepare(
                "SELECT cid, name, type, \"notnull\", dflt_value, pk \
                 FROM pragma_table_info(?1, ?2) ORDER BY cid",
            )
            .map_err(map_sqlite_error)?;

        let rows = stmt
            .query_map([table, schema], |row| {
                let ordinal: i64 = row.get(0)?;
                let data_type: Option<String> = row.get(2)?;
                let not_null: i64 = row.get(3)?;
                let pk: i64 = row.get(5)?;
                Ok((
                    ordinal as usize,
                    row.get::<_, String>(1)?,
                    data_type.unwrap_or_default(),
                    not_null == 0,
                    row.get::<_, Option<String>>(4)?,
                    pk,
                ))
            })
            .map_err(map_sqlite_error)?;

        let mut columns = Vec::new();
        let mut pk_count = 0;
        for row in rows {
            let (ordinal, name, data_type, nullable, default_value, pk) = row.map_err(map_sqlite_error)?;
            if pk > 0 {
                pk_count += 1;
            }
            columns.push(ColumnInfo {
                name,
                ordinal,
                data_type,
                nullable,
                default_value,
                is_primary_key: pk > 0,
                is_auto_increment: false,
            });
        }

        // Only a lone INTEGER PRIMARY KEY aliases the rowid and is generated.
        if pk_count == 1 {
            for column in columns.iter_mut().filter(|c| c.is_primary_key) {
                column.is_auto_increment = column.data_type.eq_ignore_ascii_case("INTEGER");
            }
        }

        Ok(columns)
    }

    /// Primary key columns in key order, which can differ from table order
    async fn get_primary_key(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Option<PrimaryKeyInfo>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info(?1, ?2) WHERE pk > 0 ORDER BY pk")
            .map_err(map_sqlite_error)?;
        let columns = stmt
            .query_map([table, schema.unwrap_or("main")], |row| row.get::<_, String>(0))
            .map_err(map_sqlite_error)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_sqlite_error)?;

        if columns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PrimaryKeyInfo {
                name: None,
                columns,
            }))
        }
    }
}
