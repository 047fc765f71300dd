// Writing the assembled tables to a SQLite database.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use crate::etl::*;

pub struct SqliteStore {
    conn: Connection,
    batch_size: usize,
}

fn sql_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Integer => "INTEGER",
        ColumnType::Float => "REAL",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Text => "TEXT",
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql_value(value: Value) -> SqlValue {
    match value {
        Value::Integer(i) => SqlValue::Integer(i),
        Value::Float(f) => SqlValue::Real(f),
        Value::Boolean(b) => SqlValue::Integer(b as i64),
        Value::Text(s) => SqlValue::Text(s),
    }
}

pub fn create_table_sql<R: Record>(table: &str) -> String {
    let columns: Vec<String> = R::column_names()
        .iter()
        .zip(R::TYPES.iter())
        .map(|(name, t)| format!("{} {}", quote_identifier(name), sql_type(*t)))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        quote_identifier(table),
        columns.join(", ")
    )
}

fn insert_sql<R: Record>(table: &str) -> String {
    let names: Vec<String> = R::column_names()
        .iter()
        .map(|n| quote_identifier(n))
        .collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        quote_identifier(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

impl SqliteStore {
    pub fn open(path: &str, batch_size: usize) -> EtlResult<SqliteStore> {
        let conn = Connection::open(path).context(OpeningDatabaseSnafu { path })?;
        info!("Opened database {}", path);
        Ok(SqliteStore::from_connection(conn, batch_size))
    }

    pub fn from_connection(conn: Connection, batch_size: usize) -> SqliteStore {
        SqliteStore {
            conn,
            batch_size: batch_size.max(1),
        }
    }

    /// Creates the table if needed and inserts the rows, one transaction
    /// per batch. With `replace`, an existing table is dropped first.
    ///
    /// Returns the number of inserted rows. Batches committed before a
    /// failure stay in the table.
    pub fn create_and_populate<R: Record>(
        &mut self,
        table: &str,
        rows: &[R],
        replace: bool,
    ) -> EtlResult<usize> {
        if replace {
            let sql = format!("DROP TABLE IF EXISTS {};", quote_identifier(table));
            debug!("create_and_populate: {}", sql);
            self.conn
                .execute_batch(&sql)
                .context(CreatingTableSnafu { table, sql: &sql })?;
        }

        let sql = create_table_sql::<R>(table);
        info!("Generated SQL: {}", sql);
        self.conn
            .execute_batch(&sql)
            .context(CreatingTableSnafu { table, sql: &sql })?;
        if !self.table_exists(table)? {
            return MissingTableSnafu { table }.fail();
        }
        info!("Table {} created successfully.", table);

        let inserted = self.insert_rows(table, rows)?;
        info!("Data inserted into table {} successfully.", table);
        Ok(inserted)
    }

    fn table_exists(&self, table: &str) -> EtlResult<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .context(QueryingTableSnafu { table })?;
        Ok(count > 0)
    }

    fn insert_rows<R: Record>(&mut self, table: &str, rows: &[R]) -> EtlResult<usize> {
        let sql = insert_sql::<R>(table);
        debug!("insert_rows: {}", sql);
        let total = rows.len();
        let mut inserted: usize = 0;
        for (idx, batch) in rows.chunks(self.batch_size).enumerate() {
            let batch_num = idx + 1;
            let tx = self.conn.transaction().context(InsertingBatchSnafu {
                table,
                batch: batch_num,
            })?;
            {
                let mut stmt = tx.prepare_cached(&sql).context(InsertingBatchSnafu {
                    table,
                    batch: batch_num,
                })?;
                for row in batch {
                    let values: Vec<SqlValue> =
                        row.values().into_iter().map(to_sql_value).collect();
                    stmt.execute(params_from_iter(values.iter()))
                        .context(InsertingBatchSnafu {
                            table,
                            batch: batch_num,
                        })?;
                }
            }
            tx.commit().context(InsertingBatchSnafu {
                table,
                batch: batch_num,
            })?;
            inserted += batch.len();
            info!(
                "Batch {} inserted ({} out of {} rows).",
                batch_num, inserted, total
            );
        }
        Ok(inserted)
    }

    pub fn count_rows(&self, table: &str) -> EtlResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        self.conn
            .query_row(&sql, [], |row| row.get(0))
            .context(QueryingTableSnafu { table })
    }
}
