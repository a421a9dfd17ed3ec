//! Parameterized SQL construction.
//!
//! Values never reach the SQL text: every value is carried in
//! [`Statement::params`] and referenced by a `$n` placeholder.

use chrono::NaiveDate;
use uuid::Uuid;

/// A value bound to one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<Uuid> for SqlParam {
    fn from(value: Uuid) -> Self {
        SqlParam::Uuid(value)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(value: NaiveDate) -> Self {
        SqlParam::Date(value)
    }
}

/// SQL text plus its parameters, flattened in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// `count` placeholders numbered from `start` (1-based): `$start, $start+1, ...`.
pub fn positional_placeholders(start: usize, count: usize) -> Vec<String> {
    (start..start + count).map(|i| format!("${}", i)).collect()
}

/// Parenthesized, comma-joined group of placeholders, e.g. `($1,$2)`.
pub fn placeholder_group(start: usize, count: usize) -> String {
    format!("({})", positional_placeholders(start, count).join(","))
}

/// `column IN ($start,...)` predicate over `count` placeholders.
pub fn in_predicate(column: &str, start: usize, count: usize) -> String {
    format!("{} IN {}", column, placeholder_group(start, count))
}

/// Batched multi-row insert.
///
/// Rows are flattened row-major and placeholder numbering continues across
/// the whole batch, so the group of row `i` starts at `1 + i * fields.len()`.
pub fn insert_statement(table: &str, fields: &[&str], rows: Vec<Vec<SqlParam>>) -> Statement {
    let mut params: Vec<SqlParam> = Vec::with_capacity(rows.len() * fields.len());
    let mut groups = Vec::with_capacity(rows.len());

    for row in rows {
        groups.push(placeholder_group(params.len() + 1, row.len()));
        params.extend(row);
    }

    Statement::new(
        format!(
            "INSERT INTO {}({}) VALUES {}",
            table,
            fields.join(","),
            groups.join(",")
        ),
        params,
    )
}

/// `SELECT <fields> FROM <table> [WHERE <predicate>]`; no ordering is imposed.
pub fn select_statement(
    table: &str,
    fields: &[&str],
    predicate: Option<&str>,
    params: Vec<SqlParam>,
) -> Statement {
    let mut sql = format!("SELECT {} FROM {}", fields.join(","), table);
    if let Some(predicate) = predicate {
        sql.push_str(" WHERE ");
        sql.push_str(predicate);
    }

    Statement::new(sql, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_continue_from_start() {
        assert_eq!(positional_placeholders(5, 3), vec!["$5", "$6", "$7"]);
        assert_eq!(positional_placeholders(1, 1), vec!["$1"]);
        assert!(positional_placeholders(3, 0).is_empty());
    }

    #[test]
    fn batched_insert_numbers_groups_across_rows() {
        let fields = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let row = |tag: &str| -> Vec<SqlParam> {
            fields.iter().map(|f| SqlParam::from(format!("{}{}", tag, f))).collect()
        };

        let statement = insert_statement("users", &fields, vec![row("1"), row("2")]);

        assert_eq!(
            statement.sql,
            "INSERT INTO users(a,b,c,d,e,f,g,h) VALUES \
             ($1,$2,$3,$4,$5,$6,$7,$8),($9,$10,$11,$12,$13,$14,$15,$16)"
        );
        assert_eq!(statement.params.len(), 16);
        assert_eq!(statement.params[0], SqlParam::from("1a"));
        assert_eq!(statement.params[8], SqlParam::from("2a"));
        assert_eq!(statement.params[15], SqlParam::from("2h"));
    }

    #[test]
    fn single_row_insert() {
        let user_id = Uuid::new_v4();
        let statement = insert_statement(
            "sessions",
            &["user_id", "token"],
            vec![vec![user_id.into(), "tok".into()]],
        );

        assert_eq!(statement.sql, "INSERT INTO sessions(user_id,token) VALUES ($1,$2)");
        assert_eq!(statement.params, vec![SqlParam::Uuid(user_id), SqlParam::from("tok")]);
    }

    #[test]
    fn select_with_and_without_predicate() {
        let all = select_statement("sessions", &["user_id", "token"], None, vec![]);
        assert_eq!(all.sql, "SELECT user_id,token FROM sessions");

        let predicate = in_predicate("id", 1, 3);
        assert_eq!(predicate, "id IN ($1,$2,$3)");

        let filtered = select_statement("users", &["id"], Some(predicate.as_str()), vec![]);
        assert_eq!(filtered.sql, "SELECT id FROM users WHERE id IN ($1,$2,$3)");
    }
}
