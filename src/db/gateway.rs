use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::models::{Session, User, SESSIONS_TABLE, SESSION_FIELDS, USERS_TABLE, USER_FIELDS};
use crate::db::query::{insert_statement, in_predicate, select_statement, SqlParam, Statement};
use crate::error::StoreError;

/// Persistence port used by the account services.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts all users with one batched statement.
    async fn add_users(&self, users: &[User]) -> Result<(), StoreError>;

    /// Users whose id is in `ids`, in store order. Empty when nothing matches.
    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError>;

    async fn add_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Token of the first session row for `user_id`, or [`StoreError::NoUser`].
    async fn get_session(&self, user_id: Uuid) -> Result<String, StoreError>;
}

/// Maps one result row to a typed entity.
pub trait RowMapper<T> {
    fn map_row(&self, row: &PgRow) -> Result<T, StoreError>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&PgRow) -> Result<T, StoreError>,
{
    fn map_row(&self, row: &PgRow) -> Result<T, StoreError> {
        self(row)
    }
}

pub fn map_user(row: &PgRow) -> Result<User, StoreError> {
    let sex: String = row.try_get("sex")?;

    Ok(User {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        birth_date: row.try_get("birth_date")?,
        sex: sex.parse().map_err(StoreError::QueryError)?,
        biography: row.try_get("biography")?,
        city: row.try_get("city")?,
        password_hash: row.try_get("password_hash")?,
    })
}

pub fn map_session(row: &PgRow) -> Result<Session, StoreError> {
    Ok(Session {
        user_id: row.try_get("user_id")?,
        token: row.try_get("token")?,
    })
}

fn user_params(user: &User) -> Vec<SqlParam> {
    vec![
        user.id.into(),
        user.first_name.clone().into(),
        user.last_name.clone().into(),
        user.birth_date.into(),
        user.sex.as_str().into(),
        user.biography.clone().into(),
        user.city.clone().into(),
        user.password_hash.clone().into(),
    ]
}

fn bind_params<'q>(statement: &'q Statement) -> Query<'q, Postgres, PgArguments> {
    statement
        .params
        .iter()
        .fold(sqlx::query(&statement.sql), |query, param| match param {
            SqlParam::Text(value) => query.bind(value.as_str()),
            SqlParam::Uuid(value) => query.bind(*value),
            SqlParam::Date(value) => query.bind(*value),
        })
}

/// Owns the connection pool and runs statements built by [`crate::db::query`].
#[derive(Clone)]
pub struct Gateway {
    pool: Arc<PgPool>,
}

impl Gateway {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        Ok(Self::new(Arc::new(pool)))
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Runs one non-query statement. No retry.
    pub async fn execute(&self, statement: &Statement) -> Result<u64, StoreError> {
        debug!(sql = %statement.sql, params = statement.params.len(), "execute");
        let result = bind_params(statement).execute(self.pool.as_ref()).await?;
        Ok(result.rows_affected())
    }

    /// Runs all statements in one transaction; any failure rolls back the whole batch.
    pub async fn execute_transaction(&self, statements: &[Statement]) -> Result<(), StoreError> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionError(e.to_string()))?;

        for statement in statements {
            debug!(sql = %statement.sql, "execute in transaction");
            let result = bind_params(statement).execute(&mut *transaction).await;
            if let Err(e) = result {
                transaction
                    .rollback()
                    .await
                    .map_err(|e| StoreError::TransactionError(e.to_string()))?;
                return Err(e.into());
            }
        }

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::TransactionError(e.to_string()))
    }

    /// Runs a read and maps every row through `mapper`, preserving store order.
    pub async fn query<T, M>(&self, statement: &Statement, mapper: M) -> Result<Vec<T>, StoreError>
    where
        M: RowMapper<T>,
    {
        debug!(sql = %statement.sql, params = statement.params.len(), "query");
        let rows = bind_params(statement).fetch_all(self.pool.as_ref()).await?;

        rows.iter().map(|row| mapper.map_row(row)).collect()
    }
}

#[async_trait]
impl UserStore for Gateway {
    async fn add_users(&self, users: &[User]) -> Result<(), StoreError> {
        if users.is_empty() {
            return Ok(());
        }

        let statement = insert_statement(
            USERS_TABLE,
            &USER_FIELDS,
            users.iter().map(user_params).collect(),
        );
        self.execute(&statement).await?;

        Ok(())
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let statement = select_statement(
            USERS_TABLE,
            &USER_FIELDS,
            Some(in_predicate("id", 1, ids.len()).as_str()),
            ids.iter().copied().map(SqlParam::from).collect(),
        );

        self.query(&statement, map_user).await
    }

    async fn add_session(&self, session: &Session) -> Result<(), StoreError> {
        let statement = insert_statement(
            SESSIONS_TABLE,
            &SESSION_FIELDS,
            vec![vec![session.user_id.into(), session.token.clone().into()]],
        );
        self.execute(&statement).await?;

        Ok(())
    }

    async fn get_session(&self, user_id: Uuid) -> Result<String, StoreError> {
        let statement = select_statement(
            SESSIONS_TABLE,
            &SESSION_FIELDS,
            Some("user_id = $1"),
            vec![user_id.into()],
        );

        self.query::<Session, _>(&statement, map_session)
            .await?
            .into_iter()
            .next()
            .map(|session| session.token)
            .ok_or(StoreError::NoUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_params_follow_field_order() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            sex: crate::db::models::Sex::Female,
            biography: "bio".into(),
            city: "NYC".into(),
            password_hash: "hash".into(),
        };

        let params = user_params(&user);
        assert_eq!(params.len(), USER_FIELDS.len());
        assert_eq!(params[0], SqlParam::Uuid(user.id));
        assert_eq!(params[3], SqlParam::Date(user.birth_date));
        assert_eq!(params[4], SqlParam::from("female"));
        assert_eq!(params[7], SqlParam::from("hash"));
    }

    #[test]
    fn bind_params_keeps_sql_text() {
        let statement = Statement::new("SELECT 1 WHERE $1 = $1", vec![SqlParam::from("x")]);
        let query = bind_params(&statement);
        assert_eq!(sqlx::Execute::sql(&query), "SELECT 1 WHERE $1 = $1");
    }
}
