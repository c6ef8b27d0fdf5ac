//! PostgreSQL-backed [`UserRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, PasswordHash, StoredUser, User, UserId};

use super::diesel_error_mapping::DbFailure;
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure, email: Option<&Email>) -> UserPersistenceError {
    match failure {
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        DbFailure::UniqueViolation { .. } => UserPersistenceError::duplicate_email(
            email.map_or_else(String::new, |e| e.as_str().to_owned()),
        ),
        other => UserPersistenceError::query(other.message()),
    }
}

fn map_error(error: impl Into<DbFailure>) -> UserPersistenceError {
    map_failure(error.into(), None)
}

fn row_to_stored(row: UserRow) -> Result<StoredUser, UserPersistenceError> {
    let email = Email::parse(&row.email).map_err(|err| {
        warn!(user_id = row.id, "stored email failed validation");
        UserPersistenceError::query(format!("user {}: {err}", row.id))
    })?;
    let role = row
        .role
        .parse()
        .map_err(|err| UserPersistenceError::query(format!("user {}: {err}", row.id)))?;
    Ok(StoredUser {
        user: User {
            id: UserId::new(row.id),
            email,
            name: row.name,
            phone: row.phone,
            address: row.address,
            role,
        },
        password_hash: PasswordHash::new(row.password_hash),
    })
}

fn new_row(user: &NewUser) -> NewUserRow<'_> {
    NewUserRow {
        email: user.email.as_str(),
        password_hash: user.password_hash.as_str(),
        name: &user.name,
        phone: user.phone.as_deref(),
        address: user.address.as_deref(),
        role: user.role.as_str(),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let row = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        row.map(|r| row_to_stored(r).map(|stored| stored.user))
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        row.map(row_to_stored).transpose()
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let row = diesel::insert_into(users::table)
            .values(new_row(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(err.into(), Some(&user.email)))?;
        row_to_stored(row).map(|stored| stored.user)
    }

    async fn upsert_by_email(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_error)?;
        let row = diesel::insert_into(users::table)
            .values(new_row(user))
            .on_conflict(users::email)
            .do_update()
            .set((
                users::password_hash.eq(excluded(users::password_hash)),
                users::name.eq(excluded(users::name)),
                users::phone.eq(excluded(users::phone)),
                users::address.eq(excluded(users::address)),
                users::role.eq(excluded(users::role)),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;
        row_to_stored(row).map(|stored| stored.user)
    }
}
