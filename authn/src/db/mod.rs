// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Database abstraction to manipulate user accounts.
//!
//! All operations are public so that services can compose them with their own queries inside a
//! single transaction.

use crate::model::{HashedPassword, User, UserId};
#[cfg(feature = "postgres")]
use journeyhub_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use journeyhub_core::db::sqlite;
use journeyhub_core::db::{DbError, DbResult, Executor};
use journeyhub_core::model::{EmailAddress, Username};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;


/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Builds a `User` out of the raw fields of a row, validating them.
fn build_user(id: String, username: String, email: String, password: String) -> DbResult<User> {
    Ok(User::new(
        UserId::parse(&id)?,
        Username::new(username)?,
        EmailAddress::new(email)?,
        HashedPassword::new(password),
    ))
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for User {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let username: String = row.try_get("username").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
        let password: String = row.try_get("password").map_err(postgres::map_sqlx_error)?;
        build_user(id, username, email, password)
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for User {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let username: String = row.try_get("username").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
        let password: String = row.try_get("password").map_err(sqlite::map_sqlx_error)?;
        build_user(id, username, email, password)
    }
}

/// Creates a new account for `user`.
///
/// Fails with `AlreadyExists` if the identifier is taken or if another account has the same
/// username or email address, ignoring casing.
pub async fn create_user(ex: &mut Executor, user: &User) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO users (id, username, email, username_key, email_key, password)
                VALUES ($1, $2, $3, $4, $5, $6)
            ";
            let done = sqlx::query(query_str)
                .bind(user.id().to_string())
                .bind(user.username().as_str())
                .bind(user.email().as_str())
                .bind(user.username().normalized())
                .bind(user.email().normalized())
                .bind(user.password().as_str())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO users (id, username, email, username_key, email_key, password)
                VALUES (?, ?, ?, ?, ?, ?)
            ";
            let done = sqlx::query(query_str)
                .bind(user.id().to_string())
                .bind(user.username().as_str())
                .bind(user.email().as_str())
                .bind(user.username().normalized())
                .bind(user.email().normalized())
                .bind(user.password().as_str())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets the user whose `column` matches `value`.  `column` must be a unique column.
async fn get_user_by(ex: &mut Executor, column: &'static str, value: &str) -> DbResult<User> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str =
                format!("SELECT id, username, email, password FROM users WHERE {} = $1", column);
            let raw_user = sqlx::query(&query_str)
                .bind(value)
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            User::try_from(raw_user)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str =
                format!("SELECT id, username, email, password FROM users WHERE {} = ?", column);
            let raw_user = sqlx::query(&query_str)
                .bind(value)
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            User::try_from(raw_user)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets information about the existing user with identifier `id`.
pub async fn get_user_by_id(ex: &mut Executor, id: UserId) -> DbResult<User> {
    get_user_by(ex, "id", &id.to_string()).await
}

/// Gets information about the existing user with address `email`, in any casing.
pub async fn get_user_by_email(ex: &mut Executor, email: &EmailAddress) -> DbResult<User> {
    get_user_by(ex, "email_key", &email.normalized()).await
}

/// Gets information about the existing user named `username`, in any casing.
pub async fn get_user_by_username(ex: &mut Executor, username: &Username) -> DbResult<User> {
    get_user_by(ex, "username_key", &username.normalized()).await
}

/// Overwrites the stored details of an existing user with the contents of `user`.
///
/// The user is located by its identifier, which never changes.
pub async fn update_user(ex: &mut Executor, user: &User) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE users
                SET username = $1, email = $2, username_key = $3, email_key = $4, password = $5
                WHERE id = $6
            ";
            let done = sqlx::query(query_str)
                .bind(user.username().as_str())
                .bind(user.email().as_str())
                .bind(user.username().normalized())
                .bind(user.email().normalized())
                .bind(user.password().as_str())
                .bind(user.id().to_string())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE users
                SET username = ?, email = ?, username_key = ?, email_key = ?, password = ?
                WHERE id = ?
            ";
            let done = sqlx::query(query_str)
                .bind(user.username().as_str())
                .bind(user.email().as_str())
                .bind(user.username().normalized())
                .bind(user.email().normalized())
                .bind(user.password().as_str())
                .bind(user.id().to_string())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes the account of the user with identifier `id`.
///
/// Callers are responsible for deleting any data that references the user first.
pub async fn delete_user(ex: &mut Executor, id: UserId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id.to_string())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(id.to_string())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}
