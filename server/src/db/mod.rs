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

//! Database abstraction to manipulate trips and their ratings.

use crate::model::{Page, Score, Trip, TripDraft, TripId, TripRating, TripSummary};
use journeyhub_authn::model::UserId;
#[cfg(feature = "postgres")]
use journeyhub_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use journeyhub_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use journeyhub_core::db::{DbError, DbResult, Executor};
use journeyhub_geo::{AreaInfo, MapPoint};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
use time::OffsetDateTime;


/// Initializes the database schema.
///
/// The schema references the `users` table, so the authentication schema must be initialized
/// first.
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

/// Selects the trips to return in a listing.
#[derive(Clone, Copy, Debug)]
pub(crate) enum TripFilter {
    /// All trips that are not private.
    Public,

    /// All trips owned by the given user, private or not.
    Owner(UserId),
}

/// Converts a map point coordinate as stored in the database into a `MapPoint`.
fn build_map_point(lat: f64, lng: f64) -> DbResult<MapPoint> {
    MapPoint::new(lat, lng).map_err(|e| DbError::DataIntegrityError(e.to_string()))
}

/// Raw contents of a row in the `trips` table.  Map points are stored separately.
struct TripRow {
    /// The trip's summary, which is everything but the map points.
    summary: TripSummary,
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for TripRow {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let user_id: String = row.try_get("user_id").map_err(postgres::map_sqlx_error)?;
        let title: String = row.try_get("title").map_err(postgres::map_sqlx_error)?;
        let description: String = row.try_get("description").map_err(postgres::map_sqlx_error)?;
        let country: String = row.try_get("country").map_err(postgres::map_sqlx_error)?;
        let city: String = row.try_get("city").map_err(postgres::map_sqlx_error)?;
        let is_private: bool = row.try_get("is_private").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;

        Ok(TripRow {
            summary: TripSummary::new(
                TripId::new(id),
                UserId::parse(&user_id)?,
                title,
                description,
                AreaInfo::new(country, city),
                is_private,
                created_at,
            ),
        })
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for TripRow {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let user_id: String = row.try_get("user_id").map_err(sqlite::map_sqlx_error)?;
        let title: String = row.try_get("title").map_err(sqlite::map_sqlx_error)?;
        let description: String = row.try_get("description").map_err(sqlite::map_sqlx_error)?;
        let country: String = row.try_get("country").map_err(sqlite::map_sqlx_error)?;
        let city: String = row.try_get("city").map_err(sqlite::map_sqlx_error)?;
        let is_private: bool = row.try_get("is_private").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 = row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(TripRow {
            summary: TripSummary::new(
                TripId::new(id),
                UserId::parse(&user_id)?,
                title,
                description,
                AreaInfo::new(country, city),
                is_private,
                build_timestamp(created_at_secs, created_at_nsecs)?,
            ),
        })
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for TripRating {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let user_id: String = row.try_get("user_id").map_err(postgres::map_sqlx_error)?;
        let trip_id: i64 = row.try_get("trip_id").map_err(postgres::map_sqlx_error)?;
        let rating: i16 = row.try_get("rating").map_err(postgres::map_sqlx_error)?;
        let comment: Option<String> = row.try_get("comment").map_err(postgres::map_sqlx_error)?;

        Ok(TripRating::new(
            id,
            UserId::parse(&user_id)?,
            TripId::new(trip_id),
            Score::new(i64::from(rating))?,
            comment,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for TripRating {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let user_id: String = row.try_get("user_id").map_err(sqlite::map_sqlx_error)?;
        let trip_id: i64 = row.try_get("trip_id").map_err(sqlite::map_sqlx_error)?;
        let rating: i64 = row.try_get("rating").map_err(sqlite::map_sqlx_error)?;
        let comment: Option<String> = row.try_get("comment").map_err(sqlite::map_sqlx_error)?;

        Ok(TripRating::new(
            id,
            UserId::parse(&user_id)?,
            TripId::new(trip_id),
            Score::new(rating)?,
            comment,
        ))
    }
}

/// Inserts the map `points` of the trip `id`, preserving their order.
async fn put_map_points(ex: &mut Executor, id: TripId, points: &[MapPoint]) -> DbResult<()> {
    for (position, point) in points.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| DbError::BackendError("Too many map points".to_owned()))?;
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => {
                let query_str = "
                    INSERT INTO trip_map_points (trip_id, position, lat, lng)
                    VALUES ($1, $2, $3, $4)
                ";
                sqlx::query(query_str)
                    .bind(id.as_i64())
                    .bind(position)
                    .bind(point.lat())
                    .bind(point.lng())
                    .execute(&mut **ex)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
            }

            #[cfg(any(feature = "sqlite", test))]
            Executor::Sqlite(ex) => {
                let query_str = "
                    INSERT INTO trip_map_points (trip_id, position, lat, lng)
                    VALUES (?, ?, ?, ?)
                ";
                sqlx::query(query_str)
                    .bind(id.as_i64())
                    .bind(position)
                    .bind(point.lat())
                    .bind(point.lng())
                    .execute(&mut **ex)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }
    Ok(())
}

/// Gets the map points of the trip `id` in the order they were submitted.
async fn get_map_points(ex: &mut Executor, id: TripId) -> DbResult<Vec<MapPoint>> {
    let mut points = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str =
                "SELECT lat, lng FROM trip_map_points WHERE trip_id = $1 ORDER BY position";
            let rows = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_all(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            for row in rows {
                let lat: f64 = row.try_get("lat").map_err(postgres::map_sqlx_error)?;
                let lng: f64 = row.try_get("lng").map_err(postgres::map_sqlx_error)?;
                points.push(build_map_point(lat, lng)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str =
                "SELECT lat, lng FROM trip_map_points WHERE trip_id = ? ORDER BY position";
            let rows = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_all(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            for row in rows {
                let lat: f64 = row.try_get("lat").map_err(sqlite::map_sqlx_error)?;
                let lng: f64 = row.try_get("lng").map_err(sqlite::map_sqlx_error)?;
                points.push(build_map_point(lat, lng)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(points)
}

/// Creates a new trip owned by `user_id` with the contents of `draft` and the resolved `area`.
///
/// Returns the persisted trip with the identifier assigned by the database.
pub(crate) async fn create_trip(
    ex: &mut Executor,
    user_id: UserId,
    draft: &TripDraft,
    area: &AreaInfo,
    created_at: OffsetDateTime,
) -> DbResult<Trip> {
    let id: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO trips
                    (user_id, title, description, country, city, is_private, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
            ";
            let row = sqlx::query(query_str)
                .bind(user_id.to_string())
                .bind(&draft.title)
                .bind(&draft.description)
                .bind(&area.country)
                .bind(&area.city)
                .bind(draft.is_private)
                .bind(created_at)
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_at_secs, created_at_nsecs) = unpack_timestamp(created_at);
            let query_str = "
                INSERT INTO trips
                    (user_id, title, description, country, city, is_private,
                    created_at_secs, created_at_nsecs)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING id
            ";
            let row = sqlx::query(query_str)
                .bind(user_id.to_string())
                .bind(&draft.title)
                .bind(&draft.description)
                .bind(&area.country)
                .bind(&area.city)
                .bind(draft.is_private)
                .bind(created_at_secs)
                .bind(created_at_nsecs)
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    let id = TripId::new(id);

    put_map_points(ex, id, &draft.map_points).await?;

    Ok(Trip::new(
        id,
        user_id,
        draft.title.clone(),
        draft.description.clone(),
        draft.map_points.clone(),
        area.clone(),
        draft.is_private,
        created_at,
    ))
}

/// Gets the trip with identifier `id`, including its map points.
pub(crate) async fn get_trip(ex: &mut Executor, id: TripId) -> DbResult<Trip> {
    let row: TripRow = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let raw = sqlx::query("SELECT * FROM trips WHERE id = $1")
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            TripRow::try_from(raw)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let raw = sqlx::query("SELECT * FROM trips WHERE id = ?")
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            TripRow::try_from(raw)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    let map_points = get_map_points(ex, id).await?;

    let summary = row.summary;
    Ok(Trip::new(
        *summary.id(),
        *summary.user_id(),
        summary.title().clone(),
        summary.description().clone(),
        map_points,
        summary.area().clone(),
        *summary.is_private(),
        *summary.created_at(),
    ))
}

/// Gets one `page` of the trips selected by `filter`, ordered by identifier, along with the total
/// number of trips selected by `filter`.
pub(crate) async fn list_trips(
    ex: &mut Executor,
    filter: TripFilter,
    page: Page,
) -> DbResult<(Vec<TripSummary>, u64)> {
    let limit = i64::from(page.size());
    let offset = page.offset();

    let (total, trips): (i64, Vec<TripSummary>) = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let (where_str, owner) = match filter {
                TripFilter::Public => ("is_private = FALSE", None),
                TripFilter::Owner(user_id) => ("user_id = $1", Some(user_id.to_string())),
            };

            let count_str = format!("SELECT COUNT(*) AS count FROM trips WHERE {}", where_str);
            let mut count_query = sqlx::query(&count_str);
            if let Some(owner) = owner.as_ref() {
                count_query = count_query.bind(owner);
            }
            let row = count_query.fetch_one(&mut **ex).await.map_err(postgres::map_sqlx_error)?;
            let total: i64 = row.try_get("count").map_err(postgres::map_sqlx_error)?;

            let (limit_idx, offset_idx) = if owner.is_some() { (2, 3) } else { (1, 2) };
            let list_str = format!(
                "SELECT * FROM trips WHERE {} ORDER BY id LIMIT ${} OFFSET ${}",
                where_str, limit_idx, offset_idx
            );
            let mut list_query = sqlx::query(&list_str);
            if let Some(owner) = owner.as_ref() {
                list_query = list_query.bind(owner);
            }
            let rows = list_query
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;

            let mut trips = Vec::with_capacity(rows.len());
            for row in rows {
                trips.push(TripRow::try_from(row)?.summary);
            }
            (total, trips)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (where_str, owner) = match filter {
                TripFilter::Public => ("is_private = FALSE", None),
                TripFilter::Owner(user_id) => ("user_id = ?", Some(user_id.to_string())),
            };

            let count_str = format!("SELECT COUNT(*) AS count FROM trips WHERE {}", where_str);
            let mut count_query = sqlx::query(&count_str);
            if let Some(owner) = owner.as_ref() {
                count_query = count_query.bind(owner);
            }
            let row = count_query.fetch_one(&mut **ex).await.map_err(sqlite::map_sqlx_error)?;
            let total: i64 = row.try_get("count").map_err(sqlite::map_sqlx_error)?;

            let list_str =
                format!("SELECT * FROM trips WHERE {} ORDER BY id LIMIT ? OFFSET ?", where_str);
            let mut list_query = sqlx::query(&list_str);
            if let Some(owner) = owner.as_ref() {
                list_query = list_query.bind(owner);
            }
            let rows = list_query
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;

            let mut trips = Vec::with_capacity(rows.len());
            for row in rows {
                trips.push(TripRow::try_from(row)?.summary);
            }
            (total, trips)
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    let total = u64::try_from(total)
        .map_err(|_| DbError::DataIntegrityError(format!("Negative trip count {}", total)))?;
    Ok((trips, total))
}

/// Deletes the trip with identifier `id` along with its map points and ratings.
pub(crate) async fn delete_trip(ex: &mut Executor, id: TripId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM trips WHERE id = $1")
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM trips WHERE id = ?")
                .bind(id.as_i64())
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

/// Deletes all trips owned by `user_id`, along with their map points and ratings.
///
/// Returns the number of deleted trips.
pub(crate) async fn delete_trips_by_user(ex: &mut Executor, user_id: UserId) -> DbResult<u64> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM trips WHERE user_id = $1")
                .bind(user_id.to_string())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM trips WHERE user_id = ?")
                .bind(user_id.to_string())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    Ok(rows_affected)
}

/// Records that `user_id` gave `score` to `trip_id`, with an optional `comment`.
///
/// Fails with `AlreadyExists` if the user had already rated the trip and with `NotFound` if the
/// trip does not exist.
pub(crate) async fn create_rating(
    ex: &mut Executor,
    user_id: UserId,
    trip_id: TripId,
    score: Score,
    comment: Option<String>,
) -> DbResult<TripRating> {
    let id: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO trip_ratings (user_id, trip_id, rating, comment)
                VALUES ($1, $2, $3, $4)
                RETURNING id
            ";
            let row = sqlx::query(query_str)
                .bind(user_id.to_string())
                .bind(trip_id.as_i64())
                .bind(score.as_i16())
                .bind(comment.as_deref())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO trip_ratings (user_id, trip_id, rating, comment)
                VALUES (?, ?, ?, ?)
                RETURNING id
            ";
            let row = sqlx::query(query_str)
                .bind(user_id.to_string())
                .bind(trip_id.as_i64())
                .bind(score.as_i16())
                .bind(comment.as_deref())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(TripRating::new(id, user_id, trip_id, score, comment))
}

/// Gets all ratings of `trip_id`, oldest first.
pub(crate) async fn get_ratings(ex: &mut Executor, trip_id: TripId) -> DbResult<Vec<TripRating>> {
    let mut ratings = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let rows = sqlx::query("SELECT * FROM trip_ratings WHERE trip_id = $1 ORDER BY id")
                .bind(trip_id.as_i64())
                .fetch_all(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            for row in rows {
                ratings.push(TripRating::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let rows = sqlx::query("SELECT * FROM trip_ratings WHERE trip_id = ? ORDER BY id")
                .bind(trip_id.as_i64())
                .fetch_all(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            for row in rows {
                ratings.push(TripRating::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(ratings)
}

/// Deletes all ratings submitted by `user_id`.
///
/// Returns the number of deleted ratings.
pub(crate) async fn delete_ratings_by_user(ex: &mut Executor, user_id: UserId) -> DbResult<u64> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM trip_ratings WHERE user_id = $1")
                .bind(user_id.to_string())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM trip_ratings WHERE user_id = ?")
                .bind(user_id.to_string())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    Ok(rows_affected)
}
