use crate::error::AppError;

/// SQLSTATE raised by PostgreSQL on a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
const NO_ROWS: &str = "no rows";

/// Turns a driver error into the API error it represents.
///
/// This is the only place where raw `sqlx` errors are inspected.
#[must_use]
pub fn parse_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::ServerError("title already taken".into())
        }
        sqlx::Error::RowNotFound => AppError::NotFound("no record matching given id".into()),
        other if other.to_string().contains(NO_ROWS) => AppError::NotFound("no record matching given id".into()),
        other => AppError::ServerError(format!("error when processing request: {other}")),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        parse_error(err)
    }
}
