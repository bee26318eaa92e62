#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validate(String),

    #[error("failed to generate tokens: {0}")]
    Token(#[source] Box<Error>),

    #[error("{0}")]
    Storage(#[from] sqlx::Error),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP-style status the boundary layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::Validate(_) => 422,
            Error::Token(inner) => inner.status_code(),
            Error::Storage(_) | Error::Unknown(_) => 500,
        }
    }

    /// Unwraps token-issuance wrapping to reach the error that caused it.
    pub fn root(&self) -> &Error {
        match self {
            Error::Token(inner) => inner.root(),
            other => other,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::Validate(value.to_string())
    }
}

#[macro_export]
macro_rules! not_found {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::NotFound(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::NotFound(format!($fmt, $($arg)*)))
    };
}

#[macro_export]
macro_rules! conflict {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Conflict(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Conflict(format!($fmt, $($arg)*)))
    };
}

#[macro_export]
macro_rules! invalid {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Validate(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Validate(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_error_reports_inner_status() {
        let err = Error::Token(Box::new(Error::Validate("role missing".to_owned())));

        assert_eq!(err.status_code(), 422);
        assert_eq!(err.to_string(), "failed to generate tokens: role missing");
        assert!(matches!(err.root(), Error::Validate(_)));
    }

    #[test]
    fn macros_return_matching_variant() {
        fn lookup(id: &str) -> Result<()> {
            not_found!("User not found with id {id}");
        }

        fn restore(id: &str) -> Result<()> {
            conflict!("User with ID {} is already active", id);
        }

        assert_eq!(lookup("a").unwrap_err().status_code(), 404);
        assert_eq!(restore("a").unwrap_err().status_code(), 409);
    }
}
