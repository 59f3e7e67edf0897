use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("{}", server_message(.0))]
    Connect(#[source] tokio_postgres::Error),

    #[error("{message}")]
    Query {
        query: String,
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("tls setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("io error: `{0}`")]
    Io(#[from] std::io::Error),
}

impl VerifyError {
    pub fn query(query: &str, source: tokio_postgres::Error) -> Self {
        VerifyError::Query {
            query: query.to_string(),
            message: server_message(&source),
            source,
        }
    }
}

// Prefer the server's own text over the driver's generic "db error".
pub fn server_message(error: &tokio_postgres::Error) -> String {
    match error.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => format!("{} ({})", db.message(), detail),
            None => db.message().to_string(),
        },
        None => error.to_string(),
    }
}

pub type Result<T = ()> = std::result::Result<T, VerifyError>;
