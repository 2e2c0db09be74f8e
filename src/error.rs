use std::error::Error as StdError;
use thiserror::Error;

/// Any fault raised while fetching `user_locations`.
///
/// Callers see a single kind of failure: [`DataAccessError::fault_message`]
/// flattens whichever variant occurred into free text for the error envelope.
#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error(transparent)]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error(transparent)]
    Query(#[from] tokio_postgres::Error),

    #[error("column \"{column}\" has unsupported type {type_name}")]
    UnsupportedColumnType { column: String, type_name: String },

    #[error("error decoding column \"{column}\"")]
    Decode {
        column: String,
        #[source]
        source: Box<dyn StdError + Sync + Send>,
    },
}

impl DataAccessError {
    pub fn unsupported_column(column: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedColumnType {
            column: column.into(),
            type_name: type_name.into(),
        }
    }

    pub fn decode(column: impl Into<String>, source: Box<dyn StdError + Sync + Send>) -> Self {
        Self::Decode {
            column: column.into(),
            source,
        }
    }

    /// Human-readable text for the error envelope.
    pub fn fault_message(&self) -> String {
        describe_chain(self)
    }
}

/// Renders an error and its source chain joined by `": "`.
/// A source whose text already appears in the message is skipped.
pub fn describe_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }

    message
}
