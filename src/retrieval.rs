use serde::Serialize;

/// Outcome of a best-effort fetch from a remote source.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval<T> {
    Retrieved(T),
    /// The source answered but had nothing usable.
    Empty,
    Failed(String),
}

impl<T> Retrieval<T> {
    pub fn from_result(result: anyhow::Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Retrieval::Retrieved(value),
            Ok(None) => Retrieval::Empty,
            Err(err) => Retrieval::Failed(format!("{err:#}")),
        }
    }

    pub fn status(&self) -> RetrievalStatus {
        match self {
            Retrieval::Retrieved(_) => RetrievalStatus::Retrieved,
            Retrieval::Empty => RetrievalStatus::Empty,
            Retrieval::Failed(_) => RetrievalStatus::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Retrieval::Failed(_))
    }
}

impl<T: Default> Retrieval<T> {
    pub fn into_value_or_default(self) -> T {
        match self {
            Retrieval::Retrieved(value) => value,
            Retrieval::Empty | Retrieval::Failed(_) => T::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStatus {
    Retrieved,
    Empty,
    Failed,
}

impl RetrievalStatus {
    pub fn label(self) -> &'static str {
        match self {
            RetrievalStatus::Retrieved => "retrieved",
            RetrievalStatus::Empty => "no data",
            RetrievalStatus::Failed => "fetch failed",
        }
    }
}
