/*!
# Unified Error Type

This module provides the unified error enum for all netrics operations.
Errors fall into three bands: caller errors (rejected synchronously by the
analysis facade), runtime errors (delivered as a task's terminal event), and
systemic errors (the pool refusing work).
*/

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unified error type for all netrics operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Edge input with a self-loop or non-positive weight
    InvalidEdge(String),

    /// Node not present in the graph
    NoSuchNode(String),

    /// Feature id not present in the registry
    UnknownFeature(String),

    /// Layout or community algorithm id not present in the registry
    UnknownAlgorithm(String),

    /// A layout's required precondition does not hold
    LayoutPreconditionUnmet(String),

    /// Graph exceeds the size ceiling of a dense kernel
    GraphTooLarge { nodes: usize, limit: usize },

    /// Task deadline elapsed before the algorithm finished
    TimedOut { elapsed_ms: u64 },

    /// Task was cancelled before producing a result
    Cancelled,

    /// Worker panicked while running a task
    WorkerCrash(String),

    /// Pool is degraded and refuses new tasks
    PoolExhausted(String),
}

impl Error {
    /// Creates an invalid edge error.
    pub fn invalid_edge(message: impl Into<String>) -> Self {
        Error::InvalidEdge(message.into())
    }

    /// Creates a missing node error.
    pub fn no_such_node(message: impl Into<String>) -> Self {
        Error::NoSuchNode(message.into())
    }

    /// Creates an unknown feature error.
    pub fn unknown_feature(message: impl Into<String>) -> Self {
        Error::UnknownFeature(message.into())
    }

    /// Creates an unknown algorithm error.
    pub fn unknown_algorithm(message: impl Into<String>) -> Self {
        Error::UnknownAlgorithm(message.into())
    }

    /// Creates a layout precondition error.
    pub fn layout_precondition(message: impl Into<String>) -> Self {
        Error::LayoutPreconditionUnmet(message.into())
    }

    /// Creates a worker crash error.
    pub fn worker_crash(message: impl Into<String>) -> Self {
        Error::WorkerCrash(message.into())
    }

    /// Creates a pool exhausted error.
    pub fn pool_exhausted(message: impl Into<String>) -> Self {
        Error::PoolExhausted(message.into())
    }

    /// Returns the discriminant name, used as the `kind` field in error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidEdge(_) => "InvalidEdge",
            Error::NoSuchNode(_) => "NoSuchNode",
            Error::UnknownFeature(_) => "UnknownFeature",
            Error::UnknownAlgorithm(_) => "UnknownAlgorithm",
            Error::LayoutPreconditionUnmet(_) => "LayoutPreconditionUnmet",
            Error::GraphTooLarge { .. } => "GraphTooLarge",
            Error::TimedOut { .. } => "TimedOut",
            Error::Cancelled => "Cancelled",
            Error::WorkerCrash(_) => "WorkerCrash",
            Error::PoolExhausted(_) => "PoolExhausted",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidEdge(msg) => write!(f, "Invalid edge: {}", msg),
            Error::NoSuchNode(msg) => write!(f, "No such node: {}", msg),
            Error::UnknownFeature(msg) => write!(f, "Unknown feature: {}", msg),
            Error::UnknownAlgorithm(msg) => write!(f, "Unknown algorithm: {}", msg),
            Error::LayoutPreconditionUnmet(msg) => {
                write!(f, "Layout precondition unmet: {}", msg)
            }
            Error::GraphTooLarge { nodes, limit } => {
                write!(f, "Graph too large: {} nodes exceeds limit of {}", nodes, limit)
            }
            Error::TimedOut { elapsed_ms } => {
                write!(f, "Timed out after {} ms", elapsed_ms)
            }
            Error::Cancelled => write!(f, "Cancelled"),
            Error::WorkerCrash(msg) => write!(f, "Worker crashed: {}", msg),
            Error::PoolExhausted(msg) => write!(f, "Pool exhausted: {}", msg),
        }
    }
}

impl StdError for Error {}

/// Serializable `{kind, message}` form of an [`Error`], used in the
/// `errors` map of an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        ErrorReport {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}
