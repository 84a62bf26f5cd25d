//! Local/remote query splitting and variable propagation for GraphQL client
//! operations.
//!
//! Given one operation and its variables, the engine classifies `@client`
//! selections, executes them against registered local resolvers and a cache
//! reader, folds `@export(as:)` values into the operation variables, sends
//! the residual operation to a remote transport and merges both result trees
//! into a single response that matches the original query shape.
//!
//! The pipeline runs in five stages per operation: classification, local
//! execution, export binding, remote dispatch, result merging. Operations
//! whose selections are all local never touch the transport.

#![cfg_attr(feature = "failfast", allow(unreachable_code))]

macro_rules! failfast_debug {
    ($($tokens:tt)+) => {{
        tracing::debug!($($tokens)+);
        #[cfg(feature = "failfast")]
        panic!(
            "failfast triggered. \
            Please remove the feature failfast if you don't want to see these panics"
        );
    }};
}

macro_rules! failfast_error {
    ($($tokens:tt)+) => {{
        tracing::error!($($tokens)+);
        #[cfg(feature = "failfast")]
        panic!(
            "failfast triggered. \
            Please remove the feature failfast if you don't want to see these panics"
        );
    }};
}

mod cache;
mod error;
mod execution;
mod json_ext;
mod local_state;
pub mod mock;
mod registry;
mod request;
mod response;
mod spec;
mod transport;

pub use cache::CacheStore;
pub use error::{BoxError, GraphQLError, LocalStateError};
pub use json_ext::{ByteString, Map, Object, Path, PathElement, Value};
pub use local_state::LocalState;
pub use registry::{LocalResolver, ResolverContext, ResolverRegistry};
pub use request::Request;
pub use response::Response;
pub use spec::{Locality, Operation, OperationKind, Selection};
pub use transport::{RemoteRequest, RemoteTransport};
