//! Gateway access
//!
//! - `client`: raw GraphQL-over-HTTP calls to the gateway
//! - `operations`: the shared operation document and typed wrappers

pub mod client;
pub mod operations;

pub use client::{GatewayClient, GatewayError, GraphQlResponse, Operation};
pub use operations::{
    CreateIssueInput, CreatedIssue, GatewayApi, GitHubUser, Issue, SupportedService,
    SupportedServices,
};
