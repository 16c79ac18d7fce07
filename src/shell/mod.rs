// Composition root for the attendance tracker.
//
// Responsibilities
// - Read config from environment.
// - Wire the store into use case handlers.
// - Expose the HTTP router and the dashboard GraphQL schema.

pub mod config;
pub mod graphql;
pub mod http;
pub mod state;
