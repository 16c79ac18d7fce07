use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptyMutation, EmptySubscription, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{Extension, Router, response::Html, routing::get};

pub use crate::modules::attendance::use_cases::attendance_stats::inbound::graphql::QueryRoot;
pub use crate::shell::state::AppState;

pub type AppSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Read-only dashboard schema.
pub fn build_schema(state: AppState) -> AppSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(state)
        .finish()
}

pub fn routes(schema: AppSchema) -> Router {
    Router::new()
        .route("/gql", get(graphiql).post(graphql))
        .layer(Extension(schema))
}

async fn graphql(Extension(schema): Extension<AppSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/gql").finish())
}
