//! The seam between the route and the GraphQL engine

use async_graphql::{ObjectType, Request, Response, Schema, SubscriptionType};
use async_trait::async_trait;

/// Anything that can run one GraphQL operation.
///
/// The request carries the operation string, variables, operation name and
/// the request-scoped data; the response carries data and errors.
#[async_trait]
pub trait GraphQLExecutor: Send + Sync + 'static {
    async fn execute(&self, request: Request) -> Response;
}

#[async_trait]
impl<Query, Mutation, Subscription> GraphQLExecutor for Schema<Query, Mutation, Subscription>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    async fn execute(&self, request: Request) -> Response {
        Schema::execute(self, request).await
    }
}
