//! Demo schema served by the binary

use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};

pub type AccountsSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

const ACCOUNTS: &[i32] = &[1212, 43434];

/// A single account
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct Account {
    pub account: i32,
}

/// Root query type for GraphQL
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All known accounts
    async fn accounts(&self) -> Vec<Account> {
        ACCOUNTS
            .iter()
            .map(|&account| Account { account })
            .collect()
    }

    /// Look up one account by number
    async fn account(&self, id: i32) -> Option<Account> {
        ACCOUNTS
            .contains(&id)
            .then_some(Account { account: id })
    }
}

/// Create the GraphQL schema
pub fn create_schema() -> AccountsSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription).finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_accounts_query() {
        let schema = create_schema();
        let result = schema.execute("{ accounts { account } }").await;

        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(
            result.data.into_json().unwrap(),
            json!({ "accounts": [{ "account": 1212 }, { "account": 43434 }] })
        );
    }

    #[tokio::test]
    async fn test_account_lookup() {
        let schema = create_schema();

        let result = schema.execute("{ account(id: 43434) { account } }").await;
        assert_eq!(
            result.data.into_json().unwrap(),
            json!({ "account": { "account": 43434 } })
        );

        let result = schema.execute("{ account(id: 7) { account } }").await;
        assert_eq!(result.data.into_json().unwrap(), json!({ "account": null }));
    }

    #[test]
    fn test_schema_sdl() {
        let sdl = create_schema().sdl();
        assert!(sdl.contains("accounts: [Account!]!"));
    }
}
