/// Integration tests for the mock backend
///
/// These tests execute the generated operation documents against the mock
/// schema and verify:
/// - Record creation, lookup, update and deletion
/// - Pagination with continuation tokens
/// - Filters and mutation conditions
/// - Subscriptions fed by mutations

mod mock_backend_tests {
    use async_graphql::dynamic::Schema;
    use async_graphql::{Request, Variables};
    use contactgraph::catalog::{Catalog, CatalogBuilder};
    use contactgraph::model::builtin_models;
    use contactgraph::schema::MockSchemaBuilder;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn setup() -> (Schema, Catalog) {
        let _ = tracing_subscriber::fmt::try_init();

        let models = builtin_models();
        let schema = MockSchemaBuilder::new()
            .build_schema(&models)
            .expect("Failed to build schema");
        let catalog = CatalogBuilder::new()
            .build(&models)
            .expect("Failed to build catalog");
        (schema, catalog)
    }

    fn request(catalog: &Catalog, name: &str, variables: Value) -> Request {
        let operation = catalog.get(name).expect("Unknown operation");
        Request::new(operation.document.clone()).variables(Variables::from_json(variables))
    }

    /// Execute a catalog operation, returning the whole response as JSON
    async fn execute(schema: &Schema, catalog: &Catalog, name: &str, variables: Value) -> Value {
        let response = schema.execute(request(catalog, name, variables)).await;
        serde_json::to_value(&response).expect("Failed to serialize response")
    }

    /// Execute a catalog operation that must succeed, returning its root field
    async fn execute_ok(schema: &Schema, catalog: &Catalog, name: &str, variables: Value) -> Value {
        let response = execute(schema, catalog, name, variables).await;
        assert!(response.get("errors").is_none(), "{} failed: {}", name, response);
        response["data"][name].clone()
    }

    #[tokio::test]
    async fn test_create_and_get_connection() {
        let (schema, catalog) = setup();

        let created = execute_ok(
            &schema,
            &catalog,
            "createConnection",
            json!({"input": {
                "companyName": "Example Co",
                "firstName": "Jane",
                "lastName": "Doe",
                "linkedinURL": "https://www.linkedin.com/in/jane"
            }}),
        )
        .await;

        let id = created["id"].as_str().expect("id assigned").to_string();
        assert_eq!(created["__typename"], "Connection");
        assert_eq!(created["linkedinURL"], "https://www.linkedin.com/in/jane");
        assert_eq!(created["email"], Value::Null);
        assert_eq!(created["createdAt"], created["updatedAt"]);

        let fetched = execute_ok(&schema, &catalog, "getConnection", json!({"id": id})).await;
        assert_eq!(fetched, created);

        let missing = execute_ok(&schema, &catalog, "getConnection", json!({"id": "nope"})).await;
        assert_eq!(missing, Value::Null);
    }

    #[tokio::test]
    async fn test_update_and_delete_company() {
        let (schema, catalog) = setup();

        execute_ok(
            &schema,
            &catalog,
            "createCompany",
            json!({"input": {"id": "c1", "companyName": "Acme", "city": "Oslo"}}),
        )
        .await;

        let updated = execute_ok(
            &schema,
            &catalog,
            "updateCompany",
            json!({"input": {"id": "c1", "industry": "Software", "city": null}}),
        )
        .await;
        assert_eq!(updated["companyName"], "Acme");
        assert_eq!(updated["industry"], "Software");
        assert_eq!(updated["city"], Value::Null);

        let deleted = execute_ok(
            &schema,
            &catalog,
            "deleteCompany",
            json!({"input": {"id": "c1"}}),
        )
        .await;
        assert_eq!(deleted["industry"], "Software");

        let gone = execute_ok(&schema, &catalog, "getCompany", json!({"id": "c1"})).await;
        assert_eq!(gone, Value::Null);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (schema, catalog) = setup();

        for i in 0..5 {
            execute_ok(
                &schema,
                &catalog,
                "createCompany",
                json!({"input": {"id": format!("c{}", i), "companyName": format!("Company {}", i)}}),
            )
            .await;
        }

        let mut seen = Vec::new();
        let mut next_token = Value::Null;
        let mut pages = 0;
        loop {
            let page = execute_ok(
                &schema,
                &catalog,
                "listCompanies",
                json!({"limit": 2, "nextToken": next_token}),
            )
            .await;
            pages += 1;

            assert_eq!(page["__typename"], "ModelCompanyConnection");
            for item in page["items"].as_array().expect("items") {
                seen.push(item["id"].as_str().unwrap().to_string());
            }

            next_token = page["nextToken"].clone();
            if next_token.is_null() {
                break;
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(seen, vec!["c0", "c1", "c2", "c3", "c4"]);
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let (schema, catalog) = setup();

        for (id, first, company) in [
            ("p1", "Jane", "Example Co"),
            ("p2", "John", "Acme"),
            ("p3", "Janet", "Acme"),
        ] {
            execute_ok(
                &schema,
                &catalog,
                "createConnection",
                json!({"input": {"id": id, "firstName": first, "companyName": company}}),
            )
            .await;
        }

        let page = execute_ok(
            &schema,
            &catalog,
            "listConnections",
            json!({"filter": {
                "firstName": {"beginsWith": "Jan"},
                "companyName": {"eq": "Acme"}
            }}),
        )
        .await;

        let items = page["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "p3");
        assert_eq!(page["nextToken"], Value::Null);

        let page = execute_ok(
            &schema,
            &catalog,
            "listConnections",
            json!({"filter": {"or": [
                {"firstName": {"eq": "John"}},
                {"companyName": {"eq": "Example Co"}}
            ]}}),
        )
        .await;
        assert_eq!(page["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_condition_leaves_record_unchanged() {
        let (schema, catalog) = setup();

        execute_ok(
            &schema,
            &catalog,
            "createCompany",
            json!({"input": {"id": "c1", "industry": "Retail"}}),
        )
        .await;

        let response = execute(
            &schema,
            &catalog,
            "updateCompany",
            json!({
                "input": {"id": "c1", "industry": "Software"},
                "condition": {"industry": {"eq": "Banking"}}
            }),
        )
        .await;

        assert_eq!(response["data"]["updateCompany"], Value::Null);
        assert_eq!(
            response["errors"][0]["extensions"]["errorType"],
            "ConditionalCheckFailedException"
        );

        let company = execute_ok(&schema, &catalog, "getCompany", json!({"id": "c1"})).await;
        assert_eq!(company["industry"], "Retail");
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let (schema, catalog) = setup();

        let variables = json!({"input": {"id": "p1", "firstName": "Jane"}});
        execute_ok(&schema, &catalog, "createConnection", variables.clone()).await;

        let response = execute(&schema, &catalog, "createConnection", variables).await;
        assert_eq!(
            response["errors"][0]["extensions"]["errorType"],
            "ConditionalCheckFailedException"
        );
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let (schema, catalog) = setup();

        let response = execute(
            &schema,
            &catalog,
            "deleteConnection",
            json!({"input": {"id": "missing"}}),
        )
        .await;
        assert!(response["errors"].as_array().is_some());
    }

    #[tokio::test]
    async fn test_filter_on_timestamps() {
        let (schema, catalog) = setup();

        execute_ok(
            &schema,
            &catalog,
            "createCompany",
            json!({"input": {"id": "c1"}}),
        )
        .await;

        // Timestamps compare as strings
        let page = execute_ok(
            &schema,
            &catalog,
            "listCompanies",
            json!({"filter": {"createdAt": {"gt": "2000-01-01T00:00:00.000Z"}}}),
        )
        .await;
        assert_eq!(page["items"].as_array().unwrap().len(), 1);

        let page = execute_ok(
            &schema,
            &catalog,
            "listCompanies",
            json!({"filter": {"createdAt": {"lt": "2000-01-01T00:00:00.000Z"}}}),
        )
        .await;
        assert_eq!(page["items"], json!([]));
    }

    #[tokio::test]
    async fn test_subscription_receives_matching_creates() {
        let (schema, catalog) = setup();

        let mut stream = schema.execute_stream(request(
            &catalog,
            "onCreateCompany",
            json!({"filter": {"city": {"eq": "Oslo"}}}),
        ));

        // Poll once so the subscription is registered before any mutation
        assert!(
            tokio::time::timeout(Duration::from_millis(50), stream.next())
                .await
                .is_err()
        );

        execute_ok(
            &schema,
            &catalog,
            "createCompany",
            json!({"input": {"id": "c1", "city": "Rome"}}),
        )
        .await;
        execute_ok(
            &schema,
            &catalog,
            "updateCompany",
            json!({"input": {"id": "c1", "city": "Oslo"}}),
        )
        .await;
        execute_ok(
            &schema,
            &catalog,
            "createCompany",
            json!({"input": {"id": "c2", "city": "Oslo"}}),
        )
        .await;

        let response = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("No event received")
            .expect("Stream ended");
        let response = serde_json::to_value(&response).unwrap();

        assert_eq!(response["data"]["onCreateCompany"]["id"], "c2");
        assert_eq!(response["data"]["onCreateCompany"]["__typename"], "Company");
    }

    #[tokio::test]
    async fn test_update_subscription_filters_updated_record() {
        let (schema, catalog) = setup();

        let mut stream = schema.execute_stream(request(
            &catalog,
            "onUpdateCompany",
            json!({"filter": {"city": {"eq": "Oslo"}}}),
        ));
        assert!(
            tokio::time::timeout(Duration::from_millis(50), stream.next())
                .await
                .is_err()
        );

        execute_ok(
            &schema,
            &catalog,
            "createCompany",
            json!({"input": {"id": "c1", "city": "Oslo"}}),
        )
        .await;
        execute_ok(
            &schema,
            &catalog,
            "updateCompany",
            json!({"input": {"id": "c1", "city": "Rome"}}),
        )
        .await;
        execute_ok(
            &schema,
            &catalog,
            "updateCompany",
            json!({"input": {"id": "c1", "city": "Oslo", "industry": "Software"}}),
        )
        .await;

        let response = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("No event received")
            .expect("Stream ended");
        let response = serde_json::to_value(&response).unwrap();

        // The create and the move away from Oslo are not delivered
        let company = &response["data"]["onUpdateCompany"];
        assert_eq!(company["id"], "c1");
        assert_eq!(company["city"], "Oslo");
        assert_eq!(company["industry"], "Software");
        assert_eq!(company["__typename"], "Company");
    }

    #[tokio::test]
    async fn test_delete_subscription() {
        let (schema, catalog) = setup();

        let mut stream = schema.execute_stream(request(&catalog, "onDeleteConnection", json!({})));
        assert!(
            tokio::time::timeout(Duration::from_millis(50), stream.next())
                .await
                .is_err()
        );

        execute_ok(
            &schema,
            &catalog,
            "createConnection",
            json!({"input": {"id": "p1", "email": "jane@example.com"}}),
        )
        .await;
        execute_ok(
            &schema,
            &catalog,
            "deleteConnection",
            json!({"input": {"id": "p1"}}),
        )
        .await;

        let response = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("No event received")
            .expect("Stream ended");
        let response = serde_json::to_value(&response).unwrap();

        assert_eq!(response["data"]["onDeleteConnection"]["id"], "p1");
        assert_eq!(response["data"]["onDeleteConnection"]["email"], "jane@example.com");
    }
}
