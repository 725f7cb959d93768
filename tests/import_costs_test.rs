use httpmock::prelude::*;
use icp_etl::core::{ApiClient, Auth, ImportSummary};
use icp_etl::jobs;
use serde_json::json;
use std::io::Write;

/// Two rows referencing the same new tax-rate name: exactly one tax-rate
/// creation call, two cost creations, both carrying the resolved id.
#[tokio::test]
async fn test_import_costs_shares_created_tax_rate() {
    let server = MockServer::start();

    let categories_mock = server.mock(|when, then| {
        when.method(GET).path("/finance/cost-categories");
        then.status(200)
            .json_body(json!([{"id": "cc-1", "name": "Office"}]));
    });
    let tax_rates_mock = server.mock(|when, then| {
        when.method(GET).path("/finance/tax-rates");
        then.status(200).json_body(json!([]));
    });
    let projects_mock = server.mock(|when, then| {
        when.method(GET).path("/project/projects");
        then.status(200).json_body(json!([]));
    });

    let category_create_mock = server.mock(|when, then| {
        when.method(POST).path("/finance/cost-categories");
        then.status(201).json_body(json!({"id": "cc-never"}));
    });
    let tax_rate_create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/finance/tax-rates")
            .json_body(json!({"name": "VAT 23%", "value": 23.0, "isDefault": false}));
        then.status(201)
            .json_body(json!({"id": "tr-1", "name": "VAT 23%"}));
    });
    let cost_create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/finance/costs")
            .json_body_partial(r#"{"taxRate": "tr-1", "costCategory": "cc-1"}"#);
        then.status(201).json_body(json!({"id": "cost"}));
    });

    let mut csv_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        csv_file,
        "name,description,priceNet,priceGross,date,isBilled,isPosted,category,taxRate,taxRateValue,project"
    )
    .unwrap();
    writeln!(
        csv_file,
        "Cost A,First,100,123,2024-01-05,true,false,Office,VAT 23%,23,"
    )
    .unwrap();
    writeln!(
        csv_file,
        "Cost B,Second,200,246,2024-01-06,false,false,Office,VAT 23%,23,"
    )
    .unwrap();

    let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
    let summary = jobs::import_costs::run(&client, csv_file.path())
        .await
        .unwrap();

    categories_mock.assert();
    tax_rates_mock.assert();
    projects_mock.assert();
    category_create_mock.assert_hits(0); // "Office" was already indexed
    tax_rate_create_mock.assert(); // created exactly once, reused for row 2
    cost_create_mock.assert_hits(2);
    assert_eq!(
        summary,
        ImportSummary {
            created: 2,
            failed: 0
        }
    );
}

/// A cost referencing an unknown project still goes through, with the
/// project reference resolved to null.
#[tokio::test]
async fn test_import_costs_unknown_project_resolves_to_null() {
    let server = MockServer::start();

    for path in [
        "/finance/cost-categories",
        "/finance/tax-rates",
        "/project/projects",
    ] {
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(json!([]));
        });
    }
    server.mock(|when, then| {
        when.method(POST).path("/finance/cost-categories");
        then.status(201).json_body(json!({"id": "cc-1"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/finance/tax-rates");
        then.status(201).json_body(json!({"id": "tr-1"}));
    });
    let cost_create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/finance/costs")
            .json_body_partial(r#"{"financeProject": null}"#);
        then.status(201).json_body(json!({"id": "cost"}));
    });

    let mut csv_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        csv_file,
        "name,description,priceNet,priceGross,date,isBilled,isPosted,category,taxRate,taxRateValue,project"
    )
    .unwrap();
    writeln!(
        csv_file,
        "Cost A,First,100,123,2024-01-05,true,false,New category,VAT 8%,8,No Such Project"
    )
    .unwrap();

    let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
    let summary = jobs::import_costs::run(&client, csv_file.path())
        .await
        .unwrap();

    cost_create_mock.assert();
    assert_eq!(
        summary,
        ImportSummary {
            created: 1,
            failed: 0
        }
    );
}

/// A failed tax-rate creation is non-fatal: the cost is submitted with a
/// null reference and the run still succeeds.
#[tokio::test]
async fn test_import_costs_failed_reference_creation_is_non_fatal() {
    let server = MockServer::start();

    for path in [
        "/finance/cost-categories",
        "/finance/tax-rates",
        "/project/projects",
    ] {
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(json!([]));
        });
    }
    server.mock(|when, then| {
        when.method(POST).path("/finance/cost-categories");
        then.status(201).json_body(json!({"id": "cc-1"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/finance/tax-rates");
        then.status(422).body("tax rate rejected");
    });
    let cost_create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/finance/costs")
            .json_body_partial(r#"{"taxRate": null}"#);
        then.status(201).json_body(json!({"id": "cost"}));
    });

    let mut csv_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        csv_file,
        "name,description,priceNet,priceGross,date,isBilled,isPosted,category,taxRate,taxRateValue,project"
    )
    .unwrap();
    writeln!(
        csv_file,
        "Cost A,First,100,123,2024-01-05,true,false,Office,Broken rate,0,"
    )
    .unwrap();

    let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
    let summary = jobs::import_costs::run(&client, csv_file.path())
        .await
        .unwrap();

    cost_create_mock.assert();
    assert_eq!(summary.created, 1);
}
