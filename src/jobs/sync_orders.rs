use crate::config::ApiloConfig;
use crate::core::ApiClient;
use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use serde_json::{json, Value};
use uuid::Uuid;

/// Mirrors Apilo orders into kanban tasks: one task per order, dropped into
/// the first column of the board the configured link points at. The column
/// is resolved once per run.
pub async fn run(icp: &ApiClient, apilo: &ApiClient, config: &ApiloConfig) -> Result<()> {
    let mut query = Vec::new();
    if let Some(after) = &config.created_after {
        query.push(("createdAfter".to_string(), after.clone()));
    }

    let body = apilo.get_value("orders", &query).await?;
    let orders: Vec<Record> = body
        .get("orders")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| Record::from_value(v.clone()))
                .collect()
        })
        .unwrap_or_default();

    if orders.is_empty() {
        tracing::info!("no orders to mirror");
        return Ok(());
    }
    tracing::info!("retrieved {} orders", orders.len());

    let column_id = resolve_board_column(icp, &config.board_link).await?;

    let mut created = 0usize;
    let mut failed = 0usize;
    for order in &orders {
        let external_id = order
            .display("idExternal")
            .unwrap_or_else(|| "<unknown>".to_string());
        let customer = order
            .get("addressCustomer")
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown customer");

        let payload = json!({
            "identifier": Uuid::new_v4().to_string(),
            "boardColumn": column_id,
            "name": format!("Order ID: {}", external_id),
            "description": format!("Order from customer: {}", customer),
            "dateStart": order.str("createdAt"),
            "dateEnd": order.str("createdAt"),
            "priority": "normal",
        });

        match icp.submit("project/tasks", &payload).await {
            Ok(()) => {
                created += 1;
                tracing::info!("task for order {} created", external_id);
            }
            Err(err) => {
                failed += 1;
                tracing::warn!("could not create task for order {}: {}", external_id, err);
            }
        }
    }

    tracing::info!("orders mirrored: {} created, {} failed", created, failed);
    Ok(())
}

/// The board link ends with the board slug; the slug resolves to a board id
/// whose first column receives the mirrored tasks.
async fn resolve_board_column(icp: &ApiClient, board_link: &str) -> Result<Value> {
    let slug = board_link
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(board_link);

    let board = icp
        .get_value(&format!("project/boards/s/{}/get-kanban-board", slug), &[])
        .await?;
    let board_id = Record::from_value(board)
        .and_then(|r| r.display("id"))
        .ok_or_else(|| EtlError::Payload("kanban board response carried no id".to_string()))?;

    let columns = icp
        .get_records(&format!("project/boards/{}/board-columns", board_id), &[])
        .await?;
    columns
        .first()
        .and_then(|column| column.get("id").cloned())
        .ok_or_else(|| EtlError::Payload(format!("board {} has no columns", board_id)))
}
