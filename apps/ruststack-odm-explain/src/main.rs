//! RustStack ODM explain - show how a request would be planned.
//!
//! Reads a plan request as JSON on stdin and prints the chosen operation,
//! the selected index and the finalized native payload on stdout. Nothing is
//! sent to a store.
//!
//! # Usage
//!
//! ```text
//! echo '{
//!   "table": "orders",
//!   "catalog": {"primary": {"hashAttribute": "pk", "rangeAttribute": "sk"}},
//!   "action": "read",
//!   "conditions": [
//!     {"column": "pk", "type": "=", "value": "USER#1"},
//!     {"column": "sk", "type": "begins_with", "value": "ORDER#"}
//!   ]
//! }' | ruststack-odm-explain
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ODM_TABLE_PREFIX` | *(empty)* | Prefix prepended to table names |
//! | `ODM_CONSISTENT_READ` | `false` | Default consistency flag for reads |
//! | `ODM_NAME_PREFIX` | `#` | Name placeholder prefix |
//! | `ODM_VALUE_PREFIX` | `:` | Value placeholder prefix |
//! | `ODM_PLACEHOLDER_PREFIX` | `a` | Value placeholder token prefix |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::io::Read;

use anyhow::{Context, Result};
use ruststack_odm_core::{
    Condition, FinalizedRequest, IndexCatalog, ItemUpdate, OdmConfig, ReadOptions, RequestPlanner,
    SelectedIndex,
};
use ruststack_odm_model::{ReturnValue, StoreOperation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Request read from stdin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanRequest {
    table: String,
    catalog: IndexCatalog,
    #[serde(flatten)]
    action: PlanAction,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum PlanAction {
    Read {
        #[serde(default)]
        conditions: Vec<Condition>,
        #[serde(default)]
        options: ReadOptions,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        key: Map<String, Value>,
        #[serde(default)]
        set: Map<String, Value>,
        #[serde(default)]
        remove: Vec<String>,
        #[serde(default)]
        condition: Vec<Condition>,
        #[serde(default)]
        return_values: Option<ReturnValue>,
    },
    Put {
        item: Map<String, Value>,
        #[serde(default)]
        condition: Vec<Condition>,
    },
    Delete {
        key: Map<String, Value>,
        #[serde(default)]
        condition: Vec<Condition>,
    },
}

/// Report written to stdout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Explanation {
    operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<SelectedIndex>,
    request: FinalizedRequest,
}

/// Initialize the tracing subscriber on stderr.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `LOG_LEVEL`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned())
}

fn explain(planner: &RequestPlanner, action: PlanAction) -> Result<Explanation> {
    let explanation = match action {
        PlanAction::Read {
            conditions,
            options,
        } => {
            let plan = planner
                .plan_read(&conditions, &options)
                .context("failed to plan read")?;
            Explanation {
                operation: plan.operation.as_str(),
                request: plan.finalize(),
                index: plan.index,
            }
        }
        PlanAction::Update {
            key,
            set,
            remove,
            condition,
            return_values,
        } => {
            let update = ItemUpdate {
                set,
                remove,
                condition,
                return_values,
            };
            let request = planner
                .plan_update(&key, &update)
                .context("failed to plan update")?;
            Explanation {
                operation: StoreOperation::UpdateItem.as_str(),
                index: None,
                request: request.finalize(),
            }
        }
        PlanAction::Put { item, condition } => {
            let request = planner
                .plan_put(&item, &condition)
                .context("failed to plan put")?;
            Explanation {
                operation: StoreOperation::PutItem.as_str(),
                index: None,
                request: request.finalize(),
            }
        }
        PlanAction::Delete { key, condition } => {
            let request = planner
                .plan_delete(&key, &condition)
                .context("failed to plan delete")?;
            Explanation {
                operation: StoreOperation::DeleteItem.as_str(),
                index: None,
                request: request.finalize(),
            }
        }
    };
    Ok(explanation)
}

fn main() -> Result<()> {
    init_tracing(&log_level())?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    let request: PlanRequest =
        serde_json::from_str(&input).context("failed to parse plan request")?;

    let config = OdmConfig::from_env();
    info!(
        table = %request.table,
        table_prefix = %config.table_prefix,
        secondary_indexes = request.catalog.secondary().len(),
        "planning request",
    );

    let planner = RequestPlanner::new(request.table, request.catalog).with_config(config);
    let explanation = explain(&planner, request.action)?;

    let output = serde_json::to_string_pretty(&explanation).context("failed to encode output")?;
    println!("{output}");
    Ok(())
}
