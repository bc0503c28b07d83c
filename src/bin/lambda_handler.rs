//! AWS Lambda handler for payout evaluations
//!
//! Accepts a JSON request through a Lambda Function URL and returns the role
//! list, a single-month evaluation or a consultant quarter as JSON.
//!
//! ```json
//! {"action": "evaluate", "role": "credit-manager-upf", "inputs": {"approvals_month": 10}}
//! {"action": "quarterly", "role": "consultant-expert", "months": [{}, {}, {}],
//!  "meets_creation_quota": true, "meets_effective_quota": true}
//! {"action": "roles"}
//! ```

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use incentive_engine::{
    evaluate, Currency, EngineError, Evaluation, InputSet, QuarterlyAggregate, QuarterlyAggregator, QuotaFlags,
    RuleTable,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum PayoutRequest {
    Roles,
    Evaluate {
        role: String,
        /// Values applied over the role defaults
        #[serde(default)]
        inputs: InputSet,
    },
    Quarterly {
        role: String,
        months: Vec<InputSet>,
        #[serde(default)]
        meets_creation_quota: bool,
        #[serde(default)]
        meets_effective_quota: bool,
    },
}

#[derive(Debug, Serialize)]
struct RoleSummary {
    id: &'static str,
    title: &'static str,
    currency: Currency,
    inputs: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum PayoutResponse {
    Roles { roles: Vec<RoleSummary> },
    Evaluation(Evaluation),
    Quarter(QuarterlyAggregate),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn respond(status_code: i64, body: String) -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code,
        headers: Default::default(),
        body: Some(body),
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn error_response(status_code: i64, message: String) -> Result<LambdaFunctionUrlResponse, Error> {
    let body = serde_json::to_string(&ErrorBody { error: message })?;
    Ok(respond(status_code, body))
}

/// Role defaults overlaid with the request's values
fn with_defaults(table: &RuleTable, role: &str, overrides: InputSet) -> Result<InputSet, EngineError> {
    let mut inputs = table.get(role)?.default_inputs();
    inputs.merge(overrides);
    Ok(inputs)
}

fn dispatch(table: &RuleTable, request: PayoutRequest) -> Result<PayoutResponse, EngineError> {
    match request {
        PayoutRequest::Roles => Ok(PayoutResponse::Roles {
            roles: table
                .roles()
                .iter()
                .map(|role| RoleSummary {
                    id: role.id,
                    title: role.title,
                    currency: role.currency,
                    inputs: role.inputs.iter().map(|spec| spec.key).collect(),
                })
                .collect(),
        }),
        PayoutRequest::Evaluate { role, inputs } => {
            let inputs = with_defaults(table, &role, inputs)?;
            Ok(PayoutResponse::Evaluation(evaluate(table.get(&role)?, &inputs)?))
        }
        PayoutRequest::Quarterly {
            role,
            months,
            meets_creation_quota,
            meets_effective_quota,
        } => {
            let months = months
                .into_iter()
                .map(|month| with_defaults(table, &role, month))
                .collect::<Result<Vec<_>, _>>()?;
            let flags = QuotaFlags::new(meets_creation_quota, meets_effective_quota);
            let aggregate = QuarterlyAggregator::new().aggregate_slice(table.get(&role)?, &months, flags)?;
            Ok(PayoutResponse::Quarter(aggregate))
        }
    }
}

async fn handler(
    table: &RuleTable,
    event: LambdaEvent<LambdaFunctionUrlRequest>,
) -> Result<LambdaFunctionUrlResponse, Error> {
    let start = std::time::Instant::now();

    if event.payload.is_base64_encoded {
        return error_response(415, "base64-encoded bodies are not supported; send application/json".to_string());
    }
    let body = event.payload.body.unwrap_or_else(|| "{}".to_string());

    let request: PayoutRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => return error_response(400, format!("Invalid JSON: {}", e)),
    };

    let response = match dispatch(table, request) {
        Ok(response) => response,
        Err(e @ EngineError::UnknownRole(_)) => return error_response(404, e.to_string()),
        Err(e) => return error_response(422, e.to_string()),
    };

    log::info!("Request handled in {:?}", start.elapsed());
    Ok(respond(200, serde_json::to_string(&response)?))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let table = RuleTable::load_configured(None)?;
    let table = &table;
    run(service_fn(move |event| async move { handler(table, event).await })).await
}
