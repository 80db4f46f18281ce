// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::Utc;
use clap::Parser;
use classledger_api::{
    ApiError, ApproveExpenseProposalRequest, ApproveIncomeReportRequest,
    CancelEnrollmentRequest, ConfirmPaymentRequest, CreateEnrollmentRequest,
    CreateExpenseProposalRequest, CreateIncomeReportRequest, MarkExpenseProposalPaidRequest,
    RejectRequest, UpdateExpenseProposalRequest, UpdateIncomeReportRequest,
    ValidateVoucherRequest, approve_expense_proposal, approve_income_report, auto_apply_preview,
    cancel_enrollment, confirm_payment, create_enrollment, create_expense_proposal,
    create_income_report, delete_enrollment, delete_expense_proposal, delete_income_report,
    enrollment_statistics, get_enrollment, get_expense_proposal, get_income_report,
    list_enrollments, list_expense_proposals, list_income_reports, list_vouchers,
    mark_expense_proposal_paid, reject_expense_proposal, reject_income_report,
    update_expense_proposal, update_income_report, validate_voucher,
};
use classledger_persistence::{EnrollmentFilter, FinanceFilter, Persistence};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// ClassLedger Server - HTTP server for the ClassLedger education-center backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for all ClassLedger records.
    persistence: Arc<Mutex<Persistence>>,
}

/// Uniform JSON envelope for every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope<T> {
    /// Success indicator.
    success: bool,
    /// Optional human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// The operation payload, absent on errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: None,
        data: Some(data),
    })
}

fn ok_empty(message: String) -> Json<Envelope<serde_json::Value>> {
    Json(Envelope {
        success: true,
        message: Some(message),
        data: None,
    })
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<Envelope<serde_json::Value>> = Json(Envelope {
            success: false,
            message: Some(self.message),
            data: None,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InvalidInput { .. } | ApiError::DomainRuleViolation { .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: err.to_string(),
            },
            ApiError::ResourceNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Query parameters for listing enrollments.
#[derive(Debug, Deserialize)]
struct EnrollmentListQuery {
    /// Filter by enrollment status.
    status: Option<String>,
    /// Filter by customer.
    customer_id: Option<i64>,
    /// Filter by product.
    product_id: Option<i64>,
    /// Filter by branch.
    branch_id: Option<i64>,
    /// Substring match on the customer name.
    search: Option<String>,
}

/// Query parameters for listing income reports or expense proposals.
#[derive(Debug, Deserialize)]
struct FinanceListQuery {
    /// Filter by status.
    status: Option<String>,
    /// Filter by branch.
    branch_id: Option<i64>,
    /// Inclusive lower bound on the report/proposal date (RFC 3339).
    date_from: Option<String>,
    /// Inclusive upper bound on the report/proposal date (RFC 3339).
    date_to: Option<String>,
    /// Substring match on the title.
    search: Option<String>,
}

/// Query parameters for listing vouchers.
#[derive(Debug, Deserialize)]
struct VoucherListQuery {
    /// Restrict the listing to active vouchers.
    #[serde(default)]
    active_only: bool,
}

/// Query parameters for the auto-apply campaign preview.
#[derive(Debug, Deserialize)]
struct AutoApplyQuery {
    /// The product the preview is priced against.
    product_id: i64,
}

/// Query parameters for delete endpoints.
#[derive(Debug, Deserialize)]
struct StaffQuery {
    /// The staff member performing the action.
    staff_id: Option<i64>,
}

// ============================================================================
// Enrollment handlers
// ============================================================================

/// Handler for POST `/enrollments`.
///
/// Creates an enrollment together with its pending income report,
/// applying only a voucher or campaign the request names.
async fn handle_create_enrollment(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateEnrollmentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        customer_id = req.customer_id,
        product_id = req.product_id,
        voucher_code = req.voucher_code.as_deref().unwrap_or(""),
        "Handling create_enrollment request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = create_enrollment(&mut persistence, req, Utc::now())?;
    drop(persistence);

    info!(
        enrollment_id = response.enrollment_id,
        final_price = response.final_price,
        "Successfully created enrollment"
    );

    Ok(ok(response))
}

/// Handler for POST `/enrollments/{id}/confirm-payment`.
async fn handle_confirm_payment(
    AxumState(app_state): AxumState<AppState>,
    Path(enrollment_id): Path<i64>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        enrollment_id = enrollment_id,
        amount = req.amount,
        "Handling confirm_payment request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = confirm_payment(&mut persistence, enrollment_id, req, Utc::now())?;
    drop(persistence);

    info!(
        enrollment_id = enrollment_id,
        status = %response.status,
        remaining = response.remaining_amount,
        "Payment confirmed"
    );

    Ok(ok(response))
}

/// Handler for POST `/enrollments/{id}/cancel`.
async fn handle_cancel_enrollment(
    AxumState(app_state): AxumState<AppState>,
    Path(enrollment_id): Path<i64>,
    Json(req): Json<CancelEnrollmentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        enrollment_id = enrollment_id,
        "Handling cancel_enrollment request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = cancel_enrollment(&mut persistence, enrollment_id, req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for DELETE `/enrollments/{id}`.
async fn handle_delete_enrollment(
    AxumState(app_state): AxumState<AppState>,
    Path(enrollment_id): Path<i64>,
    Query(query): Query<StaffQuery>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        enrollment_id = enrollment_id,
        "Handling delete_enrollment request"
    );

    let mut persistence = app_state.persistence.lock().await;
    delete_enrollment(&mut persistence, enrollment_id, query.staff_id, Utc::now())?;
    drop(persistence);

    Ok(ok_empty(format!("Deleted enrollment {enrollment_id}")))
}

/// Handler for GET `/enrollments`.
async fn handle_list_enrollments(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<EnrollmentListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let filter = EnrollmentFilter {
        status: query.status,
        customer_id: query.customer_id,
        product_id: query.product_id,
        branch_id: query.branch_id,
        search: query.search,
    };

    let mut persistence = app_state.persistence.lock().await;
    let rows = list_enrollments(&mut persistence, &filter)?;
    drop(persistence);

    Ok(ok(rows))
}

/// Handler for GET `/enrollments/statistics`.
async fn handle_enrollment_statistics(
    AxumState(app_state): AxumState<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let stats = enrollment_statistics(&mut persistence)?;
    drop(persistence);

    Ok(ok(stats))
}

/// Handler for GET `/enrollments/{id}`.
async fn handle_get_enrollment(
    AxumState(app_state): AxumState<AppState>,
    Path(enrollment_id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let row = get_enrollment(&mut persistence, enrollment_id)?;
    drop(persistence);

    Ok(ok(row))
}

// ============================================================================
// Voucher and campaign handlers
// ============================================================================

/// Handler for POST `/vouchers/validate`.
///
/// A voucher that fails an eligibility gate comes back as a 422 naming
/// the failed gate.
async fn handle_validate_voucher(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ValidateVoucherRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        code = %req.code,
        customer_id = req.customer_id,
        product_id = req.product_id,
        "Handling validate_voucher request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = validate_voucher(&mut persistence, &req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for GET `/vouchers`.
async fn handle_list_vouchers(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<VoucherListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let vouchers = list_vouchers(&mut persistence, query.active_only)?;
    drop(persistence);

    Ok(ok(vouchers))
}

/// Handler for GET `/campaigns/auto-apply`.
async fn handle_auto_apply_preview(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<AutoApplyQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let preview = auto_apply_preview(&mut persistence, query.product_id, Utc::now())?;
    drop(persistence);

    Ok(ok(preview))
}

// ============================================================================
// Income report handlers
// ============================================================================

/// Handler for POST `/income-reports`.
async fn handle_create_income_report(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateIncomeReportRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        title = %req.title,
        amount = req.amount,
        "Handling create_income_report request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = create_income_report(&mut persistence, req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for GET `/income-reports`.
async fn handle_list_income_reports(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<FinanceListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let filter = FinanceFilter {
        status: query.status,
        branch_id: query.branch_id,
        date_from: query.date_from,
        date_to: query.date_to,
        search: query.search,
    };

    let mut persistence = app_state.persistence.lock().await;
    let rows = list_income_reports(&mut persistence, &filter)?;
    drop(persistence);

    Ok(ok(rows))
}

/// Handler for GET `/income-reports/{id}`.
async fn handle_get_income_report(
    AxumState(app_state): AxumState<AppState>,
    Path(income_report_id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let row = get_income_report(&mut persistence, income_report_id)?;
    drop(persistence);

    Ok(ok(row))
}

/// Handler for PUT `/income-reports/{id}`.
async fn handle_update_income_report(
    AxumState(app_state): AxumState<AppState>,
    Path(income_report_id): Path<i64>,
    Json(req): Json<UpdateIncomeReportRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        income_report_id = income_report_id,
        "Handling update_income_report request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = update_income_report(&mut persistence, income_report_id, req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for POST `/income-reports/{id}/approve`.
async fn handle_approve_income_report(
    AxumState(app_state): AxumState<AppState>,
    Path(income_report_id): Path<i64>,
    Json(req): Json<ApproveIncomeReportRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        income_report_id = income_report_id,
        cash_account_id = req.cash_account_id,
        "Handling approve_income_report request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = approve_income_report(&mut persistence, income_report_id, req, Utc::now())?;
    drop(persistence);

    info!(
        income_report_id = income_report_id,
        transaction_id = response.transaction_id.unwrap_or(0),
        "Income report approved"
    );

    Ok(ok(response))
}

/// Handler for POST `/income-reports/{id}/reject`.
async fn handle_reject_income_report(
    AxumState(app_state): AxumState<AppState>,
    Path(income_report_id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        income_report_id = income_report_id,
        "Handling reject_income_report request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = reject_income_report(&mut persistence, income_report_id, req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for DELETE `/income-reports/{id}`.
async fn handle_delete_income_report(
    AxumState(app_state): AxumState<AppState>,
    Path(income_report_id): Path<i64>,
    Query(query): Query<StaffQuery>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        income_report_id = income_report_id,
        "Handling delete_income_report request"
    );

    let mut persistence = app_state.persistence.lock().await;
    delete_income_report(&mut persistence, income_report_id, query.staff_id, Utc::now())?;
    drop(persistence);

    Ok(ok_empty(format!("Deleted income report {income_report_id}")))
}

// ============================================================================
// Expense proposal handlers
// ============================================================================

/// Handler for POST `/expense-proposals`.
async fn handle_create_expense_proposal(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateExpenseProposalRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        title = %req.title,
        amount = req.amount,
        "Handling create_expense_proposal request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = create_expense_proposal(&mut persistence, req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for GET `/expense-proposals`.
async fn handle_list_expense_proposals(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<FinanceListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let filter = FinanceFilter {
        status: query.status,
        branch_id: query.branch_id,
        date_from: query.date_from,
        date_to: query.date_to,
        search: query.search,
    };

    let mut persistence = app_state.persistence.lock().await;
    let rows = list_expense_proposals(&mut persistence, &filter)?;
    drop(persistence);

    Ok(ok(rows))
}

/// Handler for GET `/expense-proposals/{id}`.
async fn handle_get_expense_proposal(
    AxumState(app_state): AxumState<AppState>,
    Path(expense_proposal_id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let row = get_expense_proposal(&mut persistence, expense_proposal_id)?;
    drop(persistence);

    Ok(ok(row))
}

/// Handler for PUT `/expense-proposals/{id}`.
async fn handle_update_expense_proposal(
    AxumState(app_state): AxumState<AppState>,
    Path(expense_proposal_id): Path<i64>,
    Json(req): Json<UpdateExpenseProposalRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        expense_proposal_id = expense_proposal_id,
        "Handling update_expense_proposal request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response =
        update_expense_proposal(&mut persistence, expense_proposal_id, req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for POST `/expense-proposals/{id}/approve`.
async fn handle_approve_expense_proposal(
    AxumState(app_state): AxumState<AppState>,
    Path(expense_proposal_id): Path<i64>,
    Json(req): Json<ApproveExpenseProposalRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        expense_proposal_id = expense_proposal_id,
        "Handling approve_expense_proposal request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response =
        approve_expense_proposal(&mut persistence, expense_proposal_id, req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for POST `/expense-proposals/{id}/reject`.
async fn handle_reject_expense_proposal(
    AxumState(app_state): AxumState<AppState>,
    Path(expense_proposal_id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        expense_proposal_id = expense_proposal_id,
        "Handling reject_expense_proposal request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response =
        reject_expense_proposal(&mut persistence, expense_proposal_id, req, Utc::now())?;
    drop(persistence);

    Ok(ok(response))
}

/// Handler for POST `/expense-proposals/{id}/mark-paid`.
async fn handle_mark_expense_proposal_paid(
    AxumState(app_state): AxumState<AppState>,
    Path(expense_proposal_id): Path<i64>,
    Json(req): Json<MarkExpenseProposalPaidRequest>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        expense_proposal_id = expense_proposal_id,
        payment_method = %req.payment_method,
        "Handling mark_expense_proposal_paid request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response =
        mark_expense_proposal_paid(&mut persistence, expense_proposal_id, req, Utc::now())?;
    drop(persistence);

    info!(
        expense_proposal_id = expense_proposal_id,
        transaction_id = response.transaction_id.unwrap_or(0),
        "Expense proposal marked paid"
    );

    Ok(ok(response))
}

/// Handler for DELETE `/expense-proposals/{id}`.
async fn handle_delete_expense_proposal(
    AxumState(app_state): AxumState<AppState>,
    Path(expense_proposal_id): Path<i64>,
    Query(query): Query<StaffQuery>,
) -> Result<impl IntoResponse, HttpError> {
    info!(
        expense_proposal_id = expense_proposal_id,
        "Handling delete_expense_proposal request"
    );

    let mut persistence = app_state.persistence.lock().await;
    delete_expense_proposal(&mut persistence, expense_proposal_id, query.staff_id, Utc::now())?;
    drop(persistence);

    Ok(ok_empty(format!("Deleted expense proposal {expense_proposal_id}")))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/enrollments", post(handle_create_enrollment))
        .route("/enrollments", get(handle_list_enrollments))
        .route("/enrollments/statistics", get(handle_enrollment_statistics))
        .route("/enrollments/{id}", get(handle_get_enrollment))
        .route("/enrollments/{id}", delete(handle_delete_enrollment))
        .route("/enrollments/{id}/confirm-payment", post(handle_confirm_payment))
        .route("/enrollments/{id}/cancel", post(handle_cancel_enrollment))
        .route("/vouchers/validate", post(handle_validate_voucher))
        .route("/vouchers", get(handle_list_vouchers))
        .route("/campaigns/auto-apply", get(handle_auto_apply_preview))
        .route("/income-reports", post(handle_create_income_report))
        .route("/income-reports", get(handle_list_income_reports))
        .route("/income-reports/{id}", get(handle_get_income_report))
        .route("/income-reports/{id}", put(handle_update_income_report))
        .route("/income-reports/{id}", delete(handle_delete_income_report))
        .route("/income-reports/{id}/approve", post(handle_approve_income_report))
        .route("/income-reports/{id}/reject", post(handle_reject_income_report))
        .route("/expense-proposals", post(handle_create_expense_proposal))
        .route("/expense-proposals", get(handle_list_expense_proposals))
        .route("/expense-proposals/{id}", get(handle_get_expense_proposal))
        .route("/expense-proposals/{id}", put(handle_update_expense_proposal))
        .route("/expense-proposals/{id}", delete(handle_delete_expense_proposal))
        .route(
            "/expense-proposals/{id}/approve",
            post(handle_approve_expense_proposal),
        )
        .route(
            "/expense-proposals/{id}/reject",
            post(handle_reject_expense_proposal),
        )
        .route(
            "/expense-proposals/{id}/mark-paid",
            post(handle_mark_expense_proposal_paid),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing ClassLedger Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
