use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use shared::{
    BoardDto, ErrorBody, PurchaseReceipt, PurchaseRequest, SweepSummaryDto, TransactionDto,
    UserDto, WinnerEntry, WinningBoardDraftDto, WinningBoardDto, WinnersResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::domain::models::{Board, LedgerTransaction, NewWinningBoard, User, WinningBoard};
use crate::domain::purchase::PurchaseService;
use crate::domain::settlement::SettlementService;
use crate::domain::winners::WinnerService;
use crate::errors::DomainError;

/// Application state shared across handlers.
pub struct AppState {
    pub purchases: PurchaseService,
    pub winners: WinnerService,
    pub settlement: SettlementService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/purchases", post(create_purchase))
        .route("/winning-boards", post(create_winning_board))
        .route("/winning-boards/:id/winners", get(list_winners))
        .route("/settlement/advance-week", post(advance_week))
        .route("/health", get(health))
        .with_state(state)
}

/// Map the domain error taxonomy onto HTTP statuses. The message always
/// travels in the body; unexpected service failures stay opaque.
fn error_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::InvalidRequest(_) | DomainError::RangeValidation(_) => StatusCode::BAD_REQUEST,
        DomainError::PurchaseNotAllowed(_) => StatusCode::FORBIDDEN,
        DomainError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::DuplicateResource(_) => StatusCode::CONFLICT,
        DomainError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Service error: {:?}", err);
        ErrorBody { error: "internal error".to_string() }
    } else {
        ErrorBody { error: err.to_string() }
    };

    (status, Json(body)).into_response()
}

fn board_dto(board: Board) -> BoardDto {
    BoardDto {
        id: board.id,
        user_id: board.user_id,
        size: board.size,
        numbers: board.numbers,
        week: board.week,
        year: board.year,
        weeks_purchased: board.weeks_purchased,
        is_active: board.is_active,
        won: board.won,
    }
}

fn transaction_dto(transaction: LedgerTransaction) -> TransactionDto {
    TransactionDto {
        id: transaction.id,
        user_id: transaction.user_id,
        amount: transaction.amount,
        pending: transaction.pending,
        description: transaction.description,
        created_at: transaction.created_at,
    }
}

fn user_dto(user: User) -> UserDto {
    UserDto {
        id: user.id,
        name: user.name,
        balance: user.balance,
    }
}

fn winning_board_dto(winning: WinningBoard) -> WinningBoardDto {
    WinningBoardDto {
        id: winning.id,
        week: winning.week,
        year: winning.year,
        numbers: winning.numbers,
    }
}

/// Axum handler for POST /api/purchases
async fn create_purchase(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PurchaseRequest>,
) -> impl IntoResponse {
    info!("POST /api/purchases - user: {}", request.board.user_id);

    match state.purchases.purchase(request, Utc::now()).await {
        Ok((board, transaction)) => (
            StatusCode::CREATED,
            Json(PurchaseReceipt {
                board: board_dto(board),
                transaction: transaction_dto(transaction),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for POST /api/winning-boards
async fn create_winning_board(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WinningBoardDraftDto>,
) -> impl IntoResponse {
    info!("POST /api/winning-boards - week {}/{}", request.week, request.year);

    let draft = NewWinningBoard {
        week: request.week,
        year: request.year,
        numbers: request.numbers,
    };

    match state.winners.create_winning_board(draft).await {
        Ok(winning) => (StatusCode::CREATED, Json(winning_board_dto(winning))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/winning-boards/:id/winners
async fn list_winners(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/winning-boards/{}/winners", id);

    let winning = match state.winners.get_winning_board(&id).await {
        Ok(winning) => winning,
        Err(e) => return error_response(e),
    };

    match state.winners.find_matching_boards(&id).await {
        Ok(matches) => {
            let winners = matches
                .into_iter()
                .map(|(board, user)| WinnerEntry {
                    board: board_dto(board),
                    user: user_dto(user),
                })
                .collect();
            (
                StatusCode::OK,
                Json(WinnersResponse {
                    winning_board: winning_board_dto(winning),
                    winners,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Axum handler for POST /api/settlement/advance-week
async fn advance_week(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("POST /api/settlement/advance-week");

    match state.settlement.advance_week().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(SweepSummaryDto {
                boards_decremented: summary.boards_decremented,
                boards_retired: summary.boards_retired,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
