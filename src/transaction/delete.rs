use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{alert::Alert, auth::UserData, client::ApiClient, transaction::delete_transaction};

/// Delete a transaction. The row is removed by the delete button on success.
pub async fn delete_transaction_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(transaction_id): Path<Uuid>,
) -> Response {
    match delete_transaction(&api, &user.token, transaction_id).await {
        Ok(()) => {
            tracing::info!("Deleted transaction {transaction_id}");
            Alert::SuccessSimple {
                message: "Transaction deleted".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
