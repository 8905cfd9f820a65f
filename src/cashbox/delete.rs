use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{alert::Alert, auth::UserData, cashbox::delete_cashbox, client::ApiClient};

/// Delete a cashbox. The row is removed by the delete button on success.
pub async fn delete_cashbox_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(cashbox_id): Path<Uuid>,
) -> Response {
    match delete_cashbox(&api, &user.token, cashbox_id).await {
        Ok(()) => {
            tracing::info!("Deleted cashbox {cashbox_id}");
            Alert::SuccessSimple {
                message: "Cashbox deleted".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete cashbox {cashbox_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        extract::{FromRef, Path, State},
        http::StatusCode,
        routing::delete,
    };
    use uuid::Uuid;

    use crate::{
        client::ApiClient,
        error::SessionExpired,
        test_utils::{element_text, parse_html_fragment, spawn_backend, test_state, test_user},
    };

    use super::delete_cashbox_endpoint;

    #[tokio::test]
    async fn deletes_cashbox() {
        let backend = spawn_backend(
            Router::new().route("/cashbox/{id}", delete(|| async { StatusCode::NO_CONTENT })),
        )
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));
        let id = Uuid::new_v4();

        let response = delete_cashbox_endpoint(State(api), Extension(test_user()), Path(id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_eq!(element_text(&html, "p.font-semibold"), ["Cashbox deleted"]);
        assert_eq!(backend.requests_to("DELETE", &format!("/cashbox/{id}")).len(), 1);
    }

    #[tokio::test]
    async fn expired_session_is_marked_for_middleware() {
        let backend = spawn_backend(
            Router::new().route("/cashbox/{id}", delete(|| async { StatusCode::UNAUTHORIZED })),
        )
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response =
            delete_cashbox_endpoint(State(api), Extension(test_user()), Path(Uuid::new_v4())).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }
}
