use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{alert::Alert, auth::UserData, category::delete_category, client::ApiClient};

/// Delete a category.
///
/// The delete button removes the category's table row itself when this
/// succeeds, so the response only carries the alert.
pub async fn delete_category_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(category_id): Path<Uuid>,
) -> Response {
    match delete_category(&api, &user.token, category_id).await {
        Ok(()) => {
            tracing::info!("Deleted category {category_id}");
            Alert::SuccessSimple {
                message: "Category deleted".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete category {category_id}: {error}");
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
        test_utils::{element_text, parse_html_fragment, spawn_backend, test_state, test_user},
    };

    use super::delete_category_endpoint;

    #[tokio::test]
    async fn deletes_category() {
        let backend = spawn_backend(
            Router::new().route("/category/{id}", delete(|| async { StatusCode::NO_CONTENT })),
        )
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));
        let id = Uuid::new_v4();

        let response = delete_category_endpoint(State(api), Extension(test_user()), Path(id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_eq!(element_text(&html, "p.font-semibold"), ["Category deleted"]);
        assert_eq!(backend.requests_to("DELETE", &format!("/category/{id}")).len(), 1);
    }

    #[tokio::test]
    async fn missing_category_shows_not_found_alert() {
        let backend = spawn_backend(Router::new()).await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response =
            delete_category_endpoint(State(api), Extension(test_user()), Path(Uuid::new_v4())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert_eq!(element_text(&html, "p.font-semibold"), ["Not found"]);
    }
}
