use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    axum_http::error_responses::ApiResponse,
    config::config_model::DotEnvyConfig,
    domain::repositories::{
        mailer::MailTransport, orders::OrderRepository, users::UserRepository,
    },
    infrastructure::{
        mailer::http_mailer::{HttpMailerClient, HttpMailerConfig},
        postgres::{
            postgres_connection::PgPoolHandle,
            repositories::{orders::OrderPostgres, users::UserPostgres},
        },
    },
    usecases::{
        orders::OrderError, subscription_confirmation::SubscriptionConfirmationUseCase,
    },
};

pub fn routes(db_pool: Arc<PgPoolHandle>, config: Arc<DotEnvyConfig>) -> Router {
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let mail_transport = HttpMailerClient::new(HttpMailerConfig {
        api_url: config.mailer.api_url.clone(),
        api_key: config.mailer.api_key.clone(),
        from_address: config.mailer.from_address.clone(),
    });
    let confirmation_usecase = SubscriptionConfirmationUseCase::new(
        Arc::new(order_repository),
        Arc::new(user_repository),
        Arc::new(mail_transport),
    );

    Router::new()
        .route("/confirm/:order_id", post(confirm_subscription))
        .with_state(Arc::new(confirmation_usecase))
}

pub async fn confirm_subscription<O, U, M>(
    State(confirmation_usecase): State<Arc<SubscriptionConfirmationUseCase<O, U, M>>>,
    _admin: AdminUser,
    Path(order_id): Path<String>,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
{
    let order_id = match Uuid::parse_str(&order_id) {
        Ok(order_id) => order_id,
        Err(_) => {
            return OrderError::Validation("orderId must be a valid UUID".to_string())
                .into_response();
        }
    };

    match confirmation_usecase.verify_payment(order_id).await {
        Ok(order) => {
            ApiResponse::ok_with_message("Payment verified and subscription confirmed", order)
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}
