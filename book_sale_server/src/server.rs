use std::{sync::Arc, time::Duration};

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
    ResponseError,
};
use book_sale_engine::{AuthApi, BookApi, OrderApi, ResourceStore, ReviewApi, SqliteDatabase, UserApi};
use log::*;

use crate::{
    auth::{IdentityVerifier, JwtIdentityVerifier},
    config::ServerConfig,
    errors::ServerError,
    routes::{
        liveness,
        AdminStatusRoute,
        AllBooksRoute,
        AllOrdersRoute,
        AllReviewsRoute,
        BookByIdRoute,
        CreateBookRoute,
        CreateOrderRoute,
        CreateReviewRoute,
        CreateUserRoute,
        DeleteBookRoute,
        DeleteOrderRoute,
        MakeAdminRoute,
        OrdersForUserRoute,
        ReplaceBookRoute,
        ReviewsForUserRoute,
        UpsertUserRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(format!("Could not connect to {}. {e}", config.database_url)))?;
    info!("🚀️ Connected to database at {}", db.url());
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwtIdentityVerifier::new(&config.auth));
    let verifier = web::Data::from(verifier);
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %r").log_target("bss::access_log"))
            .wrap(Cors::permissive())
            .configure(|cfg| configure_app(cfg, db.clone(), verifier.clone()))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the API objects, the identity verifier and every route on an app.
///
/// This is shared by the live server and the endpoint tests, so both see exactly the same routing table.
pub fn configure_app<B>(cfg: &mut web::ServiceConfig, db: B, verifier: web::Data<dyn IdentityVerifier>)
where B: ResourceStore + Clone + 'static {
    cfg.app_data(web::Data::new(UserApi::new(db.clone())))
        .app_data(web::Data::new(AuthApi::new(db.clone())))
        .app_data(web::Data::new(BookApi::new(db.clone())))
        .app_data(web::Data::new(OrderApi::new(db.clone())))
        .app_data(web::Data::new(ReviewApi::new(db)))
        .app_data(verifier)
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(liveness)
        .service(CreateUserRoute::<B>::new())
        .service(UpsertUserRoute::<B>::new())
        .service(MakeAdminRoute::<B>::new())
        .service(AdminStatusRoute::<B>::new())
        .service(CreateBookRoute::<B>::new())
        .service(AllBooksRoute::<B>::new())
        .service(BookByIdRoute::<B>::new())
        .service(DeleteBookRoute::<B>::new())
        .service(ReplaceBookRoute::<B>::new())
        .service(CreateOrderRoute::<B>::new())
        .service(OrdersForUserRoute::<B>::new())
        .service(AllOrdersRoute::<B>::new())
        .service(DeleteOrderRoute::<B>::new())
        .service(CreateReviewRoute::<B>::new())
        .service(ReviewsForUserRoute::<B>::new())
        .service(AllReviewsRoute::<B>::new());
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Rejected request body. {err}");
    let server_error = ServerError::InvalidRequestBody(err.to_string());
    let response = server_error.error_response();
    InternalError::from_response(err, response).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Rejected query string. {err}");
    let server_error = ServerError::InvalidRequestQuery(err.to_string());
    let response = server_error.error_response();
    InternalError::from_response(err, response).into()
}
