//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every store call here is async, so handlers only ever yield while
//! they wait on the database.
use actix_web::{get, web, HttpResponse, Responder};
use book_sale_engine::{
    bss_api::user_api::EMAIL_FIELD,
    db_types::{Document, DocumentId},
    AuthApi,
    AuthApiError,
    BookApi,
    BookDetails,
    OrderApi,
    ResourceStore,
    ReviewApi,
    UserApi,
};
use log::*;
use serde_json::Value;

use crate::{
    auth::IdentityOutcome,
    data_objects::{AdminGrantRequest, AdminStatus, OwnerQuery},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Liveness  ----------------------------------------------------
#[get("/")]
pub async fn liveness() -> impl Responder {
    trace!("💻️ Received liveness request");
    HttpResponse::Ok().content_type("text/plain").body("Server Running")
}

//----------------------------------------------   Users  ----------------------------------------------------
route!(create_user => Post "/users" impl ResourceStore);
pub async fn create_user<B: ResourceStore>(
    body: web::Json<Document>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received create user request");
    let receipt = api.create_user(body.into_inner()).await?;
    debug!("💻️ Created user {}", receipt.inserted_id);
    Ok(HttpResponse::Ok().json(receipt))
}

route!(upsert_user => Put "/users" impl ResourceStore);
/// Sets every field of the body on the user whose email matches `body.email`, creating the user if needed.
pub async fn upsert_user<B: ResourceStore>(
    body: web::Json<Document>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let profile = body.into_inner();
    let email = match profile.get(EMAIL_FIELD) {
        Some(Value::String(email)) => email.clone(),
        _ => return Err(ServerError::InvalidRequestBody("A string 'email' field is required".into())),
    };
    trace!("💻️ Received upsert request for user {email}");
    let receipt = api.upsert_user(&email, profile).await?;
    debug!("💻️ Upserted user {email}. Matched: {}, upserted: {}", receipt.matched_count, receipt.upserted_count);
    Ok(HttpResponse::Ok().json(receipt))
}

route!(make_admin => Put "/users/admin" impl ResourceStore);
/// Route handler for promoting a user to admin.
///
/// The requester is identified by their bearer token and must already be an admin. Any refusal, including a missing or
/// invalid token and an unknown target user, is a 403 with the same message. The requester is checked before the body
/// is read, so unauthorised callers learn nothing from a malformed body.
pub async fn make_admin<B: ResourceStore>(
    identity: IdentityOutcome,
    body: web::Bytes,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    if !api.can_grant_admin(identity.principal()).await? {
        info!("💻️ Admin grant refused before reading the request body");
        return Err(AuthApiError::InsufficientPermissions.into());
    }
    let AdminGrantRequest { email } =
        serde_json::from_slice(&body).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    trace!("💻️ Received admin grant request for {email}");
    let receipt = api.grant_admin(identity.principal(), &email).await.map_err(|e| {
        info!("💻️ Admin grant for {email} refused. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(receipt))
}

route!(admin_status => Get "/users/{email}" impl ResourceStore);
pub async fn admin_status<B: ResourceStore>(
    path: web::Path<String>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let email = path.into_inner();
    trace!("💻️ Received admin status request for {email}");
    let admin = api.is_admin(&email).await?;
    Ok(HttpResponse::Ok().json(AdminStatus { admin }))
}

//----------------------------------------------   Books  ----------------------------------------------------
route!(create_book => Post "/books" impl ResourceStore);
pub async fn create_book<B: ResourceStore>(
    body: web::Json<Document>,
    api: web::Data<BookApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received create book request");
    let receipt = api.create_book(body.into_inner()).await?;
    debug!("💻️ Created book {}", receipt.inserted_id);
    Ok(HttpResponse::Ok().json(receipt))
}

route!(all_books => Get "/books" impl ResourceStore);
pub async fn all_books<B: ResourceStore>(api: web::Data<BookApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received request for all books");
    let books = api.all_books().await?;
    Ok(HttpResponse::Ok().json(books))
}

route!(book_by_id => Get "/books/{id}" impl ResourceStore);
/// A missing book is not an error. The response is a JSON `null`.
pub async fn book_by_id<B: ResourceStore>(
    path: web::Path<String>,
    api: web::Data<BookApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.parse::<DocumentId>()?;
    trace!("💻️ Received request for book {id}");
    let book = api.fetch_book(id).await?;
    Ok(HttpResponse::Ok().json(book))
}

route!(delete_book => Delete "/books/{id}" impl ResourceStore);
pub async fn delete_book<B: ResourceStore>(
    path: web::Path<String>,
    api: web::Data<BookApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.parse::<DocumentId>()?;
    trace!("💻️ Received delete request for book {id}");
    let receipt = api.delete_book(id).await?;
    debug!("💻️ Delete request for book {id} removed {} documents", receipt.deleted_count);
    Ok(HttpResponse::Ok().json(receipt))
}

route!(replace_book => Put "/books/{id}" impl ResourceStore);
/// Overwrites the five listing fields of a book. Fields missing from the body are set to `null`, and the book is
/// created under the given id if it does not exist.
pub async fn replace_book<B: ResourceStore>(
    path: web::Path<String>,
    body: web::Json<BookDetails>,
    api: web::Data<BookApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.parse::<DocumentId>()?;
    trace!("💻️ Received replace request for book {id}");
    let receipt = api.replace_book(id, &body).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/order" impl ResourceStore);
pub async fn create_order<B: ResourceStore>(
    body: web::Json<Document>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received create order request");
    let receipt = api.create_order(body.into_inner()).await?;
    debug!("💻️ Created order {}", receipt.inserted_id);
    Ok(HttpResponse::Ok().json(receipt))
}

route!(orders_for_user => Get "/user/order" impl ResourceStore);
pub async fn orders_for_user<B: ResourceStore>(
    query: web::Query<OwnerQuery>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received request for orders of {}", query.user_email);
    let orders = api.orders_for_user(&query.user_email).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(all_orders => Get "/order" impl ResourceStore);
pub async fn all_orders<B: ResourceStore>(api: web::Data<OrderApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received request for all orders");
    let orders = api.all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(delete_order => Delete "/order/{id}" impl ResourceStore);
pub async fn delete_order<B: ResourceStore>(
    path: web::Path<String>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.parse::<DocumentId>()?;
    trace!("💻️ Received delete request for order {id}");
    let receipt = api.delete_order(id).await?;
    debug!("💻️ Delete request for order {id} removed {} documents", receipt.deleted_count);
    Ok(HttpResponse::Ok().json(receipt))
}

//----------------------------------------------   Reviews  ----------------------------------------------------
route!(create_review => Post "/review" impl ResourceStore);
pub async fn create_review<B: ResourceStore>(
    body: web::Json<Document>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received create review request");
    let receipt = api.create_review(body.into_inner()).await?;
    debug!("💻️ Created review {}", receipt.inserted_id);
    Ok(HttpResponse::Ok().json(receipt))
}

route!(reviews_for_user => Get "/user/review" impl ResourceStore);
pub async fn reviews_for_user<B: ResourceStore>(
    query: web::Query<OwnerQuery>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received request for reviews by {}", query.user_email);
    let reviews = api.reviews_for_user(&query.user_email).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

route!(all_reviews => Get "/review" impl ResourceStore);
pub async fn all_reviews<B: ResourceStore>(api: web::Data<ReviewApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received request for all reviews");
    let reviews = api.all_reviews().await?;
    Ok(HttpResponse::Ok().json(reviews))
}
