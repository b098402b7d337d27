use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::{ErrorForbidden, ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{web, Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::db::user_queries;
use crate::middleware::auth::{validate_jwt_from_request, Claims};

/// Guards the admin scope.
///
/// The token only identifies the caller; role and status are read from the
/// database on every request so promotions, demotions and suspensions apply
/// to tokens that are already out.
pub struct AdminMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AdminMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminMiddlewareService { service: Rc::new(service) }))
    }
}

pub struct AdminMiddlewareService<S> {
    service: Rc<S>,
}

/// Replace the token's role and status with the stored ones and require an active admin.
async fn refresh_admin_claims(pool: &PgPool, mut claims: Claims) -> Result<Claims, Error> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| ErrorUnauthorized("Invalid token subject"))?;

    let (role, status) = user_queries::access_level(pool, user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load access level for {}: {}", user_id, e);
            ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| ErrorUnauthorized("Account no longer exists"))?;

    claims.role = role;
    claims.status = status;

    if !claims.is_admin() {
        tracing::warn!(
            "Admin access denied for {} (role: {}, status: {:?})",
            claims.username, claims.role, claims.status
        );
        return Err(ErrorForbidden("Insufficient privileges"));
    }
    Ok(claims)
}

impl<S, B> Service<ServiceRequest> for AdminMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let claims = validate_jwt_from_request(&req)?;
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| ErrorInternalServerError("Database pool not configured"))?;

            let claims = refresh_admin_claims(pool.get_ref(), claims).await?;
            req.extensions_mut().insert(claims);

            service.call(req).await
        })
    }
}
