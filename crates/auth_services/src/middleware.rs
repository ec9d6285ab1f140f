use actix_web::{
    Error, HttpMessage, HttpResponse, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
};

use crate::jwt::JwtService;
use crate::types::{AuthError, Session, UserType};

/// Middleware for handling authentication by verifying JWT tokens
/// and attaching the caller's [`Session`] to the request.
pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    /// Creates the middleware around a token verifier.
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

/// Service that implements the authentication middleware logic
pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: JwtService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "));

            let token = match token {
                Some(token) => token,
                None => {
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "missing_token",
                        "message": "Authorization token is required"
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let session = match jwt_service.session_from_token(token) {
                Ok(session) => session,
                Err(e) => {
                    log::debug!("Rejected bearer token: {}", e);
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "invalid_token",
                        "message": "Invalid or expired token"
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(session);

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn session_from_request(req: &actix_web::HttpRequest) -> Result<Session, AuthError> {
    req.extensions()
        .get::<Session>()
        .copied()
        .ok_or(AuthError::InvalidCredentials)
}

/// Extractor for any authenticated caller
pub struct AuthenticatedUser(pub Session);

impl actix_web::FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(session_from_request(req).map(AuthenticatedUser))
    }
}

/// Extractor guarding camp-owner routes
pub struct CampOwnerUser(pub Session);

impl actix_web::FromRequest for CampOwnerUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(session_from_request(req).and_then(|session| {
            if session.user_type == UserType::CampOwner {
                Ok(CampOwnerUser(session))
            } else {
                Err(AuthError::Forbidden(
                    "Only camp owners can access this resource".to_string(),
                ))
            }
        }))
    }
}

/// Extractor guarding admin routes
pub struct AdminUser(pub Session);

impl actix_web::FromRequest for AdminUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(session_from_request(req).and_then(|session| {
            if session.user_type == UserType::Admin {
                Ok(AdminUser(session))
            } else {
                Err(AuthError::Forbidden(
                    "Only admins can access this resource".to_string(),
                ))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{FromRequest, test};
    use uuid::Uuid;

    fn request_with(user_type: UserType) -> actix_web::HttpRequest {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(Session {
            user_id: Uuid::new_v4(),
            user_type,
        });
        req
    }

    #[actix_web::test]
    async fn test_role_guards() {
        let admin = request_with(UserType::Admin);
        assert!(AdminUser::extract(&admin).await.is_ok());
        assert!(CampOwnerUser::extract(&admin).await.is_err());

        let owner = request_with(UserType::CampOwner);
        assert!(CampOwnerUser::extract(&owner).await.is_ok());
        assert!(AdminUser::extract(&owner).await.is_err());

        let regular = request_with(UserType::Regular);
        assert!(AuthenticatedUser::extract(&regular).await.is_ok());
        assert!(CampOwnerUser::extract(&regular).await.is_err());
    }

    #[actix_web::test]
    async fn test_missing_session_is_rejected() {
        let req = test::TestRequest::default().to_http_request();
        assert!(AuthenticatedUser::extract(&req).await.is_err());
    }
}
