//! Bearer authentication for HTTP handlers.
//!
//! Handlers that need a caller declare an [`AuthenticatedUser`] argument;
//! the extractor reads `Authorization: Bearer <token>` and resolves it
//! through the [`Authenticator`](crate::domain::ports::Authenticator) port.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, User};
use crate::inbound::http::state::HttpState;

const BEARER: &str = "bearer";

/// The active user behind a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER) || token.is_empty() {
        return Err(Error::unauthorized("malformed authorization header"));
    }
    Ok(token.to_owned())
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token?;
            state.authenticator.authenticate(&token).await.map(Self)
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    use crate::inbound::http::test_utils::{TestPorts, sample_user};

    async fn call_whoami(
        ports: TestPorts,
        authorization: Option<&str>,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .route(
                    "/whoami",
                    web::get().to(|caller: AuthenticatedUser| async move {
                        HttpResponse::Ok().body(caller.user().username().to_string())
                    }),
                ),
        )
        .await;
        let mut request = test::TestRequest::get().uri("/whoami");
        if let Some(value) = authorization {
            request = request.insert_header((AUTHORIZATION, value));
        }
        test::call_service(&app, request.to_request()).await
    }

    #[actix_web::test]
    async fn valid_bearer_token_resolves_the_user() {
        let mut ports = TestPorts::default();
        ports
            .authenticator
            .expect_authenticate()
            .withf(|token| token == "good-token")
            .times(1)
            .returning(|_| Ok(sample_user("ada")));

        let response = call_whoami(ports, Some("Bearer good-token")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test::read_body(response).await, "ada");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic YWRhOnNlY3JldA=="))]
    #[case(Some("Bearer"))]
    #[case(Some("Bearer    "))]
    #[actix_web::test]
    async fn missing_or_malformed_headers_are_unauthorized(#[case] header: Option<&str>) {
        // The authenticator mock has no expectations: it must not be called.
        let response = call_whoami(TestPorts::default(), header).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn rejected_tokens_are_unauthorized() {
        let mut ports = TestPorts::default();
        ports
            .authenticator
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized("invalid token")));

        let response = call_whoami(ports, Some("Bearer forged")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
