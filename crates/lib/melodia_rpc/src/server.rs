//! RPC server — accept loop, per-connection framing and dispatch.
//!
//! The same dispatcher backs both daemons; each is configured with
//! the subset of methods it serves. Requests for any other method are
//! rejected with `InvalidArgument`.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use sqlx::PgPool;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{error, info, warn};

use melodia_core::auth::{AuthError, identity};
use melodia_core::models::user::SignUp;

use crate::wire::{
    ChangePasswordRequest, GetUserByAuthDataRequest, GetUserByCredsRequest, IdReply,
    IncreaseUserVersionRequest, Method, RpcRequest, RpcResponse, SignUpUserRequest, Status,
    UserReply,
};

/// Methods served by the auth daemon.
pub const AUTH_SERVICE_METHODS: &[Method] = &[
    Method::SignUpUser,
    Method::GetUserByCreds,
    Method::IncreaseUserVersion,
    Method::ChangePassword,
];

/// Methods served by the user daemon.
pub const USER_SERVICE_METHODS: &[Method] = &[Method::GetUserByAuthData];

fn status_for(e: &AuthError) -> Status {
    match e {
        AuthError::Validation(_) => Status::InvalidArgument,
        AuthError::UserAlreadyExists => Status::AlreadyExists,
        AuthError::NoSuchUser => Status::NotFound,
        AuthError::IncorrectPassword
        | AuthError::TokenInvalid
        | AuthError::TokenExpired
        | AuthError::Forbidden => Status::PermissionDenied,
        AuthError::Db(_) | AuthError::Crypto(_) | AuthError::Internal(_) => Status::Internal,
    }
}

fn auth_error_response(e: AuthError) -> RpcResponse {
    let status = status_for(&e);
    if status == Status::Internal {
        error!(detail = %e, "rpc operation failed");
        // Internal detail stays in the logs.
        return RpcResponse::error(status, "internal error");
    }
    RpcResponse::error(status, e.to_string())
}

fn parse_body<T: serde::de::DeserializeOwned>(
    body: serde_json::Value,
) -> Result<T, Box<RpcResponse>> {
    serde_json::from_value(body).map_err(|e| {
        Box::new(RpcResponse::error(
            Status::InvalidArgument,
            format!("malformed request body: {e}"),
        ))
    })
}

fn ok_body<T: serde::Serialize>(body: &T) -> RpcResponse {
    match serde_json::to_value(body) {
        Ok(value) => RpcResponse::ok(value),
        Err(e) => RpcResponse::error(Status::Internal, format!("encode reply: {e}")),
    }
}

/// Execute one request against the identity service.
pub async fn dispatch(pool: &PgPool, allowed: &[Method], request: RpcRequest) -> RpcResponse {
    if !allowed.contains(&request.method) {
        return RpcResponse::error(
            Status::InvalidArgument,
            format!("method {:?} not served here", request.method),
        );
    }

    let result = match request.method {
        Method::SignUpUser => match parse_body::<SignUpUserRequest>(request.body) {
            Err(resp) => return *resp,
            Ok(body) => {
                let input = SignUp {
                    username: body.username,
                    email: body.email,
                    password: body.password,
                    first_name: body.first_name,
                    last_name: body.last_name,
                    sex: body.sex,
                    birth_date: body.birth_date,
                };
                identity::sign_up(pool, &input)
                    .await
                    .map(|id| ok_body(&IdReply { id }))
            }
        },
        Method::GetUserByCreds => match parse_body::<GetUserByCredsRequest>(request.body) {
            Err(resp) => return *resp,
            Ok(body) => identity::verify_credentials(pool, &body.username, &body.password)
                .await
                .map(|user| ok_body(&UserReply::from(&user))),
        },
        Method::GetUserByAuthData => match parse_body::<GetUserByAuthDataRequest>(request.body) {
            Err(resp) => return *resp,
            Ok(body) => identity::get_by_auth_data(pool, body.user_id, body.user_version)
                .await
                .map(|user| ok_body(&UserReply::from(&user))),
        },
        Method::IncreaseUserVersion => {
            match parse_body::<IncreaseUserVersionRequest>(request.body) {
                Err(resp) => return *resp,
                Ok(body) => identity::bump_version(pool, body.user_id)
                    .await
                    .map(|_| RpcResponse::ok(serde_json::json!({}))),
            }
        }
        Method::ChangePassword => match parse_body::<ChangePasswordRequest>(request.body) {
            Err(resp) => return *resp,
            Ok(body) => identity::change_password(pool, body.user_id, &body.new_password)
                .await
                .map(|_| RpcResponse::ok(serde_json::json!({}))),
        },
    };

    result.unwrap_or_else(auth_error_response)
}

/// Serve one connection until the peer closes it.
pub async fn handle_connection<S>(io: S, pool: PgPool, allowed: &[Method])
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(io, LengthDelimitedCodec::new());

    while let Some(frame) = framed.next().await {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                warn!(detail = %e, "rpc frame read failed");
                return;
            }
        };

        let response = match serde_json::from_slice::<RpcRequest>(&frame) {
            Ok(request) => dispatch(&pool, allowed, request).await,
            Err(e) => RpcResponse::error(
                Status::InvalidArgument,
                format!("malformed request frame: {e}"),
            ),
        };

        let encoded = match serde_json::to_vec(&response) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(detail = %e, "rpc response encode failed");
                return;
            }
        };
        if let Err(e) = framed.send(Bytes::from(encoded)).await {
            warn!(detail = %e, "rpc frame write failed");
            return;
        }
    }
}

/// Accept loop: one task per connection.
pub async fn serve(
    listener: TcpListener,
    pool: PgPool,
    allowed: &'static [Method],
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "rpc service listening");
    loop {
        let (socket, peer) = listener.accept().await?;
        let pool = pool.clone();
        tokio::spawn(async move {
            info!(%peer, "rpc connection opened");
            handle_connection(socket, pool, allowed).await;
            info!(%peer, "rpc connection closed");
        });
    }
}
