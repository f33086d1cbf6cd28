//! Typed RPC client over any byte stream.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::wire::{
    ChangePasswordRequest, GetUserByAuthDataRequest, GetUserByCredsRequest, IdReply,
    IncreaseUserVersionRequest, Method, RpcRequest, RpcResponse, SignUpUserRequest, Status,
    UserReply,
};

/// Client-side RPC errors.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc status {status:?}: {message}")]
    Status { status: Status, message: String },

    #[error("connection closed")]
    Closed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// One client connection. Calls are serialized request/response pairs.
pub struct RpcClient<S> {
    framed: Framed<S, LengthDelimitedCodec>,
}

impl RpcClient<TcpStream> {
    /// Connect to an RPC daemon over TCP.
    pub async fn connect(addr: &str) -> Result<Self, RpcError> {
        Ok(Self::new(TcpStream::connect(addr).await?))
    }
}

impl<S> RpcClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an established byte stream.
    pub fn new(io: S) -> Self {
        Self {
            framed: Framed::new(io, LengthDelimitedCodec::new()),
        }
    }

    async fn call<Req, Reply>(&mut self, method: Method, body: &Req) -> Result<Reply, RpcError>
    where
        Req: serde::Serialize,
        Reply: serde::de::DeserializeOwned,
    {
        let request = RpcRequest {
            method,
            body: serde_json::to_value(body)?,
        };
        self.framed
            .send(Bytes::from(serde_json::to_vec(&request)?))
            .await?;

        let frame = self.framed.next().await.ok_or(RpcError::Closed)??;
        let response: RpcResponse = serde_json::from_slice(&frame)?;
        if response.status != Status::Ok {
            return Err(RpcError::Status {
                status: response.status,
                message: response.message,
            });
        }
        Ok(serde_json::from_value(
            response.body.unwrap_or(serde_json::Value::Null),
        )?)
    }

    pub async fn sign_up_user(&mut self, request: &SignUpUserRequest) -> Result<u32, RpcError> {
        let reply: IdReply = self.call(Method::SignUpUser, request).await?;
        Ok(reply.id)
    }

    pub async fn get_user_by_creds(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<UserReply, RpcError> {
        self.call(
            Method::GetUserByCreds,
            &GetUserByCredsRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    pub async fn get_user_by_auth_data(
        &mut self,
        user_id: u32,
        user_version: u32,
    ) -> Result<UserReply, RpcError> {
        self.call(
            Method::GetUserByAuthData,
            &GetUserByAuthDataRequest {
                user_id,
                user_version,
            },
        )
        .await
    }

    pub async fn increase_user_version(&mut self, user_id: u32) -> Result<(), RpcError> {
        let _: serde_json::Value = self
            .call(
                Method::IncreaseUserVersion,
                &IncreaseUserVersionRequest { user_id },
            )
            .await?;
        Ok(())
    }

    pub async fn change_password(
        &mut self,
        user_id: u32,
        new_password: &str,
    ) -> Result<(), RpcError> {
        let _: serde_json::Value = self
            .call(
                Method::ChangePassword,
                &ChangePasswordRequest {
                    user_id,
                    new_password: new_password.to_string(),
                },
            )
            .await?;
        Ok(())
    }
}
