//! Typed calls for each RPC backend.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::config::schema::RpcConfig;
use crate::rpc::{RpcBackend, RpcClient, RpcError, RpcOperation};

fn username_params(username: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("username".to_string(), json!(username));
    params
}

/// Stakeholder profiles.
#[derive(Debug, Clone)]
pub struct StakeholderRpc {
    client: RpcClient,
}

impl StakeholderRpc {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }

    pub async fn get_profile(&self, username: &str) -> Result<Value, RpcError> {
        self.client
            .call(RpcOperation::GetProfile.method(), username_params(username))
            .await
    }
}

/// Payload of a new blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBlog {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub author: String,
}

/// Blog posts.
#[derive(Debug, Clone)]
pub struct BlogRpc {
    client: RpcClient,
}

impl BlogRpc {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }

    pub async fn create_blog(&self, blog: &NewBlog) -> Result<Value, RpcError> {
        let params = match serde_json::to_value(blog)? {
            Value::Object(params) => params,
            _ => Map::new(),
        };
        self.client.call(RpcOperation::CreateBlog.method(), params).await
    }

    pub async fn personalized_blogs(&self, username: &str) -> Result<Value, RpcError> {
        self.client
            .call(RpcOperation::GetPersonalizedBlogs.method(), username_params(username))
            .await
    }
}

/// Carts and purchases.
#[derive(Debug, Clone)]
pub struct PurchaseRpc {
    client: RpcClient,
}

impl PurchaseRpc {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }

    pub async fn checkout(&self, username: &str) -> Result<Value, RpcError> {
        self.client
            .call(RpcOperation::Checkout.method(), username_params(username))
            .await
    }

    pub async fn purchased_tours(&self, username: &str) -> Result<Value, RpcError> {
        self.client
            .call(RpcOperation::GetPurchasedTours.method(), username_params(username))
            .await
    }
}

/// The fixed set of RPC backends the gateway talks to.
#[derive(Debug, Clone)]
pub struct RpcBackends {
    pub stakeholder: StakeholderRpc,
    pub blog: BlogRpc,
    pub purchase: PurchaseRpc,
}

impl RpcBackends {
    pub fn from_config(config: &RpcConfig) -> Self {
        let client = |addr: &str| {
            let client = RpcClient::new(addr);
            match config.call_timeout_ms {
                0 => client,
                ms => client.with_deadline(Duration::from_millis(ms)),
            }
        };
        Self {
            stakeholder: StakeholderRpc::new(client(&config.stakeholder)),
            blog: BlogRpc::new(client(&config.blog)),
            purchase: PurchaseRpc::new(client(&config.purchase)),
        }
    }

    /// Address serving `backend`, for logging.
    pub fn addr(&self, backend: RpcBackend) -> &str {
        match backend {
            RpcBackend::Stakeholder => self.stakeholder.client.addr(),
            RpcBackend::Blog => self.blog.client.addr(),
            RpcBackend::Purchase => self.purchase.client.addr(),
        }
    }
}
