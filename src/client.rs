use crate::{
    apis::{BlacklistApi, RecordApi, StreamApi},
    auth::{Clock, SystemClock},
    compose::{compose, RequestDescriptor, RequestOptions},
    config::ClientConfig,
    dispatch::{Dispatched, Dispatcher},
    error::{KlsError, KlsResult},
    sign::SigV4Signer,
    transport::{RawResponse, ReqwestTransport, Timeouts, Transport},
};
use log::info;
use serde_json::Value;
use std::sync::Arc;

/// Main KLS client
#[derive(Clone)]
pub struct KlsClient {
    config: Arc<ClientConfig>,
    signer: SigV4Signer,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl KlsClient {
    /// Create a new KLS client backed by reqwest
    pub fn new(config: ClientConfig) -> KlsResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client from `KSYUN_*`/`KLS_*` environment variables
    pub fn from_env() -> KlsResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a new KLS client with a custom transport
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        let dispatcher = Dispatcher::new(
            Arc::new(transport),
            config.scheme.clone(),
            Timeouts::from_config(&config),
        );
        Self {
            signer: SigV4Signer::new(config.credentials.clone()),
            config: Arc::new(config),
            dispatcher,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the signing clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stream query and control API
    pub fn streams(&self) -> StreamApi<'_> {
        StreamApi::new(self)
    }

    /// Blacklist API
    pub fn blacklist(&self) -> BlacklistApi<'_> {
        BlacklistApi::new(self)
    }

    /// Recording task API
    pub fn records(&self) -> RecordApi<'_> {
        RecordApi::new(self)
    }

    /// Compose and sign a request without sending it
    pub fn prepare(
        &self,
        action: &str,
        user_params: Option<&Value>,
        options: &RequestOptions,
    ) -> KlsResult<RequestDescriptor> {
        let descriptor = compose(action, user_params, options, &self.config)?;
        Ok(self.signer.sign(descriptor, self.clock.now()))
    }

    /// Call `action` and return its JSON payload.
    ///
    /// With `options.raw` set, the untouched transport response is returned
    /// as JSON (`status`, `status_text`, `headers`, `body`) instead.
    pub async fn request(
        &self,
        action: &str,
        user_params: Option<Value>,
        options: RequestOptions,
    ) -> KlsResult<Value> {
        let descriptor = self.prepare(action, user_params.as_ref(), &options)?;
        info!("Calling {} ({} {})", action, descriptor.method, descriptor.pathname());
        match self
            .dispatcher
            .dispatch(descriptor, options.raw, options.timeout)
            .await?
        {
            Dispatched::Payload(payload) => Ok(payload),
            Dispatched::Raw(raw) => serde_json::to_value(raw)
                .map_err(|e| KlsError::transport_error(500, format!("cannot encode raw response: {}", e))),
        }
    }

    /// Call `action` and return the transport response without classification
    pub async fn request_raw(
        &self,
        action: &str,
        user_params: Option<Value>,
        options: RequestOptions,
    ) -> KlsResult<RawResponse> {
        let descriptor = self.prepare(action, user_params.as_ref(), &options)?;
        info!("Calling {} raw ({} {})", action, descriptor.method, descriptor.pathname());
        self.dispatcher.send(descriptor, options.timeout).await
    }
}
