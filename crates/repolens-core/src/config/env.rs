use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("REPOLENS_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_LLM_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("REPOLENS_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_LLM_TIMEOUT")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.llm.timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("REPOLENS_EMBEDDING_BASE_URL") {
            self.embedding.base_url = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("REPOLENS_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_EMBEDDING_TIMEOUT")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.embedding.timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("REPOLENS_USE_SYSTEM_PROXY") {
            if let Ok(enabled) = v.parse::<bool>() {
                self.network.use_system_proxy = enabled;
            } else {
                tracing::warn!("ignoring invalid REPOLENS_USE_SYSTEM_PROXY value: {v}");
            }
        }
        if let Ok(v) = std::env::var("REPOLENS_QDRANT_URL") {
            self.index.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_QDRANT_API_KEY") {
            self.index.qdrant_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("REPOLENS_COLLECTION") {
            self.index.collection = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_GATEWAY_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.gateway.port = port;
            } else {
                tracing::warn!("ignoring invalid REPOLENS_GATEWAY_PORT value: {v}");
            }
        }
    }
}
